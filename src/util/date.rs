//! Display formatting for feed timestamps.
//!
//! Feeds carry two date shapes: RSS `pubDate` values
//! (`Wed, 04 Feb 2026 17:29:45 +0000`) and the ISO-8601 timestamps YouTube
//! puts in `<published>` (`2026-02-09T21:35:27+00:00`). Both are rendered as
//! `dd/mm/yyyy`. Neither formatter fails: unparseable input is returned as-is
//! so the page still shows something.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Display format shared by every rendered date.
const DISPLAY_FORMAT: &str = "%d/%m/%Y";

/// Number of characters of an RSS date that carry the date and time.
/// Anything after this (the zone offset) is ignored.
const RSS_PREFIX_LEN: usize = 25;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Formats an RSS `pubDate` as `dd/mm/yyyy`.
///
/// The weekday must be an English abbreviation but is not checked against
/// the date; publishers get it wrong often enough.
///
/// # Examples
///
/// ```
/// use clubfeed::util::format_rss_date;
///
/// assert_eq!(format_rss_date("Wed, 04 Feb 2026 17:29:45 +0000"), "04/02/2026");
/// assert_eq!(format_rss_date("mañana"), "mañana");
/// ```
pub fn format_rss_date(raw: &str) -> String {
    parse_rss_date(raw)
        .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_rss_date(raw: &str) -> Option<NaiveDateTime> {
    let prefix: String = raw.trim_start().chars().take(RSS_PREFIX_LEN).collect();
    let (weekday, rest) = prefix.trim_end().split_once(", ")?;
    if !WEEKDAYS.iter().any(|w| w.eq_ignore_ascii_case(weekday)) {
        return None;
    }
    NaiveDateTime::parse_from_str(rest, "%d %b %Y %H:%M:%S").ok()
}

/// Formats a YouTube `<published>` timestamp as `dd/mm/yyyy`.
///
/// The zone designator (`Z` or a numeric offset) is dropped and the remaining
/// wall-clock value is used as-is, so the displayed day is the publisher's
/// local day.
///
/// # Examples
///
/// ```
/// use clubfeed::util::format_youtube_date;
///
/// assert_eq!(format_youtube_date("2026-02-09T21:35:27+00:00"), "09/02/2026");
/// assert_eq!(format_youtube_date("2026-02-09T23:10:00-03:00"), "09/02/2026");
/// ```
pub fn format_youtube_date(raw: &str) -> String {
    parse_youtube_date(raw)
        .map(|dt| dt.format(DISPLAY_FORMAT).to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn parse_youtube_date(raw: &str) -> Option<NaiveDateTime> {
    let naive = strip_zone(raw.trim());
    if let Ok(dt) = NaiveDateTime::parse_from_str(naive, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(naive, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Removes a trailing `Z`, `±HH:MM` or `±HHMM` from an ISO timestamp.
fn strip_zone(s: &str) -> &str {
    if let Some(rest) = s.strip_suffix(['Z', 'z']) {
        return rest;
    }
    // The offset can only appear after the time component.
    let Some(t) = s.find('T') else {
        return s;
    };
    match s[t..].rfind(['+', '-']) {
        Some(pos) => &s[..t + pos],
        None => s,
    }
}

/// Rewrites an RFC 3339 timestamp into a fixed-width UTC form
/// (`YYYY-MM-DDTHH:MM:SS+00:00`) so that plain string comparison orders
/// timestamps chronologically, whatever offset the source used.
///
/// Unparseable input is returned unchanged.
pub fn sortable_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(dt) => dt
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Secs, false),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rss_date_ignores_offset() {
        assert_eq!(format_rss_date("Mon, 09 Feb 2026 21:35:27 +0000"), "09/02/2026");
        assert_eq!(format_rss_date("Mon, 09 Feb 2026 21:35:27 -0300"), "09/02/2026");
        assert_eq!(format_rss_date("Mon, 09 Feb 2026 21:35:27 GMT"), "09/02/2026");
    }

    #[test]
    fn test_rss_date_surrounding_whitespace() {
        assert_eq!(format_rss_date("  Mon, 09 Feb 2026 21:35:27 +0000\n"), "09/02/2026");
        assert_eq!(format_rss_date("  pronto \n"), "  pronto \n");
    }

    #[test]
    fn test_rss_date_wrong_weekday_accepted() {
        assert_eq!(format_rss_date("Fri, 09 Feb 2026 21:35:27 +0000"), "09/02/2026");
    }

    #[test]
    fn test_rss_date_fallback() {
        assert_eq!(format_rss_date(""), "");
        assert_eq!(format_rss_date("2026-02-09"), "2026-02-09");
        assert_eq!(format_rss_date("Xyz, 09 Feb 2026 21:35:27"), "Xyz, 09 Feb 2026 21:35:27");
        assert_eq!(format_rss_date("Mon, 31 Feb 2026 21:35:27"), "Mon, 31 Feb 2026 21:35:27");
    }

    #[test]
    fn test_youtube_date_variants() {
        assert_eq!(format_youtube_date("2026-02-09T21:35:27+00:00"), "09/02/2026");
        assert_eq!(format_youtube_date("2026-02-09T21:35:27Z"), "09/02/2026");
        assert_eq!(format_youtube_date("2026-02-09T21:35:27.123+0000"), "09/02/2026");
        assert_eq!(format_youtube_date("2026-02-09T21:35:27"), "09/02/2026");
        assert_eq!(format_youtube_date("2026-02-09"), "09/02/2026");
    }

    #[test]
    fn test_youtube_date_fallback() {
        assert_eq!(format_youtube_date(""), "");
        assert_eq!(format_youtube_date("yesterday"), "yesterday");
        assert_eq!(format_youtube_date("2026-13-01T00:00:00Z"), "2026-13-01T00:00:00Z");
    }

    #[test]
    fn test_same_day_formats_agree() {
        let rss = format_rss_date("Mon, 09 Feb 2026 21:35:27 +0000");
        let yt = format_youtube_date("2026-02-09T21:35:27+00:00");
        assert_eq!(rss, yt);
    }

    #[test]
    fn test_sortable_timestamp() {
        assert_eq!(
            sortable_timestamp("2026-02-09T21:35:27+00:00"),
            "2026-02-09T21:35:27+00:00"
        );
        assert_eq!(
            sortable_timestamp("2026-02-09T21:35:27-03:00"),
            "2026-02-10T00:35:27+00:00"
        );
        assert_eq!(sortable_timestamp("not a date"), "not a date");
    }
}
