//! Sitemap generation.
//!
//! Lists the home page and every video page for search engine indexing.
//!
//! # Sitemap Format
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url>
//!     <loc>https://example.com/</loc>
//!     <lastmod>2026-02-10</lastmod>
//!     <changefreq>daily</changefreq>
//!     <priority>1.0</priority>
//!   </url>
//! </urlset>
//! ```
//!
//! A video's `lastmod` is its UTC publication day, while its page shows the
//! publisher's local day. The two differ for videos published late in the
//! evening west of UTC: `2026-02-09T22:00:00-03:00` is shown as 09/02/2026
//! and listed with `lastmod` 2026-02-10.

use chrono::NaiveDate;
use quick_xml::escape::escape;

use super::build::VideoPage;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

/// Renders `sitemap.xml` for a site published at `base_url`.
///
/// Video `lastmod` is the date part of `pub_date_raw`, or `build_date` when
/// the video has no usable date.
pub fn render(base_url: &str, videos: &[VideoPage], build_date: NaiveDate) -> String {
    let base = base_url.trim().trim_end_matches('/');
    let today = build_date.format("%Y-%m-%d").to_string();

    let mut xml = String::with_capacity(256 + videos.len() * 192);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"");
    xml.push_str(SITEMAP_NS);
    xml.push_str("\">\n");

    push_url(&mut xml, &format!("{base}/"), &today, "daily", "1.0");
    for page in videos {
        let lastmod = lastmod(&page.video.pub_date_raw).unwrap_or(&today);
        push_url(
            &mut xml,
            &format!("{base}/videos/{}/", page.slug),
            lastmod,
            "monthly",
            "0.8",
        );
    }

    xml.push_str("</urlset>\n");
    xml
}

fn push_url(xml: &mut String, loc: &str, lastmod: &str, changefreq: &str, priority: &str) {
    xml.push_str("  <url>\n    <loc>");
    xml.push_str(&escape(loc));
    xml.push_str("</loc>\n    <lastmod>");
    xml.push_str(lastmod);
    xml.push_str("</lastmod>\n    <changefreq>");
    xml.push_str(changefreq);
    xml.push_str("</changefreq>\n    <priority>");
    xml.push_str(priority);
    xml.push_str("</priority>\n  </url>\n");
}

/// The `YYYY-MM-DD` prefix of a timestamp, if it is a real date.
fn lastmod(raw: &str) -> Option<&str> {
    let date = raw.get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    // chrono accepts unpadded fields; lastmod must be zero-padded
    let bytes = date.as_bytes();
    let shaped = bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    shaped.then_some(date)
}
