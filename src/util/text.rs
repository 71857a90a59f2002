use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Ellipsis string appended to truncated descriptions
pub const ELLIPSIS: &str = "...";

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

static IMAGE_SRC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)src=["']([^"']+\.(?:jpg|jpeg|png|gif))["']"#)
        .expect("image pattern is valid")
});

/// Converts an HTML fragment into plain text.
///
/// Entities are decoded first, then every `<...>` run is removed, then
/// whitespace runs collapse to a single space and the result is trimmed.
/// This is a pattern-based cleaner, not an HTML parser: the contents of
/// `<script>` or `<style>` blocks survive as text.
///
/// Escaped markup such as `&lt;b&gt;` turns into a tag after decoding, so the
/// pass repeats until the text stops changing, which makes the function
/// idempotent. Each pass that changes the text makes it shorter or swaps
/// single whitespace characters for spaces, so the loop terminates.
///
/// # Examples
///
/// ```
/// use clubfeed::util::clean_html;
///
/// assert_eq!(clean_html("<p>Hola &amp; <b>Mundo</b></p>"), "Hola & Mundo");
/// assert_eq!(clean_html("  a \n\t b  "), "a b");
/// assert_eq!(clean_html(""), "");
/// ```
pub fn clean_html(raw: &str) -> String {
    let mut current = clean_pass(raw);
    loop {
        let next = clean_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_pass(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let decoded = html_escape::decode_html_entities(raw);
    let stripped = TAG_RE.replace_all(&decoded, "");
    let collapsed = WHITESPACE_RE.replace_all(&stripped, " ");
    collapsed.trim().to_string()
}

/// Caps a cleaned description at `max_chars` characters.
///
/// Longer text is cut to exactly `max_chars` characters and [`ELLIPSIS`] is
/// appended. Shorter or equal text is returned as-is (borrowed).
///
/// Lengths are counted in Unicode scalar values, so multi-byte characters are
/// never split.
///
/// # Examples
///
/// ```
/// use clubfeed::util::truncate_description;
///
/// assert_eq!(truncate_description("Short", 10), "Short");
/// assert_eq!(truncate_description("Hello World", 5), "Hello...");
/// assert_eq!(truncate_description("Año nuevo", 3), "Año...");
/// ```
pub fn truncate_description(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => Cow::Owned(format!("{}{}", &text[..cut], ELLIPSIS)),
        None => Cow::Borrowed(text),
    }
}

/// Finds the first image URL referenced by a `src` attribute in raw markup.
///
/// Only `.jpg`, `.jpeg`, `.png` and `.gif` URLs match (case-insensitive).
/// Query strings after the extension prevent a match.
pub fn extract_first_image(html: &str) -> Option<String> {
    if html.is_empty() {
        return None;
    }
    IMAGE_SRC_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clean_decodes_entities() {
        assert_eq!(clean_html("Hola &amp; Mundo"), "Hola & Mundo");
        assert_eq!(clean_html("caf&eacute; &#241;"), "café ñ");
        assert_eq!(clean_html("a&nbsp;b"), "a b");
    }

    #[test]
    fn test_clean_strips_tags() {
        assert_eq!(
            clean_html(r#"<p class="x">Primer <a href="/y">tiempo</a></p>"#),
            "Primer tiempo"
        );
        // "<>" has nothing between the brackets and is kept
        assert_eq!(clean_html("1 <> 2"), "1 <> 2");
    }

    #[test]
    fn test_clean_escaped_markup() {
        // WordPress descriptions arrive with their markup entity-escaped
        assert_eq!(clean_html("&lt;p&gt;Gol&lt;/p&gt;"), "Gol");
        assert_eq!(clean_html("&amp;lt;b&amp;gt;x"), "x");
    }

    #[test]
    fn test_clean_collapses_whitespace() {
        assert_eq!(clean_html("\n\n  uno\t\tdos \r\n tres  "), "uno dos tres");
    }

    #[test]
    fn test_truncate_exact_boundary() {
        let text = "a".repeat(200);
        assert_eq!(truncate_description(&text, 200), text);
        let longer = "a".repeat(201);
        assert_eq!(truncate_description(&longer, 200).len(), 203);
    }

    #[test]
    fn test_truncate_zero_cap() {
        assert_eq!(truncate_description("abc", 0), "...");
        assert_eq!(truncate_description("", 0), "");
    }

    #[test]
    fn test_extract_first_image() {
        let html = r#"<p><img src="https://x/a.PNG"> <img src='https://x/b.jpg'></p>"#;
        assert_eq!(extract_first_image(html).as_deref(), Some("https://x/a.PNG"));
    }

    #[test]
    fn test_extract_image_skips_non_images() {
        let html = r#"<iframe src="https://video.example/embed"></iframe><img src="https://x/y.jpeg">"#;
        assert_eq!(extract_first_image(html).as_deref(), Some("https://x/y.jpeg"));
        assert_eq!(extract_first_image(r#"<img src="https://x/y.webp">"#), None);
        assert_eq!(extract_first_image(""), None);
    }

    #[test]
    fn test_clean_deeply_escaped_markup_is_idempotent() {
        let raw = format!("&{}lt;b&gt;x", "amp;".repeat(9));
        let once = clean_html(&raw);
        assert_eq!(once, "x");
        assert_eq!(clean_html(&once), once);
    }

    proptest! {
        #[test]
        fn prop_clean_is_idempotent(s in ".{0,200}") {
            let once = clean_html(&s);
            prop_assert_eq!(clean_html(&once), once);
        }

        #[test]
        fn prop_clean_markup_is_idempotent(s in "[a-z <>/&;]{0,80}") {
            let once = clean_html(&s);
            prop_assert_eq!(clean_html(&once), once);
        }

        #[test]
        fn prop_truncate_shape(s in "\\PC{0,300}", cap in 0usize..250) {
            let out = truncate_description(&s, cap);
            let len = s.chars().count();
            if len > cap {
                prop_assert_eq!(out.chars().count(), cap + ELLIPSIS.len());
                let prefix: String = s.chars().take(cap).collect();
                prop_assert_eq!(out.as_ref(), format!("{prefix}{ELLIPSIS}"));
            } else {
                prop_assert_eq!(out.as_ref(), s.as_str());
            }
        }
    }
}
