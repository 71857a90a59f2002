use std::path::Path;

use super::xml::{Document, Element};
use super::{FeedError, FeedItem};
use crate::util::{clean_html, extract_first_image, format_rss_date, truncate_description};

/// Namespace of `<content:encoded>`.
const CONTENT_NS: &str = "http://purl.org/rss/1.0/modules/content/";

/// When images are required, this many candidates are examined per wanted
/// item, since plenty of posts carry no picture.
const IMAGE_OVERFETCH: usize = 5;

/// Options for extracting one RSS section.
#[derive(Debug, Clone, Copy)]
pub struct RssOptions {
    /// Maximum number of items returned.
    pub limit: usize,
    /// Skip items whose encoded content has no image.
    pub require_image: bool,
    /// Description cap in characters.
    pub max_description: usize,
}

/// Extracts up to `opts.limit` items from an RSS 2.0 document.
///
/// Only the first `limit` `<item>` elements are examined, or the first
/// `limit * 5` when images are required. Items without an image are then
/// skipped. Missing child elements read as empty strings.
///
/// # Errors
///
/// Returns [`FeedError::Malformed`] if the document is not well-formed XML.
pub fn parse_items(document: &str, opts: &RssOptions) -> Result<Vec<FeedItem>, FeedError> {
    let doc = Document::parse(document)?;

    let window = if opts.require_image {
        opts.limit.saturating_mul(IMAGE_OVERFETCH)
    } else {
        opts.limit
    };

    let mut items = Vec::with_capacity(opts.limit);
    for item in doc.root().find_all(None, "item").into_iter().take(window) {
        if items.len() >= opts.limit {
            break;
        }
        match parse_item(item, opts) {
            Some(parsed) => items.push(parsed),
            None => {
                tracing::debug!(
                    title = %item.child_text(None, "title"),
                    "Skipping item without image"
                );
            }
        }
    }

    Ok(items)
}

/// Reads a cached RSS file and extracts its items.
///
/// # Errors
///
/// - [`FeedError::MissingCache`] if the file does not exist
/// - [`FeedError::Io`] if it cannot be read
/// - [`FeedError::Malformed`] if it is not well-formed XML
pub async fn load_items(path: &Path, opts: &RssOptions) -> Result<Vec<FeedItem>, FeedError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| FeedError::from_read(path.to_path_buf(), e))?;
    parse_items(&content, opts)
}

fn parse_item(item: &Element, opts: &RssOptions) -> Option<FeedItem> {
    let encoded = item
        .find(Some(CONTENT_NS), "encoded")
        .map(Element::text)
        .unwrap_or_default();
    let image = extract_first_image(&encoded);

    if opts.require_image && image.is_none() {
        return None;
    }

    let description = clean_html(&item.child_text(None, "description"));

    Some(FeedItem {
        title: clean_html(&item.child_text(None, "title")),
        link: item.child_text(None, "link").trim().to_string(),
        description: truncate_description(&description, opts.max_description).into_owned(),
        pub_date: format_rss_date(&item.child_text(None, "pubDate")),
        image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn opts(limit: usize, require_image: bool) -> RssOptions {
        RssOptions {
            limit,
            require_image,
            max_description: 200,
        }
    }

    fn item(n: usize, with_image: bool) -> String {
        let content = if with_image {
            format!(r#"<content:encoded><![CDATA[<p><img src="https://x/{n}.jpg"></p>]]></content:encoded>"#)
        } else {
            "<content:encoded><![CDATA[<p>sin foto</p>]]></content:encoded>".to_string()
        };
        format!(
            "<item><title>Item {n}</title><link>https://x/{n}</link>\
             <description>Desc {n}</description>\
             <pubDate>Wed, 04 Feb 2026 17:29:45 +0000</pubDate>{content}</item>"
        )
    }

    fn feed(items: &[String]) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/">
<channel><title>Club</title>{}</channel></rss>"#,
            items.concat()
        )
    }

    #[test]
    fn test_scenario_entities_image_and_truncation() {
        let description = "x".repeat(300);
        let doc = format!(
            r#"<?xml version="1.0"?>
<rss version="2.0" xmlns:content="http://purl.org/rss/1.0/modules/content/"><channel>
<item>
  <title>Hola &amp; Mundo</title>
  <link>https://club.example/hola</link>
  <description>{description}</description>
  <pubDate>Wed, 04 Feb 2026 17:29:45 +0000</pubDate>
  <content:encoded><![CDATA[<p>{description}</p><img src="https://x/y.jpg">]]></content:encoded>
</item>
</channel></rss>"#
        );

        let items = parse_items(&doc, &opts(3, false)).unwrap();
        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.title, "Hola & Mundo");
        assert_eq!(item.link, "https://club.example/hola");
        assert_eq!(item.image.as_deref(), Some("https://x/y.jpg"));
        assert_eq!(item.description.chars().count(), 203);
        assert!(item.description.ends_with("..."));
        assert_eq!(item.pub_date, "04/02/2026");
    }

    #[test]
    fn test_limit_respected() {
        let items: Vec<String> = (0..10).map(|n| item(n, n % 2 == 0)).collect();
        let doc = feed(&items);
        for limit in 0..12 {
            let parsed = parse_items(&doc, &opts(limit, false)).unwrap();
            assert_eq!(parsed.len(), limit.min(10));
        }
    }

    #[test]
    fn test_require_image_skips_and_overfetches() {
        // Only items 7 and 9 have images; both are inside the 2 * 5 window
        let items: Vec<String> = (0..12).map(|n| item(n, n == 7 || n == 9)).collect();
        let parsed = parse_items(&feed(&items), &opts(2, true)).unwrap();
        let titles: Vec<&str> = parsed.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, ["Item 7", "Item 9"]);
        assert!(parsed.iter().all(|i| i.image.is_some()));
    }

    #[test]
    fn test_require_image_window_is_bounded() {
        // The only image sits at index 5, outside the 1 * 5 window
        let items: Vec<String> = (0..8).map(|n| item(n, n == 5)).collect();
        let parsed = parse_items(&feed(&items), &opts(1, true)).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_without_require_image_items_keep_none() {
        let items = vec![item(0, false), item(1, true)];
        let parsed = parse_items(&feed(&items), &opts(5, false)).unwrap();
        assert_eq!(parsed[0].image, None);
        assert_eq!(parsed[1].image.as_deref(), Some("https://x/1.jpg"));
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let doc = feed(&["<item><title>Solo título</title></item>".to_string()]);
        let parsed = parse_items(&doc, &opts(3, false)).unwrap();
        assert_eq!(
            parsed,
            vec![FeedItem {
                title: "Solo título".to_string(),
                link: String::new(),
                description: String::new(),
                pub_date: String::new(),
                image: None,
            }]
        );
    }

    #[test]
    fn test_escaped_html_description_cleaned() {
        let doc = feed(&[
            "<item><title>T</title><description>&lt;p&gt;El equipo &lt;b&gt;ganó&lt;/b&gt;&amp;nbsp;hoy&lt;/p&gt;</description></item>"
                .to_string(),
        ]);
        let parsed = parse_items(&doc, &opts(1, false)).unwrap();
        assert_eq!(parsed[0].description, "El equipo ganó hoy");
    }

    #[test]
    fn test_unparseable_date_kept_raw() {
        let doc = feed(&["<item><title>T</title><pubDate>4 de febrero</pubDate></item>".to_string()]);
        let parsed = parse_items(&doc, &opts(1, false)).unwrap();
        assert_eq!(parsed[0].pub_date, "4 de febrero");
    }

    #[test]
    fn test_date_whitespace_kept_on_fallback() {
        let doc = feed(&[
            "<item><title>A</title><pubDate>\n  4 de febrero  </pubDate></item>".to_string(),
            "<item><title>B</title><pubDate>  Wed, 04 Feb 2026 17:29:45 +0000\n</pubDate></item>".to_string(),
        ]);
        let parsed = parse_items(&doc, &opts(2, false)).unwrap();
        assert_eq!(parsed[0].pub_date, "\n  4 de febrero  ");
        assert_eq!(parsed[1].pub_date, "04/02/2026");
    }

    #[test]
    fn test_malformed_feed_is_error() {
        let result = parse_items("<rss><channel><item></channel></rss>", &opts(3, false));
        assert!(matches!(result, Err(FeedError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_load_items_missing_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed-general.xml");
        let result = load_items(&path, &opts(3, false)).await;
        assert!(matches!(result, Err(FeedError::MissingCache(_))));
    }
}
