//! Feed retrieval and item extraction.
//!
//! This module turns remote feeds into the item lists the site renders:
//!
//! - **Fetching**: single-attempt HTTP download into the local cache
//! - **Parsing**: a small namespace-aware XML tree shared by both extractors
//! - **RSS**: news, photo and agenda items from the club's WordPress feeds
//! - **YouTube**: videos from channel Atom feeds, with keyword filtering
//! - **Selection**: merging channels into one newest-first list
//!
//! # Architecture
//!
//! - [`fetcher`] - HTTP download with timeout and stale-cache fallback
//! - [`xml`] - sanitizer and document tree built on `quick-xml`
//! - [`rss`] - RSS 2.0 `<item>` extraction
//! - [`youtube`] - YouTube Atom `<entry>` extraction
//! - [`select`] - cross-channel aggregation
//!
//! # Example
//!
//! ```ignore
//! use clubfeed::feed::{parse_items, RssOptions};
//!
//! let opts = RssOptions { limit: 3, require_image: true, max_description: 200 };
//! let items = parse_items(&document, &opts)?;
//! ```

pub mod fetcher;
pub mod rss;
pub mod select;
mod types;
pub mod xml;
pub mod youtube;

pub use fetcher::{FetchError, Fetcher};
pub use rss::{load_items, parse_items, RssOptions};
pub use select::aggregate;
pub use types::{FeedError, FeedItem, VideoItem};
pub use xml::sanitize;
pub use youtube::{channel_feed_url, load_videos, parse_videos, KeywordFilter, VideoOptions};
