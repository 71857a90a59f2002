use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors raised while turning a cached feed document into items.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The document is not well-formed XML.
    #[error("Malformed feed: {0}")]
    Malformed(String),

    /// No cached copy exists (fetch disabled or failed on the first run).
    #[error("No cached feed at {}", .0.display())]
    MissingCache(PathBuf),

    /// The cached copy exists but could not be read.
    #[error("Failed to read feed {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FeedError {
    /// Maps a read failure on `path` onto the matching variant.
    pub(crate) fn from_read(path: PathBuf, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            FeedError::MissingCache(path)
        } else {
            FeedError::Io { path, source }
        }
    }
}

// ============================================================================
// Items
// ============================================================================

/// A news, photo-gallery or agenda entry from the club's RSS feeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    /// Plain text, capped at the configured length (plus `"..."` when cut).
    pub description: String,
    /// `dd/mm/yyyy`, or the feed's raw text when it could not be parsed.
    pub pub_date: String,
    /// First image found in the item's encoded content.
    pub image: Option<String>,
}

/// A video from a YouTube channel's Atom feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoItem {
    pub title: String,
    pub link: String,
    pub description: String,
    /// `dd/mm/yyyy`, or the raw `<published>` text.
    pub pub_date: String,
    /// Fixed-width ISO-8601 timestamp; string order is chronological order.
    pub pub_date_raw: String,
    /// Thumbnail URL.
    pub image: Option<String>,
    pub author: String,
    pub video_id: String,
    /// Display name of the configured channel this video came from.
    pub channel: String,
}

impl VideoItem {
    /// YouTube embed URL for the player on the video page.
    pub fn embed_url(&self) -> Option<String> {
        if self.video_id.is_empty() {
            None
        } else {
            Some(format!("https://www.youtube.com/embed/{}", self.video_id))
        }
    }
}
