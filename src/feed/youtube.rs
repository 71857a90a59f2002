use std::path::Path;

use super::xml::{Document, Element};
use super::{FeedError, VideoItem};
use crate::config::ChannelConfig;
use crate::util::{
    clean_html, format_youtube_date, sortable_timestamp, truncate_description,
};

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const YT_NS: &str = "http://www.youtube.com/xml/schemas/2015";
const MEDIA_NS: &str = "http://search.yahoo.com/mrss/";

/// Builds the Atom feed URL YouTube publishes for a channel.
pub fn channel_feed_url(channel_id: &str) -> String {
    format!("https://www.youtube.com/feeds/videos.xml?channel_id={channel_id}")
}

/// Thumbnail used when an entry has a video id but no `<media:thumbnail>`.
pub fn fallback_thumbnail(video_id: &str) -> String {
    format!("https://i.ytimg.com/vi/{video_id}/hqdefault.jpg")
}

/// Case-insensitive title filter: a title passes if it contains any keyword.
#[derive(Debug, Clone, Default)]
pub struct KeywordFilter {
    keywords: Vec<String>,
}

impl KeywordFilter {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// True when `title` contains at least one keyword. An empty filter
    /// matches nothing.
    pub fn matches(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.keywords.iter().any(|k| title.contains(k.as_str()))
    }
}

/// Options for extracting one channel's videos.
#[derive(Debug, Clone, Copy)]
pub struct VideoOptions<'a> {
    /// Entries examined, before keyword filtering.
    pub limit: usize,
    pub filter: &'a KeywordFilter,
    /// Description cap in characters.
    pub max_description: usize,
}

/// Extracts videos from a YouTube channel's Atom feed.
///
/// The first `opts.limit` entries are read; when the channel has keyword
/// filtering enabled, entries whose title matches no keyword are then
/// dropped, so fewer than `limit` videos may come back.
///
/// # Errors
///
/// Returns [`FeedError::Malformed`] if the document is not well-formed XML.
pub fn parse_videos(
    document: &str,
    channel: &ChannelConfig,
    opts: &VideoOptions<'_>,
) -> Result<Vec<VideoItem>, FeedError> {
    let doc = Document::parse(document)?;

    let videos = doc
        .root()
        .find_all(Some(ATOM_NS), "entry")
        .into_iter()
        .take(opts.limit)
        .map(|entry| parse_entry(entry, channel, opts.max_description))
        .filter(|video| {
            if !channel.filter_keywords || opts.filter.matches(&video.title) {
                return true;
            }
            tracing::debug!(
                channel = %channel.display_name,
                title = %video.title,
                "Video filtered out by keywords"
            );
            false
        })
        .collect();

    Ok(videos)
}

/// Reads a cached channel feed and extracts its videos.
///
/// Never fails: a missing, unreadable or malformed file is logged and the
/// channel contributes no videos to this build.
pub async fn load_videos(
    path: &Path,
    channel: &ChannelConfig,
    opts: &VideoOptions<'_>,
) -> Vec<VideoItem> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) => {
            let err = FeedError::from_read(path.to_path_buf(), e);
            tracing::warn!(channel = %channel.display_name, error = %err, "Skipping channel");
            return Vec::new();
        }
    };

    match parse_videos(&content, channel, opts) {
        Ok(videos) => {
            tracing::info!(
                channel = %channel.display_name,
                videos = videos.len(),
                "Parsed channel feed"
            );
            videos
        }
        Err(e) => {
            tracing::warn!(
                channel = %channel.display_name,
                path = %path.display(),
                error = %e,
                "Skipping channel with malformed feed"
            );
            Vec::new()
        }
    }
}

fn parse_entry(entry: &Element, channel: &ChannelConfig, max_description: usize) -> VideoItem {
    let video_id = entry.child_text(Some(YT_NS), "videoId").trim().to_string();
    let published = entry.child_text(Some(ATOM_NS), "published").trim().to_string();

    let link = entry
        .children()
        .filter(|e| e.is(Some(ATOM_NS), "link"))
        .find(|e| e.attr("rel") == Some("alternate"))
        .and_then(|e| e.attr("href"))
        .map(str::to_string)
        .or_else(|| {
            (!video_id.is_empty())
                .then(|| format!("https://www.youtube.com/watch?v={video_id}"))
        })
        .unwrap_or_default();

    let author = entry
        .child(Some(ATOM_NS), "author")
        .map(|a| a.child_text(Some(ATOM_NS), "name").trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| channel.display_name.clone());

    let image = entry
        .find(Some(MEDIA_NS), "thumbnail")
        .and_then(|t| t.attr("url"))
        .map(str::to_string)
        .or_else(|| (!video_id.is_empty()).then(|| fallback_thumbnail(&video_id)));

    let description = entry
        .find(Some(MEDIA_NS), "description")
        .map(|d| clean_html(&d.text()))
        .unwrap_or_default();

    VideoItem {
        title: clean_html(&entry.child_text(Some(ATOM_NS), "title")),
        link,
        description: truncate_description(&description, max_description).into_owned(),
        pub_date: format_youtube_date(&published),
        pub_date_raw: sortable_timestamp(&published),
        image,
        author,
        video_id,
        channel: channel.display_name.clone(),
    }
}
