use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;

use super::{render, sitemap};
use crate::config::{Config, SectionConfig};
use crate::feed::{
    aggregate, channel_feed_url, load_items, load_videos, FeedError, FeedItem, FetchError,
    Fetcher, KeywordFilter, RssOptions, VideoItem, VideoOptions,
};
use crate::util::slugify;

/// Errors that abort a build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Failed to initialise HTTP client: {0}")]
    Client(#[from] FetchError),

    /// An RSS section's cached feed is malformed and `build.strict_feeds` is set.
    #[error("Malformed {section} feed: {source}")]
    StrictFeed {
        section: &'static str,
        #[source]
        source: FeedError,
    },

    #[error("Failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A selected video and the page it is rendered to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoPage {
    pub video: VideoItem,
    /// Unique within one build.
    pub slug: String,
}

impl VideoPage {
    /// Page file, relative to the output directory.
    pub fn path(&self) -> PathBuf {
        Path::new("videos").join(&self.slug).join("index.html")
    }

    /// Link to the page, relative to the site root.
    pub fn href(&self) -> String {
        format!("videos/{}/", self.slug)
    }
}

/// Everything the home page shows.
#[derive(Debug, Clone, Default)]
pub struct SiteContent {
    pub news: Vec<FeedItem>,
    pub photos: Vec<FeedItem>,
    pub agenda: Vec<FeedItem>,
    pub videos: Vec<VideoPage>,
}

/// Summary of a finished build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub news: usize,
    pub photos: usize,
    pub agenda: usize,
    pub videos: usize,
    pub sitemap: bool,
}

#[derive(Debug, Clone, Copy)]
enum Section {
    News,
    Photos,
    Agenda,
}

impl Section {
    fn name(self) -> &'static str {
        match self {
            Section::News => "news",
            Section::Photos => "photos",
            Section::Agenda => "agenda",
        }
    }

    fn cache_file(self) -> &'static str {
        match self {
            Section::News => "feed-general.xml",
            Section::Photos => "galeria-de-fotos.xml",
            Section::Agenda => "agenda-deportiva.xml",
        }
    }

    fn config(self, config: &Config) -> &SectionConfig {
        match self {
            Section::News => &config.news,
            Section::Photos => &config.photos,
            Section::Agenda => &config.agenda,
        }
    }
}

/// Pairs each video with a unique slug.
///
/// A title that slugifies to nothing falls back to the video id, then to
/// `"video"`. Repeats get `-2`, `-3`, ... in list order.
pub fn assign_slugs(videos: Vec<VideoItem>) -> Vec<VideoPage> {
    let mut taken = HashSet::with_capacity(videos.len());

    videos
        .into_iter()
        .map(|video| {
            let mut base = slugify(&video.title);
            if base.is_empty() {
                base = slugify(&video.video_id);
            }
            if base.is_empty() {
                base = "video".to_string();
            }

            let mut slug = base.clone();
            let mut n = 2;
            while !taken.insert(slug.clone()) {
                slug = format!("{base}-{n}");
                n += 1;
            }
            VideoPage { video, slug }
        })
        .collect()
}

/// Runs the whole pipeline: refresh the feed cache, extract and select
/// items, then write the home page, the video pages and the sitemap.
///
/// Feeds are handled one at a time. A feed that cannot be downloaded falls
/// back to its cached copy; one that cannot be read leaves its section empty.
///
/// # Errors
///
/// - [`BuildError::StrictFeed`] - malformed RSS with `build.strict_feeds`
/// - [`BuildError::Write`] - the output directory or a page could not be written
/// - [`BuildError::Client`] - the HTTP client could not be built
pub async fn build_site(config: &Config, build_date: NaiveDate) -> Result<BuildReport, BuildError> {
    let fetcher = Fetcher::new(&config.fetch)?;
    let content = collect(config, &fetcher).await?;
    write_site(config, &content, build_date).await
}

/// Fetches and extracts every visible section.
pub async fn collect(config: &Config, fetcher: &Fetcher) -> Result<SiteContent, BuildError> {
    Ok(SiteContent {
        news: collect_section(config, fetcher, Section::News).await?,
        photos: collect_section(config, fetcher, Section::Photos).await?,
        agenda: collect_section(config, fetcher, Section::Agenda).await?,
        videos: collect_videos(config, fetcher).await,
    })
}

async fn collect_section(
    config: &Config,
    fetcher: &Fetcher,
    section: Section,
) -> Result<Vec<FeedItem>, BuildError> {
    let settings = section.config(config);
    if !settings.visible {
        tracing::debug!(section = section.name(), "Section hidden, skipping");
        return Ok(Vec::new());
    }

    let path = config.build.feeds_dir.join(section.cache_file());
    fetcher.fetch(&settings.url, &path).await;

    let opts = RssOptions {
        limit: settings.limit,
        require_image: settings.require_image,
        max_description: config.max_description,
    };
    match load_items(&path, &opts).await {
        Ok(items) => {
            tracing::info!(
                section = section.name(),
                items = items.len(),
                require_image = settings.require_image,
                "Parsed feed"
            );
            Ok(items)
        }
        Err(source @ FeedError::Malformed(_)) if config.build.strict_feeds => {
            Err(BuildError::StrictFeed {
                section: section.name(),
                source,
            })
        }
        Err(e) => {
            tracing::warn!(section = section.name(), error = %e, "Section left empty");
            Ok(Vec::new())
        }
    }
}

async fn collect_videos(config: &Config, fetcher: &Fetcher) -> Vec<VideoPage> {
    let videos = &config.videos;
    if !videos.visible {
        tracing::debug!("Video section hidden, skipping");
        return Vec::new();
    }

    let filter = KeywordFilter::new(videos.keywords.as_slice());
    let opts = VideoOptions {
        limit: videos.per_channel,
        filter: &filter,
        max_description: config.max_description,
    };

    let mut per_channel = Vec::with_capacity(videos.channels.len());
    for channel in &videos.channels {
        if !is_channel_id(&channel.channel_id) {
            tracing::warn!(channel_id = %channel.channel_id, "Invalid channel id, skipping");
            continue;
        }
        let path = config
            .build
            .feeds_dir
            .join(format!("youtube-{}.xml", channel.channel_id));
        fetcher
            .fetch(&channel_feed_url(&channel.channel_id), &path)
            .await;
        per_channel.push(load_videos(&path, channel, &opts).await);
    }

    let selected = aggregate(per_channel, videos.max_videos);
    tracing::info!(videos = selected.len(), "Selected videos");
    assign_slugs(selected)
}

/// Channel ids end up in a file name and a query string.
fn is_channel_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// Writes `index.html`, one page per video and, with a base URL configured,
/// `sitemap.xml`.
pub async fn write_site(
    config: &Config,
    content: &SiteContent,
    build_date: NaiveDate,
) -> Result<BuildReport, BuildError> {
    let out = &config.build.output_dir;
    create_dir(out).await?;

    write_file(&out.join("index.html"), &render::home_page(config, content)).await?;

    for page in &content.videos {
        let path = out.join(page.path());
        if let Some(parent) = path.parent() {
            create_dir(parent).await?;
        }
        write_file(&path, &render::video_page(config, page)).await?;
        tracing::debug!(slug = %page.slug, "Wrote video page");
    }

    let base_url = config.site.base_url.trim();
    let sitemap = !base_url.is_empty();
    if sitemap {
        let xml = sitemap::render(base_url, &content.videos, build_date);
        write_file(&out.join("sitemap.xml"), &xml).await?;
    } else {
        tracing::info!("No base_url configured, skipping sitemap");
    }

    tracing::info!(
        output = %out.display(),
        video_pages = content.videos.len(),
        sitemap = sitemap,
        "Site generated"
    );

    Ok(BuildReport {
        news: content.news.len(),
        photos: content.photos.len(),
        agenda: content.agenda.len(),
        videos: content.videos.len(),
        sitemap,
    })
}

async fn create_dir(path: &Path) -> Result<(), BuildError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| BuildError::Write {
            path: path.to_path_buf(),
            source,
        })
}

async fn write_file(path: &Path, content: &str) -> Result<(), BuildError> {
    tokio::fs::write(path, content)
        .await
        .map_err(|source| BuildError::Write {
            path: path.to_path_buf(),
            source,
        })
}
