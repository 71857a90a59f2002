//! Configuration file parser for `clubfeed.toml`.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Every key has a default, resolved once here so the rest of the pipeline
//! reads plain values. Unknown top-level keys are ignored with a warning.
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level build configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Characters of description kept before `"..."` is appended.
    pub max_description: usize,

    pub site: SiteConfig,
    pub fetch: FetchConfig,
    pub build: BuildConfig,

    #[serde(deserialize_with = "news_section")]
    pub news: SectionConfig,
    #[serde(deserialize_with = "photos_section")]
    pub photos: SectionConfig,
    #[serde(deserialize_with = "agenda_section")]
    pub agenda: SectionConfig,

    pub videos: VideoConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_description: 200,
            site: SiteConfig::default(),
            fetch: FetchConfig::default(),
            build: BuildConfig::default(),
            news: SectionConfig::news(),
            photos: SectionConfig::photos(),
            agenda: SectionConfig::agenda(),
            videos: VideoConfig::default(),
        }
    }
}

/// Texts and URLs of the generated site.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub subtitle: String,
    /// Public URL of the generated site. Empty disables the sitemap.
    pub base_url: String,
    pub lang: String,
    pub meta_description: String,
    pub footer: String,
    /// The official club site credited in the footer.
    pub official_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "INSTITUTO".to_string(),
            subtitle: "Sitio No Oficial - Por los Hinchas de La Gloria".to_string(),
            base_url: String::new(),
            lang: "es".to_string(),
            meta_description:
                "Sitio no oficial de Instituto con las últimas noticias y fotos del club"
                    .to_string(),
            footer: "Sitio No Oficial - Hecho por Hinchas para Hinchas".to_string(),
            official_url: "https://institutoacc.com.ar".to_string(),
        }
    }
}

/// HTTP download settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// When false, no network requests are made and cached files are used.
    pub enabled: bool,
    /// Upper bound on a whole request, body included.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: 30,
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36".to_string(),
        }
    }
}

/// Output layout and failure policy.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Abort the build when an RSS section's feed is malformed, instead of
    /// rendering that section empty.
    pub strict_feeds: bool,
    pub output_dir: PathBuf,
    pub feeds_dir: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            strict_feeds: false,
            output_dir: PathBuf::from("docs"),
            feeds_dir: PathBuf::from("feeds"),
        }
    }
}

/// One RSS-backed section of the home page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionConfig {
    pub url: String,
    pub limit: usize,
    pub require_image: bool,
    pub visible: bool,
    pub title: String,
    /// Label of the link to the full post.
    pub button: String,
}

impl SectionConfig {
    pub fn news() -> Self {
        Self {
            url: "https://institutoacc.com.ar/index.php/feed/".to_string(),
            limit: 3,
            require_image: false,
            visible: true,
            title: "📰 Últimas Noticias".to_string(),
            button: "Leer más en institutoacc.com.ar →".to_string(),
        }
    }

    pub fn photos() -> Self {
        Self {
            url: "https://institutoacc.com.ar/index.php/category/galeria-de-fotos/feed/"
                .to_string(),
            limit: 3,
            require_image: true,
            visible: true,
            title: "📸 Galería de Fotos".to_string(),
            button: "Ver galería completa →".to_string(),
        }
    }

    pub fn agenda() -> Self {
        Self {
            url: "https://institutoacc.com.ar/index.php/category/agenda-deportiva/feed/"
                .to_string(),
            limit: 3,
            require_image: false,
            visible: false,
            title: "📅 Agenda Deportiva".to_string(),
            button: "Ver más →".to_string(),
        }
    }
}

/// Keys of a `[news]`/`[photos]`/`[agenda]` table. Absent keys keep the
/// section's own default rather than a shared one.
#[derive(Debug, Default, Deserialize)]
struct SectionOverrides {
    url: Option<String>,
    limit: Option<usize>,
    require_image: Option<bool>,
    visible: Option<bool>,
    title: Option<String>,
    button: Option<String>,
}

impl SectionOverrides {
    fn apply(self, base: SectionConfig) -> SectionConfig {
        SectionConfig {
            url: self.url.unwrap_or(base.url),
            limit: self.limit.unwrap_or(base.limit),
            require_image: self.require_image.unwrap_or(base.require_image),
            visible: self.visible.unwrap_or(base.visible),
            title: self.title.unwrap_or(base.title),
            button: self.button.unwrap_or(base.button),
        }
    }
}

fn news_section<'de, D: Deserializer<'de>>(d: D) -> Result<SectionConfig, D::Error> {
    Ok(SectionOverrides::deserialize(d)?.apply(SectionConfig::news()))
}

fn photos_section<'de, D: Deserializer<'de>>(d: D) -> Result<SectionConfig, D::Error> {
    Ok(SectionOverrides::deserialize(d)?.apply(SectionConfig::photos()))
}

fn agenda_section<'de, D: Deserializer<'de>>(d: D) -> Result<SectionConfig, D::Error> {
    Ok(SectionOverrides::deserialize(d)?.apply(SectionConfig::agenda()))
}

/// YouTube section settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub visible: bool,
    pub title: String,
    /// Videos kept after all channels are merged.
    pub max_videos: usize,
    /// Entries examined per channel, before keyword filtering.
    pub per_channel: usize,
    /// Title keywords for channels with `filter_keywords = true`.
    pub keywords: Vec<String>,
    pub channels: Vec<ChannelConfig>,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            visible: true,
            title: "🎬 Videos".to_string(),
            max_videos: 6,
            per_channel: 15,
            keywords: vec!["Instituto".to_string()],
            channels: Vec::new(),
        }
    }
}

/// A YouTube channel to pull videos from.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChannelConfig {
    pub channel_id: String,
    /// Keep only videos whose title contains one of `videos.keywords`.
    #[serde(default)]
    pub filter_keywords: bool,
    /// Shown as author when an entry has none. Defaults to the channel id.
    #[serde(default)]
    pub display_name: String,
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 8] = [
        "max_description",
        "site",
        "fetch",
        "build",
        "news",
        "photos",
        "agenda",
        "videos",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let config = Self::from_toml(&content)?;
        tracing::info!(
            path = %path.display(),
            channels = config.videos.channels.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        // Parse the TOML content first as a raw table to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(content)?;
        Ok(config.resolved())
    }

    fn resolved(mut self) -> Self {
        for channel in &mut self.videos.channels {
            if channel.display_name.trim().is_empty() {
                channel.display_name = channel.channel_id.clone();
            }
        }
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
