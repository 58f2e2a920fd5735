use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::platform;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Substrings that mark an ICY title as a station announcement rather
    /// than a music track. Matched case-insensitively.
    #[serde(default = "default_station_ids")]
    pub station_ids: Vec<String>,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
    #[serde(default)]
    pub cast: CastConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

/// Where the channel list comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    #[serde(default = "default_directory_url")]
    pub url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Which channel image to use for icons and cast artwork.
    #[serde(default)]
    pub image_field: ImageField,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageField {
    Image,
    LargeImage,
    #[default]
    XlImage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    #[serde(default = "default_channel")]
    pub default_channel: String,
    /// Index into a channel's playlists; 0 is the highest quality.
    #[serde(default)]
    pub quality: usize,
    /// Media player binary, either a bare name looked up on PATH or a path.
    #[serde(default = "default_player")]
    pub player: String,
    /// Flag that tells the player its argument is a playlist reference.
    /// Empty means the URL is passed on its own.
    #[serde(default = "default_playlist_flag")]
    pub playlist_flag: String,
    /// Extra arguments for metadata-only playback while audio is cast.
    #[serde(default = "default_silent_args")]
    pub silent_args: Vec<String>,
    /// After an interrupt, also kill every process named like `player`.
    #[serde(default = "default_true")]
    pub cleanup_stragglers: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_notify_command")]
    pub command: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastConfig {
    /// Device used by `--cast` when no name is given.
    #[serde(default)]
    pub device: Option<String>,
    #[serde(default = "default_cast_command")]
    pub command: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
}

impl DirectoryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            url: default_directory_url(),
            timeout_secs: default_timeout_secs(),
            image_field: ImageField::default(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            default_channel: default_channel(),
            quality: 0,
            player: default_player(),
            playlist_flag: default_playlist_flag(),
            silent_args: default_silent_args(),
            cleanup_stragglers: true,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            command: default_notify_command(),
        }
    }
}

impl Default for CastConfig {
    fn default() -> Self {
        Self {
            device: None,
            command: default_cast_command(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
        }
    }
}

fn default_directory_url() -> String {
    "https://somafm.com/channels.json".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_channel() -> String {
    "Groove Salad".to_string()
}

fn default_player() -> String {
    "mplayer".to_string()
}

fn default_playlist_flag() -> String {
    "-playlist".to_string()
}

fn default_silent_args() -> Vec<String> {
    vec!["-ao".to_string(), "null".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_notify_command() -> String {
    "notify-send".to_string()
}

fn default_cast_command() -> String {
    "catt".to_string()
}

fn default_cache_dir() -> PathBuf {
    platform::cache_dir()
}

fn default_station_ids() -> Vec<String> {
    vec!["SomaFM".to_string(), "Big Url".to_string()]
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            station_ids: default_station_ids(),
            directory: DirectoryConfig::default(),
            playback: PlaybackConfig::default(),
            notifications: NotificationConfig::default(),
            cast: CastConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}
