//! Channel directory download and on-disk cache.
//!
//! Layout under the cache root:
//!
//! ```text
//!   <root>/channels.json   serialized ChannelDirectory
//!   <root>/icons/          one image per channel, named by URL basename
//! ```
//!
//! The cache never expires on its own. It is rewritten by an explicit
//! refresh and removed by [`DirectoryCache::purge`].

use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::channel::{Channel, ChannelDirectory};
use crate::config::{Config, ImageField};
use crate::error::{CacheError, FetchError};

const CHANNEL_FILE: &str = "channels.json";
const ICON_DIR: &str = "icons";

/// Wire shape of the directory endpoint.
#[derive(Debug, Deserialize)]
struct DirectoryResponse {
    channels: Vec<Channel>,
}

pub struct DirectoryCache {
    root: PathBuf,
    url: String,
    image_field: ImageField,
    client: reqwest::Client,
}

impl DirectoryCache {
    pub fn new(
        root: impl Into<PathBuf>,
        url: impl Into<String>,
        image_field: ImageField,
        client: reqwest::Client,
    ) -> Self {
        Self {
            root: root.into(),
            url: url.into(),
            image_field,
            client,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        let client = http_client(config)?;
        Ok(Self::new(
            config.cache.dir.clone(),
            config.directory.url.clone(),
            config.directory.image_field,
            client,
        ))
    }

    pub fn channel_file(&self) -> PathBuf {
        self.root.join(CHANNEL_FILE)
    }

    pub fn icon_dir(&self) -> PathBuf {
        self.root.join(ICON_DIR)
    }

    pub fn icon_path(&self, channel: &Channel) -> PathBuf {
        self.icon_dir()
            .join(url_basename(channel.image_url(self.image_field)))
    }

    /// GET the directory endpoint and parse the channel list.
    pub async fn fetch_directory(&self) -> Result<ChannelDirectory, FetchError> {
        info!("Downloading channel list from {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?;

        let body: DirectoryResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Unknown(format!("bad directory document: {}", e)))?;

        info!("Directory lists {} channels", body.channels.len());
        Ok(ChannelDirectory::new(body.channels))
    }

    /// Fetch and overwrite the cache. A failed write is logged, not fatal.
    pub async fn refresh(&self) -> Result<ChannelDirectory, FetchError> {
        let directory = self.fetch_directory().await?;
        if let Err(e) = self.save(&directory).await {
            warn!("Could not write channel cache: {}", e);
        }
        Ok(directory)
    }

    pub async fn load_cached(&self) -> Result<ChannelDirectory, CacheError> {
        let path = self.channel_file();
        let content = tokio::fs::read(&path)
            .await
            .map_err(|e| CacheError::io(&path, e))?;
        let directory: ChannelDirectory = serde_json::from_slice(&content)
            .map_err(|source| CacheError::Corrupt {
                path: path.clone(),
                source,
            })?;
        debug!("Loaded {} channels from {:?}", directory.len(), path);
        Ok(directory)
    }

    /// Write the whole list, replacing any previous cache. Not atomic.
    pub async fn save(&self, directory: &ChannelDirectory) -> Result<(), CacheError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| CacheError::io(&self.root, e))?;
        let path = self.channel_file();
        let json = serde_json::to_vec_pretty(directory).map_err(|source| CacheError::Corrupt {
            path: path.clone(),
            source,
        })?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| CacheError::io(&path, e))?;
        debug!("Saved {} channels to {:?}", directory.len(), path);
        Ok(())
    }

    /// Cached list if present, otherwise a fresh download.
    pub async fn load_or_fetch(&self) -> anyhow::Result<ChannelDirectory> {
        match self.load_cached().await {
            Ok(directory) => Ok(directory),
            Err(CacheError::NotFound(_)) => Ok(self.refresh().await?),
            Err(e) => {
                warn!("Ignoring unusable channel cache: {}", e);
                Ok(self.refresh().await?)
            }
        }
    }

    /// Whether the icon directory exists and has anything in it.
    pub async fn icons_present(&self) -> std::io::Result<bool> {
        match tokio::fs::read_dir(self.icon_dir()).await {
            Ok(mut entries) => Ok(entries.next_entry().await?.is_some()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Download every channel icon, unless the icon directory already has
    /// anything in it. Returns the number of files written.
    ///
    /// `on_progress` runs once per downloaded icon.
    pub async fn download_icons<F>(
        &self,
        directory: &ChannelDirectory,
        mut on_progress: F,
    ) -> anyhow::Result<usize>
    where
        F: FnMut(&Channel),
    {
        let icon_dir = self.icon_dir();
        if self.icons_present().await? {
            debug!("Icon directory {:?} already populated", icon_dir);
            return Ok(0);
        }
        tokio::fs::create_dir_all(&icon_dir).await?;

        let mut written = 0;
        for channel in directory.iter() {
            let url = channel.image_url(self.image_field);
            if url.is_empty() {
                continue;
            }
            let bytes = self
                .client
                .get(url)
                .send()
                .await
                .map_err(FetchError::from)?
                .error_for_status()
                .map_err(FetchError::from)?
                .bytes()
                .await
                .map_err(FetchError::from)?;
            tokio::fs::write(icon_dir.join(url_basename(url)), &bytes).await?;
            written += 1;
            on_progress(channel);
        }
        info!("Downloaded {} channel icons", written);
        Ok(written)
    }

    /// Remove the whole cache tree.
    pub async fn purge(&self) -> Result<(), CacheError> {
        tokio::fs::remove_dir_all(&self.root)
            .await
            .map_err(|e| CacheError::io(&self.root, e))?;
        info!("Removed cache directory {:?}", self.root);
        Ok(())
    }
}

/// Client with the directory timeout applied to every request.
pub fn http_client(config: &Config) -> Result<reqwest::Client, FetchError> {
    reqwest::Client::builder()
        .user_agent(concat!("somafm-cli/", env!("CARGO_PKG_VERSION")))
        .timeout(config.directory.timeout())
        .build()
        .map_err(FetchError::from)
}

/// Last path segment of a URL, without query or fragment.
pub fn url_basename(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let path = url[..end].trim_end_matches('/');
    path.rsplit('/').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_basename() {
        assert_eq!(
            url_basename("https://api.somafm.com/logos/512/groovesalad512.png"),
            "groovesalad512.png"
        );
        assert_eq!(url_basename("http://x/y/icon.jpg?v=2"), "icon.jpg");
        assert_eq!(url_basename("icon.png"), "icon.png");
    }

    #[tokio::test]
    async fn test_save_load_purge() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("cache");
        let cache = DirectoryCache::new(
            &root,
            "http://127.0.0.1:9/unused",
            ImageField::XlImage,
            reqwest::Client::new(),
        );

        assert!(matches!(
            cache.load_cached().await,
            Err(CacheError::NotFound(_))
        ));

        let directory = ChannelDirectory::new(vec![Channel {
            title: "Lush".to_string(),
            listeners: 42,
            ..Channel::default()
        }]);
        cache.save(&directory).await.unwrap();
        assert_eq!(cache.load_cached().await.unwrap(), directory);

        cache.purge().await.unwrap();
        assert!(!root.exists());
        assert!(matches!(
            cache.load_cached().await,
            Err(CacheError::NotFound(_))
        ));
        assert!(matches!(cache.purge().await, Err(CacheError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = DirectoryCache::new(
            tmp.path(),
            "http://127.0.0.1:9/unused",
            ImageField::XlImage,
            reqwest::Client::new(),
        );
        std::fs::write(cache.channel_file(), b"not json").unwrap();
        assert!(matches!(
            cache.load_cached().await,
            Err(CacheError::Corrupt { .. })
        ));
    }

    #[tokio::test]
    async fn test_icons_present_ignores_empty_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let cache = DirectoryCache::new(
            tmp.path(),
            "http://127.0.0.1:9/unused",
            ImageField::XlImage,
            reqwest::Client::new(),
        );
        assert!(!cache.icons_present().await.unwrap());

        // Left behind by an aborted download.
        std::fs::create_dir_all(cache.icon_dir()).unwrap();
        assert!(!cache.icons_present().await.unwrap());

        std::fs::write(cache.icon_dir().join("lush512.png"), b"png").unwrap();
        assert!(cache.icons_present().await.unwrap());
    }

    #[test]
    fn test_icon_path_uses_basename() {
        let cache = DirectoryCache::new(
            "/tmp/soma",
            "http://unused",
            ImageField::Image,
            reqwest::Client::new(),
        );
        let channel = Channel {
            title: "Drone Zone".to_string(),
            image: "https://api.somafm.com/img/dronezone120.jpg".to_string(),
            ..Channel::default()
        };
        assert_eq!(
            cache.icon_path(&channel),
            PathBuf::from("/tmp/soma/icons/dronezone120.jpg")
        );
    }
}
