//! Turn a channel into something a player or cast device can open.

use tracing::debug;

use crate::channel::Channel;
use crate::error::{FetchError, ResolveError};

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStream {
    pub playlist_url: String,
    /// Direct media URL, only filled in for targets that cannot follow a
    /// playlist themselves.
    pub media_url: Option<String>,
}

pub struct StreamResolver {
    client: reqwest::Client,
    quality: usize,
}

impl StreamResolver {
    pub fn new(client: reqwest::Client, quality: usize) -> Self {
        Self { client, quality }
    }

    /// Playlist at the configured quality rank (0 is best).
    pub fn resolve_playlist<'a>(&self, channel: &'a Channel) -> Result<&'a str, ResolveError> {
        channel
            .playlists
            .get(self.quality)
            .map(|p| p.url.as_str())
            .ok_or_else(|| ResolveError::QualityUnavailable {
                title: channel.title.clone(),
                rank: self.quality,
                available: channel.playlists.len(),
            })
    }

    /// Download the playlist file and return its first `FileN` entry.
    pub async fn resolve_media_url(&self, channel: &Channel) -> Result<String, ResolveError> {
        let playlist_url = self.resolve_playlist(channel)?;
        debug!("Resolving media URL from {}", playlist_url);
        let body = self
            .client
            .get(playlist_url)
            .send()
            .await
            .map_err(FetchError::from)?
            .error_for_status()
            .map_err(FetchError::from)?
            .text()
            .await
            .map_err(FetchError::from)?;

        parse_pls(&body).ok_or_else(|| ResolveError::MalformedPlaylist(playlist_url.to_string()))
    }

    pub async fn resolve(
        &self,
        channel: &Channel,
        need_media_url: bool,
    ) -> Result<ResolvedStream, ResolveError> {
        let playlist_url = self.resolve_playlist(channel)?.to_string();
        let media_url = if need_media_url {
            Some(self.resolve_media_url(channel).await?)
        } else {
            None
        };
        Ok(ResolvedStream {
            playlist_url,
            media_url,
        })
    }
}

/// Value of the first `FileN=` line in a PLS playlist.
pub fn parse_pls(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let (key, value) = line.trim().split_once('=')?;
        let index = key.trim().strip_prefix("File")?;
        if index.is_empty() || !index.chars().all(|c| c.is_ascii_digit()) {
            return None;
        }
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}
