//! Error taxonomy shared by the directory, resolver, session and cast layers.
//!
//! Everything here is fatal to the current invocation except
//! [`NotifierUnavailable`], which only disables desktop notifications.

use std::path::PathBuf;
use thiserror::Error;

/// Directory or icon download failure, classified from the transport error.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("unknown error: {0}")]
    Unknown(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_connect() || e.is_request() {
            FetchError::Network(e.to_string())
        } else {
            FetchError::Unknown(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("no cache at {0}")]
    NotFound(PathBuf),
    #[error("cache I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cache file {path} is unreadable: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            CacheError::NotFound(path)
        } else {
            CacheError::Io { path, source }
        }
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("channel not found: {0}")]
    NotFound(String),
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{title} has no playlist at quality rank {rank} ({available} available)")]
    QualityUnavailable {
        title: String,
        rank: usize,
        available: usize,
    },
    #[error("playlist {0} has no File entry")]
    MalformedPlaylist(String),
    #[error("failed to fetch playlist: {0}")]
    Fetch(#[from] FetchError),
}

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("{0} not found on PATH")]
    NotFound(String),
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum CastError {
    #[error("casting is not available ({0} not found)")]
    Unavailable(String),
    #[error("cast device {0:?} not found")]
    DeviceNotFound(String),
    #[error("cast negotiation failed: {0}")]
    Negotiation(String),
}

#[derive(Debug, Error)]
#[error("desktop notifications not supported on this system ({0} not found)")]
pub struct NotifierUnavailable(pub String);

/// Anything that ends a `play` invocation early.
#[derive(Debug, Error)]
pub enum PlayError {
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error(transparent)]
    Cast(#[from] CastError),
    #[error("reading player output failed: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_maps_to_not_found() {
        let err = CacheError::io(
            "/nowhere/channels.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(matches!(err, CacheError::NotFound(_)));

        let err = CacheError::io(
            "/nowhere/channels.json",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "nope"),
        );
        assert!(matches!(err, CacheError::Io { .. }));
    }

    #[test]
    fn test_play_error_is_transparent() {
        let err: PlayError = LookupError::NotFound("Groove".to_string()).into();
        assert_eq!(err.to_string(), "channel not found: Groove");
    }
}
