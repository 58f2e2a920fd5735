//! Console SomaFM player: channel directory, stream resolution, player
//! process supervision and now-playing parsing.

pub mod cast;
pub mod channel;
pub mod config;
pub mod directory;
pub mod error;
pub mod notify;
pub mod now_playing;
pub mod platform;
pub mod play;
pub mod resolver;
pub mod session;

pub use channel::{Channel, ChannelDirectory, Playlist};
pub use config::Config;
pub use directory::DirectoryCache;
pub use now_playing::{format_elapsed, OutputParser, PlayerEvent, TrackChange};
