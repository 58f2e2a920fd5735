//! Now-playing state machine over the player's text output.
//!
//! ```text
//!   AwaitingHeader ── "Name…"    → ChannelName (first one only)
//!         │        ── "Genre…"   → Genre       (first one only)
//!         │        ── "Bitrate…" → Bitrate, header closed
//!         │        ── "ICY Info:" → header closed, handled as below
//!         ▼
//!   Streaming ────── "ICY Info:" → Track (when StreamTitle parses)
//! ```
//!
//! Header markers seen after the header closed are ignored, so each header
//! field is reported at most once per session. Anything unrecognised,
//! including ICY lines whose StreamTitle cannot be extracted, is a non-event.

use chrono::{DateTime, Local};
use regex::Regex;
use std::time::Duration;

const NAME_MARKER: &str = "Name";
const GENRE_MARKER: &str = "Genre";
const BITRATE_MARKER: &str = "Bitrate";
const ICY_MARKER: &str = "ICY Info:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingHeader,
    Streaming,
}

/// What is known about the current session so far.
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlaying {
    pub channel_name: Option<String>,
    pub genre: Option<String>,
    pub bitrate: Option<String>,
    pub current_track: Option<String>,
    pub header_printed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackChange {
    pub title: String,
    pub at: DateTime<Local>,
    /// Title looks like a station announcement rather than music.
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    ChannelName(String),
    Genre(String),
    /// Last header field; the header is complete after this.
    Bitrate(String),
    Track(TrackChange),
}

pub struct OutputParser {
    phase: Phase,
    state: NowPlaying,
    station_ids: Vec<String>,
    title_re: Regex,
}

impl OutputParser {
    pub fn new<I, S>(station_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            phase: Phase::AwaitingHeader,
            state: NowPlaying {
                channel_name: None,
                genre: None,
                bitrate: None,
                current_track: None,
                header_printed: false,
            },
            station_ids: station_ids
                .into_iter()
                .map(|s| s.as_ref().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            // Lazy match up to the first `';`, or greedy to the last quote
            // when the title is the final attribute.
            title_re: Regex::new(r"StreamTitle='(.*?)';|StreamTitle='(.*)'")
                .expect("static regex"),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> &NowPlaying {
        &self.state
    }

    /// Consume one line of player output.
    pub fn feed(&mut self, line: &str) -> Option<PlayerEvent> {
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(info) = line.strip_prefix(ICY_MARKER) {
            if self.phase == Phase::AwaitingHeader {
                tracing::debug!("ICY metadata before Bitrate, closing header");
                self.close_header();
            }
            return self.track_change(info);
        }

        if self.phase == Phase::Streaming {
            return None;
        }

        if line.starts_with(NAME_MARKER) {
            if self.state.channel_name.is_some() {
                return None;
            }
            // "Name   : Groove Salad: A nicely chilled…" → "Groove Salad"
            let name = line.splitn(3, ':').nth(1)?.trim().to_string();
            self.state.channel_name = Some(name.clone());
            return Some(PlayerEvent::ChannelName(name));
        }

        if line.starts_with(GENRE_MARKER) {
            if self.state.genre.is_some() {
                return None;
            }
            let genre = after_first_colon(line)?;
            self.state.genre = Some(genre.clone());
            return Some(PlayerEvent::Genre(genre));
        }

        if line.starts_with(BITRATE_MARKER) {
            let bitrate = after_first_colon(line)?;
            self.state.bitrate = Some(bitrate.clone());
            self.close_header();
            return Some(PlayerEvent::Bitrate(bitrate));
        }

        None
    }

    fn close_header(&mut self) {
        self.phase = Phase::Streaming;
        self.state.header_printed = true;
    }

    fn track_change(&mut self, info: &str) -> Option<PlayerEvent> {
        let caps = self.title_re.captures(info)?;
        let title = caps.get(1).or_else(|| caps.get(2))?.as_str().trim();
        if title.is_empty() {
            return None;
        }

        let highlighted = self.is_station_id(title);
        self.state.current_track = Some(title.to_string());

        Some(PlayerEvent::Track(TrackChange {
            title: title.to_string(),
            at: Local::now(),
            highlighted,
        }))
    }

    pub fn is_station_id(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.station_ids.iter().any(|id| title.contains(id.as_str()))
    }
}

fn after_first_colon(line: &str) -> Option<String> {
    line.split_once(':').map(|(_, rest)| rest.trim().to_string())
}

/// `HH:MM:SS`, zero padded. Hours keep counting past 24.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
