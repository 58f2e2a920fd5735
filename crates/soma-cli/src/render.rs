//! Terminal output: channel tables, the now-playing feed, and messages.

use crossterm::style::Stylize;
use soma_core::cast::CastSession;
use soma_core::play::Reporter;
use soma_core::resolver::ResolvedStream;
use soma_core::{format_elapsed, Channel, ChannelDirectory, PlayerEvent};
use std::io::Write;
use std::time::Duration;
use unicode_width::UnicodeWidthStr;

use crate::theme::*;

const TITLE_WIDTH: usize = 22;
const COUNT_WIDTH: usize = 4;

/// Right-align by display width rather than byte length.
fn pad_left(text: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(text);
    format!("{}{}", " ".repeat(width.saturating_sub(w)), text)
}

fn separator() {
    println!("{}", SEPARATOR.with(C_ACCENT));
}

/// Start a status line that a later [`done`] completes.
pub fn progress(message: &str) {
    print!("{}", message.with(C_PRIMARY));
    let _ = std::io::stdout().flush();
}

pub fn tick() {
    print!(".");
    let _ = std::io::stdout().flush();
}

pub fn done() {
    println!("{}", "OK".with(C_PLAYING));
}

pub fn success(message: &str) {
    println!("{}", message.with(C_PLAYING));
}

pub fn warning(message: &str) {
    println!("{}", message.with(C_WARNING));
}

pub fn fatal(error: &anyhow::Error) {
    println!();
    println!("{}", format!("{}", error).with(C_ERROR).bold());
    for cause in error.chain().skip(1) {
        println!("{}", format!("  caused by: {}", cause).with(C_SECONDARY));
    }
}

pub fn channel_list(directory: &ChannelDirectory) {
    separator();
    for channel in directory.iter() {
        println!(
            "{} : {}",
            pad_left(&channel.title, TITLE_WIDTH).with(C_TAG),
            channel.description.as_str().with(C_PLAYING)
        );
    }
}

pub fn stats(directory: &ChannelDirectory) {
    separator();
    for channel in directory.by_listeners() {
        println!(
            "{} : {}",
            pad_left(&channel.listeners.to_string(), COUNT_WIDTH).with(C_PLAYING),
            channel.title.as_str().with(C_TAG)
        );
    }
    println!(
        "{} : {}",
        pad_left(&directory.total_listeners().to_string(), COUNT_WIDTH).with(C_TOTAL),
        "Total Listeners".with(C_LABEL)
    );
}

pub fn about() {
    separator();
    println!(
        "{} {}",
        "somafm".with(C_LABEL).bold(),
        env!("CARGO_PKG_VERSION").with(C_PRIMARY)
    );
    println!(
        "{}",
        "A console front-end for SomaFM: pick a channel, hear it, watch the track list scroll by."
            .with(C_PRIMARY)
    );
    println!();
    println!(
        "{}",
        "SomaFM is listener-supported, commercial-free radio. If you enjoy the music,"
            .with(C_PLAYING)
    );
    println!(
        "{} {}",
        "please consider supporting the stations at".with(C_PLAYING),
        "https://somafm.com/support/".with(C_TAG).underlined()
    );
    separator();
}

pub fn stopped(elapsed: Duration) {
    println!(
        "{}",
        format!("Playback stopped after {}", format_elapsed(elapsed)).with(C_PRIMARY)
    );
}

pub fn force_closing() {
    println!();
    println!("{}", "Force closing...".with(C_ERROR));
}

/// Renders a play invocation as it happens.
pub struct TerminalReporter;

impl Reporter for TerminalReporter {
    fn loading(&mut self, channel: &Channel, stream: &ResolvedStream) {
        tracing::debug!("loading {} from {}", channel.title, stream.playlist_url);
        progress(&format!("Loading {}...", channel.title));
        done();
        separator();
    }

    fn casting(&mut self, session: &CastSession) {
        println!(
            "{} {}",
            "Casting to".with(C_LABEL),
            session.device.name.as_str().with(C_PRIMARY)
        );
    }

    fn player_event(&mut self, event: &PlayerEvent) {
        match event {
            PlayerEvent::ChannelName(name) => {
                println!("{}{}", "Channel: ".with(C_LABEL), name.as_str().with(C_PRIMARY));
            }
            PlayerEvent::Genre(genre) => {
                println!("{}{}", "Genre: ".with(C_LABEL), genre.as_str().with(C_PRIMARY));
            }
            PlayerEvent::Bitrate(bitrate) => {
                println!("{}{}", "Bitrate: ".with(C_LABEL), bitrate.as_str().with(C_PRIMARY));
                separator();
            }
            PlayerEvent::Track(track) => {
                let title = if track.highlighted {
                    track.title.as_str().with(C_STATION_ID).bold()
                } else {
                    track.title.as_str().with(C_PLAYING)
                };
                println!(
                    "{} | {}",
                    track.at.format("%H:%M:%S").to_string().with(C_TAG),
                    title
                );
            }
        }
    }

    fn warning(&mut self, message: &str) {
        warning(message);
    }
}
