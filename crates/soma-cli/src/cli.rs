use clap::Parser;

/// Console player for SomaFM streams.
#[derive(Debug, Parser)]
#[command(name = "somafm", version, about)]
pub struct Args {
    /// Download and display the list of channels
    #[arg(short, long)]
    pub list: bool,

    /// Display current listener stats
    #[arg(short, long)]
    pub stats: bool,

    /// Show information about this program and the station
    #[arg(short, long)]
    pub about: bool,

    /// Enable desktop notifications for this session
    #[arg(short, long)]
    pub notify: bool,

    /// Play on a cast device instead of locally (defaults to the configured device)
    #[arg(short, long, value_name = "DEVICE", num_args = 0..=1)]
    pub cast: Option<Option<String>>,

    /// Delete the channel and icon cache
    #[arg(long)]
    pub purge: bool,

    /// Playlist quality rank for this run (0 is highest)
    #[arg(short, long, value_name = "RANK")]
    pub quality: Option<usize>,

    /// Print the log file location
    #[arg(short, long)]
    pub verbose: bool,

    /// Channel to stream (case-insensitive, partial names allowed)
    pub channel: Option<String>,
}
