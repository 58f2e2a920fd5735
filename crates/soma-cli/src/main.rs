mod cli;
mod render;
mod theme;

use anyhow::{anyhow, Context};
use clap::Parser;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

use cli::Args;
use soma_core::cast::{CastBackend, CattBackend, NoCast};
use soma_core::config::Config;
use soma_core::directory::http_client;
use soma_core::error::CacheError;
use soma_core::notify::DesktopNotifier;
use soma_core::play::{play, PlayContext, PlayRequest};
use soma_core::resolver::StreamResolver;
use soma_core::session::{PlayerCommand, SessionEnd};
use soma_core::{platform, DirectoryCache};

const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose) {
        eprintln!("somafm: logging disabled: {}", e);
    }
    tracing::info!("somafm {} starting", env!("CARGO_PKG_VERSION"));

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!("{:#}", e);
            render::fatal(&e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("somafm.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Quiet connection-level chatter from the HTTP stack unless RUST_LOG says otherwise.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,soma_core=debug,hyper_util=warn,reqwest=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    if verbose {
        eprintln!("somafm log: {}", log_path.display());
    }
    Ok(())
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    let mut config = Config::load().context("failed to read configuration")?;
    if let Some(rank) = args.quality {
        config.playback.quality = rank;
    }
    let cache = DirectoryCache::from_config(&config)?;

    if args.purge {
        purge(&cache).await?;
        render::success("Cache purged.");
        return Ok(ExitCode::SUCCESS);
    }
    if args.about {
        render::about();
        return Ok(ExitCode::SUCCESS);
    }
    if args.list || args.stats {
        render::progress("Downloading channel list...");
        let directory = cache.refresh().await?;
        render::done();
        if args.list {
            render::channel_list(&directory);
        }
        if args.stats {
            render::stats(&directory);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let player = PlayerCommand::locate(
        &config.playback.player,
        config.playback.playlist_flag.clone(),
        config.playback.silent_args.clone(),
    )
    .map_err(|e| anyhow!("{}. A media player is required to stream channels.", e))?;

    let directory = if cache.channel_file().exists() {
        cache.load_or_fetch().await?
    } else {
        render::progress("Downloading channel list...");
        let directory = cache.refresh().await?;
        render::done();
        directory
    };

    let notifier = if args.notify || config.notifications.enabled {
        match DesktopNotifier::probe(&config.notifications.command) {
            Ok(notifier) => {
                if !cache.icons_present().await? {
                    render::progress("Downloading channel icons");
                }
                let written = cache.download_icons(&directory, |_| render::tick()).await?;
                if written > 0 {
                    render::done();
                }
                Some(notifier)
            }
            Err(e) => {
                tracing::warn!("{}", e);
                render::warning(&format!("Notifications disabled: {}", e));
                None
            }
        }
    } else {
        None
    };

    let cast_device = match &args.cast {
        None => None,
        Some(Some(name)) => Some(name.clone()),
        Some(None) => Some(config.cast.device.clone().ok_or_else(|| {
            anyhow!("--cast needs a device name, or set [cast] device in {}", Config::config_path().display())
        })?),
    };

    let channel = args
        .channel
        .clone()
        .unwrap_or_else(|| config.playback.default_channel.clone());

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("interrupt received");
                cancel.cancel();
            }
        });
    }

    let resolver = StreamResolver::new(http_client(&config)?, config.playback.quality);
    let ctx = PlayContext {
        config: &config,
        directory: &directory,
        cache: &cache,
        resolver: &resolver,
        player: &player,
    };
    let request = PlayRequest {
        channel: &channel,
        notifier: notifier.as_ref(),
        cast_device: cast_device.as_deref(),
    };

    let outcome = match CattBackend::detect(&config.cast.command) {
        Some(catt) if cast_device.is_some() => {
            play_with(&ctx, request, &catt, &cancel).await?
        }
        _ => {
            let none = NoCast::new(config.cast.command.clone());
            play_with(&ctx, request, &none, &cancel).await?
        }
    };

    match outcome.end {
        SessionEnd::Finished => {
            render::stopped(outcome.elapsed);
            Ok(ExitCode::SUCCESS)
        }
        SessionEnd::Interrupted => {
            render::force_closing();
            Ok(ExitCode::from(EXIT_INTERRUPTED))
        }
    }
}

/// Remove the cache tree. A cache that is already gone is an error too.
async fn purge(cache: &DirectoryCache) -> anyhow::Result<()> {
    match cache.purge().await {
        Ok(()) => Ok(()),
        Err(e @ CacheError::NotFound(_)) => Err(anyhow!(e).context("nothing to purge")),
        Err(e) => Err(anyhow!(e).context("failed to purge cache")),
    }
}

async fn play_with<B: CastBackend>(
    ctx: &PlayContext<'_>,
    request: PlayRequest<'_>,
    caster: &B,
    cancel: &CancellationToken,
) -> anyhow::Result<soma_core::session::SessionOutcome> {
    let mut reporter = render::TerminalReporter;
    Ok(play(ctx, request, caster, &mut reporter, cancel).await?)
}
