//! The default action: look a channel up, resolve it, run the player and
//! report what it prints until it stops.

use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cast::{cast_to, CastBackend, CastMedia, CastSession};
use crate::channel::{Channel, ChannelDirectory};
use crate::config::Config;
use crate::directory::DirectoryCache;
use crate::error::PlayError;
use crate::notify::DesktopNotifier;
use crate::now_playing::{OutputParser, PlayerEvent};
use crate::resolver::{ResolvedStream, StreamResolver};
use crate::session::{PlaybackSession, PlayerCommand, SessionEnd, SessionOutcome};

/// Receives progress of a play invocation. The terminal front-end renders
/// these; tests record them.
pub trait Reporter {
    fn loading(&mut self, channel: &Channel, stream: &ResolvedStream);
    fn casting(&mut self, session: &CastSession);
    fn player_event(&mut self, event: &PlayerEvent);
    fn warning(&mut self, message: &str);
}

/// Everything a play invocation reads but does not own.
pub struct PlayContext<'a> {
    pub config: &'a Config,
    pub directory: &'a ChannelDirectory,
    pub cache: &'a DirectoryCache,
    pub resolver: &'a StreamResolver,
    pub player: &'a PlayerCommand,
}

#[derive(Default)]
pub struct PlayRequest<'a> {
    pub channel: &'a str,
    pub notifier: Option<&'a DesktopNotifier>,
    pub cast_device: Option<&'a str>,
}

/// Run one channel to completion. Cancelling `cancel` at any point,
/// including during playlist resolution or cast setup, ends the call with
/// an interrupted outcome; no cast device is started after the interrupt.
pub async fn play<B, R>(
    ctx: &PlayContext<'_>,
    request: PlayRequest<'_>,
    caster: &B,
    reporter: &mut R,
    cancel: &CancellationToken,
) -> Result<SessionOutcome, PlayError>
where
    B: CastBackend,
    R: Reporter,
{
    let started = Instant::now();
    let interrupted = || {
        info!("Interrupted before playback started");
        SessionOutcome {
            end: SessionEnd::Interrupted,
            elapsed: started.elapsed(),
        }
    };

    let channel = ctx.directory.find(request.channel)?;
    info!("Playing {:?}", channel.title);

    let stream = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Ok(interrupted()),
        stream = ctx.resolver.resolve(channel, request.cast_device.is_some()) => stream?,
    };

    let cast_session = match (request.cast_device, stream.media_url.as_deref()) {
        (Some(device), Some(media_url)) => {
            let media = CastMedia {
                url: media_url,
                title: &channel.title,
                icon_url: channel.image_url(ctx.config.directory.image_field),
            };
            let session = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(interrupted()),
                session = cast_to(caster, device, media) => session?,
            };
            reporter.casting(&session);
            Some(session)
        }
        _ => None,
    };

    reporter.loading(channel, &stream);
    // With a cast device the local player only reads metadata.
    let audio = cast_session.is_none();
    let session = match PlaybackSession::start(ctx.player, &stream.playlist_url, audio) {
        Ok(s) => s.with_straggler_cleanup(ctx.config.playback.cleanup_stragglers),
        Err(e) => {
            if let Some(cast) = cast_session {
                release_cast(cast, caster, reporter).await;
            }
            return Err(e.into());
        }
    };

    let mut parser = OutputParser::new(&ctx.config.station_ids);
    let icon = ctx.cache.icon_path(channel);
    let notifier = request.notifier;

    let result = session
        .run(&mut parser, cancel, |event| {
            if let (PlayerEvent::Track(track), Some(n)) = (&event, notifier) {
                n.notify(&track.title, &icon);
            }
            reporter.player_event(&event);
        })
        .await;

    if let Some(cast) = cast_session {
        if releases_cast(&result) {
            release_cast(cast, caster, reporter).await;
        }
    }

    let outcome = result?;
    info!("Session ended ({:?}) after {:?}", outcome.end, outcome.elapsed);
    Ok(outcome)
}

/// The cast device keeps playing only when the user interrupted; a finished
/// or failed local session releases it.
fn releases_cast(result: &std::io::Result<SessionOutcome>) -> bool {
    !matches!(
        result,
        Ok(SessionOutcome {
            end: SessionEnd::Interrupted,
            ..
        })
    )
}

async fn release_cast<B: CastBackend, R: Reporter>(
    cast: CastSession,
    caster: &B,
    reporter: &mut R,
) {
    let device = cast.device.name.clone();
    if let Err(e) = cast.stop(caster).await {
        warn!("Failed to stop cast on {}: {}", device, e);
        reporter.warning(&format!("Could not stop playback on {}: {}", device, e));
    }
}
