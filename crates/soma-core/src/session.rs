//! External player process owned for the length of one playback.
//!
//! ```text
//!   PlaybackSession::start()
//!         │
//!         ├── stdout ─┐
//!         └── stderr ─┴─ merged line stream ─→ run() ─→ OutputParser ─→ on_event
//!
//!   CancellationToken ─→ run() kills the owned child, then (optionally)
//!                        every process with the player's name
//! ```

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{Child, ChildStderr, ChildStdout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::LaunchError;
use crate::now_playing::{OutputParser, PlayerEvent};
use crate::platform;

/// How to invoke the media player.
#[derive(Debug, Clone)]
pub struct PlayerCommand {
    pub program: PathBuf,
    pub playlist_flag: String,
    pub silent_args: Vec<String>,
}

impl PlayerCommand {
    /// Look `program` up on PATH (or take it as a path).
    pub fn locate(
        program: &str,
        playlist_flag: impl Into<String>,
        silent_args: Vec<String>,
    ) -> Result<Self, LaunchError> {
        let program =
            platform::find_binary(program).ok_or_else(|| LaunchError::NotFound(program.to_string()))?;
        Ok(Self {
            program,
            playlist_flag: playlist_flag.into(),
            silent_args,
        })
    }

    /// Arguments for one stream. `audio` false selects metadata-only mode.
    pub fn args(&self, locator: &str, audio: bool) -> Vec<String> {
        let mut args = Vec::new();
        if !audio {
            args.extend(self.silent_args.iter().cloned());
        }
        if !self.playlist_flag.is_empty() {
            args.push(self.playlist_flag.clone());
        }
        args.push(locator.to_string());
        args
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// Player closed its output.
    Finished,
    /// Cancellation token fired.
    Interrupted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOutcome {
    pub end: SessionEnd,
    pub elapsed: Duration,
}

/// Newline-delimited reader that never fails on encoding. Bytes that are not
/// UTF-8 are replaced, so stray Latin-1 metadata cannot end a session.
struct LossyLines<R> {
    reader: BufReader<R>,
    buf: Vec<u8>,
}

impl<R: AsyncRead + Unpin> LossyLines<R> {
    fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
            buf: Vec::new(),
        }
    }

    /// Partial reads stay in `buf`, so this is safe to race in `select!`.
    async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        let n = self.reader.read_until(b'\n', &mut self.buf).await?;
        if n == 0 && self.buf.is_empty() {
            return Ok(None);
        }
        let end = self
            .buf
            .iter()
            .rposition(|b| *b != b'\n' && *b != b'\r')
            .map_or(0, |i| i + 1);
        let line = String::from_utf8_lossy(&self.buf[..end]).into_owned();
        self.buf.clear();
        Ok(Some(line))
    }
}

/// Two line streams read as one, in arrival order.
struct MergedLines<A, B> {
    first: Option<LossyLines<A>>,
    second: Option<LossyLines<B>>,
}

impl<A, B> MergedLines<A, B>
where
    A: AsyncRead + Unpin,
    B: AsyncRead + Unpin,
{
    fn new(first: Option<A>, second: Option<B>) -> Self {
        Self {
            first: first.map(LossyLines::new),
            second: second.map(LossyLines::new),
        }
    }

    /// Next line from either stream; `None` once both are closed.
    async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        loop {
            match (self.first.as_mut(), self.second.as_mut()) {
                (None, None) => return Ok(None),
                (Some(a), None) => return a.next_line().await,
                (None, Some(b)) => return b.next_line().await,
                (Some(a), Some(b)) => {
                    tokio::select! {
                        line = a.next_line() => match line? {
                            Some(l) => return Ok(Some(l)),
                            None => self.first = None,
                        },
                        line = b.next_line() => match line? {
                            Some(l) => return Ok(Some(l)),
                            None => self.second = None,
                        },
                    }
                }
            }
        }
    }
}

pub struct PlaybackSession {
    child: Child,
    program: PathBuf,
    output: MergedLines<ChildStdout, ChildStderr>,
    started: Instant,
    cleanup_stragglers: bool,
}

impl PlaybackSession {
    /// Spawn the player against `locator` with both output streams captured.
    pub fn start(
        command: &PlayerCommand,
        locator: &str,
        audio: bool,
    ) -> Result<Self, LaunchError> {
        let args = command.args(locator, audio);
        info!("Starting {} {:?}", command.program.display(), args);

        let started = Instant::now();
        let mut child = tokio::process::Command::new(&command.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| LaunchError::Spawn {
                program: command.program.display().to_string(),
                source,
            })?;
        debug!("player pid {:?}", child.id());

        let output = MergedLines::new(child.stdout.take(), child.stderr.take());
        Ok(Self {
            child,
            program: command.program.clone(),
            output,
            started,
            cleanup_stragglers: false,
        })
    }

    /// After an interrupt, also kill every process sharing the player's name.
    pub fn with_straggler_cleanup(mut self, enabled: bool) -> Self {
        self.cleanup_stragglers = enabled;
        self
    }

    /// Feed player output through `parser` until the player closes its
    /// output or `cancel` fires. No read timeout applies.
    pub async fn run<F>(
        mut self,
        parser: &mut OutputParser,
        cancel: &CancellationToken,
        mut on_event: F,
    ) -> std::io::Result<SessionOutcome>
    where
        F: FnMut(PlayerEvent),
    {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    self.terminate().await;
                    return Ok(self.outcome(SessionEnd::Interrupted));
                }
                line = self.output.next_line() => match line? {
                    Some(line) => {
                        if let Some(event) = parser.feed(&line) {
                            on_event(event);
                        }
                    }
                    None => break,
                },
            }
        }

        match self.child.wait().await {
            Ok(status) => debug!("player exited with {:?}", status.code()),
            Err(e) => warn!("waiting for player failed: {}", e),
        }
        Ok(self.outcome(SessionEnd::Finished))
    }

    async fn terminate(&mut self) {
        info!("Terminating player");
        if let Err(e) = self.child.kill().await {
            warn!("Could not kill player: {}", e);
        }
        if self.cleanup_stragglers {
            platform::kill_all_named(&self.program.to_string_lossy()).await;
        }
    }

    fn outcome(&self, end: SessionEnd) -> SessionOutcome {
        SessionOutcome {
            end,
            elapsed: self.started.elapsed(),
        }
    }
}
