//! Cast-device playback behind a small backend trait.
//!
//! Two backends ship: [`CattBackend`], which drives the `catt` CLI, and
//! [`NoCast`], used when no cast tool is installed. The binary picks one at
//! startup with [`CattBackend::detect`].

use std::path::PathBuf;
use std::process::Output;
use tracing::{debug, info, warn};

use crate::error::CastError;
use crate::platform;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CastDevice {
    pub name: String,
    pub address: String,
    pub model: String,
}

/// What to put on the device.
#[derive(Debug, Clone, Copy)]
pub struct CastMedia<'a> {
    pub url: &'a str,
    pub title: &'a str,
    pub icon_url: &'a str,
}

#[allow(async_fn_in_trait)]
pub trait CastBackend {
    async fn discover(&self) -> Result<Vec<CastDevice>, CastError>;
    async fn play(&self, device: &CastDevice, media: CastMedia<'_>) -> Result<(), CastError>;
    async fn stop(&self, device: &CastDevice) -> Result<(), CastError>;
}

/// A device that is currently playing our stream. Release it with
/// [`CastSession::stop`] once local monitoring ends.
#[derive(Debug, Clone)]
pub struct CastSession {
    pub device: CastDevice,
}

impl CastSession {
    pub async fn stop<B: CastBackend>(self, backend: &B) -> Result<(), CastError> {
        info!("Stopping cast on {}", self.device.name);
        backend.stop(&self.device).await
    }
}

/// Discover devices, pick the first whose name equals `device_name`, and
/// start `media` on it.
pub async fn cast_to<B: CastBackend>(
    backend: &B,
    device_name: &str,
    media: CastMedia<'_>,
) -> Result<CastSession, CastError> {
    let devices = backend.discover().await?;
    debug!("Discovered cast devices: {:?}", devices);
    let device = devices
        .into_iter()
        .find(|d| d.name == device_name)
        .ok_or_else(|| CastError::DeviceNotFound(device_name.to_string()))?;

    info!("Casting {:?} to {} ({})", media.title, device.name, device.address);
    backend.play(&device, media).await?;
    Ok(CastSession { device })
}

// ── catt ──────────────────────────────────────────────────────────────────────

pub struct CattBackend {
    program: PathBuf,
}

impl CattBackend {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn detect(command: &str) -> Option<Self> {
        platform::find_binary(command).map(Self::new)
    }

    async fn run(&self, args: &[&str], action: &str) -> Result<Output, CastError> {
        debug!("{} {:?}", self.program.display(), args);
        let output = tokio::process::Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(|e| CastError::Negotiation(format!("failed to execute {}: {}", action, e)))?;
        if output.status.success() {
            Ok(output)
        } else {
            Err(CastError::Negotiation(format!(
                "{} failed (code {}): {}",
                action,
                output.status.code().unwrap_or(-1),
                output_summary(&output)
            )))
        }
    }
}

impl CastBackend for CattBackend {
    async fn discover(&self) -> Result<Vec<CastDevice>, CastError> {
        let output = self.run(&["scan"], "catt scan").await?;
        Ok(parse_scan(&String::from_utf8_lossy(&output.stdout)))
    }

    async fn play(&self, device: &CastDevice, media: CastMedia<'_>) -> Result<(), CastError> {
        if !media.icon_url.is_empty() {
            debug!("catt cannot show artwork, skipping {}", media.icon_url);
        }
        self.run(&["-d", device.name.as_str(), "cast", media.url], "catt cast")
            .await
            .map(|_| ())
    }

    async fn stop(&self, device: &CastDevice) -> Result<(), CastError> {
        self.run(&["-d", device.name.as_str(), "stop"], "catt stop")
            .await
            .map(|_| ())
    }
}

fn output_summary(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if !stderr.is_empty() {
        return stderr;
    }
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if !stdout.is_empty() {
        return stdout;
    }
    "no output".to_string()
}

/// Parse `catt scan` output: `<address> - <name> - <model>` per device.
pub fn parse_scan(text: &str) -> Vec<CastDevice> {
    text.lines()
        .filter_map(|line| {
            let line = line.trim();
            let (address, rest) = line.split_once(" - ")?;
            if !address.chars().any(|c| c.is_ascii_digit()) || address.contains(' ') {
                return None;
            }
            let (name, model) = rest.rsplit_once(" - ").unwrap_or((rest, ""));
            Some(CastDevice {
                name: name.trim().to_string(),
                address: address.to_string(),
                model: model.trim().to_string(),
            })
        })
        .collect()
}

// ── absent backend ────────────────────────────────────────────────────────────

/// Stand-in when no cast tool is installed; every call fails.
pub struct NoCast {
    command: String,
}

impl NoCast {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl CastBackend for NoCast {
    async fn discover(&self) -> Result<Vec<CastDevice>, CastError> {
        Err(CastError::Unavailable(self.command.clone()))
    }

    async fn play(&self, _device: &CastDevice, _media: CastMedia<'_>) -> Result<(), CastError> {
        Err(CastError::Unavailable(self.command.clone()))
    }

    async fn stop(&self, device: &CastDevice) -> Result<(), CastError> {
        warn!("No cast backend to stop {}", device.name);
        Err(CastError::Unavailable(self.command.clone()))
    }
}
