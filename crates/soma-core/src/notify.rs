//! Desktop notifications through an external command (`notify-send`).

use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::{debug, warn};

use crate::error::NotifierUnavailable;
use crate::platform;

#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    program: PathBuf,
}

impl DesktopNotifier {
    /// Check once whether `command` exists. Callers disable notifications
    /// for the whole run when it does not.
    pub fn probe(command: &str) -> Result<Self, NotifierUnavailable> {
        platform::find_binary(command)
            .map(|program| Self { program })
            .ok_or_else(|| NotifierUnavailable(command.to_string()))
    }

    pub fn args(title: &str, icon: &Path) -> Vec<String> {
        let mut args = Vec::new();
        if icon.is_file() {
            args.push("-i".to_string());
            args.push(icon.display().to_string());
        }
        args.push(title.to_string());
        args
    }

    /// Fire and forget; a failed notification is only logged.
    pub fn notify(&self, title: &str, icon: &Path) {
        let result = tokio::process::Command::new(&self.program)
            .args(Self::args(title, icon))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        match result {
            Ok(_) => debug!("notified {:?}", title),
            Err(e) => warn!("notification failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_missing_command() {
        let err = DesktopNotifier::probe("no-such-notifier-binary").unwrap_err();
        assert_eq!(err.0, "no-such-notifier-binary");
    }

    #[test]
    fn test_args_skip_missing_icon() {
        let args = DesktopNotifier::args("Artist - Track", Path::new("/nonexistent/icon.png"));
        assert_eq!(args, vec!["Artist - Track"]);
    }

    #[test]
    fn test_args_with_icon() {
        let dir = tempfile::tempdir().unwrap();
        let icon = dir.path().join("groovesalad512.png");
        std::fs::write(&icon, b"png").unwrap();
        let args = DesktopNotifier::args("Artist - Track", &icon);
        assert_eq!(args[0], "-i");
        assert_eq!(args[1], icon.display().to_string());
        assert_eq!(args[2], "Artist - Track");
    }
}
