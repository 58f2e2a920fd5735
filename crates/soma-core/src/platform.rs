use std::path::{Path, PathBuf};

const APP_DIR: &str = "somafm";

pub fn temp_dir() -> PathBuf {
    std::env::temp_dir()
}

pub fn data_dir() -> PathBuf {
    // On macOS and Linux, use ~/.local/share/somafm/ (XDG standard)
    // instead of macOS Application Support for consistency
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(temp_dir)
            .join(".local")
            .join("share")
            .join(APP_DIR)
    }
    #[cfg(windows)]
    {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

pub fn config_dir() -> PathBuf {
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join(APP_DIR)
    }

    #[cfg(windows)]
    {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }
}

pub fn cache_dir() -> PathBuf {
    #[cfg(unix)]
    {
        dirs::home_dir()
            .unwrap_or_else(temp_dir)
            .join(".cache")
            .join(APP_DIR)
    }
    #[cfg(windows)]
    {
        dirs::cache_dir().unwrap_or_else(temp_dir).join(APP_DIR)
    }
}

#[cfg(unix)]
fn executable_names(name: &str) -> Vec<String> {
    vec![name.to_string()]
}

#[cfg(windows)]
fn executable_names(name: &str) -> Vec<String> {
    if name.to_ascii_lowercase().ends_with(".exe") {
        vec![name.to_string()]
    } else {
        vec![format!("{}.exe", name), name.to_string()]
    }
}

/// Resolve an external program by name.
///
/// A name containing a path separator is taken as-is and only checked for
/// existence; a bare name is searched on PATH.
pub fn find_binary(name: &str) -> Option<PathBuf> {
    let direct = Path::new(name);
    if direct.components().count() > 1 {
        return direct.exists().then(|| direct.to_path_buf());
    }

    let path = std::env::var_os("PATH")?;
    let names = executable_names(name);
    for dir in std::env::split_paths(&path) {
        for candidate in &names {
            let p = dir.join(candidate);
            if p.is_file() {
                return Some(p);
            }
        }
    }
    None
}

/// Best-effort removal of every process called `name`, system-wide.
///
/// Only used as a fallback after the owned child has been killed.
pub async fn kill_all_named(name: &str) {
    let image = Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string());

    #[cfg(unix)]
    let result = tokio::process::Command::new("killall")
        .arg("-q")
        .arg(&image)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .await;

    #[cfg(windows)]
    let result = tokio::process::Command::new("taskkill")
        .args(["/F", "/IM"])
        .arg(&image)
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .await;

    match result {
        Ok(status) => tracing::debug!("cleanup of {:?} exited with {:?}", image, status.code()),
        Err(e) => tracing::debug!("cleanup of {:?} failed: {}", image, e),
    }
}
