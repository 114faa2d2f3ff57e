//! Logging setup.
//!
//! The dashboard owns the terminal in raw mode, so logs always go to
//! [`Settings::log_file`] and never to stdout or stderr. `RUST_LOG` wins over
//! the configured filter.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Settings;

fn build_filter(settings: &Settings) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_filter))
}

fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))
}

/// Install the global subscriber, appending to the configured log file.
///
/// Does nothing if a subscriber is already installed. Fails only when the
/// log file cannot be opened.
pub fn init(settings: &Settings) -> Result<()> {
    let file = open_log_file(&settings.log_file)?;
    let _ = fmt()
        .with_env_filter(build_filter(settings))
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn test_default_settings_log_to_a_file() {
        let settings = Settings::default();
        assert_eq!(settings.log_file, crate::config::default_log_file());
        assert!(settings.log_file.starts_with(std::env::temp_dir()));
    }

    #[test]
    fn test_init_creates_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.log");
        let settings = Settings {
            log_file: path.clone(),
            ..Settings::default()
        };

        init(&settings).unwrap();
        assert!(path.exists());
        // A second call is harmless
        init(&settings).unwrap();
    }

    #[test]
    fn test_log_file_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.log");
        std::fs::write(&path, "earlier run\n").unwrap();

        drop(open_log_file(&path).unwrap());

        let mut contents = String::new();
        File::open(&path).unwrap().read_to_string(&mut contents).unwrap();
        assert_eq!(contents, "earlier run\n");
    }

    #[test]
    fn test_unwritable_log_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            log_file: dir.path().join("missing").join("dashboard.log"),
            ..Settings::default()
        };
        assert!(init(&settings).is_err());
    }
}
