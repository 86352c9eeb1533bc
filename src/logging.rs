//! Tracing subscriber setup
//!
//! The interactive grid owns the terminal, so it logs to a file; batch runs
//! log to stderr. `RUST_LOG` overrides the level picked from `--verbose`.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Where log lines are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    File(PathBuf),
    Stderr,
}

/// `<cache_dir>/pdfstack/pdfstack.log`
pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("pdfstack").join("pdfstack.log"))
}

/// Level used when `RUST_LOG` is unset
pub fn fallback_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Installs the global subscriber; later calls are ignored
pub fn init_tracing(target: &LogTarget, verbose: u8) {
    let level = fallback_level(verbose);
    let make_filter = || {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level))
            .unwrap_or_else(|_| EnvFilter::new("info"))
    };

    match target {
        LogTarget::File(path) => match open_log_file(path) {
            Ok(file) => {
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(make_filter())
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .try_init();
            }
            Err(_) => {
                // Nowhere visible to write while the TUI holds the screen
                let _ = tracing_subscriber::fmt()
                    .with_env_filter(make_filter())
                    .with_writer(io::sink)
                    .try_init();
            }
        },
        LogTarget::Stderr => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(make_filter())
                .with_target(true)
                .with_writer(io::stderr)
                .try_init();
        }
    }

    tracing::info!(level, target = ?target, "tracing initialized");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_fallback_level_from_verbosity() {
        assert_eq!(fallback_level(0), "info");
        assert_eq!(fallback_level(1), "debug");
        assert_eq!(fallback_level(5), "trace");
    }

    #[test]
    fn test_open_log_file_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logs").join("run.log");

        open_log_file(&path).unwrap();

        assert!(path.exists());
    }

    #[test]
    fn test_default_log_path_name() {
        if let Some(path) = default_log_path() {
            assert!(path.ends_with("pdfstack/pdfstack.log"));
        }
    }
}
