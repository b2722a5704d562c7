use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// Where log lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard error, for one-shot CLI commands.
    Stderr,
    /// `todoust.log` in the data directory, so the TUI screen stays clean.
    File,
}

/// Installs the global subscriber. Safe to call more than once; later calls are ignored.
pub fn init(config: &Config, target: LogTarget) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let result = match target {
        LogTarget::Stderr => builder.with_writer(std::io::stderr).try_init(),
        LogTarget::File => {
            let _ = fs::create_dir_all(&config.data_dir);
            match OpenOptions::new().create(true).append(true).open(config.log_path()) {
                Ok(file) => builder.with_ansi(false).with_writer(Mutex::new(file)).try_init(),
                // No log file, no logging: stderr would draw over the TUI.
                Err(_) => return,
            }
        }
    };
    if result.is_err() {
        tracing::debug!("subscriber already installed");
    }
}
