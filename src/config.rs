use std::path::PathBuf;

use crate::history::DEFAULT_LIMIT;

/// Environment variable overriding the data directory.
pub const DATA_ENV: &str = "TODOUST_DATA";
/// Environment variable setting the undo depth (`0` for unbounded).
pub const HISTORY_ENV: &str = "TODOUST_HISTORY";
/// Environment variable holding the log filter, e.g. `debug` or `todoust=trace`.
pub const LOG_ENV: &str = "TODOUST_LOG";

/// Runtime settings, resolved from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Directory holding the persisted documents and the TUI log.
    pub data_dir: PathBuf,
    /// Maximum undo depth, `None` for unbounded.
    pub history_limit: Option<usize>,
    /// `tracing` filter directive.
    pub log_filter: String,
    /// Problems found while resolving, reported once logging is up.
    pub warnings: Vec<String>,
}

impl Config {
    /// Resolves the configuration.
    ///
    /// The data directory is determined in the following order:
    /// 1. `TODOUST_DATA` environment variable.
    /// 2. `~/.local/share/todoust` (on Linux).
    /// 3. `.` (fallback).
    pub fn from_env() -> Self {
        Self::from_vars(
            std::env::var(DATA_ENV).ok(),
            std::env::var(HISTORY_ENV).ok(),
            std::env::var(LOG_ENV).ok(),
        )
    }

    /// Resolves the configuration from raw variable values.
    pub fn from_vars(data: Option<String>, history: Option<String>, log: Option<String>) -> Self {
        let data_dir = data.map(PathBuf::from).unwrap_or_else(|| {
            let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
            p.push("todoust");
            p
        });
        let mut warnings = Vec::new();
        let history_limit = match history {
            Some(v) => parse_history_limit(&v).unwrap_or_else(|e| {
                warnings.push(e);
                Some(DEFAULT_LIMIT)
            }),
            None => Some(DEFAULT_LIMIT),
        };
        let log_filter = log.unwrap_or_else(|| "warn".to_string());
        Config { data_dir, history_limit, log_filter, warnings }
    }

    /// Defaults rooted at `dir`, ignoring the environment.
    pub fn with_data_dir(dir: impl Into<PathBuf>) -> Self {
        Config {
            data_dir: dir.into(),
            history_limit: Some(DEFAULT_LIMIT),
            log_filter: "warn".to_string(),
            warnings: Vec::new(),
        }
    }

    /// Path of the TUI log file.
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join("todoust.log")
    }
}

/// `0` means unbounded.
fn parse_history_limit(raw: &str) -> Result<Option<usize>, String> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Ok(None),
        Ok(n) => Ok(Some(n)),
        Err(_) => Err(format!("invalid {} '{}', using {}", HISTORY_ENV, raw, DEFAULT_LIMIT)),
    }
}
