use crate::lesson_times::LessonTimes;
use std::env;
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

pub const HTTP_ADDR_VAR: &str = "MCL_SCHEDULE_HTTP_ADDR";
pub const DB_PATH_VAR: &str = "MCL_SCHEDULE_DB";
pub const LESSON_TIMES_VAR: &str = "MCL_SCHEDULE_LESSON_TIMES";
pub const IMPORT_VAR: &str = "MCL_SCHEDULE_IMPORT";

const DEFAULT_HTTP_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("expected {expected} lesson slots, found {found}")]
    SlotCount { expected: usize, found: usize },
    #[error("invalid time '{input}': {reason}")]
    InvalidTime { input: String, reason: String },
    #[error("slot {slot} ends before it starts ({range})")]
    SlotEndsBeforeStart { slot: usize, range: String },
    #[error("invalid {var} value '{value}': {reason}")]
    InvalidVar {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Runtime settings shared by the binaries, read from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_addr: SocketAddr,
    pub db_path: Option<PathBuf>,
    pub lesson_times_path: Option<PathBuf>,
    pub import_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            db_path: None,
            lesson_times_path: None,
            import_path: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable source; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let raw_addr = var(HTTP_ADDR_VAR).unwrap_or_else(|| DEFAULT_HTTP_ADDR.to_string());
        let http_addr = raw_addr
            .trim()
            .parse()
            .map_err(|err: std::net::AddrParseError| ConfigError::InvalidVar {
                var: HTTP_ADDR_VAR,
                value: raw_addr.clone(),
                reason: err.to_string(),
            })?;

        Ok(Self {
            http_addr,
            db_path: var(DB_PATH_VAR).map(PathBuf::from),
            lesson_times_path: var(LESSON_TIMES_VAR).map(PathBuf::from),
            import_path: var(IMPORT_VAR).map(PathBuf::from),
        })
    }

    /// The configured bell schedule, or the built-in one.
    pub fn lesson_times(&self) -> Result<LessonTimes, ConfigError> {
        match &self.lesson_times_path {
            Some(path) => LessonTimes::load_from_json(path),
            None => Ok(LessonTimes::default()),
        }
    }
}

/// Installs the global `tracing` subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.http_addr.to_string(), DEFAULT_HTTP_ADDR);
        assert!(config.db_path.is_none());
        assert!(config.lesson_times().is_ok());
    }

    #[test]
    fn reads_paths_and_address() {
        let config = AppConfig::from_lookup(lookup(&[
            (HTTP_ADDR_VAR, "127.0.0.1:8081"),
            (DB_PATH_VAR, "/tmp/schedule.db"),
            (IMPORT_VAR, ""),
        ]))
        .unwrap();
        assert_eq!(config.http_addr.port(), 8081);
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/schedule.db")));
        assert!(config.import_path.is_none());
    }

    #[test]
    fn rejects_bad_address() {
        let err = AppConfig::from_lookup(lookup(&[(HTTP_ADDR_VAR, "not-an-addr")])).unwrap_err();
        assert!(err.to_string().contains(HTTP_ADDR_VAR));
    }
}
