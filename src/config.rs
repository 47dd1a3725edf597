//! Configuration types.

use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConfigError;

/// Helpdesk bot configuration.
#[derive(Debug, Clone)]
pub struct HelpdeskConfig {
    /// Bot name for identification.
    pub name: String,
    /// Path of the libSQL state database. `:memory:` keeps state in memory.
    pub db_path: PathBuf,
    /// Port for the HTTP surface. `None` disables it.
    pub http_port: Option<u16>,
    /// How many unrecognized replies a prompt tolerates before the dialog
    /// stack is cancelled.
    pub prompt_retry_limit: u32,
    /// Maximum number of steps a single turn may run without suspending.
    pub max_steps_per_turn: usize,
    /// Send a generic line when a turn produced no activity at all.
    pub silent_turn_fallback: bool,
    /// Directory for daily rolling log files. `None` logs to stderr only.
    pub log_dir: Option<PathBuf>,
}

impl Default for HelpdeskConfig {
    fn default() -> Self {
        Self {
            name: "rp-helpdesk".to_string(),
            db_path: PathBuf::from("./data/rp-helpdesk.db"),
            http_port: None,
            prompt_retry_limit: 3,
            max_steps_per_turn: 64,
            silent_turn_fallback: false,
            log_dir: None,
        }
    }
}

impl HelpdeskConfig {
    /// Build configuration from `HELPDESK_*` environment variables, falling
    /// back to defaults for anything unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let name = lookup("HELPDESK_NAME")
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.name);
        let db_path = lookup("HELPDESK_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path);
        let http_port = parse_var::<u16>(&lookup, "HELPDESK_HTTP_PORT")?;
        let prompt_retry_limit = parse_var(&lookup, "HELPDESK_PROMPT_RETRY_LIMIT")?
            .unwrap_or(defaults.prompt_retry_limit);
        let max_steps_per_turn = parse_var(&lookup, "HELPDESK_MAX_STEPS_PER_TURN")?
            .unwrap_or(defaults.max_steps_per_turn);
        if max_steps_per_turn == 0 {
            return Err(ConfigError::InvalidValue {
                key: "HELPDESK_MAX_STEPS_PER_TURN".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        let silent_turn_fallback = parse_var(&lookup, "HELPDESK_SILENT_TURN_FALLBACK")?
            .unwrap_or(defaults.silent_turn_fallback);
        let log_dir = lookup("HELPDESK_LOG_DIR")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            name,
            db_path,
            http_port,
            prompt_retry_limit,
            max_steps_per_turn,
            silent_turn_fallback,
            log_dir,
        })
    }

    /// Whether the state database lives in memory only.
    pub fn is_memory_db(&self) -> bool {
        self.db_path.as_os_str() == ":memory:"
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("{raw:?}: {e}"),
            }),
        _ => Ok(None),
    }
}
