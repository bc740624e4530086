use crate::error::AppError;
use crate::rollover::RolloverPolicy;
use crate::storage::json_store::SCHEDULE_FILE_NAME;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "DAYPLAN_CONFIG_PATH";

pub const DEFAULT_TICK_INTERVAL_MS: u64 = 1_000;
pub const MIN_TICK_INTERVAL_MS: u64 = 100;
pub const MAX_TICK_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_ROLLOVER_POLL_SECONDS: u64 = 30;
pub const DEFAULT_ROLLOVER_WINDOW_MINUTES: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub schedule_path: Option<PathBuf>,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_rollover_poll_seconds")]
    pub rollover_poll_seconds: u64,
    #[serde(default = "default_rollover_window_minutes")]
    pub rollover_window_minutes: u8,
    #[serde(default = "default_archive_empty_days")]
    pub archive_empty_days: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schedule_path: None,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            rollover_poll_seconds: DEFAULT_ROLLOVER_POLL_SECONDS,
            rollover_window_minutes: DEFAULT_ROLLOVER_WINDOW_MINUTES,
            archive_empty_days: default_archive_empty_days(),
        }
    }
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

fn default_rollover_poll_seconds() -> u64 {
    DEFAULT_ROLLOVER_POLL_SECONDS
}

fn default_rollover_window_minutes() -> u8 {
    DEFAULT_ROLLOVER_WINDOW_MINUTES
}

fn default_archive_empty_days() -> bool {
    true
}

impl Config {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn rollover_poll_interval(&self) -> Duration {
        Duration::from_secs(self.rollover_poll_seconds)
    }

    pub fn rollover_policy(&self) -> RolloverPolicy {
        RolloverPolicy {
            window_minutes: self.rollover_window_minutes,
            archive_empty_days: self.archive_empty_days,
        }
    }

    /// Explicit path first, then `schedule_path`, then `schedule.json` in the store directory.
    pub fn resolve_schedule_path(&self, explicit: Option<&Path>, store_dir: &Path) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| self.schedule_path.clone())
            .unwrap_or_else(|| store_dir.join(SCHEDULE_FILE_NAME))
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !(MIN_TICK_INTERVAL_MS..=MAX_TICK_INTERVAL_MS).contains(&self.tick_interval_ms) {
            return Err(AppError::invalid_data(format!(
                "tick_interval_ms must be between {MIN_TICK_INTERVAL_MS} and {MAX_TICK_INTERVAL_MS}"
            )));
        }
        if !(1..=60).contains(&self.rollover_poll_seconds) {
            return Err(AppError::invalid_data(
                "rollover_poll_seconds must be between 1 and 60",
            ));
        }
        if !(1..=59).contains(&self.rollover_window_minutes) {
            return Err(AppError::invalid_data(
                "rollover_window_minutes must be between 1 and 59",
            ));
        }

        // The loop only sees midnight if it polls at least once inside the window.
        let poll_ms = self
            .tick_interval_ms
            .max(self.rollover_poll_seconds.saturating_mul(1_000));
        let window_ms = u64::from(self.rollover_window_minutes) * 60_000;
        if poll_ms >= window_ms {
            return Err(AppError::invalid_data(
                "rollover polling must be shorter than rollover_window_minutes",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    SchedulePath,
    TickIntervalMs,
    RolloverPollSeconds,
    RolloverWindowMinutes,
    ArchiveEmptyDays,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

pub fn config_path(store_dir: &Path) -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return PathBuf::from(path);
    }
    store_dir.join(CONFIG_FILE_NAME)
}

pub fn load_config_with_fallback(store_dir: &Path) -> ConfigLoad {
    load_config_with_fallback_from_path(&config_path(store_dir))
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    let config: Config = serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })?;
    config.validate()?;
    Ok(config)
}

/// Parse a raw `KEY=VALUE` override string.
pub fn parse_config_override(raw: &str) -> Result<ConfigOverride, AppError> {
    let (key_raw, value_raw) = raw
        .trim()
        .split_once('=')
        .ok_or_else(|| AppError::invalid_input("override must be in KEY=VALUE format"))?;

    let key = canonical_key(key_raw)
        .ok_or_else(|| AppError::invalid_input("override key cannot be empty"))?;
    let target = match key.as_str() {
        "schedule_path" | "schedule" => ConfigOverrideTarget::SchedulePath,
        "tick_interval_ms" => ConfigOverrideTarget::TickIntervalMs,
        "rollover_poll_seconds" => ConfigOverrideTarget::RolloverPollSeconds,
        "rollover_window_minutes" => ConfigOverrideTarget::RolloverWindowMinutes,
        "archive_empty_days" => ConfigOverrideTarget::ArchiveEmptyDays,
        other => {
            return Err(AppError::invalid_input(format!(
                "unknown config field '{other}'"
            )));
        }
    };

    Ok(ConfigOverride {
        target,
        value: value_raw.trim().to_string(),
    })
}

fn canonical_key(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn merge_overrides(base: &Config, overrides: &[ConfigOverride]) -> Result<Config, AppError> {
    let mut merged = base.clone();

    for entry in overrides {
        match entry.target {
            ConfigOverrideTarget::SchedulePath => {
                merged.schedule_path = Some(PathBuf::from(&entry.value));
            }
            ConfigOverrideTarget::TickIntervalMs => {
                merged.tick_interval_ms = parse_value(entry, "tick_interval_ms")?;
            }
            ConfigOverrideTarget::RolloverPollSeconds => {
                merged.rollover_poll_seconds = parse_value(entry, "rollover_poll_seconds")?;
            }
            ConfigOverrideTarget::RolloverWindowMinutes => {
                merged.rollover_window_minutes = parse_value(entry, "rollover_window_minutes")?;
            }
            ConfigOverrideTarget::ArchiveEmptyDays => {
                merged.archive_empty_days = parse_value(entry, "archive_empty_days")?;
            }
        }
    }

    merged.validate()?;
    Ok(merged)
}

fn parse_value<T: std::str::FromStr>(entry: &ConfigOverride, field: &str) -> Result<T, AppError> {
    entry
        .value
        .parse()
        .map_err(|_| AppError::invalid_input(format!("invalid value '{}' for {field}", entry.value)))
}
