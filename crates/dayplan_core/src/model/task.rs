use crate::error::AppError;
use serde::{Deserialize, Serialize};
use time::Time;
use time::macros::format_description;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub start_time: String,
    pub end_time: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Task {
    pub fn start(&self) -> Result<Time, AppError> {
        parse_hhmm(&self.start_time)
    }

    pub fn end(&self) -> Result<Time, AppError> {
        parse_hhmm(&self.end_time)
    }
}

/// Where "now" sits relative to a task's window on the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemporalStatus {
    Past,
    Current,
    Future,
}

/// Display status: completion wins over the temporal classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Completed,
    Current,
    Past,
    Future,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Current => "current",
            Self::Past => "past",
            Self::Future => "future",
        }
    }
}

impl From<TemporalStatus> for TaskStatus {
    fn from(status: TemporalStatus) -> Self {
        match status {
            TemporalStatus::Past => Self::Past,
            TemporalStatus::Current => Self::Current,
            TemporalStatus::Future => Self::Future,
        }
    }
}

/// Parses a 24h `HH:MM` wall-clock time.
pub fn parse_hhmm(raw: &str) -> Result<Time, AppError> {
    Time::parse(raw.trim(), format_description!("[hour]:[minute]"))
        .map_err(|_| AppError::invalid_time(format!("'{raw}' is not a valid HH:MM time")))
}
