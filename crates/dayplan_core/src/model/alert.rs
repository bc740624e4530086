use serde::{Deserialize, Serialize};

/// Minute mark of a pre-start warning. Stored as the bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum UpcomingMark {
    OneMinute,
    TwoMinutes,
}

impl UpcomingMark {
    pub const ALL: [UpcomingMark; 2] = [UpcomingMark::TwoMinutes, UpcomingMark::OneMinute];

    pub fn minutes(self) -> u8 {
        match self {
            Self::OneMinute => 1,
            Self::TwoMinutes => 2,
        }
    }

    /// Lower bound (exclusive) of the minutes-until-start window.
    pub fn window_floor(self) -> f64 {
        match self {
            Self::OneMinute => 0.9,
            Self::TwoMinutes => 1.9,
        }
    }

    pub fn contains(self, minutes_away: f64) -> bool {
        minutes_away <= f64::from(self.minutes()) && minutes_away > self.window_floor()
    }

    fn phrase(self) -> &'static str {
        match self {
            Self::OneMinute => "In 1 minute",
            Self::TwoMinutes => "In 2 minutes",
        }
    }
}

impl TryFrom<u8> for UpcomingMark {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::OneMinute),
            2 => Ok(Self::TwoMinutes),
            other => Err(format!("unsupported upcoming mark {other}")),
        }
    }
}

impl From<UpcomingMark> for u8 {
    fn from(mark: UpcomingMark) -> Self {
        mark.minutes()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "minutes")]
pub enum AlertKind {
    TaskStarted,
    UpcomingTask(UpcomingMark),
    NewDay,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl Alert {
    pub fn task_started(task_id: &str, description: &str) -> Self {
        Self {
            kind: AlertKind::TaskStarted,
            title: "Task Started".to_string(),
            body: format!("Time to start: {description}"),
            task_id: Some(task_id.to_string()),
        }
    }

    pub fn upcoming(mark: UpcomingMark, task_id: &str, description: &str) -> Self {
        Self {
            kind: AlertKind::UpcomingTask(mark),
            title: "Upcoming Task".to_string(),
            body: format!("{}: {description}", mark.phrase()),
            task_id: Some(task_id.to_string()),
        }
    }

    pub fn new_day() -> Self {
        Self {
            kind: AlertKind::NewDay,
            title: "New Day Started".to_string(),
            body: "Yesterday's tasks have been archived and today's tasks reset.".to_string(),
            task_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Alert, UpcomingMark};

    #[test]
    fn upcoming_windows_are_a_tenth_of_a_minute_wide() {
        assert!(UpcomingMark::TwoMinutes.contains(2.0));
        assert!(UpcomingMark::TwoMinutes.contains(1.95));
        assert!(!UpcomingMark::TwoMinutes.contains(1.9));
        assert!(!UpcomingMark::TwoMinutes.contains(2.01));
        assert!(UpcomingMark::OneMinute.contains(0.91));
        assert!(!UpcomingMark::OneMinute.contains(0.9));
    }

    #[test]
    fn upcoming_mark_serializes_as_integer() {
        let json = serde_json::to_string(&UpcomingMark::TwoMinutes).unwrap();
        assert_eq!(json, "2");
        let parsed: UpcomingMark = serde_json::from_str("1").unwrap();
        assert_eq!(parsed, UpcomingMark::OneMinute);
        assert!(serde_json::from_str::<UpcomingMark>("3").is_err());
    }

    #[test]
    fn alert_wording() {
        let started = Alert::task_started("t1", "Standup");
        assert_eq!(started.title, "Task Started");
        assert_eq!(started.body, "Time to start: Standup");

        let soon = Alert::upcoming(UpcomingMark::OneMinute, "t1", "Standup");
        assert_eq!(soon.body, "In 1 minute: Standup");
        assert_eq!(soon.task_id.as_deref(), Some("t1"));

        assert!(Alert::new_day().task_id.is_none());
    }
}
