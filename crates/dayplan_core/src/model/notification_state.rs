use crate::model::UpcomingMark;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use time::Date;

/// Per-day notification bookkeeping plus the persisted on/off toggle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationState {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub last_notified_task_id: Option<String>,
    #[serde(default)]
    pub upcoming_notified: BTreeMap<String, UpcomingMark>,
    #[serde(default)]
    pub last_rollover: Option<Date>,
}

impl NotificationState {
    /// A mark counts as fired when the stored mark is at or below it; marks only move 2 → 1.
    pub fn upcoming_fired(&self, task_id: &str, mark: UpcomingMark) -> bool {
        self.upcoming_notified
            .get(task_id)
            .is_some_and(|stored| *stored <= mark)
    }

    pub fn record_upcoming(&mut self, task_id: &str, mark: UpcomingMark) {
        let entry = self
            .upcoming_notified
            .entry(task_id.to_string())
            .or_insert(mark);
        if mark < *entry {
            *entry = mark;
        }
    }

    /// Clears the per-day bookkeeping; the toggle and rollover guard survive.
    pub fn reset_day(&mut self) {
        self.last_notified_task_id = None;
        self.upcoming_notified.clear();
    }
}
