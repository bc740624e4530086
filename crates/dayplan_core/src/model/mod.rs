pub mod alert;
pub mod notification_state;
pub mod schedule;
pub mod task;

pub use alert::{Alert, AlertKind, UpcomingMark};
pub use notification_state::NotificationState;
pub use schedule::{ScheduleCatalog, WEEKDAYS, parse_weekday, weekday_name};
pub use task::{Task, TaskStatus, TemporalStatus, parse_hhmm};

use std::collections::BTreeMap;

/// Task id → completed flag for the active day. Absent means not completed.
pub type CompletionMap = BTreeMap<String, bool>;

/// `YYYY-MM-DD` → the ids completed on that day.
pub type ArchiveMap = BTreeMap<String, CompletionMap>;
