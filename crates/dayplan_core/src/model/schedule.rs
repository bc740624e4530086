use crate::error::AppError;
use crate::model::Task;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use time::Weekday;

pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Monday,
    Weekday::Tuesday,
    Weekday::Wednesday,
    Weekday::Thursday,
    Weekday::Friday,
    Weekday::Saturday,
    Weekday::Sunday,
];

#[derive(Debug, Deserialize)]
struct StoredSchedule {
    schedule: BTreeMap<String, Vec<Task>>,
}

/// Read-only weekday → ordered task list mapping, loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleCatalog {
    days: HashMap<Weekday, Vec<Task>>,
}

impl ScheduleCatalog {
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path)
            .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, AppError> {
        let stored: StoredSchedule = serde_json::from_str(content)
            .map_err(|err| AppError::invalid_data(format!("invalid schedule: {err}")))?;
        Self::from_days(stored.schedule)
    }

    pub fn from_days(raw: BTreeMap<String, Vec<Task>>) -> Result<Self, AppError> {
        let mut days = HashMap::new();

        for (name, tasks) in raw {
            let weekday = parse_weekday(&name)
                .ok_or_else(|| AppError::invalid_data(format!("unknown weekday '{name}'")))?;
            validate_day(weekday, &tasks)?;
            if days.insert(weekday, tasks).is_some() {
                return Err(AppError::invalid_data(format!(
                    "weekday '{}' is listed twice",
                    weekday_name(weekday)
                )));
            }
        }

        Ok(Self { days })
    }

    /// Missing weekdays degrade to an empty list.
    pub fn tasks_for(&self, weekday: Weekday) -> &[Task] {
        self.days.get(&weekday).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find_task(&self, weekday: Weekday, task_id: &str) -> Option<&Task> {
        self.tasks_for(weekday).iter().find(|task| task.id == task_id)
    }

    pub fn days(&self) -> impl Iterator<Item = (Weekday, &[Task])> {
        WEEKDAYS
            .iter()
            .map(move |weekday| (*weekday, self.tasks_for(*weekday)))
    }
}

fn validate_day(weekday: Weekday, tasks: &[Task]) -> Result<(), AppError> {
    let mut seen = HashSet::new();

    for task in tasks {
        if task.id.trim().is_empty() {
            return Err(AppError::invalid_data(format!(
                "{}: task id is required",
                weekday_name(weekday)
            )));
        }
        if !seen.insert(task.id.as_str()) {
            return Err(AppError::invalid_data(format!(
                "{}: duplicate task id '{}'",
                weekday_name(weekday),
                task.id
            )));
        }

        let start = task.start()?;
        let end = task.end()?;
        if start >= end {
            return Err(AppError::invalid_data(format!(
                "{}: task '{}' must start before it ends",
                weekday_name(weekday),
                task.id
            )));
        }
    }

    Ok(())
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Monday => "Monday",
        Weekday::Tuesday => "Tuesday",
        Weekday::Wednesday => "Wednesday",
        Weekday::Thursday => "Thursday",
        Weekday::Friday => "Friday",
        Weekday::Saturday => "Saturday",
        Weekday::Sunday => "Sunday",
    }
}

pub fn parse_weekday(raw: &str) -> Option<Weekday> {
    let lowered = raw.trim().to_ascii_lowercase();
    WEEKDAYS.iter().copied().find(|weekday| {
        let name = weekday_name(*weekday).to_ascii_lowercase();
        lowered == name || (lowered.len() == 3 && name.starts_with(&lowered))
    })
}
