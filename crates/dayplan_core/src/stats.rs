use crate::model::{ArchiveMap, CompletionMap, ScheduleCatalog, Task, weekday_name};
use serde::Serialize;
use std::collections::BTreeMap;
use time::Date;
use time::macros::format_description;

const UNCATEGORIZED: &str = "Uncategorized";
const STREAK_THRESHOLD: f64 = 0.5;
const MIN_CATEGORY_TASKS: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Tally {
    pub total: usize,
    pub completed: usize,
}

impl Tally {
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    pub fn percent(&self) -> f64 {
        self.rate() * 100.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Streaks {
    pub current: usize,
    pub longest: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub overall: Tally,
    pub by_category: BTreeMap<String, Tally>,
    pub by_weekday: BTreeMap<String, Tally>,
    pub streaks: Streaks,
    pub most_productive_day: Option<String>,
    pub most_productive_category: Option<String>,
}

/// Progress for one day's list against the completion map.
pub fn day_progress(tasks: &[Task], completions: &CompletionMap) -> Tally {
    Tally {
        total: tasks.len(),
        completed: tasks
            .iter()
            .filter(|task| completions.get(&task.id).copied().unwrap_or(false))
            .count(),
    }
}

pub fn summarize(
    catalog: &ScheduleCatalog,
    completions: &CompletionMap,
    archive: &ArchiveMap,
) -> Summary {
    let mut overall = Tally::default();
    let mut by_category: BTreeMap<String, Tally> = BTreeMap::new();
    let mut by_weekday: BTreeMap<String, Tally> = BTreeMap::new();

    for (weekday, tasks) in catalog.days() {
        let day = by_weekday.entry(weekday_name(weekday).to_string()).or_default();
        for task in tasks {
            let done = completions.get(&task.id).copied().unwrap_or(false);
            let category = by_category
                .entry(task.category.clone().unwrap_or_else(|| UNCATEGORIZED.to_string()))
                .or_default();

            overall.total += 1;
            day.total += 1;
            category.total += 1;
            if done {
                overall.completed += 1;
                day.completed += 1;
                category.completed += 1;
            }
        }
    }

    let most_productive_day = best_rate(by_weekday.iter(), 0);
    let most_productive_category = best_rate(by_category.iter(), MIN_CATEGORY_TASKS);

    Summary {
        overall,
        streaks: streaks(catalog, archive),
        by_category,
        by_weekday,
        most_productive_day,
        most_productive_category,
    }
}

fn best_rate<'a>(
    tallies: impl Iterator<Item = (&'a String, &'a Tally)>,
    min_total: usize,
) -> Option<String> {
    let mut best: Option<(&String, f64)> = None;
    for (name, tally) in tallies {
        if tally.total < min_total.max(1) {
            continue;
        }
        let rate = tally.rate();
        if rate > 0.0 && best.is_none_or(|(_, top)| rate > top) {
            best = Some((name, rate));
        }
    }
    best.map(|(name, _)| name.clone())
}

/// Streaks of archived days where at least half of that weekday's tasks were completed.
pub fn streaks(catalog: &ScheduleCatalog, archive: &ArchiveMap) -> Streaks {
    let mut result = Streaks::default();
    let mut run = 0;
    let mut current_open = true;

    // Archive keys sort chronologically; walk from the newest day back.
    for (key, completed) in archive.iter().rev() {
        let Ok(date) = Date::parse(key, format_description!("[year]-[month]-[day]")) else {
            tracing::debug!(key = %key, "skipping malformed archive key");
            continue;
        };

        let tally = Tally {
            total: catalog.tasks_for(date.weekday()).len(),
            completed: completed.values().filter(|done| **done).count(),
        };

        if tally.total > 0 && tally.rate() >= STREAK_THRESHOLD {
            run += 1;
            result.longest = result.longest.max(run);
            if current_open {
                result.current = run;
            }
        } else {
            run = 0;
            current_open = false;
        }
    }

    result
}
