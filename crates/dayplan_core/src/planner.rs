use crate::clock::Clock;
use crate::error::AppError;
use crate::model::{Alert, ArchiveMap, CompletionMap, ScheduleCatalog, Task, TaskStatus};
use crate::rollover::{RolloverManager, RolloverOutcome, RolloverPolicy};
use crate::scheduler;
use crate::stats::{self, Summary, Tally};
use crate::status;
use crate::storage::{ArchiveStore, CompletionStore, NotificationStateStore};
use serde::Serialize;
use std::path::Path;
use time::{PrimitiveDateTime, Weekday};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRow {
    pub task: Task,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayView {
    pub weekday: String,
    pub rows: Vec<TaskRow>,
    pub progress: Tally,
}

/// The daily schedule state machine: one clock, one catalog, three stores.
///
/// Stores are loaded once and written back on every mutation. All transitions run to
/// completion inside one call, so no locking is needed under a single writer.
pub struct Planner<C: Clock> {
    clock: C,
    catalog: ScheduleCatalog,
    completions: CompletionStore,
    archive: ArchiveStore,
    notifications: NotificationStateStore,
    rollover: RolloverManager,
}

impl<C: Clock> Planner<C> {
    pub fn open(clock: C, catalog: ScheduleCatalog, store_dir: &Path, policy: RolloverPolicy) -> Self {
        Self {
            clock,
            catalog,
            completions: CompletionStore::open(store_dir),
            archive: ArchiveStore::open(store_dir),
            notifications: NotificationStateStore::open(store_dir),
            rollover: RolloverManager::new(policy),
        }
    }

    pub fn in_memory(clock: C, catalog: ScheduleCatalog, policy: RolloverPolicy) -> Self {
        Self {
            clock,
            catalog,
            completions: CompletionStore::in_memory(),
            archive: ArchiveStore::in_memory(),
            notifications: NotificationStateStore::in_memory(),
            rollover: RolloverManager::new(policy),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn now(&self) -> PrimitiveDateTime {
        self.clock.now()
    }

    pub fn today(&self) -> Weekday {
        self.now().weekday()
    }

    pub fn today_tasks(&self) -> &[Task] {
        self.catalog.tasks_for(self.today())
    }

    pub fn completions(&self) -> &CompletionMap {
        self.completions.as_map()
    }

    pub fn archive(&self) -> &ArchiveMap {
        self.archive.entries()
    }

    pub fn day_view(&self, weekday: Weekday) -> Result<DayView, AppError> {
        let tasks = self.catalog.tasks_for(weekday);
        let completions = self.completions.as_map();
        let rows = status::resolve_day(tasks, self.now(), completions)?
            .into_iter()
            .map(|resolved| TaskRow {
                task: resolved.task.clone(),
                status: resolved.status,
            })
            .collect();

        Ok(DayView {
            weekday: crate::model::weekday_name(weekday).to_string(),
            rows,
            progress: stats::day_progress(tasks, completions),
        })
    }

    pub fn current_task(&self) -> Result<Option<&Task>, AppError> {
        status::current_task(self.today_tasks(), self.now())
    }

    /// Only ids on today's list are accepted, so no stale key outlives the day.
    pub fn set_completion(&mut self, task_id: &str, completed: bool) -> Result<Task, AppError> {
        let task = self.require_today_task(task_id)?;
        self.completions.set_completion(&task.id, completed);
        tracing::debug!(task_id = %task.id, completed, "completion updated");
        Ok(task)
    }

    pub fn toggle_completion(&mut self, task_id: &str) -> Result<(Task, bool), AppError> {
        let task = self.require_today_task(task_id)?;
        let completed = self.completions.toggle(&task.id);
        Ok((task, completed))
    }

    /// Clears completions for today's list only. Returns how many entries were dropped.
    pub fn reset_today(&mut self) -> usize {
        let ids: Vec<String> = self
            .today_tasks()
            .iter()
            .filter(|task| self.completions.as_map().contains_key(&task.id))
            .map(|task| task.id.clone())
            .collect();
        self.completions.remove(ids.iter().map(String::as_str));
        ids.len()
    }

    pub fn reset_all(&mut self) {
        self.completions.clear_all();
    }

    pub fn notifications_enabled(&self) -> bool {
        self.notifications.state().enabled
    }

    /// Flags and the last notified id survive a disable/enable cycle.
    pub fn set_notifications_enabled(&mut self, enabled: bool) {
        self.notifications.update(|state| state.enabled = enabled);
    }

    /// One notification tick against today's list.
    pub fn tick(&mut self) -> Result<Vec<Alert>, AppError> {
        let now = self.now();
        let tasks = self.catalog.tasks_for(now.weekday());
        let mut next = self.notifications.state().clone();
        let alerts = scheduler::evaluate(&mut next, tasks, now)?;

        if next != *self.notifications.state() {
            self.notifications.update(|state| *state = next);
        }
        Ok(alerts)
    }

    /// Inside the midnight window with today's rollover still outstanding.
    pub fn rollover_pending(&self) -> bool {
        let now = self.now();
        self.rollover.is_boundary(now)
            && self.notifications.state().last_rollover != Some(now.date())
    }

    pub fn check_rollover(&mut self) -> Result<Option<RolloverOutcome>, AppError> {
        let now = self.now();
        self.rollover.check(
            now,
            &self.catalog,
            &mut self.completions,
            &mut self.archive,
            &mut self.notifications,
        )
    }

    pub fn summary(&self) -> Summary {
        stats::summarize(
            &self.catalog,
            self.completions.as_map(),
            self.archive.entries(),
        )
    }

    fn require_today_task(&self, task_id: &str) -> Result<Task, AppError> {
        let trimmed = task_id.trim();
        if trimmed.is_empty() {
            return Err(AppError::invalid_input("id is required"));
        }
        self.catalog
            .find_task(self.today(), trimmed)
            .cloned()
            .ok_or_else(|| AppError::invalid_input("task not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::Planner;
    use crate::clock::FixedClock;
    use crate::model::{AlertKind, ScheduleCatalog, TaskStatus, UpcomingMark};
    use crate::rollover::RolloverPolicy;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};
    use time::Duration;
    use time::macros::{date, datetime};

    // 2025-03-10 is a Monday.
    const SCHEDULE: &str = r#"{ "schedule": {
        "Monday": [
            { "id": "t1", "startTime": "09:00", "endTime": "09:30", "description": "Standup", "category": "Work" },
            { "id": "t2", "startTime": "10:00", "endTime": "11:00", "description": "Review", "category": "Work" }
        ],
        "Tuesday": [
            { "id": "tu1", "startTime": "08:00", "endTime": "08:30", "description": "Gym" }
        ]
    } }"#;

    fn temp_dir(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("dayplan-{nanos}-{name}"))
    }

    fn planner_at(now: time::PrimitiveDateTime) -> Planner<FixedClock> {
        Planner::in_memory(
            FixedClock::new(now),
            ScheduleCatalog::from_json_str(SCHEDULE).unwrap(),
            RolloverPolicy::default(),
        )
    }

    #[test]
    fn day_view_reports_statuses_and_progress() {
        let mut planner = planner_at(datetime!(2025-03-10 9:15));
        planner.set_completion("t2", true).unwrap();

        let view = planner.day_view(planner.today()).unwrap();

        assert_eq!(view.weekday, "Monday");
        assert_eq!(view.rows[0].status, TaskStatus::Current);
        assert_eq!(view.rows[1].status, TaskStatus::Completed);
        assert_eq!(view.progress.completed, 1);
        assert_eq!(view.progress.total, 2);
    }

    #[test]
    fn completion_rejects_ids_outside_today() {
        let mut planner = planner_at(datetime!(2025-03-10 9:15));

        let err = planner.set_completion("tu1", true).unwrap_err();
        assert_eq!(err.code(), "invalid_input");
        assert!(planner.completions().is_empty());

        let blank = planner.toggle_completion("  ").unwrap_err();
        assert_eq!(blank.message(), "id is required");
    }

    #[test]
    fn toggle_flips_completion() {
        let mut planner = planner_at(datetime!(2025-03-10 9:15));

        let (_, first) = planner.toggle_completion("t1").unwrap();
        let (_, second) = planner.toggle_completion("t1").unwrap();

        assert!(first);
        assert!(!second);
        assert_eq!(planner.completions().get("t1"), Some(&false));
    }

    #[test]
    fn reset_today_leaves_other_keys() {
        let mut planner = planner_at(datetime!(2025-03-10 9:15));
        planner.set_completion("t1", true).unwrap();
        planner.clock().set(datetime!(2025-03-11 8:10));
        planner.set_completion("tu1", true).unwrap();

        let removed = planner.reset_today();

        assert_eq!(removed, 1);
        assert_eq!(planner.completions().get("t1"), Some(&true));
        assert!(planner.completions().get("tu1").is_none());

        planner.reset_all();
        assert!(planner.completions().is_empty());
    }

    #[test]
    fn tick_respects_notification_toggle() {
        let mut planner = planner_at(datetime!(2025-03-10 9:00));
        assert!(planner.tick().unwrap().is_empty());

        planner.set_notifications_enabled(true);
        let alerts = planner.tick().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].kind, AlertKind::TaskStarted);

        planner.set_notifications_enabled(false);
        planner.clock().set(datetime!(2025-03-10 9:58:05));
        assert!(planner.tick().unwrap().is_empty());

        planner.set_notifications_enabled(true);
        let later = planner.tick().unwrap();
        assert_eq!(later.len(), 1);
        assert_eq!(later[0].kind, AlertKind::UpcomingTask(UpcomingMark::TwoMinutes));
        assert!(planner.tick().unwrap().is_empty());
    }

    #[test]
    fn midnight_rollover_archives_monday() {
        let mut planner = planner_at(datetime!(2025-03-10 9:15));
        planner.set_completion("t1", true).unwrap();
        planner.set_notifications_enabled(true);
        planner.tick().unwrap();

        planner.clock().set(datetime!(2025-03-11 0:00:00));
        let outcome = planner.check_rollover().unwrap().expect("rollover");
        planner.clock().advance(Duration::seconds(30));
        let again = planner.check_rollover().unwrap();

        assert_eq!(outcome.archived_date, date!(2025-03-10));
        assert!(again.is_none());
        assert_eq!(
            planner.archive()["2025-03-10"].get("t1"),
            Some(&true)
        );
        assert!(planner.completions().is_empty());
        assert!(planner.notifications_enabled());
    }

    #[test]
    fn rollover_pending_clears_once_rolled() {
        let mut planner = planner_at(datetime!(2025-03-10 23:59:59));
        assert!(!planner.rollover_pending());

        planner.clock().set(datetime!(2025-03-11 0:00:00));
        assert!(planner.rollover_pending());

        planner.check_rollover().unwrap().expect("rollover");
        assert!(!planner.rollover_pending());

        planner.clock().set(datetime!(2025-03-11 0:01:00));
        assert!(!planner.rollover_pending());
    }

    #[test]
    fn state_persists_across_reopen() {
        let dir = temp_dir("planner");
        let catalog = ScheduleCatalog::from_json_str(SCHEDULE).unwrap();
        {
            let mut planner = Planner::open(
                FixedClock::new(datetime!(2025-03-10 9:15)),
                catalog.clone(),
                &dir,
                RolloverPolicy::default(),
            );
            planner.set_completion("t1", true).unwrap();
            planner.set_notifications_enabled(true);
            planner.tick().unwrap();
        }

        let mut reopened = Planner::open(
            FixedClock::new(datetime!(2025-03-10 9:20)),
            catalog,
            &dir,
            RolloverPolicy::default(),
        );
        let alerts = reopened.tick().unwrap();
        let completed = reopened.completions().get("t1").copied();
        fs::remove_dir_all(&dir).ok();

        assert!(alerts.is_empty());
        assert_eq!(completed, Some(true));
        assert!(reopened.notifications_enabled());
    }
}
