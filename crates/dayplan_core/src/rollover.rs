use crate::error::AppError;
use crate::model::{Alert, CompletionMap, ScheduleCatalog};
use crate::storage::{ArchiveStore, CompletionStore, NotificationStateStore};
use time::{Date, PrimitiveDateTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RolloverPolicy {
    /// Minutes after midnight during which a poll still counts as the boundary.
    pub window_minutes: u8,
    /// Write an archive entry even when nothing was completed.
    pub archive_empty_days: bool,
}

impl Default for RolloverPolicy {
    fn default() -> Self {
        Self {
            window_minutes: 1,
            archive_empty_days: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverOutcome {
    pub archived_date: Date,
    pub snapshot: CompletionMap,
    pub archived: bool,
    pub persisted: bool,
    pub alert: Alert,
}

/// Archives yesterday's completions and resets the day once per date.
///
/// Armed until a poll lands in `[00:00, 00:00 + window)`. The date of the last rollover is
/// kept with the notification bookkeeping, so further polls inside the same window (or a
/// restart within it) do not run it again.
#[derive(Debug, Clone, Default)]
pub struct RolloverManager {
    policy: RolloverPolicy,
}

impl RolloverManager {
    pub fn new(policy: RolloverPolicy) -> Self {
        Self { policy }
    }

    pub fn is_boundary(&self, now: PrimitiveDateTime) -> bool {
        now.hour() == 0 && now.minute() < self.policy.window_minutes
    }

    pub fn check(
        &self,
        now: PrimitiveDateTime,
        catalog: &ScheduleCatalog,
        completions: &mut CompletionStore,
        archive: &mut ArchiveStore,
        notifications: &mut NotificationStateStore,
    ) -> Result<Option<RolloverOutcome>, AppError> {
        if !self.is_boundary(now) {
            return Ok(None);
        }

        let today = now.date();
        if notifications.state().last_rollover == Some(today) {
            tracing::debug!(%today, "rollover already done");
            return Ok(None);
        }

        self.roll(today, catalog, completions, archive, notifications)
            .map(Some)
    }

    fn roll(
        &self,
        today: Date,
        catalog: &ScheduleCatalog,
        completions: &mut CompletionStore,
        archive: &mut ArchiveStore,
        notifications: &mut NotificationStateStore,
    ) -> Result<RolloverOutcome, AppError> {
        let yesterday = today
            .previous_day()
            .ok_or_else(|| AppError::invalid_data("no calendar day before today"))?;

        let snapshot: CompletionMap = catalog
            .tasks_for(yesterday.weekday())
            .iter()
            .filter(|task| completions.get(&task.id))
            .map(|task| (task.id.clone(), true))
            .collect();

        let archived = self.policy.archive_empty_days || !snapshot.is_empty();
        let persisted = archived && archive.put(yesterday, snapshot.clone());

        completions.clear_all();
        notifications.update(|state| {
            state.reset_day();
            state.last_rollover = Some(today);
        });

        tracing::info!(
            date = %yesterday,
            completed = snapshot.len(),
            archived,
            persisted,
            "day rolled over"
        );

        Ok(RolloverOutcome {
            archived_date: yesterday,
            snapshot,
            archived,
            persisted,
            alert: Alert::new_day(),
        })
    }
}
