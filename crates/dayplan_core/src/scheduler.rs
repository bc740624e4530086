use crate::error::AppError;
use crate::model::{Alert, NotificationState, Task, UpcomingMark};
use crate::status;
use time::PrimitiveDateTime;

/// Decides which alerts a clock tick produces.
///
/// Re-evaluated on every tick while enabled. A start alert fires once per task because
/// `last_notified_task_id` is only ever overwritten by the next current task, never cleared
/// when a window ends. Upcoming alerts fire when minutes-until-start falls inside
/// `(1.9, 2.0]` or `(0.9, 1.0]`. Each window is six seconds wide, so one-second polling always
/// lands in it; the recorded mark suppresses the remaining ticks.
pub fn evaluate(
    state: &mut NotificationState,
    tasks: &[Task],
    now: PrimitiveDateTime,
) -> Result<Vec<Alert>, AppError> {
    if !state.enabled {
        return Ok(Vec::new());
    }

    let mut alerts = Vec::new();

    if let Some(task) = status::current_task(tasks, now)?
        && state.last_notified_task_id.as_deref() != Some(task.id.as_str())
    {
        tracing::debug!(task_id = %task.id, "task started");
        alerts.push(Alert::task_started(&task.id, &task.description));
        state.last_notified_task_id = Some(task.id.clone());
    }

    for task in tasks {
        let minutes_away = status::minutes_until_start(task, now)?;
        for mark in UpcomingMark::ALL {
            if mark.contains(minutes_away) && !state.upcoming_fired(&task.id, mark) {
                tracing::debug!(task_id = %task.id, minutes = mark.minutes(), "task upcoming");
                alerts.push(Alert::upcoming(mark, &task.id, &task.description));
                state.record_upcoming(&task.id, mark);
            }
        }
    }

    Ok(alerts)
}
