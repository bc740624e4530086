use crate::error::AppError;
use crate::model::{CompletionMap, Task, TaskStatus, TemporalStatus};
use time::PrimitiveDateTime;

/// `current` iff `start <= now < end`, against same-day instants.
pub fn classify(task: &Task, now: PrimitiveDateTime) -> Result<TemporalStatus, AppError> {
    let start = now.replace_time(task.start()?);
    let end = now.replace_time(task.end()?);

    if now >= end {
        Ok(TemporalStatus::Past)
    } else if now >= start {
        Ok(TemporalStatus::Current)
    } else {
        Ok(TemporalStatus::Future)
    }
}

pub fn resolve(task: &Task, now: PrimitiveDateTime, completed: bool) -> Result<TaskStatus, AppError> {
    let temporal = classify(task, now)?;
    if completed {
        Ok(TaskStatus::Completed)
    } else {
        Ok(temporal.into())
    }
}

/// First task in list order whose window contains `now`.
pub fn current_task(tasks: &[Task], now: PrimitiveDateTime) -> Result<Option<&Task>, AppError> {
    for task in tasks {
        if classify(task, now)? == TemporalStatus::Current {
            return Ok(Some(task));
        }
    }
    Ok(None)
}

/// Minutes from `now` until the task starts today; negative once started.
pub fn minutes_until_start(task: &Task, now: PrimitiveDateTime) -> Result<f64, AppError> {
    let start = now.replace_time(task.start()?);
    Ok((start - now).as_seconds_f64() / 60.0)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTask<'a> {
    pub task: &'a Task,
    pub status: TaskStatus,
}

pub fn resolve_day<'a>(
    tasks: &'a [Task],
    now: PrimitiveDateTime,
    completions: &CompletionMap,
) -> Result<Vec<ResolvedTask<'a>>, AppError> {
    tasks
        .iter()
        .map(|task| {
            let completed = completions.get(&task.id).copied().unwrap_or(false);
            Ok(ResolvedTask {
                task,
                status: resolve(task, now, completed)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{classify, current_task, minutes_until_start, resolve, resolve_day};
    use crate::model::{CompletionMap, Task, TaskStatus, TemporalStatus};
    use time::Duration;
    use time::macros::datetime;

    fn task(id: &str, start: &str, end: &str) -> Task {
        Task {
            id: id.to_string(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            description: format!("task {id}"),
            category: None,
        }
    }

    #[test]
    fn classifies_around_the_window() {
        let t1 = task("t1", "09:00", "09:30");

        assert_eq!(
            classify(&t1, datetime!(2025-03-10 9:15)).unwrap(),
            TemporalStatus::Current
        );
        assert_eq!(
            classify(&t1, datetime!(2025-03-10 9:30)).unwrap(),
            TemporalStatus::Past
        );
        assert_eq!(
            classify(&t1, datetime!(2025-03-10 8:59)).unwrap(),
            TemporalStatus::Future
        );
        assert_eq!(
            classify(&t1, datetime!(2025-03-10 9:00)).unwrap(),
            TemporalStatus::Current
        );
    }

    #[test]
    fn classification_is_monotonic_over_the_day() {
        let t1 = task("t1", "09:00", "09:30");
        let mut now = datetime!(2025-03-10 0:00);
        let mut last = TemporalStatus::Future;

        while now.date() == datetime!(2025-03-10 0:00).date() {
            let status = classify(&t1, now).unwrap();
            let rank = |s: TemporalStatus| match s {
                TemporalStatus::Future => 0,
                TemporalStatus::Current => 1,
                TemporalStatus::Past => 2,
            };
            assert!(rank(status) >= rank(last), "went backwards at {now}");
            last = status;
            now += Duration::minutes(7);
        }
        assert_eq!(last, TemporalStatus::Past);
    }

    #[test]
    fn completion_overrides_display_status() {
        let t1 = task("t1", "09:00", "09:30");
        let now = datetime!(2025-03-10 8:00);

        assert_eq!(resolve(&t1, now, true).unwrap(), TaskStatus::Completed);
        assert_eq!(resolve(&t1, now, false).unwrap(), TaskStatus::Future);
    }

    #[test]
    fn malformed_time_fails_fast() {
        let bad = task("bad", "9h", "10:00");
        let err = classify(&bad, datetime!(2025-03-10 9:15)).unwrap_err();
        assert_eq!(err.code(), "invalid_time");
    }

    #[test]
    fn current_task_picks_first_match() {
        let tasks = vec![
            task("a", "08:00", "09:00"),
            task("b", "09:00", "10:00"),
            task("c", "09:30", "10:30"),
        ];

        let now = datetime!(2025-03-10 9:45);
        assert_eq!(current_task(&tasks, now).unwrap().map(|t| t.id.as_str()), Some("b"));
        assert!(current_task(&tasks, datetime!(2025-03-10 11:00)).unwrap().is_none());
    }

    #[test]
    fn minutes_until_start_is_fractional() {
        let t = task("t", "10:00", "10:30");
        let minutes = minutes_until_start(&t, datetime!(2025-03-10 9:58:05)).unwrap();
        assert!((minutes - 115.0 / 60.0).abs() < 1e-9);
        assert!(minutes_until_start(&t, datetime!(2025-03-10 10:05)).unwrap() < 0.0);
    }

    #[test]
    fn resolve_day_uses_completion_map() {
        let tasks = vec![task("a", "08:00", "09:00"), task("b", "09:00", "10:00")];
        let mut completions = CompletionMap::new();
        completions.insert("a".to_string(), true);
        completions.insert("b".to_string(), false);

        let resolved = resolve_day(&tasks, datetime!(2025-03-10 9:10), &completions).unwrap();
        assert_eq!(resolved[0].status, TaskStatus::Completed);
        assert_eq!(resolved[1].status, TaskStatus::Current);
    }
}
