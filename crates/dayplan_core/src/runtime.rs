use crate::clock::Clock;
use crate::error::AppError;
use crate::model::Alert;
use crate::notify::{self, Notifier};
use crate::planner::Planner;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub tick_interval: Duration,
    pub rollover_poll_interval: Duration,
    pub max_ticks: Option<u64>,
}

impl WatchOptions {
    /// Rollover is polled on every n-th tick; never less often than once per tick.
    pub fn rollover_every(&self) -> u64 {
        let tick = self.tick_interval.as_millis().max(1);
        let ticks = self.rollover_poll_interval.as_millis() / tick;
        u64::try_from(ticks).unwrap_or(u64::MAX).max(1)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchReport {
    pub ticks: u64,
    pub alerts: u64,
    pub rollovers: u64,
}

/// Cooperative timer loop: the fast tick drives notifications, the slow one drives rollover.
///
/// Rollover runs first when both are due so the new day starts from reset state. Inside the
/// midnight window it is checked on every tick until it has run, so no alert is evaluated
/// against the new date before the reset.
pub fn watch<C: Clock>(
    planner: &mut Planner<C>,
    notifier: &dyn Notifier,
    options: WatchOptions,
    in_app: &mut dyn FnMut(&Alert),
) -> Result<WatchReport, AppError> {
    let rollover_every = options.rollover_every();
    let mut report = WatchReport::default();

    tracing::info!(
        tick_ms = options.tick_interval.as_millis() as u64,
        rollover_every,
        "watching schedule"
    );

    loop {
        if options.max_ticks.is_some_and(|max| report.ticks >= max) {
            break;
        }

        if (report.ticks % rollover_every == 0 || planner.rollover_pending())
            && let Some(outcome) = planner.check_rollover()?
        {
            report.rollovers += 1;
            report.alerts += 1;
            notify::dispatch(std::slice::from_ref(&outcome.alert), notifier, in_app);
        }

        let alerts = planner.tick()?;
        report.alerts += alerts.len() as u64;
        notify::dispatch(&alerts, notifier, in_app);

        report.ticks += 1;
        planner.clock().wait(options.tick_interval);
    }

    Ok(report)
}
