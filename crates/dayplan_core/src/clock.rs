use crate::error::AppError;
use std::cell::Cell;
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Sole source of wall-clock time for every derived state.
pub trait Clock {
    fn now(&self) -> PrimitiveDateTime;

    /// Blocks until `interval` has passed on this clock.
    fn wait(&self, interval: std::time::Duration);
}

/// Local wall clock. Falls back to UTC when the local offset is unknown.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> PrimitiveDateTime {
        let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
        let now = OffsetDateTime::now_utc().to_offset(offset);
        PrimitiveDateTime::new(now.date(), now.time())
    }

    fn wait(&self, interval: std::time::Duration) {
        std::thread::sleep(interval);
    }
}

/// Manually driven clock for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
    now: Cell<PrimitiveDateTime>,
}

impl FixedClock {
    pub fn new(now: PrimitiveDateTime) -> Self {
        Self {
            now: Cell::new(now),
        }
    }

    pub fn set(&self, now: PrimitiveDateTime) {
        self.now.set(now);
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> PrimitiveDateTime {
        self.now.get()
    }

    /// Advances instead of sleeping, so replays run at full speed.
    fn wait(&self, interval: std::time::Duration) {
        let step = Duration::try_from(interval).unwrap_or(Duration::MAX);
        self.advance(step);
    }
}

/// Parses `YYYY-MM-DD HH:MM` or `YYYY-MM-DD HH:MM:SS` as local wall time.
pub fn parse_local_datetime(raw: &str) -> Result<PrimitiveDateTime, AppError> {
    let trimmed = raw.trim();
    PrimitiveDateTime::parse(
        trimmed,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
    )
    .or_else(|_| {
        PrimitiveDateTime::parse(
            trimmed,
            format_description!("[year]-[month]-[day] [hour]:[minute]"),
        )
    })
    .map_err(|_| {
        AppError::invalid_input("datetime must be YYYY-MM-DD HH:MM or YYYY-MM-DD HH:MM:SS")
    })
}
