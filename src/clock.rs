//! Clock abstraction for date-dependent billing decisions
//!
//! Active-term resolution and rollover both depend on "today". The core
//! never reads the wall clock directly; it goes through this trait so
//! term-boundary behavior is deterministic under test.

use chrono::{Local, NaiveDate};

/// Source of the current date
pub trait Clock: Send + Sync {
    /// The current date, in local time
    fn today(&self) -> NaiveDate;
}

/// Wall-clock implementation used in production
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a fixed date
///
/// Used by tests and by the CLI's `--today` override to replay term
/// boundaries deterministically.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    date: NaiveDate,
}

impl FixedClock {
    /// Create a clock that always reports the given date
    pub fn new(date: NaiveDate) -> Self {
        FixedClock { date }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date
    }
}
