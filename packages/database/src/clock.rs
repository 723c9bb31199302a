//! Time source for "today" and "this month".
//!
//! The store never reads the system clock directly. It asks a [`Calendar`],
//! which combines an injected [`Clock`] with the configured UTC offset, so
//! tests can pin the current date.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset as _, Utc};
use waste_tracker_database_models::MonthKey;

/// A source of the current instant.
pub trait Clock: Send + Sync {
    /// Returns the current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// The host's wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    /// Freezes the clock at `instant`.
    #[must_use]
    pub const fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Freezes the clock at midnight UTC of `date`.
    #[must_use]
    pub fn at_date(date: NaiveDate) -> Self {
        Self(date.and_time(NaiveTime::MIN).and_utc())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A clock viewed through a fixed UTC offset.
#[derive(Clone)]
pub struct Calendar {
    clock: Arc<dyn Clock>,
    offset: FixedOffset,
}

impl Calendar {
    /// Creates a calendar from an explicit clock and offset.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, offset: FixedOffset) -> Self {
        Self { clock, offset }
    }

    /// The system clock at the given offset.
    #[must_use]
    pub fn system(offset: FixedOffset) -> Self {
        Self::new(Arc::new(SystemClock), offset)
    }

    /// A calendar whose "today" is always `date` (UTC).
    #[must_use]
    pub fn fixed(date: NaiveDate) -> Self {
        Self::new(Arc::new(FixedClock::at_date(date)), Utc.fix())
    }

    /// The configured UTC offset.
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Today's date at the configured offset.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.now().with_timezone(&self.offset).date_naive()
    }

    /// The month containing [`Self::today`].
    #[must_use]
    pub fn current_month(&self) -> MonthKey {
        MonthKey::of(self.today())
    }
}

impl std::fmt::Debug for Calendar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Calendar")
            .field("now", &self.clock.now())
            .field("offset", &self.offset)
            .finish()
    }
}
