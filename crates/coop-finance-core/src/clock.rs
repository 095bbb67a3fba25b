use chrono::{DateTime, NaiveDate, Utc};

/// Time source for "now" and date arithmetic, injected so operations stay
/// deterministic under test.
pub trait Clock {
    fn today(&self) -> NaiveDate;
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Utc::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant, for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0.date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
