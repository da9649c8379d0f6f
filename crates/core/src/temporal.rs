//! Date predicates and the clinic clock.
//!
//! Due and overdue classification always compares calendar dates, never timestamps.
//! Timestamps keep full precision for attribution and tie-breaking only. The reference
//! date ("today") is always passed in explicitly; the [`Clock`] is the one place that
//! decides what today is.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;

/// Position of a date relative to a reference date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DateClass {
    Past,
    Today,
    Future,
}

/// Classify `subject` against `today`.
pub fn classify(subject: NaiveDate, today: NaiveDate) -> DateClass {
    match subject.cmp(&today) {
        std::cmp::Ordering::Less => DateClass::Past,
        std::cmp::Ordering::Equal => DateClass::Today,
        std::cmp::Ordering::Greater => DateClass::Future,
    }
}

/// A date is due once it is today or earlier.
pub fn is_due(subject: NaiveDate, today: NaiveDate) -> bool {
    classify(subject, today) != DateClass::Future
}

pub fn is_not_yet_due(subject: NaiveDate, today: NaiveDate) -> bool {
    !is_due(subject, today)
}

/// Source of the current instant and the clinic's calendar date.
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date of `at` in the clinic's timezone.
    fn date_of(&self, at: DateTime<Utc>) -> NaiveDate;

    fn today(&self) -> NaiveDate {
        self.date_of(self.now())
    }
}

/// Wall clock shifted into the clinic's fixed offset.
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    offset: FixedOffset,
}

impl SystemClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn date_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.with_timezone(&self.offset).date_naive()
    }
}

/// A clock frozen at one instant, in UTC.
#[derive(Clone, Copy, Debug)]
pub struct FixedClock {
    at: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at }
    }

    /// A clock at noon UTC on `date`.
    pub fn on(date: NaiveDate) -> Self {
        let at = date
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN).and_utc());
        Self { at }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }

    fn date_of(&self, at: DateTime<Utc>) -> NaiveDate {
        at.date_naive()
    }
}
