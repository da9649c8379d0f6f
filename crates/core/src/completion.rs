//! The "completable" capability.
//!
//! Follow-up obligations (action items and referral followup requests) are resolved by a
//! provider at a point in time. Each such record embeds a [`Completion`] and implements
//! [`Completable`]; records that also carry a due date implement [`Scheduled`] and can be
//! classified with [`due_state`].
//!
//! `done` holds exactly when `completion_date` is set. Marking done sets the timestamp and the
//! resolver together; clearing resets both. Nothing here persists anything: callers write the
//! mutated record back inside the same unit of work.

use crate::ids::ProviderId;
use crate::temporal::is_due;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Resolution fields shared by every completable record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    pub completion_date: Option<DateTime<Utc>>,
    pub completion_author: Option<ProviderId>,
}

/// What a completion call actually changed.
///
/// Overwriting an existing resolution and clearing an open record are tolerated, but callers
/// may want to log them as probable misuse.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Resolved,
    Overwritten,
    Cleared,
    AlreadyOpen,
}

impl Transition {
    pub fn is_suspicious(self) -> bool {
        matches!(self, Transition::Overwritten | Transition::AlreadyOpen)
    }
}

impl Completion {
    pub fn mark_done(&mut self, resolver: ProviderId, at: DateTime<Utc>) -> Transition {
        let was_done = self.is_done();
        self.completion_date = Some(at);
        self.completion_author = Some(resolver);
        if was_done {
            Transition::Overwritten
        } else {
            Transition::Resolved
        }
    }

    pub fn clear_done(&mut self) -> Transition {
        let was_done = self.is_done();
        self.completion_date = None;
        self.completion_author = None;
        if was_done {
            Transition::Cleared
        } else {
            Transition::AlreadyOpen
        }
    }

    pub fn is_done(&self) -> bool {
        self.completion_date.is_some()
    }
}

/// A record that embeds a [`Completion`].
pub trait Completable {
    fn completion(&self) -> &Completion;

    fn completion_mut(&mut self) -> &mut Completion;

    fn mark_done(&mut self, resolver: ProviderId, at: DateTime<Utc>) -> Transition {
        self.completion_mut().mark_done(resolver, at)
    }

    fn clear_done(&mut self) -> Transition {
        self.completion_mut().clear_done()
    }

    fn is_done(&self) -> bool {
        self.completion().is_done()
    }
}

/// A record with a due date.
pub trait Scheduled {
    fn due_date(&self) -> NaiveDate;
}

/// Where a scheduled, completable record stands on a given day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DueState {
    /// Not done and due today or earlier.
    Active,
    /// Not done and due after today.
    Inactive,
    Done,
}

pub fn due_state<T: Completable + Scheduled>(item: &T, today: NaiveDate) -> DueState {
    if item.is_done() {
        DueState::Done
    } else if is_due(item.due_date(), today) {
        DueState::Active
    } else {
        DueState::Inactive
    }
}

pub fn done<'a, T, I>(items: I) -> impl Iterator<Item = &'a T>
where
    T: Completable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items.into_iter().filter(|item| item.is_done())
}

pub fn not_done<'a, T, I>(items: I) -> impl Iterator<Item = &'a T>
where
    T: Completable + 'a,
    I: IntoIterator<Item = &'a T>,
{
    items.into_iter().filter(|item| !item.is_done())
}
