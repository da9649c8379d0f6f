//! Per-patient obligation sets.
//!
//! Action items and followup requests are split three ways against an explicit `today`:
//!
//! - **active**: not done and due on or before today, by due date
//! - **inactive**: not done and due after today, by due date
//! - **done**: resolved, by completion timestamp
//!
//! Every obligation lands in exactly one set. Sorting is stable, so obligations with equal
//! keys keep their input order; callers pass them in id order.

use crate::completion::{due_state, Completable, DueState, Scheduled};
use crate::ids::PatientId;
use crate::models::{ActionItem, FollowupRequest};
use crate::store::ClinicData;
use chrono::NaiveDate;
use serde::Serialize;

/// Obligations partitioned by [`DueState`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ObligationSets<T> {
    pub active: Vec<T>,
    pub inactive: Vec<T>,
    pub done: Vec<T>,
}

impl<T> Default for ObligationSets<T> {
    fn default() -> Self {
        Self {
            active: Vec::new(),
            inactive: Vec::new(),
            done: Vec::new(),
        }
    }
}

impl<T> ObligationSets<T> {
    pub fn len(&self) -> usize {
        self.active.len() + self.inactive.len() + self.done.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Transform every member while keeping set membership and order.
    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> ObligationSets<U> {
        ObligationSets {
            active: self.active.into_iter().map(&mut f).collect(),
            inactive: self.inactive.into_iter().map(&mut f).collect(),
            done: self.done.into_iter().map(&mut f).collect(),
        }
    }
}

/// Partition `items` as of `today`.
pub fn partition<'a, T, I>(items: I, today: NaiveDate) -> ObligationSets<&'a T>
where
    T: Completable + Scheduled + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut sets = ObligationSets::default();
    for item in items {
        match due_state(item, today) {
            DueState::Active => sets.active.push(item),
            DueState::Inactive => sets.inactive.push(item),
            DueState::Done => sets.done.push(item),
        }
    }

    sets.active.sort_by_key(|item| item.due_date());
    sets.inactive.sort_by_key(|item| item.due_date());
    sets.done.sort_by_key(|item| item.completion().completion_date);
    sets
}

pub fn action_item_sets(
    data: &ClinicData,
    patient: PatientId,
    today: NaiveDate,
) -> ObligationSets<&ActionItem> {
    let sets = partition(data.action_items_for(patient), today);
    tracing::debug!(
        "patient {patient}: {} active, {} inactive, {} done action items",
        sets.active.len(),
        sets.inactive.len(),
        sets.done.len()
    );
    sets
}

pub fn followup_request_sets(
    data: &ClinicData,
    patient: PatientId,
    today: NaiveDate,
) -> ObligationSets<&FollowupRequest> {
    partition(data.followup_requests_for(patient), today)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::Completion;
    use crate::ids::{ActionItemId, LookupId, ProviderId};
    use crate::models::NoteMeta;
    use chrono::{Duration, TimeZone, Utc};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn item(id: u64, due_offset: i64) -> ActionItem {
        ActionItem {
            id: ActionItemId(id),
            note: NoteMeta {
                author: ProviderId(1),
                author_type: LookupId(1),
                patient: PatientId(1),
                written_datetime: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            },
            due_date: today() + Duration::days(due_offset),
            instruction: LookupId(1),
            comments: String::new(),
            completion: Completion::default(),
        }
    }

    fn ids(items: &[&ActionItem]) -> Vec<u64> {
        items.iter().map(|i| i.id.get()).collect()
    }

    #[test]
    fn partition_is_exhaustive_and_exclusive() {
        let mut items: Vec<ActionItem> = (-3..=3).map(|d| item((d + 10) as u64, d)).collect();
        items[1].mark_done(ProviderId(2), Utc::now());
        items[5].mark_done(ProviderId(2), Utc::now());

        let sets = partition(&items, today());
        assert_eq!(sets.len(), items.len());
        for item in &items {
            let memberships = [&sets.active, &sets.inactive, &sets.done]
                .iter()
                .filter(|set| set.iter().any(|i| i.id == item.id))
                .count();
            assert_eq!(memberships, 1, "item {} in {memberships} sets", item.id);
        }
        assert_eq!(ids(&sets.active), vec![7, 9, 10]);
        assert_eq!(ids(&sets.inactive), vec![11, 13]);
    }

    #[test]
    fn open_sets_sort_by_due_date_then_input_order() {
        let items = vec![item(1, 5), item(2, -1), item(3, 2), item(4, -8), item(5, -1)];
        let sets = partition(&items, today());
        assert_eq!(ids(&sets.active), vec![4, 2, 5]);
        assert_eq!(ids(&sets.inactive), vec![3, 1]);
    }

    #[test]
    fn done_set_sorts_by_completion_time() {
        let mut items = vec![item(1, 0), item(2, 0), item(3, 0)];
        let at = |h| Utc.with_ymd_and_hms(2024, 3, 9, h, 0, 0).unwrap();
        items[0].mark_done(ProviderId(1), at(15));
        items[1].mark_done(ProviderId(1), at(8));
        items[2].mark_done(ProviderId(1), at(11));

        let sets = partition(&items, today());
        assert_eq!(ids(&sets.done), vec![2, 3, 1]);
        assert!(sets.active.is_empty() && sets.inactive.is_empty());
    }

    #[test]
    fn day_boundaries() {
        let items = vec![item(1, 1), item(2, -1), item(3, 0)];
        let sets = partition(&items, today());
        assert_eq!(ids(&sets.inactive), vec![1]);
        assert_eq!(ids(&sets.active), vec![2, 3]);
    }

    #[test]
    fn clearing_done_returns_item_to_open_sets() {
        let mut items = vec![item(1, -1)];
        items[0].mark_done(ProviderId(1), Utc::now());
        assert_eq!(partition(&items, today()).done.len(), 1);

        items[0].clear_done();
        let sets = partition(&items, today());
        assert_eq!(ids(&sets.active), vec![1]);
        assert!(sets.done.is_empty());
    }
}
