use crate::completion::{Completable, Completion, Scheduled};
use crate::constants::ATTRIBUTION_DATE_FORMAT;
use crate::ids::{ActionItemId, LookupId};
use crate::models::NoteMeta;
use crate::temporal::Clock;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A scheduled follow-up obligation for a patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub id: ActionItemId,
    #[serde(flatten)]
    pub note: NoteMeta,
    pub due_date: NaiveDate,
    pub instruction: LookupId,
    pub comments: String,
    #[serde(flatten)]
    pub completion: Completion,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewActionItem {
    pub due_date: NaiveDate,
    pub instruction: LookupId,
    #[serde(default)]
    pub comments: String,
}

impl ActionItem {
    /// Who last touched this item and when, for display next to it.
    ///
    /// `completer` is only used when the item is done. Dates are the clinic's calendar dates
    /// according to `clock`.
    pub fn attribution(
        &self,
        author: &str,
        completer: Option<&str>,
        clock: &dyn Clock,
    ) -> String {
        let day = |at: DateTime<Utc>| clock.date_of(at).format(ATTRIBUTION_DATE_FORMAT);
        match (self.completion.completion_date, completer) {
            (Some(done_at), Some(completer)) => {
                format!("Marked done by {} on {}", completer, day(done_at))
            }
            (Some(done_at), None) => format!("Marked done on {}", day(done_at)),
            (None, _) => format!("Added by {} on {}", author, day(self.note.written_datetime)),
        }
    }
}

impl Completable for ActionItem {
    fn completion(&self) -> &Completion {
        &self.completion
    }

    fn completion_mut(&mut self) -> &mut Completion {
        &mut self.completion
    }
}

impl Scheduled for ActionItem {
    fn due_date(&self) -> NaiveDate {
        self.due_date
    }
}
