//! Clinical encounters: workups tied to a clinic session, and free-text followups.

use crate::ids::{ClinicDateId, FollowupId, LookupId, WorkupId};
use crate::models::NoteMeta;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A scheduled clinic session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicDate {
    pub id: ClinicDateId,
    pub clinic_type: LookupId,
    pub clinic_date: NaiveDate,
    /// Opaque identifier of the session in the external calendar.
    pub gcal_id: String,
}

impl PartialOrd for ClinicDate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClinicDate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.clinic_date, self.id).cmp(&(other.clinic_date, other.id))
    }
}

/// Free-text sections of a workup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkupNarrative {
    #[serde(default)]
    pub hpi: String,
    #[serde(default)]
    pub pmh_psh: String,
    #[serde(default)]
    pub meds: String,
    #[serde(default)]
    pub allergies: String,
    #[serde(default)]
    pub fam_hx: String,
    #[serde(default)]
    pub soc_hx: String,
    #[serde(default)]
    pub ros: String,
    #[serde(default)]
    pub pe: String,
    #[serde(default)]
    pub a_and_p: String,
}

/// A clinical encounter recorded during a clinic session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workup {
    pub id: WorkupId,
    #[serde(flatten)]
    pub note: NoteMeta,
    pub clinic_day: ClinicDateId,
    pub chief_complaint: String,
    pub diagnosis: String,
    #[serde(flatten)]
    pub narrative: WorkupNarrative,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewWorkup {
    pub clinic_day: ClinicDateId,
    pub chief_complaint: String,
    pub diagnosis: String,
    #[serde(flatten)]
    pub narrative: WorkupNarrative,
}

/// A free-text note written between clinic sessions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Followup {
    pub id: FollowupId,
    #[serde(flatten)]
    pub note: NoteMeta,
    pub text: String,
}

/// A record paired with the calendar date it happened on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Dated<T> {
    pub occurred_on: NaiveDate,
    #[serde(flatten)]
    pub record: T,
}

/// One entry in a patient's encounter history.
///
/// `occurred_on` is resolved when the timeline is built: a workup's clinic date, or the
/// calendar date of a followup's timestamp.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClinicalEncounter {
    Workup(Dated<Workup>),
    Followup(Dated<Followup>),
}

impl ClinicalEncounter {
    pub fn occurred_on(&self) -> NaiveDate {
        match self {
            ClinicalEncounter::Workup(entry) => entry.occurred_on,
            ClinicalEncounter::Followup(entry) => entry.occurred_on,
        }
    }

    pub fn written_datetime(&self) -> DateTime<Utc> {
        self.note().written_datetime
    }

    pub fn note(&self) -> &NoteMeta {
        match self {
            ClinicalEncounter::Workup(entry) => &entry.record.note,
            ClinicalEncounter::Followup(entry) => &entry.record.note,
        }
    }

    /// One-line description for list views.
    pub fn short_text(&self) -> &str {
        match self {
            ClinicalEncounter::Workup(entry) => &entry.record.chief_complaint,
            ClinicalEncounter::Followup(entry) => &entry.record.text,
        }
    }

    fn record_id(&self) -> u64 {
        match self {
            ClinicalEncounter::Workup(entry) => entry.record.id.get(),
            ClinicalEncounter::Followup(entry) => entry.record.id.get(),
        }
    }

    /// Total order used for the patient timeline: date, then timestamp, then id.
    pub fn timeline_key(&self) -> (NaiveDate, DateTime<Utc>, u64) {
        (self.occurred_on(), self.written_datetime(), self.record_id())
    }
}
