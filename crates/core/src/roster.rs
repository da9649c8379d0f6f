//! Patient roster query engine.
//!
//! A roster query takes an optional sort and an optional filter, both named on the wire:
//!
//! | parameter | values |
//! |---|---|
//! | `sort` | `last_name` (default), `latest_workup` (alias `latest_clinical_activity`) |
//! | `filter` | `unsigned_workup`, `active`, `ai_active`, `ai_inactive` |
//!
//! Unknown values are rejected. For each patient the engine gathers [`PatientFacts`]
//! (latest workup, history timestamp, open action item counts), filters on them, sorts
//! them into a total order and renders one [`PatientSummary`] per patient.
//!
//! `unsigned_workup` matches every patient with at least one workup. Workups carry no
//! signature, so "unsigned" cannot be told apart from "any".

use crate::ids::{ClinicDateId, PatientId, WorkupId};
use crate::models::{ClinicDate, Patient, Workup};
use crate::reference::LookupKind;
use crate::scheduler::action_item_sets;
use crate::store::ClinicData;
use crate::temporal::Clock;
use crate::{ClinicError, ClinicResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::str::FromStr;

// ============================================================================
// QUERY PARAMETERS
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterSort {
    #[default]
    LastName,
    /// Most recent clinical activity first.
    LatestWorkup,
}

impl FromStr for RosterSort {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "last_name" => Ok(RosterSort::LastName),
            "latest_workup" | "latest_clinical_activity" => Ok(RosterSort::LatestWorkup),
            other => Err(ClinicError::UnsupportedSort(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterFilter {
    UnsignedWorkup,
    Active,
    AiActive,
    AiInactive,
}

impl FromStr for RosterFilter {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unsigned_workup" => Ok(RosterFilter::UnsignedWorkup),
            "active" => Ok(RosterFilter::Active),
            "ai_active" => Ok(RosterFilter::AiActive),
            "ai_inactive" => Ok(RosterFilter::AiInactive),
            other => Err(ClinicError::UnsupportedFilter(other.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RosterQuery {
    pub sort: RosterSort,
    pub filter: Option<RosterFilter>,
}

impl RosterQuery {
    /// Build a query from raw request parameters. Absent or blank values mean "not given".
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::UnsupportedSort` or `ClinicError::UnsupportedFilter` for any
    /// other unrecognised value.
    pub fn from_params(sort: Option<&str>, filter: Option<&str>) -> ClinicResult<Self> {
        fn given(value: Option<&str>) -> Option<&str> {
            value.map(str::trim).filter(|v| !v.is_empty())
        }

        let sort = match given(sort) {
            Some(value) => value.parse()?,
            None => RosterSort::default(),
        };
        let filter = given(filter).map(str::parse).transpose()?;
        Ok(Self { sort, filter })
    }
}

// ============================================================================
// PER-PATIENT FACTS
// ============================================================================

/// Position of a patient's latest clinical activity in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct ActivityKey {
    pub date: NaiveDate,
    pub at: DateTime<Utc>,
}

/// Derived state the roster filters and sorts on.
#[derive(Clone, Debug)]
pub struct PatientFacts<'a> {
    pub patient: &'a Patient,
    pub workup_count: usize,
    pub latest_workup: Option<(&'a Workup, &'a ClinicDate)>,
    /// Most recent of the intake timestamp and any followup's timestamp.
    pub history: DateTime<Utc>,
    pub active_action_items: usize,
    pub inactive_action_items: usize,
}

impl<'a> PatientFacts<'a> {
    /// Gather the facts for `patient` as of `today`.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::NotFound` if a workup names a clinic date that does not exist.
    pub fn gather(
        data: &'a ClinicData,
        patient: &'a Patient,
        today: NaiveDate,
    ) -> ClinicResult<Self> {
        let mut workup_count = 0;
        let mut latest_workup: Option<(&Workup, &ClinicDate)> = None;
        for workup in data.workups_for(patient.id) {
            workup_count += 1;
            let clinic_day = data.clinic_date(workup.clinic_day)?;
            let newer = match latest_workup {
                None => true,
                Some((best, best_day)) => {
                    (clinic_day.clinic_date, workup.note.written_datetime, workup.id)
                        > (best_day.clinic_date, best.note.written_datetime, best.id)
                }
            };
            if newer {
                latest_workup = Some((workup, clinic_day));
            }
        }

        let history = data
            .followups_for(patient.id)
            .map(|followup| followup.note.written_datetime)
            .fold(patient.intake_datetime, |latest, at| latest.max(at));

        let items = action_item_sets(data, patient.id, today);

        Ok(Self {
            patient,
            workup_count,
            latest_workup,
            history,
            active_action_items: items.active.len(),
            inactive_action_items: items.inactive.len(),
        })
    }

    /// The latest workup's clinic date and timestamp, or else the history timestamp.
    pub fn activity_key(&self, clock: &dyn Clock) -> ActivityKey {
        match self.latest_workup {
            Some((workup, clinic_day)) => ActivityKey {
                date: clinic_day.clinic_date,
                at: workup.note.written_datetime,
            },
            None => ActivityKey {
                date: clock.date_of(self.history),
                at: self.history,
            },
        }
    }

    pub fn matches(&self, filter: RosterFilter) -> bool {
        match filter {
            RosterFilter::UnsignedWorkup => self.workup_count > 0,
            RosterFilter::Active => self.patient.needs_workup,
            RosterFilter::AiActive => self.active_action_items > 0,
            RosterFilter::AiInactive => self.inactive_action_items > 0,
        }
    }

    fn summarize(&self, data: &ClinicData) -> ClinicResult<PatientSummary> {
        let patient = self.patient;
        let latest_workup = match self.latest_workup {
            Some((workup, clinic_day)) => Some(WorkupSummary {
                id: workup.id,
                chief_complaint: workup.chief_complaint.clone(),
                diagnosis: workup.diagnosis.clone(),
                clinic_day: ClinicDaySummary {
                    id: clinic_day.id,
                    clinic_type: data
                        .reference
                        .require(LookupKind::ClinicType, clinic_day.clinic_type)?
                        .to_string(),
                    clinic_date: clinic_day.clinic_date,
                },
            }),
            None => None,
        };

        Ok(PatientSummary {
            id: patient.id,
            first_name: patient.name.first_name.to_string(),
            middle_name: patient.name.middle_name.clone(),
            last_name: patient.name.last_name.to_string(),
            name: patient.display_name(),
            needs_workup: patient.needs_workup,
            latest_workup,
            history: HistorySummary {
                last: HistoryEntry {
                    history_date: self.history,
                },
            },
            active_action_items: self.active_action_items,
            inactive_action_items: self.inactive_action_items,
        })
    }
}

// ============================================================================
// SUMMARY RECORDS
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClinicDaySummary {
    pub id: ClinicDateId,
    pub clinic_type: String,
    pub clinic_date: NaiveDate,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WorkupSummary {
    pub id: WorkupId,
    pub chief_complaint: String,
    pub diagnosis: String,
    pub clinic_day: ClinicDaySummary,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub history_date: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistorySummary {
    pub last: HistoryEntry,
}

/// One row of the roster.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PatientSummary {
    pub id: PatientId,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub name: String,
    /// The stored active flag.
    pub needs_workup: bool,
    pub latest_workup: Option<WorkupSummary>,
    pub history: HistorySummary,
    pub active_action_items: usize,
    pub inactive_action_items: usize,
}

// ============================================================================
// ENGINE
// ============================================================================

fn by_last_name(a: &PatientFacts<'_>, b: &PatientFacts<'_>) -> Ordering {
    let (a_name, b_name) = (&a.patient.name, &b.patient.name);
    (a_name.last_name.as_str(), a_name.first_name.as_str(), a.patient.id).cmp(&(
        b_name.last_name.as_str(),
        b_name.first_name.as_str(),
        b.patient.id,
    ))
}

/// Run `query` over every patient in `data`.
///
/// `today` drives the action item counts; `clock` converts history timestamps into clinic
/// dates for patients without a workup.
///
/// # Errors
///
/// Returns a referential error if a stored record points at a missing clinic date or
/// clinic type.
pub fn run(
    data: &ClinicData,
    query: RosterQuery,
    today: NaiveDate,
    clock: &dyn Clock,
) -> ClinicResult<Vec<PatientSummary>> {
    let mut rows = Vec::new();
    for patient in data.patients() {
        let facts = PatientFacts::gather(data, patient, today)?;
        if query.filter.map_or(true, |filter| facts.matches(filter)) {
            rows.push(facts);
        }
    }

    match query.sort {
        RosterSort::LastName => rows.sort_by(by_last_name),
        RosterSort::LatestWorkup => {
            let mut keyed: Vec<(ActivityKey, PatientFacts<'_>)> = rows
                .into_iter()
                .map(|facts| (facts.activity_key(clock), facts))
                .collect();
            keyed.sort_by(|(a_key, a), (b_key, b)| {
                b_key.cmp(a_key).then(a.patient.id.cmp(&b.patient.id))
            });
            rows = keyed.into_iter().map(|(_, facts)| facts).collect();
        }
    }

    tracing::debug!("roster query {:?} matched {} patients", query, rows.len());

    rows.iter().map(|facts| facts.summarize(data)).collect()
}
