//! # Patient Tracker Core
//!
//! Core business logic for the volunteer clinic patient tracker.
//!
//! This crate contains pure data operations:
//! - Temporal predicates and the clinic clock
//! - The completion capability shared by action items and followup requests
//! - Per-patient obligation scheduling (active / inactive / done)
//! - The referral contact workflow and attempt summaries
//! - The patient roster query engine
//! - Record storage with unit-of-work writes, in memory or as a JSON snapshot
//!
//! **No API concerns**: HTTP servers, command line parsing and authentication belong in
//! `api-rest` and `pttrack-cli`. Callers hand in an already-resolved provider id wherever a
//! note is written or resolved.

pub mod author;
pub mod completion;
pub mod config;
pub mod constants;
pub mod contact;
pub mod error;
pub mod ids;
pub mod models;
pub mod reference;
pub mod repositories;
pub mod roster;
pub mod scheduler;
pub mod store;
pub mod temporal;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use author::Author;
pub use completion::{Completable, Completion, DueState, Scheduled, Transition};
pub use config::{utc_offset_from_env_value, CoreConfig};
pub use constants::DEFAULT_PATIENT_DATA_DIR;
pub use error::{ClinicError, ClinicResult};
pub use ids::{
    ActionItemId, ClinicDateId, FollowupId, FollowupRequestId, LookupId, PatientContactId,
    PatientId, ProviderId, RecordKind, ReferralId, WorkupId,
};
pub use pttrack_types::{NonEmptyText, TextError, ZipCode};
pub use reference::{LookupKind, ReferenceData};
pub use repositories::shared::ClinicContext;
pub use roster::{PatientSummary, RosterFilter, RosterQuery, RosterSort};
pub use store::{ClinicData, ClinicStore};
pub use temporal::{Clock, FixedClock, SystemClock};
