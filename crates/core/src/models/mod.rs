//! Record types owned by the store.
//!
//! A [`Patient`] is the aggregation root: every note (action item, workup, followup, referral,
//! followup request, patient contact) names exactly one patient through its [`NoteMeta`].

pub mod action_item;
pub mod encounter;
pub mod note;
pub mod patient;
pub mod person;
pub mod referral;

pub use action_item::{ActionItem, NewActionItem};
pub use encounter::{
    ClinicDate, ClinicalEncounter, Dated, Followup, NewWorkup, Workup, WorkupNarrative,
};
pub use note::NoteMeta;
pub use patient::{NewPatient, NewProvider, Patient, Provider};
pub use person::PersonName;
pub use referral::{
    Answer, FollowupRequest, NewFollowupRequest, NewPatientContact, NewReferral, PatientContact,
    Referral, ReferralStatus,
};
