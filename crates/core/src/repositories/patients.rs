//! Patient intake, the active flag, and the patient chart.
//!
//! The chart is one aggregate read of everything recorded about a patient:
//!
//! - the patient record with display name, age and gender label
//! - action items split into active / inactive / done with attribution text
//! - followup requests split the same way
//! - the encounter timeline (workups and followups merged)
//! - each referral with its followup requests and contact attempt summaries

use crate::ids::{PatientId, RecordKind};
use crate::models::{ClinicalEncounter, FollowupRequest, NewPatient, Patient};
use crate::reference::LookupKind;
use crate::repositories::action_items::{action_item_entries, ActionItemEntry};
use crate::repositories::encounters::timeline;
use crate::repositories::referrals::{referral_entries, ReferralEntry};
use crate::repositories::shared::ClinicContext;
use crate::scheduler::{followup_request_sets, ObligationSets};
use crate::ClinicResult;
use serde::Serialize;

/// Everything recorded about one patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PatientChart {
    pub patient: Patient,
    pub name: String,
    pub age: u32,
    pub gender_label: String,
    pub action_items: ObligationSets<ActionItemEntry>,
    pub followup_requests: ObligationSets<FollowupRequest>,
    pub timeline: Vec<ClinicalEncounter>,
    pub referrals: Vec<ReferralEntry>,
}

#[derive(Clone, Debug)]
pub struct PatientService {
    ctx: ClinicContext,
}

impl PatientService {
    pub fn new(ctx: ClinicContext) -> Self {
        Self { ctx }
    }

    /// Admit a new patient from an intake form. New patients are not active.
    ///
    /// # Arguments
    ///
    /// * `new` - Intake form. Blank city and state fall back to the clinic's defaults.
    ///
    /// # Errors
    ///
    /// Returns a validation error for malformed intake fields (see [`Patient::admit`]) and
    /// `ClinicError::UnknownReference` for unknown gender, language, ethnicity or contact
    /// method.
    pub fn admit(&self, new: NewPatient) -> ClinicResult<Patient> {
        let now = self.ctx.now();
        let today = self.ctx.today();
        let patient = self.ctx.store().write(|data| {
            let id: PatientId = data.allocate();
            let patient = Patient::admit(id, new, now, today)?;
            data.insert_patient(patient.clone())?;
            Ok(patient)
        })?;

        tracing::info!("admitted patient {}", patient.id);
        Ok(patient)
    }

    pub fn get(&self, id: PatientId) -> ClinicResult<Patient> {
        self.ctx.store().read(|data| data.patient(id).cloned())?
    }

    /// Flip the patient's active flag and return its new value.
    pub fn toggle_active(&self, id: PatientId) -> ClinicResult<bool> {
        let active = self
            .ctx
            .store()
            .write(|data| Ok(data.patient_mut(id)?.change_active_status()))?;

        tracing::info!(
            "{} {id} is now {}",
            RecordKind::Patient,
            if active { "active" } else { "inactive" }
        );
        Ok(active)
    }

    /// Build the patient's chart as of today.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::NotFound` for an unknown patient.
    pub fn chart(&self, id: PatientId) -> ClinicResult<PatientChart> {
        let today = self.ctx.today();
        let clock = self.ctx.clock();
        self.ctx.store().read(|data| {
            let patient = data.patient(id)?;
            let gender_label = data.reference.require(LookupKind::Gender, patient.gender)?;

            Ok(PatientChart {
                patient: patient.clone(),
                name: patient.name.name(false, false),
                age: patient.age(today),
                gender_label: gender_label.to_string(),
                action_items: action_item_entries(data, id, clock)?,
                followup_requests: followup_request_sets(data, id, today).map(Clone::clone),
                timeline: timeline(data, id, clock)?,
                referrals: referral_entries(data, id)?,
            })
        })?
    }
}
