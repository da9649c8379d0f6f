//! Referrals, followup requests and contact attempts.
//!
//! A referral sends a patient to one or more outside locations. Each followup request under
//! it is an obligation to check in with the patient; each contact attempt documents one try.
//! Neither the referral status nor a request's resolution is derived from the attempts:
//! providers set both explicitly.

use crate::author::Author;
use crate::completion::Completable;
use crate::contact::{request_state, summarize, ContactOutcome, RequestState};
use crate::ids::{
    FollowupRequestId, PatientContactId, PatientId, ProviderId, RecordKind, ReferralId,
};
use crate::models::{
    FollowupRequest, NewFollowupRequest, NewPatientContact, NewReferral, PatientContact,
    Referral, ReferralStatus,
};
use crate::reference::LookupKind;
use crate::repositories::shared::{log_transition, ClinicContext};
use crate::scheduler::{followup_request_sets, ObligationSets};
use crate::store::ClinicData;
use crate::validation::require_text;
use crate::ClinicResult;
use serde::Serialize;

// ============================================================================
// READ MODELS
// ============================================================================

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContactEntry {
    #[serde(flatten)]
    pub contact: PatientContact,
    pub outcome: ContactOutcome,
    pub summary: String,
}

impl ContactEntry {
    fn build(data: &ClinicData, contact: &PatientContact) -> ClinicResult<Self> {
        let (outcome, summary) = summarize(contact, &data.reference)?;
        Ok(Self {
            contact: contact.clone(),
            outcome,
            summary,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FollowupRequestEntry {
    #[serde(flatten)]
    pub request: FollowupRequest,
    pub state: RequestState,
    pub contacts: Vec<ContactEntry>,
}

impl FollowupRequestEntry {
    fn build(data: &ClinicData, request: &FollowupRequest) -> ClinicResult<Self> {
        let contacts = data
            .contacts_for_request(request.id)
            .map(|contact| ContactEntry::build(data, contact))
            .collect::<ClinicResult<Vec<_>>>()?;

        Ok(Self {
            request: request.clone(),
            state: request_state(request),
            contacts,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReferralEntry {
    #[serde(flatten)]
    pub referral: Referral,
    pub kind_label: String,
    pub location_labels: Vec<String>,
    pub status_label: &'static str,
    pub followup_requests: Vec<FollowupRequestEntry>,
}

impl ReferralEntry {
    fn build(data: &ClinicData, referral: &Referral) -> ClinicResult<Self> {
        let reference = &data.reference;
        let location_labels = referral
            .locations
            .iter()
            .map(|id| {
                reference
                    .require(LookupKind::ReferralLocation, *id)
                    .map(str::to_string)
            })
            .collect::<ClinicResult<Vec<_>>>()?;
        let followup_requests = data
            .followup_requests_for_referral(referral.id)
            .map(|request| FollowupRequestEntry::build(data, request))
            .collect::<ClinicResult<Vec<_>>>()?;

        Ok(Self {
            referral: referral.clone(),
            kind_label: reference
                .require(LookupKind::ReferralType, referral.kind)?
                .to_string(),
            location_labels,
            status_label: referral.status.label(),
            followup_requests,
        })
    }
}

/// Every referral of a patient, with requests and attempts, in id order.
pub(crate) fn referral_entries(
    data: &ClinicData,
    patient: PatientId,
) -> ClinicResult<Vec<ReferralEntry>> {
    data.referrals_for(patient)
        .map(|referral| ReferralEntry::build(data, referral))
        .collect()
}

// ============================================================================
// REFERRAL SERVICE
// ============================================================================

#[derive(Clone, Debug)]
pub struct ReferralService {
    ctx: ClinicContext,
}

impl ReferralService {
    pub fn new(ctx: ClinicContext) -> Self {
        Self { ctx }
    }

    /// Refer `patient` to one or more outside locations. New referrals are pending.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::InvalidInput` if no location is given and a referential error
    /// for an unknown patient, provider, referral type or location.
    pub fn add_referral(
        &self,
        provider: ProviderId,
        patient: PatientId,
        new: NewReferral,
    ) -> ClinicResult<Referral> {
        let now = self.ctx.now();
        let referral = self.ctx.store().write(|data| {
            let author = Author::resolve(data, provider)?;
            let id: ReferralId = data.allocate();
            let referral = Referral {
                id,
                note: author.note_meta(patient, now),
                locations: new.locations,
                kind: new.kind,
                comments: new.comments.trim().to_string(),
                status: ReferralStatus::Pending,
            };
            data.insert_referral(referral.clone())?;
            Ok(referral)
        })?;

        tracing::info!("referral {} created for patient {}", referral.id, patient);
        Ok(referral)
    }

    /// Record the clinic's judgement of a referral.
    pub fn set_status(&self, id: ReferralId, status: ReferralStatus) -> ClinicResult<Referral> {
        let referral = self.ctx.store().write(|data| {
            let referral = data.referral_mut(id)?;
            referral.status = status;
            Ok(referral.clone())
        })?;

        tracing::info!("referral {id} status set to {status:?}");
        Ok(referral)
    }

    /// Open a followup request under `referral`, for the referral's patient.
    pub fn add_followup_request(
        &self,
        provider: ProviderId,
        referral: ReferralId,
        new: NewFollowupRequest,
    ) -> ClinicResult<FollowupRequest> {
        require_text("contact instructions", &new.contact_instructions)?;

        let now = self.ctx.now();
        let request = self.ctx.store().write(|data| {
            let author = Author::resolve(data, provider)?;
            let patient = data.referral(referral)?.note.patient;
            let id: FollowupRequestId = data.allocate();
            let request = FollowupRequest {
                id,
                note: author.note_meta(patient, now),
                referral,
                contact_instructions: new.contact_instructions.trim().to_string(),
                due_date: new.due_date,
                completion: Default::default(),
            };
            data.insert_followup_request(request.clone())?;
            Ok(request)
        })?;

        tracing::info!(
            "followup request {} opened for referral {}, due {}",
            request.id,
            referral,
            request.due_date
        );
        Ok(request)
    }

    /// Document one attempt to contact the patient about `request`.
    ///
    /// Recording an attempt never resolves the request.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::InvalidInput` if an appointment location is not one of the
    /// referral's locations, and a referential error for unknown records or lookups.
    pub fn record_contact(
        &self,
        provider: ProviderId,
        request: FollowupRequestId,
        new: NewPatientContact,
    ) -> ClinicResult<ContactEntry> {
        let now = self.ctx.now();
        let entry = self.ctx.store().write(|data| {
            let author = Author::resolve(data, provider)?;
            let parent = data.followup_request(request)?;
            let (patient, referral) = (parent.note.patient, parent.referral);

            let id: PatientContactId = data.allocate();
            let contact = PatientContact {
                id,
                note: author.note_meta(patient, now),
                followup_request: request,
                referral,
                contact_method: new.contact_method,
                contact_status: new.contact_status,
                has_appointment: new.has_appointment,
                no_apt_reason: new.no_apt_reason,
                appointment_location: new.appointment_location,
                pt_showed: new.pt_showed,
                no_show_reason: new.no_show_reason,
            };
            data.insert_patient_contact(contact.clone())?;
            ContactEntry::build(data, &contact)
        })?;

        tracing::info!(
            "contact {} recorded for followup request {}: {:?}",
            entry.contact.id,
            request,
            entry.outcome
        );
        Ok(entry)
    }

    pub fn mark_request_done(
        &self,
        id: FollowupRequestId,
        resolver: ProviderId,
    ) -> ClinicResult<FollowupRequest> {
        let now = self.ctx.now();
        let (request, transition) = self.ctx.store().write(|data| {
            data.provider(resolver)?;
            let request = data.followup_request_mut(id)?;
            let transition = request.mark_done(resolver, now);
            Ok((request.clone(), transition))
        })?;

        log_transition(RecordKind::FollowupRequest, id.get(), transition);
        Ok(request)
    }

    pub fn clear_request_done(&self, id: FollowupRequestId) -> ClinicResult<FollowupRequest> {
        let (request, transition) = self.ctx.store().write(|data| {
            let request = data.followup_request_mut(id)?;
            let transition = request.clear_done();
            Ok((request.clone(), transition))
        })?;

        log_transition(RecordKind::FollowupRequest, id.get(), transition);
        Ok(request)
    }

    /// The patient's followup requests as of today.
    pub fn request_sets(&self, patient: PatientId) -> ClinicResult<ObligationSets<FollowupRequest>> {
        let today = self.ctx.today();
        self.ctx.store().read(|data| {
            data.patient(patient)?;
            Ok(followup_request_sets(data, patient, today).map(Clone::clone))
        })?
    }

    pub fn referrals(&self, patient: PatientId) -> ClinicResult<Vec<ReferralEntry>> {
        self.ctx.store().read(|data| {
            data.patient(patient)?;
            referral_entries(data, patient)
        })?
    }
}
