//! Request and response bodies of the REST API.
//!
//! These mirror the core types with OpenAPI schemas attached. Lookup references travel as
//! plain numeric ids; the acting provider is named by `provider_id`.

use chrono::{DateTime, NaiveDate, Utc};
use pttrack_core::models::{
    Answer, NewActionItem, NewFollowupRequest, NewPatient, NewPatientContact, NewProvider,
    NewReferral, NewWorkup, WorkupNarrative,
};
use pttrack_core::roster::{HistorySummary, WorkupSummary};
use pttrack_core::{ClinicResult, ClinicDateId, LookupId, PatientSummary};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Clone, Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPatientsQuery {
    /// `last_name` (default) or `latest_workup`
    pub sort: Option<String>,
    /// `unsigned_workup`, `active`, `ai_active` or `ai_inactive`
    pub filter: Option<String>,
}

// ============================================================================
// ROSTER
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ClinicDayRes {
    pub id: u64,
    pub clinic_type: String,
    pub clinic_date: NaiveDate,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct LatestWorkupRes {
    pub id: u64,
    pub chief_complaint: String,
    pub diagnosis: String,
    pub clinic_day: ClinicDayRes,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntryRes {
    pub history_date: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct HistoryRes {
    pub last: HistoryEntryRes,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PatientSummaryRes {
    pub id: u64,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub name: String,
    pub needs_workup: bool,
    pub latest_workup: Option<LatestWorkupRes>,
    pub history: HistoryRes,
    pub active_action_items: usize,
    pub inactive_action_items: usize,
}

impl From<WorkupSummary> for LatestWorkupRes {
    fn from(workup: WorkupSummary) -> Self {
        Self {
            id: workup.id.get(),
            chief_complaint: workup.chief_complaint,
            diagnosis: workup.diagnosis,
            clinic_day: ClinicDayRes {
                id: workup.clinic_day.id.get(),
                clinic_type: workup.clinic_day.clinic_type,
                clinic_date: workup.clinic_day.clinic_date,
            },
        }
    }
}

impl From<HistorySummary> for HistoryRes {
    fn from(history: HistorySummary) -> Self {
        Self {
            last: HistoryEntryRes {
                history_date: history.last.history_date,
            },
        }
    }
}

impl From<PatientSummary> for PatientSummaryRes {
    fn from(summary: PatientSummary) -> Self {
        Self {
            id: summary.id.get(),
            first_name: summary.first_name,
            middle_name: summary.middle_name,
            last_name: summary.last_name,
            name: summary.name,
            needs_workup: summary.needs_workup,
            latest_workup: summary.latest_workup.map(Into::into),
            history: summary.history.into(),
            active_action_items: summary.active_action_items,
            inactive_action_items: summary.inactive_action_items,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ListPatientsRes {
    pub patients: Vec<PatientSummaryRes>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ActiveStatusRes {
    pub id: u64,
    pub needs_workup: bool,
}

// ============================================================================
// PEOPLE
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePatientReq {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub phone: String,
    pub gender: u32,
    pub address: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    pub zip_code: String,
    #[serde(default)]
    pub pcp_preferred_zip: Option<String>,
    pub date_of_birth: NaiveDate,
    pub language: u32,
    pub ethnicity: u32,
    #[serde(default)]
    pub preferred_contact_method: Option<u32>,
}

impl From<CreatePatientReq> for NewPatient {
    fn from(req: CreatePatientReq) -> Self {
        NewPatient {
            first_name: req.first_name,
            last_name: req.last_name,
            middle_name: req.middle_name,
            phone: req.phone,
            gender: LookupId(req.gender),
            address: req.address,
            city: req.city,
            state: req.state,
            zip_code: req.zip_code,
            pcp_preferred_zip: req.pcp_preferred_zip,
            date_of_birth: req.date_of_birth,
            language: LookupId(req.language),
            ethnicity: LookupId(req.ethnicity),
            preferred_contact_method: req.preferred_contact_method.map(LookupId),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateProviderReq {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub phone: String,
    pub email: String,
    pub gender: u32,
    pub provider_type: u32,
}

impl From<CreateProviderReq> for NewProvider {
    fn from(req: CreateProviderReq) -> Self {
        NewProvider {
            first_name: req.first_name,
            last_name: req.last_name,
            middle_name: req.middle_name,
            phone: req.phone,
            email: req.email,
            gender: LookupId(req.gender),
            provider_type: LookupId(req.provider_type),
        }
    }
}

// ============================================================================
// NOTES
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ResolveReq {
    pub provider_id: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateActionItemReq {
    pub provider_id: u64,
    pub due_date: NaiveDate,
    pub instruction: u32,
    #[serde(default)]
    pub comments: String,
}

impl From<CreateActionItemReq> for NewActionItem {
    fn from(req: CreateActionItemReq) -> Self {
        NewActionItem {
            due_date: req.due_date,
            instruction: LookupId(req.instruction),
            comments: req.comments,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateClinicDateReq {
    pub clinic_type: u32,
    pub clinic_date: NaiveDate,
    #[serde(default)]
    pub gcal_id: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateWorkupReq {
    pub provider_id: u64,
    pub clinic_day: u64,
    pub chief_complaint: String,
    pub diagnosis: String,
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

impl From<CreateWorkupReq> for NewWorkup {
    fn from(req: CreateWorkupReq) -> Self {
        NewWorkup {
            clinic_day: ClinicDateId(req.clinic_day),
            chief_complaint: req.chief_complaint,
            diagnosis: req.diagnosis,
            narrative: WorkupNarrative {
                hpi: req.hpi,
                pmh_psh: req.pmh_psh,
                meds: req.meds,
                allergies: req.allergies,
                fam_hx: req.fam_hx,
                soc_hx: req.soc_hx,
                ros: req.ros,
                pe: req.pe,
                a_and_p: req.a_and_p,
            },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateFollowupReq {
    pub provider_id: u64,
    pub text: String,
}

// ============================================================================
// REFERRALS
// ============================================================================

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateReferralReq {
    pub provider_id: u64,
    pub kind: u32,
    pub locations: Vec<u32>,
    #[serde(default)]
    pub comments: String,
}

impl From<CreateReferralReq> for NewReferral {
    fn from(req: CreateReferralReq) -> Self {
        NewReferral {
            kind: LookupId(req.kind),
            locations: req.locations.into_iter().map(LookupId).collect(),
            comments: req.comments,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ReferralStatusReq {
    /// `pending`, `successful` or `unsuccessful`
    pub status: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateFollowupRequestReq {
    pub provider_id: u64,
    pub contact_instructions: String,
    pub due_date: NaiveDate,
}

impl From<CreateFollowupRequestReq> for NewFollowupRequest {
    fn from(req: CreateFollowupRequestReq) -> Self {
        NewFollowupRequest {
            contact_instructions: req.contact_instructions,
            due_date: req.due_date,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordContactReq {
    pub provider_id: u64,
    pub contact_method: u32,
    pub contact_status: u32,
    /// `Yes`, `No` or `Not yet`
    #[serde(default)]
    pub has_appointment: Option<String>,
    #[serde(default)]
    pub no_apt_reason: Option<u32>,
    #[serde(default)]
    pub appointment_location: Vec<u32>,
    /// `Yes`, `No` or `Not yet`
    #[serde(default)]
    pub pt_showed: Option<String>,
    #[serde(default)]
    pub no_show_reason: Option<u32>,
}

impl RecordContactReq {
    pub fn into_new(self) -> ClinicResult<NewPatientContact> {
        fn answer(value: Option<String>) -> ClinicResult<Option<Answer>> {
            value
                .filter(|v| !v.trim().is_empty())
                .map(|v| v.trim().parse())
                .transpose()
        }

        Ok(NewPatientContact {
            contact_method: LookupId(self.contact_method),
            contact_status: LookupId(self.contact_status),
            has_appointment: answer(self.has_appointment)?,
            no_apt_reason: self.no_apt_reason.map(LookupId),
            appointment_location: self.appointment_location.into_iter().map(LookupId).collect(),
            pt_showed: answer(self.pt_showed)?,
            no_show_reason: self.no_show_reason.map(LookupId),
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ContactRes {
    pub id: u64,
    pub followup_request: u64,
    pub outcome: String,
    pub summary: String,
}
