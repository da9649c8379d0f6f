//! Referrals to outside care and the contact attempts that follow them up.

use crate::completion::{Completable, Completion, Scheduled};
use crate::ids::{FollowupRequestId, LookupId, PatientContactId, ReferralId};
use crate::models::NoteMeta;
use crate::ClinicError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Outcome of a referral as judged by the clinic.
///
/// Set explicitly by a provider; never derived from contact attempts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    #[default]
    Pending,
    Successful,
    Unsuccessful,
}

impl ReferralStatus {
    pub fn label(self) -> &'static str {
        match self {
            ReferralStatus::Pending => "Not completed",
            ReferralStatus::Successful => "Completed",
            ReferralStatus::Unsuccessful => "Unsuccessful referral",
        }
    }
}

impl std::str::FromStr for ReferralStatus {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ReferralStatus::Pending),
            "successful" => Ok(ReferralStatus::Successful),
            "unsuccessful" => Ok(ReferralStatus::Unsuccessful),
            other => Err(ClinicError::InvalidInput(format!(
                "unknown referral status: {other}"
            ))),
        }
    }
}

/// A record of sending a patient to one or more outside care locations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referral {
    pub id: ReferralId,
    #[serde(flatten)]
    pub note: NoteMeta,
    pub locations: Vec<LookupId>,
    /// Kind of care the patient should receive at the locations.
    pub kind: LookupId,
    pub comments: String,
    pub status: ReferralStatus,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewReferral {
    pub kind: LookupId,
    pub locations: Vec<LookupId>,
    #[serde(default)]
    pub comments: String,
}

/// An obligation to contact a patient about a referral.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowupRequest {
    pub id: FollowupRequestId,
    #[serde(flatten)]
    pub note: NoteMeta,
    pub referral: ReferralId,
    pub contact_instructions: String,
    pub due_date: NaiveDate,
    #[serde(flatten)]
    pub completion: Completion,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewFollowupRequest {
    pub contact_instructions: String,
    pub due_date: NaiveDate,
}

impl Completable for FollowupRequest {
    fn completion(&self) -> &Completion {
        &self.completion
    }

    fn completion_mut(&mut self) -> &mut Completion {
        &mut self.completion
    }
}

impl Scheduled for FollowupRequest {
    fn due_date(&self) -> NaiveDate {
        self.due_date
    }
}

/// Tri-state answer used for "made an appointment" and "went to the appointment".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Answer {
    Yes,
    No,
    #[serde(rename = "Not yet")]
    NotYet,
}

impl std::str::FromStr for Answer {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Yes" => Ok(Answer::Yes),
            "No" => Ok(Answer::No),
            "Not yet" => Ok(Answer::NotYet),
            other => Err(ClinicError::InvalidInput(format!(
                "{other:?} is not one of Yes, No, Not yet"
            ))),
        }
    }
}

/// One attempt to contact a patient about a followup request.
///
/// Appointment fields only mean something when the patient was reached, and the show
/// fields only when an appointment was made. Attempts are independent of each other.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientContact {
    pub id: PatientContactId,
    #[serde(flatten)]
    pub note: NoteMeta,
    pub followup_request: FollowupRequestId,
    pub referral: ReferralId,
    pub contact_method: LookupId,
    pub contact_status: LookupId,
    #[serde(default)]
    pub has_appointment: Option<Answer>,
    #[serde(default)]
    pub no_apt_reason: Option<LookupId>,
    #[serde(default)]
    pub appointment_location: Vec<LookupId>,
    #[serde(default)]
    pub pt_showed: Option<Answer>,
    #[serde(default)]
    pub no_show_reason: Option<LookupId>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewPatientContact {
    pub contact_method: LookupId,
    pub contact_status: LookupId,
    #[serde(default)]
    pub has_appointment: Option<Answer>,
    #[serde(default)]
    pub no_apt_reason: Option<LookupId>,
    #[serde(default)]
    pub appointment_location: Vec<LookupId>,
    #[serde(default)]
    pub pt_showed: Option<Answer>,
    #[serde(default)]
    pub no_show_reason: Option<LookupId>,
}
