//! Referral contact workflow.
//!
//! A followup request is either open or resolved. Resolution is always an explicit call by a
//! provider who has weighed the contact attempts; nothing here infers it.
//!
//! Each [`PatientContact`] is summarised on its own. An unreached patient reports nothing
//! else. Otherwise the show answer takes priority over the appointment answer.

use crate::completion::Completable;
use crate::models::{Answer, FollowupRequest, PatientContact};
use crate::reference::{LookupKind, ReferenceData};
use crate::ClinicResult;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestState {
    Open,
    Resolved,
}

pub fn request_state(request: &FollowupRequest) -> RequestState {
    if request.is_done() {
        RequestState::Resolved
    } else {
        RequestState::Open
    }
}

/// What a single contact attempt achieved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactOutcome {
    NotReached,
    ReachedWithoutAppointment,
    AppointmentMade,
    Attended,
}

impl ContactOutcome {
    /// Classify an attempt given whether its contact result reached the patient.
    pub fn classify(contact: &PatientContact, reached: bool) -> Self {
        if !reached {
            return ContactOutcome::NotReached;
        }
        if contact.pt_showed == Some(Answer::Yes) {
            ContactOutcome::Attended
        } else if contact.has_appointment == Some(Answer::Yes) {
            ContactOutcome::AppointmentMade
        } else {
            ContactOutcome::ReachedWithoutAppointment
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContactOutcome::NotReached => "not_reached",
            ContactOutcome::ReachedWithoutAppointment => "reached_without_appointment",
            ContactOutcome::AppointmentMade => "appointment_made",
            ContactOutcome::Attended => "attended",
        }
    }

    /// Human-readable summary. `locations` are the appointment location labels.
    pub fn summary<S: AsRef<str>>(self, locations: &[S]) -> String {
        let locations = locations
            .iter()
            .map(|location| location.as_ref())
            .collect::<Vec<&str>>()
            .join(", ");

        match self {
            ContactOutcome::Attended => format!("Patient went to appointment at {locations}."),
            ContactOutcome::AppointmentMade => {
                format!("Patient made appointment at {locations} but has not yet gone.")
            }
            ContactOutcome::ReachedWithoutAppointment => {
                "Successfully contacted patient but the patient has not made an appointment yet."
                    .to_string()
            }
            ContactOutcome::NotReached => "Did not successfully contact patient.".to_string(),
        }
    }
}

/// Classify and summarise an attempt, resolving its lookups against `reference`.
///
/// # Errors
///
/// Returns `ClinicError::UnknownReference` if the contact result or an appointment location
/// is not in the reference tables.
pub fn summarize(
    contact: &PatientContact,
    reference: &ReferenceData,
) -> ClinicResult<(ContactOutcome, String)> {
    let reached = reference.contact_result(contact.contact_status)?.patient_reached;
    let outcome = ContactOutcome::classify(contact, reached);

    let locations = contact
        .appointment_location
        .iter()
        .map(|id| reference.require(LookupKind::ReferralLocation, *id))
        .collect::<ClinicResult<Vec<_>>>()?;

    Ok((outcome, outcome.summary(&locations)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::Completion;
    use crate::ids::{
        FollowupRequestId, LookupId, PatientContactId, PatientId, ProviderId, ReferralId,
    };
    use crate::models::NoteMeta;
    use chrono::{NaiveDate, Utc};

    const REACHED: LookupId = LookupId(1);
    const VOICEMAIL: LookupId = LookupId(2);

    fn note() -> NoteMeta {
        NoteMeta {
            author: ProviderId(1),
            author_type: LookupId(1),
            patient: PatientId(1),
            written_datetime: Utc::now(),
        }
    }

    fn contact(
        status: LookupId,
        has_appointment: Option<Answer>,
        pt_showed: Option<Answer>,
    ) -> PatientContact {
        PatientContact {
            id: PatientContactId(9),
            note: note(),
            followup_request: FollowupRequestId(5),
            referral: ReferralId(4),
            contact_method: LookupId(1),
            contact_status: status,
            has_appointment,
            no_apt_reason: None,
            appointment_location: vec![LookupId(1), LookupId(3)],
            pt_showed,
            no_show_reason: None,
        }
    }

    fn summary_of(contact: &PatientContact) -> String {
        let reference = ReferenceData::embedded().unwrap();
        summarize(contact, &reference).expect("known lookups").1
    }

    #[test]
    fn attended_appointment_lists_locations() {
        let c = contact(REACHED, Some(Answer::Yes), Some(Answer::Yes));
        assert_eq!(
            summary_of(&c),
            "Patient went to appointment at Family Care Health Center, Barnes Jewish Hospital."
        );
    }

    #[test]
    fn made_appointment_not_yet_attended() {
        for showed in [None, Some(Answer::No), Some(Answer::NotYet)] {
            let c = contact(REACHED, Some(Answer::Yes), showed);
            assert_eq!(
                summary_of(&c),
                "Patient made appointment at Family Care Health Center, Barnes Jewish Hospital but has not yet gone."
            );
        }
    }

    #[test]
    fn reached_without_appointment() {
        for answer in [None, Some(Answer::No), Some(Answer::NotYet)] {
            for showed in [None, Some(Answer::No), Some(Answer::NotYet)] {
                let c = contact(REACHED, answer, showed);
                assert_eq!(
                    summary_of(&c),
                    "Successfully contacted patient but the patient has not made an appointment yet."
                );
            }
        }
    }

    #[test]
    fn show_answer_wins_over_missing_appointment() {
        for answer in [None, Some(Answer::No), Some(Answer::NotYet)] {
            let c = contact(REACHED, answer, Some(Answer::Yes));
            let reference = ReferenceData::embedded().unwrap();
            let (outcome, text) = summarize(&c, &reference).unwrap();
            assert_eq!(outcome, ContactOutcome::Attended);
            assert_eq!(
                text,
                "Patient went to appointment at Family Care Health Center, Barnes Jewish Hospital."
            );
        }
    }

    #[test]
    fn unreached_patient_ignores_other_answers() {
        let answers = [None, Some(Answer::Yes), Some(Answer::No), Some(Answer::NotYet)];
        for has_appointment in answers {
            for pt_showed in answers {
                let c = contact(VOICEMAIL, has_appointment, pt_showed);
                assert_eq!(summary_of(&c), "Did not successfully contact patient.");
            }
        }
    }

    #[test]
    fn unknown_contact_result_is_referential_error() {
        let reference = ReferenceData::embedded().unwrap();
        let c = contact(LookupId(77), None, None);
        assert!(summarize(&c, &reference).is_err());
    }

    #[test]
    fn request_state_follows_completion() {
        let mut request = FollowupRequest {
            id: FollowupRequestId(5),
            note: note(),
            referral: ReferralId(4),
            contact_instructions: "Call after 5pm".into(),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
            completion: Completion::default(),
        };
        assert_eq!(request_state(&request), RequestState::Open);
        request.mark_done(ProviderId(2), Utc::now());
        assert_eq!(request_state(&request), RequestState::Resolved);
        request.clear_done();
        assert_eq!(request_state(&request), RequestState::Open);
    }
}
