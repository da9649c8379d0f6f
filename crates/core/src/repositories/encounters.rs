//! Clinic sessions, workups and followups.
//!
//! A patient's encounter timeline merges workups and followups into one sequence ordered by
//! the date each happened on, then by timestamp, then by id.

use crate::author::Author;
use crate::ids::{ClinicDateId, FollowupId, LookupId, PatientId, ProviderId, WorkupId};
use crate::models::{ClinicDate, ClinicalEncounter, Dated, Followup, NewWorkup, Workup};
use crate::repositories::shared::ClinicContext;
use crate::store::ClinicData;
use crate::temporal::Clock;
use crate::validation::require_text;
use crate::ClinicResult;
use chrono::NaiveDate;

/// Merge a patient's workups and followups into one ordered timeline.
pub(crate) fn timeline(
    data: &ClinicData,
    patient: PatientId,
    clock: &dyn Clock,
) -> ClinicResult<Vec<ClinicalEncounter>> {
    let mut entries = Vec::new();
    for workup in data.workups_for(patient) {
        let clinic_day = data.clinic_date(workup.clinic_day)?;
        entries.push(ClinicalEncounter::Workup(Dated {
            occurred_on: clinic_day.clinic_date,
            record: workup.clone(),
        }));
    }
    for followup in data.followups_for(patient) {
        entries.push(ClinicalEncounter::Followup(Dated {
            occurred_on: clock.date_of(followup.note.written_datetime),
            record: followup.clone(),
        }));
    }

    entries.sort_by_key(ClinicalEncounter::timeline_key);
    Ok(entries)
}

#[derive(Clone, Debug)]
pub struct EncounterService {
    ctx: ClinicContext,
}

impl EncounterService {
    pub fn new(ctx: ClinicContext) -> Self {
        Self { ctx }
    }

    /// Schedule a clinic session.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::UnknownReference` for an unknown clinic type.
    pub fn add_clinic_date(
        &self,
        clinic_type: LookupId,
        clinic_date: NaiveDate,
        gcal_id: String,
    ) -> ClinicResult<ClinicDate> {
        let created = self.ctx.store().write(|data| {
            let id: ClinicDateId = data.allocate();
            let created = ClinicDate {
                id,
                clinic_type,
                clinic_date,
                gcal_id: gcal_id.trim().to_string(),
            };
            data.insert_clinic_date(created.clone())?;
            Ok(created)
        })?;

        tracing::info!("clinic date {} scheduled for {}", created.id, clinic_date);
        Ok(created)
    }

    /// All clinic sessions in date order.
    pub fn clinic_dates(&self) -> ClinicResult<Vec<ClinicDate>> {
        self.ctx.store().read(|data| {
            let mut dates: Vec<ClinicDate> = data.clinic_dates().cloned().collect();
            dates.sort();
            dates
        })
    }

    /// Record a workup for `patient` at an existing clinic session.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank chief complaint or diagnosis, and
    /// `ClinicError::NotFound` for an unknown patient, provider or clinic date.
    pub fn add_workup(
        &self,
        provider: ProviderId,
        patient: PatientId,
        new: NewWorkup,
    ) -> ClinicResult<Workup> {
        require_text("chief complaint", &new.chief_complaint)?;
        require_text("diagnosis", &new.diagnosis)?;

        let now = self.ctx.now();
        let workup = self.ctx.store().write(|data| {
            let author = Author::resolve(data, provider)?;
            let id: WorkupId = data.allocate();
            let workup = Workup {
                id,
                note: author.note_meta(patient, now),
                clinic_day: new.clinic_day,
                chief_complaint: new.chief_complaint.trim().to_string(),
                diagnosis: new.diagnosis.trim().to_string(),
                narrative: new.narrative,
            };
            data.insert_workup(workup.clone())?;
            Ok(workup)
        })?;

        tracing::info!("workup {} recorded for patient {}", workup.id, patient);
        Ok(workup)
    }

    /// Record a free-text followup for `patient`.
    pub fn add_followup(
        &self,
        provider: ProviderId,
        patient: PatientId,
        text: String,
    ) -> ClinicResult<Followup> {
        require_text("followup note", &text)?;

        let now = self.ctx.now();
        let followup = self.ctx.store().write(|data| {
            let author = Author::resolve(data, provider)?;
            let id: FollowupId = data.allocate();
            let followup = Followup {
                id,
                note: author.note_meta(patient, now),
                text: text.trim().to_string(),
            };
            data.insert_followup(followup.clone())?;
            Ok(followup)
        })?;

        tracing::info!("followup {} recorded for patient {}", followup.id, patient);
        Ok(followup)
    }

    pub fn timeline(&self, patient: PatientId) -> ClinicResult<Vec<ClinicalEncounter>> {
        self.ctx.store().read(|data| {
            data.patient(patient)?;
            timeline(data, patient, self.ctx.clock())
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkupNarrative;
    use crate::temporal::FixedClock;
    use crate::test_support::*;
    use crate::ClinicError;

    #[test]
    fn timeline_orders_by_occurrence_date_then_timestamp() {
        let mut data = empty_data();
        let author = add_provider(&mut data);
        let patient = add_patient(&mut data, "T", "Timeline", at(date(2024, 1, 1), 9));

        // Written late but for an early clinic day.
        let early_workup =
            add_workup(&mut data, &author, patient, date(2024, 3, 1), at(date(2024, 3, 6), 9));
        let followup = add_followup(&mut data, &author, patient, at(date(2024, 3, 4), 15));
        let same_day_followup = add_followup(&mut data, &author, patient, at(date(2024, 3, 1), 7));

        let clock = FixedClock::on(date(2024, 3, 10));
        let entries = timeline(&data, patient, &clock).unwrap();
        let order: Vec<(NaiveDate, u64)> = entries
            .iter()
            .map(|entry| (entry.occurred_on(), entry.timeline_key().2))
            .collect();

        assert_eq!(
            order,
            vec![
                (date(2024, 3, 1), same_day_followup.get()),
                (date(2024, 3, 1), early_workup.get()),
                (date(2024, 3, 4), followup.get()),
            ]
        );
    }

    #[test]
    fn workup_requires_existing_clinic_date() {
        let ctx = crate::repositories::shared::testing::context_on(date(2024, 3, 10));
        let provider = crate::repositories::providers::ProviderService::new(ctx.clone())
            .register(new_provider())
            .unwrap();
        let patient = crate::repositories::patients::PatientService::new(ctx.clone())
            .admit(new_patient("W", "Workup"))
            .unwrap();
        let service = EncounterService::new(ctx);

        let new = |clinic_day| NewWorkup {
            clinic_day,
            chief_complaint: "headache".into(),
            diagnosis: "tension headache".into(),
            narrative: WorkupNarrative::default(),
        };

        let err = service
            .add_workup(provider.id, patient.id, new(ClinicDateId(404)))
            .expect_err("missing clinic date");
        assert!(matches!(err, ClinicError::NotFound { .. }));
        assert!(service.timeline(patient.id).unwrap().is_empty());

        let day = service
            .add_clinic_date(LookupId(1), date(2024, 3, 9), "gcal-123".into())
            .unwrap();
        let workup = service.add_workup(provider.id, patient.id, new(day.id)).unwrap();

        let timeline = service.timeline(patient.id).unwrap();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].occurred_on(), date(2024, 3, 9));
        assert_eq!(timeline[0].short_text(), "headache");
        assert_eq!(timeline[0].note().patient, patient.id);
        assert_eq!(workup.note.author, provider.id);
    }

    #[test]
    fn blank_followup_is_rejected() {
        let ctx = crate::repositories::shared::testing::context_on(date(2024, 3, 10));
        let service = EncounterService::new(ctx);
        let err = service
            .add_followup(ProviderId(1), PatientId(1), "   ".into())
            .expect_err("blank text");
        assert!(matches!(err, ClinicError::InvalidInput(_)));
    }

    #[test]
    fn clinic_dates_are_listed_in_date_order() {
        let ctx = crate::repositories::shared::testing::context_on(date(2024, 3, 10));
        let service = EncounterService::new(ctx);
        service
            .add_clinic_date(LookupId(1), date(2024, 3, 16), "b".into())
            .unwrap();
        service
            .add_clinic_date(LookupId(2), date(2024, 3, 9), "a".into())
            .unwrap();
        let dates: Vec<NaiveDate> = service
            .clinic_dates()
            .unwrap()
            .into_iter()
            .map(|d| d.clinic_date)
            .collect();
        assert_eq!(dates, vec![date(2024, 3, 9), date(2024, 3, 16)]);

        assert!(service
            .add_clinic_date(LookupId(9), date(2024, 3, 9), "c".into())
            .is_err());
    }
}
