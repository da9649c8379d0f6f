//! Builders for unit tests that need a populated [`ClinicData`].

use crate::author::Author;
use crate::completion::Completion;
use crate::ids::{ClinicDateId, LookupId, PatientId, ProviderId};
use crate::models::{
    ActionItem, ClinicDate, Followup, NewPatient, NewProvider, Patient, Provider, Workup,
    WorkupNarrative,
};
use crate::reference::ReferenceData;
use crate::store::ClinicData;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(date: NaiveDate, hour: u32) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap())
}

pub fn empty_data() -> ClinicData {
    ClinicData::new(ReferenceData::embedded().expect("embedded reference data"))
}

pub fn new_patient(first: &str, last: &str) -> NewPatient {
    NewPatient {
        first_name: first.into(),
        last_name: last.into(),
        middle_name: None,
        phone: "314 555 0100".into(),
        gender: LookupId(1),
        address: "4414 Lindell Blvd".into(),
        city: None,
        state: None,
        zip_code: "63108".into(),
        pcp_preferred_zip: None,
        date_of_birth: date(1985, 6, 1),
        language: LookupId(1),
        ethnicity: LookupId(1),
        preferred_contact_method: None,
    }
}

pub fn new_provider() -> NewProvider {
    NewProvider {
        first_name: "Tess".into(),
        last_name: "Tester".into(),
        middle_name: None,
        phone: "314 555 0199".into(),
        email: "tess@clinic.org".into(),
        gender: LookupId(2),
        provider_type: LookupId(1),
    }
}

pub fn add_provider(data: &mut ClinicData) -> Author {
    let id: ProviderId = data.allocate();
    let provider = Provider::register(id, new_provider()).unwrap();
    data.insert_provider(provider).unwrap();
    Author::resolve(data, id).unwrap()
}

pub fn add_patient(
    data: &mut ClinicData,
    first: &str,
    last: &str,
    intake: DateTime<Utc>,
) -> PatientId {
    let id = data.allocate();
    let patient = Patient::admit(id, new_patient(first, last), intake, intake.date_naive())
        .unwrap();
    data.insert_patient(patient).unwrap()
}

pub fn add_clinic_date(data: &mut ClinicData, on: NaiveDate) -> ClinicDateId {
    let id = data.allocate();
    data.insert_clinic_date(ClinicDate {
        id,
        clinic_type: LookupId(1),
        clinic_date: on,
        gcal_id: format!("gcal-{on}"),
    })
    .unwrap()
}

pub fn add_workup(
    data: &mut ClinicData,
    author: &Author,
    patient: PatientId,
    on: NaiveDate,
    written: DateTime<Utc>,
) -> crate::ids::WorkupId {
    let clinic_day = add_clinic_date(data, on);
    let id = data.allocate();
    data.insert_workup(Workup {
        id,
        note: author.note_meta(patient, written),
        clinic_day,
        chief_complaint: "cough".into(),
        diagnosis: "bronchitis".into(),
        narrative: WorkupNarrative::default(),
    })
    .unwrap()
}

pub fn add_followup(
    data: &mut ClinicData,
    author: &Author,
    patient: PatientId,
    written: DateTime<Utc>,
) -> crate::ids::FollowupId {
    let id = data.allocate();
    data.insert_followup(Followup {
        id,
        note: author.note_meta(patient, written),
        text: "called about results".into(),
    })
    .unwrap()
}

pub fn add_action_item(
    data: &mut ClinicData,
    author: &Author,
    patient: PatientId,
    due: NaiveDate,
    written: DateTime<Utc>,
) -> crate::ids::ActionItemId {
    let id = data.allocate();
    data.insert_action_item(ActionItem {
        id,
        note: author.note_meta(patient, written),
        due_date: due,
        instruction: LookupId(1),
        comments: String::new(),
        completion: Completion::default(),
    })
    .unwrap()
}
