use crate::constants::{DEFAULT_CITY, DEFAULT_STATE};
use crate::ids::{LookupId, PatientId, ProviderId};
use crate::models::PersonName;
use crate::validation::{validate_birth_date, validate_email, validate_phone, validate_state};
use crate::ClinicResult;
use chrono::{DateTime, NaiveDate, Utc};
use pttrack_types::ZipCode;
use serde::{Deserialize, Serialize};

/// A patient of the clinic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    #[serde(flatten)]
    pub name: PersonName,
    pub phone: String,
    pub gender: LookupId,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: ZipCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pcp_preferred_zip: Option<ZipCode>,
    pub date_of_birth: NaiveDate,
    pub language: LookupId,
    pub ethnicity: LookupId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_contact_method: Option<LookupId>,
    /// Stored active flag. Toggled explicitly, never derived from clinical history.
    pub needs_workup: bool,
    pub intake_datetime: DateTime<Utc>,
}

/// Intake form for a new patient.
#[derive(Clone, Debug, Deserialize)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub phone: String,
    pub gender: LookupId,
    pub address: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    pub zip_code: String,
    #[serde(default)]
    pub pcp_preferred_zip: Option<String>,
    pub date_of_birth: NaiveDate,
    pub language: LookupId,
    pub ethnicity: LookupId,
    #[serde(default)]
    pub preferred_contact_method: Option<LookupId>,
}

impl Patient {
    /// Build a patient record from an intake form.
    ///
    /// Lookup references are not checked here; the store checks them on insert.
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank names, a malformed ZIP code, a blank phone
    /// number, a state that is not two letters, or a birth date after `today`.
    pub fn admit(
        id: PatientId,
        new: NewPatient,
        intake_datetime: DateTime<Utc>,
        today: NaiveDate,
    ) -> ClinicResult<Self> {
        let name = PersonName::new(&new.first_name, &new.last_name, new.middle_name)?;
        let zip_code = ZipCode::parse(&new.zip_code)?;
        let pcp_preferred_zip = new
            .pcp_preferred_zip
            .filter(|z| !z.trim().is_empty())
            .map(ZipCode::parse)
            .transpose()?;

        validate_phone(&new.phone)?;
        validate_birth_date(new.date_of_birth, today)?;

        let city = new
            .city
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CITY.to_string());
        let state = match new.state.map(|s| s.trim().to_string()) {
            Some(s) if !s.is_empty() => {
                validate_state(&s)?;
                s
            }
            _ => DEFAULT_STATE.to_string(),
        };

        Ok(Self {
            id,
            name,
            phone: new.phone.trim().to_string(),
            gender: new.gender,
            address: new.address.trim().to_string(),
            city,
            state,
            zip_code,
            pcp_preferred_zip,
            date_of_birth: new.date_of_birth,
            language: new.language,
            ethnicity: new.ethnicity,
            preferred_contact_method: new.preferred_contact_method,
            needs_workup: false,
            intake_datetime,
        })
    }

    /// Age in whole years on `today`.
    pub fn age(&self, today: NaiveDate) -> u32 {
        today.years_since(self.date_of_birth).unwrap_or(0)
    }

    /// Flip the active flag and return its new value.
    pub fn change_active_status(&mut self) -> bool {
        self.needs_workup = !self.needs_workup;
        self.needs_workup
    }

    pub fn display_name(&self) -> String {
        self.name.to_string()
    }
}

/// A clinic volunteer who authors and resolves notes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    #[serde(flatten)]
    pub name: PersonName,
    pub phone: String,
    pub email: String,
    pub gender: LookupId,
    pub provider_type: LookupId,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewProvider {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub phone: String,
    pub email: String,
    pub gender: LookupId,
    pub provider_type: LookupId,
}

impl Provider {
    pub fn register(id: ProviderId, new: NewProvider) -> ClinicResult<Self> {
        let name = PersonName::new(&new.first_name, &new.last_name, new.middle_name)?;
        validate_phone(&new.phone)?;
        validate_email(&new.email)?;

        Ok(Self {
            id,
            name,
            phone: new.phone.trim().to_string(),
            email: new.email.trim().to_string(),
            gender: new.gender,
            provider_type: new.provider_type,
        })
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClinicError;
    use chrono::TimeZone;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn intake() -> NewPatient {
        NewPatient {
            first_name: "Juggie".into(),
            last_name: "Brodeltein".into(),
            middle_name: Some("Bayer".into()),
            phone: "+49 178 236 5288".into(),
            gender: LookupId(2),
            address: "Schulstrasse 9".into(),
            city: None,
            state: None,
            zip_code: "63108".into(),
            pcp_preferred_zip: Some("63018".into()),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            language: LookupId(1),
            ethnicity: LookupId(1),
            preferred_contact_method: None,
        }
    }

    fn admitted() -> Patient {
        let at = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        Patient::admit(PatientId(1), intake(), at, today()).expect("valid intake")
    }

    #[test]
    fn admit_applies_location_defaults() {
        let patient = admitted();
        assert_eq!(patient.city, DEFAULT_CITY);
        assert_eq!(patient.state, DEFAULT_STATE);
        assert!(!patient.needs_workup);
    }

    #[test]
    fn admit_rejects_malformed_zip() {
        let mut new = intake();
        new.zip_code = "631O8".into();
        let err = Patient::admit(PatientId(1), new, Utc::now(), today())
            .expect_err("letter O is not a digit");
        assert!(matches!(err, ClinicError::Text(_)));
    }

    #[test]
    fn admit_rejects_malformed_pcp_zip() {
        let mut new = intake();
        new.pcp_preferred_zip = Some("6301".into());
        assert!(Patient::admit(PatientId(1), new, Utc::now(), today()).is_err());
    }

    #[test]
    fn admit_rejects_future_birth_date() {
        let mut new = intake();
        new.date_of_birth = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        assert!(Patient::admit(PatientId(1), new, Utc::now(), today()).is_err());
    }

    #[test]
    fn toggling_active_status_flips_flag() {
        let mut patient = admitted();
        assert!(patient.change_active_status());
        assert!(patient.needs_workup);
        assert!(!patient.change_active_status());
    }

    #[test]
    fn age_counts_whole_years() {
        let patient = admitted();
        assert_eq!(patient.age(today()), 34);
        assert_eq!(
            patient.age(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()),
            33
        );
    }
}
