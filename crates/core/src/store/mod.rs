//! Record storage.
//!
//! [`ClinicData`] holds every table in memory, keyed by typed ids. [`ClinicStore`] wraps it
//! behind a lock and gives callers request-scoped units of work:
//!
//! - [`ClinicStore::read`] borrows the current state.
//! - [`ClinicStore::write`] runs a closure against a copy of the state and commits the copy
//!   only if the closure returns `Ok`. A failed write leaves nothing behind, including id
//!   allocations.
//!
//! A file-backed store additionally persists every committed write as a JSON snapshot.
//! Concurrent writers are serialised by the lock; the last commit wins.

mod json_file;

use crate::config::CoreConfig;
use crate::ids::{
    ActionItemId, ClinicDateId, FollowupId, FollowupRequestId, LookupId, PatientContactId,
    PatientId, ProviderId, RecordKind, ReferralId, WorkupId,
};
use crate::models::{
    ActionItem, ClinicDate, Followup, FollowupRequest, NoteMeta, Patient, PatientContact,
    Provider, Referral, Workup,
};
use crate::reference::{LookupKind, ReferenceData};
use crate::{ClinicError, ClinicResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

macro_rules! table_access {
    ($field:ident, $get:ident, $get_mut:ident, $id:ty, $record:ty) => {
        pub fn $get(&self, id: $id) -> ClinicResult<&$record> {
            self.$field.get(&id).ok_or(ClinicError::NotFound {
                kind: <$id>::KIND,
                id: id.get(),
            })
        }

        pub fn $get_mut(&mut self, id: $id) -> ClinicResult<&mut $record> {
            self.$field.get_mut(&id).ok_or(ClinicError::NotFound {
                kind: <$id>::KIND,
                id: id.get(),
            })
        }
    };
}

/// Every table, plus the reference data the records point into.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClinicData {
    #[serde(default)]
    pub reference: ReferenceData,
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    patients: BTreeMap<PatientId, Patient>,
    #[serde(default)]
    providers: BTreeMap<ProviderId, Provider>,
    #[serde(default)]
    clinic_dates: BTreeMap<ClinicDateId, ClinicDate>,
    #[serde(default)]
    action_items: BTreeMap<ActionItemId, ActionItem>,
    #[serde(default)]
    workups: BTreeMap<WorkupId, Workup>,
    #[serde(default)]
    followups: BTreeMap<FollowupId, Followup>,
    #[serde(default)]
    referrals: BTreeMap<ReferralId, Referral>,
    #[serde(default)]
    followup_requests: BTreeMap<FollowupRequestId, FollowupRequest>,
    #[serde(default)]
    patient_contacts: BTreeMap<PatientContactId, PatientContact>,
}

impl ClinicData {
    pub fn new(reference: ReferenceData) -> Self {
        Self {
            reference,
            ..Self::default()
        }
    }

    /// Allocate the next record id. Ids increase monotonically across all tables.
    pub fn allocate<T: From<u64>>(&mut self) -> T {
        self.next_id += 1;
        T::from(self.next_id)
    }

    table_access!(patients, patient, patient_mut, PatientId, Patient);
    table_access!(providers, provider, provider_mut, ProviderId, Provider);
    table_access!(clinic_dates, clinic_date, clinic_date_mut, ClinicDateId, ClinicDate);
    table_access!(action_items, action_item, action_item_mut, ActionItemId, ActionItem);
    table_access!(workups, workup, workup_mut, WorkupId, Workup);
    table_access!(followups, followup, followup_mut, FollowupId, Followup);
    table_access!(referrals, referral, referral_mut, ReferralId, Referral);
    table_access!(
        followup_requests,
        followup_request,
        followup_request_mut,
        FollowupRequestId,
        FollowupRequest
    );
    table_access!(
        patient_contacts,
        patient_contact,
        patient_contact_mut,
        PatientContactId,
        PatientContact
    );

    // ========================================================================
    // INSERTS
    // ========================================================================

    pub fn insert_patient(&mut self, patient: Patient) -> ClinicResult<PatientId> {
        self.reference.require(LookupKind::Gender, patient.gender)?;
        self.reference.require(LookupKind::Language, patient.language)?;
        self.reference
            .require(LookupKind::Ethnicity, patient.ethnicity)?;
        self.require_optional(LookupKind::ContactMethod, patient.preferred_contact_method)?;

        let id = patient.id;
        self.patients.insert(id, patient);
        Ok(id)
    }

    pub fn insert_provider(&mut self, provider: Provider) -> ClinicResult<ProviderId> {
        self.reference.require(LookupKind::Gender, provider.gender)?;
        self.reference
            .require(LookupKind::ProviderType, provider.provider_type)?;

        let id = provider.id;
        self.providers.insert(id, provider);
        Ok(id)
    }

    pub fn insert_clinic_date(&mut self, clinic_date: ClinicDate) -> ClinicResult<ClinicDateId> {
        self.reference
            .require(LookupKind::ClinicType, clinic_date.clinic_type)?;

        let id = clinic_date.id;
        self.clinic_dates.insert(id, clinic_date);
        Ok(id)
    }

    pub fn insert_action_item(&mut self, item: ActionItem) -> ClinicResult<ActionItemId> {
        self.check_note(&item.note)?;
        self.reference
            .require(LookupKind::ActionInstruction, item.instruction)?;

        let id = item.id;
        self.action_items.insert(id, item);
        Ok(id)
    }

    pub fn insert_workup(&mut self, workup: Workup) -> ClinicResult<WorkupId> {
        self.check_note(&workup.note)?;
        self.clinic_date(workup.clinic_day)?;

        let id = workup.id;
        self.workups.insert(id, workup);
        Ok(id)
    }

    pub fn insert_followup(&mut self, followup: Followup) -> ClinicResult<FollowupId> {
        self.check_note(&followup.note)?;

        let id = followup.id;
        self.followups.insert(id, followup);
        Ok(id)
    }

    pub fn insert_referral(&mut self, referral: Referral) -> ClinicResult<ReferralId> {
        self.check_note(&referral.note)?;
        self.reference
            .require(LookupKind::ReferralType, referral.kind)?;
        if referral.locations.is_empty() {
            return Err(ClinicError::InvalidInput(
                "a referral needs at least one location".into(),
            ));
        }
        for location in &referral.locations {
            self.reference
                .require(LookupKind::ReferralLocation, *location)?;
        }

        let id = referral.id;
        self.referrals.insert(id, referral);
        Ok(id)
    }

    pub fn insert_followup_request(
        &mut self,
        request: FollowupRequest,
    ) -> ClinicResult<FollowupRequestId> {
        self.check_note(&request.note)?;
        let referral = self.referral(request.referral)?;
        if referral.note.patient != request.note.patient {
            return Err(ClinicError::Mismatched {
                kind: RecordKind::Referral,
                id: referral.id.get(),
                owner_kind: RecordKind::Patient,
                owner_id: request.note.patient.get(),
            });
        }

        let id = request.id;
        self.followup_requests.insert(id, request);
        Ok(id)
    }

    /// Insert a contact attempt.
    ///
    /// The attempt must target its request's referral, and any appointment location must be
    /// one of the referral's locations.
    pub fn insert_patient_contact(
        &mut self,
        contact: PatientContact,
    ) -> ClinicResult<PatientContactId> {
        self.check_note(&contact.note)?;

        let request = self.followup_request(contact.followup_request)?;
        if request.referral != contact.referral || request.note.patient != contact.note.patient
        {
            return Err(ClinicError::Mismatched {
                kind: RecordKind::FollowupRequest,
                id: request.id.get(),
                owner_kind: RecordKind::Referral,
                owner_id: contact.referral.get(),
            });
        }

        let reference = &self.reference;
        reference.require(LookupKind::ContactMethod, contact.contact_method)?;
        reference.contact_result(contact.contact_status)?;
        self.require_optional(LookupKind::NoAptReason, contact.no_apt_reason)?;
        self.require_optional(LookupKind::NoShowReason, contact.no_show_reason)?;

        let referral = self.referral(contact.referral)?;
        for location in &contact.appointment_location {
            self.reference
                .require(LookupKind::ReferralLocation, *location)?;
            if !referral.locations.contains(location) {
                return Err(ClinicError::InvalidInput(format!(
                    "location {location} is not part of referral {}",
                    referral.id
                )));
            }
        }

        let id = contact.id;
        self.patient_contacts.insert(id, contact);
        Ok(id)
    }

    fn check_note(&self, note: &NoteMeta) -> ClinicResult<()> {
        self.patient(note.patient)?;
        self.provider(note.author)?;
        self.reference
            .require(LookupKind::ProviderType, note.author_type)?;
        Ok(())
    }

    /// Check every stored lookup id against the current reference tables.
    pub fn check_references(&self) -> ClinicResult<()> {
        let reference = &self.reference;
        for patient in self.patients.values() {
            reference.require(LookupKind::Gender, patient.gender)?;
            reference.require(LookupKind::Language, patient.language)?;
            reference.require(LookupKind::Ethnicity, patient.ethnicity)?;
            self.require_optional(LookupKind::ContactMethod, patient.preferred_contact_method)?;
        }
        for provider in self.providers.values() {
            reference.require(LookupKind::Gender, provider.gender)?;
            reference.require(LookupKind::ProviderType, provider.provider_type)?;
        }
        for clinic_date in self.clinic_dates.values() {
            reference.require(LookupKind::ClinicType, clinic_date.clinic_type)?;
        }

        let notes = self
            .action_items
            .values()
            .map(|r| &r.note)
            .chain(self.workups.values().map(|r| &r.note))
            .chain(self.followups.values().map(|r| &r.note))
            .chain(self.referrals.values().map(|r| &r.note))
            .chain(self.followup_requests.values().map(|r| &r.note))
            .chain(self.patient_contacts.values().map(|r| &r.note));
        for note in notes {
            reference.require(LookupKind::ProviderType, note.author_type)?;
        }

        for item in self.action_items.values() {
            reference.require(LookupKind::ActionInstruction, item.instruction)?;
        }
        for referral in self.referrals.values() {
            reference.require(LookupKind::ReferralType, referral.kind)?;
            for location in &referral.locations {
                reference.require(LookupKind::ReferralLocation, *location)?;
            }
        }
        for contact in self.patient_contacts.values() {
            reference.require(LookupKind::ContactMethod, contact.contact_method)?;
            reference.contact_result(contact.contact_status)?;
            self.require_optional(LookupKind::NoAptReason, contact.no_apt_reason)?;
            self.require_optional(LookupKind::NoShowReason, contact.no_show_reason)?;
            for location in &contact.appointment_location {
                reference.require(LookupKind::ReferralLocation, *location)?;
            }
        }
        Ok(())
    }

    fn require_optional(&self, kind: LookupKind, id: Option<LookupId>) -> ClinicResult<()> {
        if let Some(id) = id {
            self.reference.require(kind, id)?;
        }
        Ok(())
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    /// All patients in id (insertion) order.
    pub fn patients(&self) -> impl Iterator<Item = &Patient> {
        self.patients.values()
    }

    pub fn providers(&self) -> impl Iterator<Item = &Provider> {
        self.providers.values()
    }

    pub fn clinic_dates(&self) -> impl Iterator<Item = &ClinicDate> {
        self.clinic_dates.values()
    }

    pub fn action_items_for(&self, patient: PatientId) -> impl Iterator<Item = &ActionItem> {
        self.action_items
            .values()
            .filter(move |item| item.note.patient == patient)
    }

    pub fn workups_for(&self, patient: PatientId) -> impl Iterator<Item = &Workup> {
        self.workups
            .values()
            .filter(move |workup| workup.note.patient == patient)
    }

    pub fn followups_for(&self, patient: PatientId) -> impl Iterator<Item = &Followup> {
        self.followups
            .values()
            .filter(move |followup| followup.note.patient == patient)
    }

    pub fn referrals_for(&self, patient: PatientId) -> impl Iterator<Item = &Referral> {
        self.referrals
            .values()
            .filter(move |referral| referral.note.patient == patient)
    }

    pub fn followup_requests_for(
        &self,
        patient: PatientId,
    ) -> impl Iterator<Item = &FollowupRequest> {
        self.followup_requests
            .values()
            .filter(move |request| request.note.patient == patient)
    }

    pub fn followup_requests_for_referral(
        &self,
        referral: ReferralId,
    ) -> impl Iterator<Item = &FollowupRequest> {
        self.followup_requests
            .values()
            .filter(move |request| request.referral == referral)
    }

    pub fn contacts_for_request(
        &self,
        request: FollowupRequestId,
    ) -> impl Iterator<Item = &PatientContact> {
        self.patient_contacts
            .values()
            .filter(move |contact| contact.followup_request == request)
    }

    /// Display name of a provider, or a placeholder if the id is dangling.
    pub fn provider_name(&self, id: ProviderId) -> String {
        match self.provider(id) {
            Ok(provider) => provider.to_string(),
            Err(_) => {
                tracing::warn!("provider {id} referenced but not found");
                format!("provider #{id}")
            }
        }
    }
}

enum Backend {
    Memory,
    JsonFile(PathBuf),
}

/// Lock-guarded [`ClinicData`] with unit-of-work writes.
pub struct ClinicStore {
    data: RwLock<ClinicData>,
    backend: Backend,
}

impl std::fmt::Debug for ClinicStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backend = match &self.backend {
            Backend::Memory => "memory".to_string(),
            Backend::JsonFile(path) => path.display().to_string(),
        };
        f.debug_struct("ClinicStore")
            .field("backend", &backend)
            .finish_non_exhaustive()
    }
}

impl ClinicStore {
    /// A store that lives only as long as the process.
    pub fn in_memory(reference: ReferenceData) -> Self {
        Self {
            data: RwLock::new(ClinicData::new(reference)),
            backend: Backend::Memory,
        }
    }

    /// Open a store persisted as a JSON snapshot at `path`.
    ///
    /// If the file exists its records are loaded; `reference` always replaces the reference
    /// data stored in the snapshot. Loading fails if a stored record points at a lookup id
    /// that `reference` no longer has.
    pub fn open_json(path: impl Into<PathBuf>, reference: ReferenceData) -> ClinicResult<Self> {
        let path = path.into();
        let data = match json_file::load_snapshot(&path)? {
            Some(mut data) => {
                if data.reference != reference {
                    tracing::info!("reference data changed since last save; using configured tables");
                }
                data.reference = reference;
                data.check_references().map_err(|err| {
                    ClinicError::ReferenceData(format!(
                        "{} does not match the configured reference data: {err}",
                        path.display()
                    ))
                })?;
                data
            }
            None => {
                tracing::info!("no store at {}; starting empty", path.display());
                ClinicData::new(reference)
            }
        };

        Ok(Self {
            data: RwLock::new(data),
            backend: Backend::JsonFile(path),
        })
    }

    /// Open the file-backed store described by `cfg`, creating the data directory if needed.
    pub fn open(cfg: &CoreConfig) -> ClinicResult<Self> {
        std::fs::create_dir_all(cfg.patient_data_dir()).map_err(ClinicError::StorageDirCreation)?;
        let reference = ReferenceData::load(cfg.reference_data_path())?;
        Self::open_json(cfg.store_path(), reference)
    }

    pub fn read<R>(&self, f: impl FnOnce(&ClinicData) -> R) -> ClinicResult<R> {
        let guard = self.data.read().map_err(|_| ClinicError::StorePoisoned)?;
        Ok(f(&guard))
    }

    /// Run one unit of work. Changes become visible, and are persisted, only on `Ok`.
    pub fn write<R>(
        &self,
        f: impl FnOnce(&mut ClinicData) -> ClinicResult<R>,
    ) -> ClinicResult<R> {
        let mut guard = self.data.write().map_err(|_| ClinicError::StorePoisoned)?;
        let mut working = guard.clone();
        let result = f(&mut working)?;

        if let Backend::JsonFile(path) = &self.backend {
            json_file::save_snapshot(path, &working)?;
        }
        *guard = working;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewPatient, Patient};
    use crate::test_support;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn add_patient(data: &mut ClinicData, new: NewPatient) -> ClinicResult<PatientId> {
        let id = data.allocate();
        let at = Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap();
        let patient = Patient::admit(id, new, at, at.date_naive())?;
        data.insert_patient(patient)
    }

    #[test]
    fn failed_write_leaves_no_partial_state() {
        let store = ClinicStore::in_memory(ReferenceData::embedded().unwrap());
        store
            .write(|data| add_patient(data, test_support::new_patient("Test", "Kept")))
            .expect("first insert");

        let mut bad = test_support::new_patient("Test", "Dropped");
        bad.language = LookupId(999);
        let err = store
            .write(|data| {
                add_patient(data, test_support::new_patient("Test", "AlsoDropped"))?;
                add_patient(data, bad)
            })
            .expect_err("unknown language should fail");
        assert!(matches!(err, ClinicError::UnknownReference { .. }));

        let names: Vec<String> = store
            .read(|data| {
                data.patients()
                    .map(|p| p.name.last_name.to_string())
                    .collect()
            })
            .unwrap();
        assert_eq!(names, vec!["Kept".to_string()]);

        let next: PatientId = store.write(|data| Ok(data.allocate())).unwrap();
        assert_eq!(next, PatientId(2), "rolled back allocations are reused");
    }

    #[test]
    fn missing_records_are_not_found() {
        let data = ClinicData::new(ReferenceData::embedded().unwrap());
        let err = data.patient(PatientId(3)).expect_err("empty store");
        assert!(matches!(
            err,
            ClinicError::NotFound {
                kind: RecordKind::Patient,
                id: 3
            }
        ));
    }

    #[test]
    fn json_store_persists_committed_writes() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("clinic.json");
        let reference = ReferenceData::embedded().unwrap();

        {
            let store = ClinicStore::open_json(&path, reference.clone()).expect("open new");
            store
                .write(|data| add_patient(data, test_support::new_patient("Test", "Durable")))
                .expect("insert");
        }

        assert!(path.is_file());
        let reopened = ClinicStore::open_json(&path, reference).expect("reopen");
        let count = reopened.read(|data| data.patients().count()).unwrap();
        assert_eq!(count, 1);

        let next: PatientId = reopened.write(|data| Ok(data.allocate())).unwrap();
        assert_eq!(next, PatientId(2), "id sequence survives restart");
    }

    #[test]
    fn reopen_rejects_records_with_missing_lookups() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("clinic.json");
        let reference = ReferenceData::embedded().unwrap();

        {
            let store = ClinicStore::open_json(&path, reference.clone()).expect("open new");
            store
                .write(|data| {
                    let id = data.allocate();
                    data.insert_clinic_date(ClinicDate {
                        id,
                        clinic_type: LookupId(1),
                        clinic_date: chrono::NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
                        gcal_id: String::new(),
                    })
                })
                .expect("insert clinic date");
        }

        let mut reduced = reference;
        reduced.clinic_types.retain(|entry| entry.id != LookupId(1));
        let err = ClinicStore::open_json(&path, reduced).expect_err("clinic type 1 is gone");
        assert!(matches!(err, ClinicError::ReferenceData(_)), "{err:?}");
        assert!(!err.is_client_error());
    }

    #[test]
    fn open_creates_data_dir() {
        let temp = TempDir::new().expect("temp dir");
        let cfg = CoreConfig::new(
            temp.path().join("nested"),
            None,
            chrono::FixedOffset::east_opt(0).unwrap(),
        )
        .unwrap();

        let store = ClinicStore::open(&cfg).expect("open");
        store
            .write(|data| add_patient(data, test_support::new_patient("Test", "Fresh")))
            .unwrap();
        assert!(cfg.store_path().is_file());
    }
}
