//! The acting provider.
//!
//! Authentication happens outside the core. Callers hand over an already-resolved provider
//! id; this module turns it into an [`Author`] that stamps notes and resolutions.

use crate::ids::{LookupId, PatientId, ProviderId};
use crate::models::NoteMeta;
use crate::store::ClinicData;
use crate::ClinicResult;
use chrono::{DateTime, Utc};

/// A provider writing or resolving notes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Author {
    pub provider: ProviderId,

    /// The role the provider acts in. Recorded on every note they write so that later
    /// changes to the provider do not rewrite history.
    pub provider_type: LookupId,
}

impl Author {
    /// Look up `provider` in the store.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::NotFound` if the provider does not exist.
    pub fn resolve(data: &ClinicData, provider: ProviderId) -> ClinicResult<Self> {
        let record = data.provider(provider)?;
        Ok(Self {
            provider,
            provider_type: record.provider_type,
        })
    }

    /// Note metadata for a note about `patient` written at `at`.
    pub fn note_meta(&self, patient: PatientId, at: DateTime<Utc>) -> NoteMeta {
        NoteMeta {
            author: self.provider,
            author_type: self.provider_type,
            patient,
            written_datetime: at,
        }
    }
}
