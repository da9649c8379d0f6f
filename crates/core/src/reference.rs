//! Reference (lookup) tables.
//!
//! Lookup entries are small immutable enumerations with a display label: genders, languages,
//! contact methods, referral locations and so on. Records refer to them by [`LookupId`] and
//! never embed them.
//!
//! The tables are loaded from a strict YAML document. Unknown keys are rejected and schema
//! mismatches report the path of the failing field. Within one table, ids must be unique.

use crate::constants::EMBEDDED_REFERENCE_DATA;
use crate::ids::LookupId;
use crate::{ClinicError, ClinicResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// A lookup entry with a single label.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LookupEntry {
    pub id: LookupId,
    pub name: String,
}

/// A lookup entry with long and short labels (genders, provider types).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AbbreviatedEntry {
    pub id: LookupId,
    pub long_name: String,
    pub short_name: String,
}

/// Outcome of an attempt to reach a patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContactResult {
    pub id: LookupId,
    pub name: String,
    pub patient_reached: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupKind {
    Language,
    Ethnicity,
    ActionInstruction,
    ProviderType,
    Gender,
    ContactMethod,
    ClinicType,
    ReferralType,
    ReferralLocation,
    ContactResult,
    NoAptReason,
    NoShowReason,
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LookupKind::Language => "language",
            LookupKind::Ethnicity => "ethnicity",
            LookupKind::ActionInstruction => "action instruction",
            LookupKind::ProviderType => "provider type",
            LookupKind::Gender => "gender",
            LookupKind::ContactMethod => "contact method",
            LookupKind::ClinicType => "clinic type",
            LookupKind::ReferralType => "referral type",
            LookupKind::ReferralLocation => "referral location",
            LookupKind::ContactResult => "contact result",
            LookupKind::NoAptReason => "no-appointment reason",
            LookupKind::NoShowReason => "no-show reason",
        };
        f.write_str(name)
    }
}

/// All lookup tables.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceData {
    #[serde(default)]
    pub languages: Vec<LookupEntry>,
    #[serde(default)]
    pub ethnicities: Vec<LookupEntry>,
    #[serde(default)]
    pub action_instructions: Vec<LookupEntry>,
    #[serde(default)]
    pub provider_types: Vec<AbbreviatedEntry>,
    #[serde(default)]
    pub genders: Vec<AbbreviatedEntry>,
    #[serde(default)]
    pub contact_methods: Vec<LookupEntry>,
    #[serde(default)]
    pub clinic_types: Vec<LookupEntry>,
    #[serde(default)]
    pub referral_types: Vec<LookupEntry>,
    #[serde(default)]
    pub referral_locations: Vec<LookupEntry>,
    #[serde(default)]
    pub contact_results: Vec<ContactResult>,
    #[serde(default)]
    pub no_apt_reasons: Vec<LookupEntry>,
    #[serde(default)]
    pub no_show_reasons: Vec<LookupEntry>,
}

impl ReferenceData {
    /// Parse reference data from YAML text.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::ReferenceData` if the YAML does not match the schema (the message
    /// names the failing path) or a table contains the same id twice.
    pub fn parse(yaml_text: &str) -> ClinicResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let data = match serde_path_to_error::deserialize::<_, ReferenceData>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(ClinicError::ReferenceData(format!(
                    "schema mismatch at {path}: {source}"
                )));
            }
        };

        data.check_unique_ids()?;
        Ok(data)
    }

    /// The reference data compiled into the crate.
    pub fn embedded() -> ClinicResult<Self> {
        Self::parse(EMBEDDED_REFERENCE_DATA)
    }

    /// Load reference data from `path`, or the embedded tables when `path` is `None`.
    pub fn load(path: Option<&Path>) -> ClinicResult<Self> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(ClinicError::FileRead)?;
                tracing::info!("loading reference data from {}", path.display());
                Self::parse(&text)
            }
            None => Self::embedded(),
        }
    }

    /// Display label of a lookup entry, if it exists.
    ///
    /// Genders render with their long name and provider types with their short name.
    pub fn label(&self, kind: LookupKind, id: LookupId) -> Option<&str> {
        fn find(entries: &[LookupEntry], id: LookupId) -> Option<&str> {
            entries.iter().find(|e| e.id == id).map(|e| e.name.as_str())
        }

        match kind {
            LookupKind::Language => find(&self.languages, id),
            LookupKind::Ethnicity => find(&self.ethnicities, id),
            LookupKind::ActionInstruction => find(&self.action_instructions, id),
            LookupKind::ContactMethod => find(&self.contact_methods, id),
            LookupKind::ClinicType => find(&self.clinic_types, id),
            LookupKind::ReferralType => find(&self.referral_types, id),
            LookupKind::ReferralLocation => find(&self.referral_locations, id),
            LookupKind::NoAptReason => find(&self.no_apt_reasons, id),
            LookupKind::NoShowReason => find(&self.no_show_reasons, id),
            LookupKind::ProviderType => self
                .provider_types
                .iter()
                .find(|e| e.id == id)
                .map(|e| e.short_name.as_str()),
            LookupKind::Gender => self
                .genders
                .iter()
                .find(|e| e.id == id)
                .map(|e| e.long_name.as_str()),
            LookupKind::ContactResult => self
                .contact_results
                .iter()
                .find(|e| e.id == id)
                .map(|e| e.name.as_str()),
        }
    }

    /// Like [`ReferenceData::label`] but fails with a referential error.
    pub fn require(&self, kind: LookupKind, id: LookupId) -> ClinicResult<&str> {
        self.label(kind, id)
            .ok_or(ClinicError::UnknownReference { kind, id: id.0 })
    }

    pub fn contact_result(&self, id: LookupId) -> ClinicResult<&ContactResult> {
        self.contact_results
            .iter()
            .find(|e| e.id == id)
            .ok_or(ClinicError::UnknownReference {
                kind: LookupKind::ContactResult,
                id: id.0,
            })
    }

    fn check_unique_ids(&self) -> ClinicResult<()> {
        fn unique(
            table: &str,
            ids: impl IntoIterator<Item = LookupId>,
        ) -> ClinicResult<()> {
            let mut seen = HashSet::new();
            for id in ids {
                if !seen.insert(id) {
                    return Err(ClinicError::ReferenceData(format!(
                        "duplicate id {id} in {table}"
                    )));
                }
            }
            Ok(())
        }

        fn ids(entries: &[LookupEntry]) -> Vec<LookupId> {
            entries.iter().map(|e| e.id).collect()
        }

        unique("languages", ids(&self.languages))?;
        unique("ethnicities", ids(&self.ethnicities))?;
        unique("action_instructions", ids(&self.action_instructions))?;
        unique("provider_types", self.provider_types.iter().map(|e| e.id))?;
        unique("genders", self.genders.iter().map(|e| e.id))?;
        unique("contact_methods", ids(&self.contact_methods))?;
        unique("clinic_types", ids(&self.clinic_types))?;
        unique("referral_types", ids(&self.referral_types))?;
        unique("referral_locations", ids(&self.referral_locations))?;
        unique("contact_results", self.contact_results.iter().map(|e| e.id))?;
        unique("no_apt_reasons", ids(&self.no_apt_reasons))?;
        unique("no_show_reasons", ids(&self.no_show_reasons))
    }
}
