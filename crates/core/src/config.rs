//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Environment variables are read by the binaries only; the values
//! they hold are parsed here so that every entry point applies the same rules.

use crate::constants::{MAX_UTC_OFFSET_HOURS, STORE_FILENAME};
use crate::{ClinicError, ClinicResult};
use chrono::FixedOffset;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    patient_data_dir: PathBuf,
    reference_data_path: Option<PathBuf>,
    utc_offset: FixedOffset,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::InvalidInput` if `reference_data_path` is given but is not a file.
    pub fn new(
        patient_data_dir: PathBuf,
        reference_data_path: Option<PathBuf>,
        utc_offset: FixedOffset,
    ) -> ClinicResult<Self> {
        if let Some(path) = &reference_data_path {
            if !path.is_file() {
                return Err(ClinicError::InvalidInput(format!(
                    "reference data file does not exist: {}",
                    path.display()
                )));
            }
        }

        Ok(Self {
            patient_data_dir,
            reference_data_path,
            utc_offset,
        })
    }

    pub fn patient_data_dir(&self) -> &Path {
        &self.patient_data_dir
    }

    /// Location of the JSON snapshot used by the file-backed store.
    pub fn store_path(&self) -> PathBuf {
        self.patient_data_dir.join(STORE_FILENAME)
    }

    pub fn reference_data_path(&self) -> Option<&Path> {
        self.reference_data_path.as_deref()
    }

    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }
}

/// Parse the clinic's offset from UTC from an optional string value, in whole hours.
///
/// If `value` is `None` or empty/whitespace, the clinic runs on UTC.
///
/// # Errors
///
/// Returns `ClinicError::InvalidInput` if the value is not an integer or lies outside
/// `-14..=14`.
pub fn utc_offset_from_env_value(value: Option<String>) -> ClinicResult<FixedOffset> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    let hours = match value {
        Some(v) => v.parse::<i32>().map_err(|_| {
            ClinicError::InvalidInput(format!("utc offset must be a whole number of hours: {v}"))
        })?,
        None => 0,
    };

    if hours.abs() > MAX_UTC_OFFSET_HOURS {
        return Err(ClinicError::InvalidInput(format!(
            "utc offset {hours} is outside -{MAX_UTC_OFFSET_HOURS}..={MAX_UTC_OFFSET_HOURS}"
        )));
    }

    FixedOffset::east_opt(hours * 3600)
        .ok_or_else(|| ClinicError::InvalidInput(format!("invalid utc offset: {hours}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_offset_defaults_to_utc() {
        let offset = utc_offset_from_env_value(None).expect("default offset");
        assert_eq!(offset.local_minus_utc(), 0);

        let offset = utc_offset_from_env_value(Some("   ".into())).expect("blank offset");
        assert_eq!(offset.local_minus_utc(), 0);
    }

    #[test]
    fn parses_negative_offset() {
        let offset = utc_offset_from_env_value(Some("-6".into())).expect("central time");
        assert_eq!(offset.local_minus_utc(), -6 * 3600);
    }

    #[test]
    fn rejects_bad_offsets() {
        assert!(utc_offset_from_env_value(Some("six".into())).is_err());
        assert!(utc_offset_from_env_value(Some("15".into())).is_err());
    }

    #[test]
    fn rejects_missing_reference_file() {
        let temp = TempDir::new().expect("temp dir");
        let missing = temp.path().join("nope.yaml");
        let err = CoreConfig::new(
            temp.path().to_path_buf(),
            Some(missing),
            FixedOffset::east_opt(0).unwrap(),
        )
        .expect_err("missing reference file should fail");
        assert!(matches!(err, ClinicError::InvalidInput(_)));
    }

    #[test]
    fn store_path_lives_in_data_dir() {
        let temp = TempDir::new().expect("temp dir");
        let cfg = CoreConfig::new(
            temp.path().to_path_buf(),
            None,
            FixedOffset::east_opt(0).unwrap(),
        )
        .expect("config");
        assert_eq!(cfg.store_path(), temp.path().join(STORE_FILENAME));
    }
}
