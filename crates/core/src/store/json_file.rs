//! JSON snapshot persistence for [`ClinicData`].

use super::ClinicData;
use crate::{ClinicError, ClinicResult};
use std::fs;
use std::path::Path;

/// Load a snapshot, or `None` if no file exists yet.
pub(super) fn load_snapshot(path: &Path) -> ClinicResult<Option<ClinicData>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(ClinicError::FileRead)?;
    let data = serde_json::from_str(&contents).map_err(ClinicError::Deserialization)?;
    Ok(Some(data))
}

/// Write a snapshot atomically: a sibling temp file is written first, then renamed over
/// the target.
pub(super) fn save_snapshot(path: &Path, data: &ClinicData) -> ClinicResult<()> {
    let json = serde_json::to_string_pretty(data).map_err(ClinicError::Serialization)?;

    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json).map_err(ClinicError::FileWrite)?;
    fs::rename(&tmp_path, path).map_err(ClinicError::FileWrite)?;

    tracing::debug!("saved store snapshot to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::ReferenceData;
    use tempfile::TempDir;

    #[test]
    fn missing_file_loads_as_none() {
        let temp = TempDir::new().unwrap();
        let loaded = load_snapshot(&temp.path().join("absent.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn corrupt_file_is_a_deserialization_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("clinic.json");
        fs::write(&path, "{ not json").unwrap();
        let err = load_snapshot(&path).expect_err("corrupt snapshot");
        assert!(matches!(err, ClinicError::Deserialization(_)));
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("clinic.json");
        let data = ClinicData::new(ReferenceData::embedded().unwrap());

        save_snapshot(&path, &data).unwrap();
        assert!(path.is_file());
        assert!(!temp.path().join("clinic.json.tmp").exists());

        let loaded = load_snapshot(&path).unwrap().expect("snapshot present");
        assert_eq!(loaded, data);
    }
}
