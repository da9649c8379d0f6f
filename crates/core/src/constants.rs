//! Constants used throughout the patient tracker core crate.

/// Default directory for patient data storage when no explicit directory is configured.
pub const DEFAULT_PATIENT_DATA_DIR: &str = "patient_data";

/// Filename of the JSON snapshot written by the file-backed store.
pub const STORE_FILENAME: &str = "clinic.json";

/// Reference data compiled into the crate, used when no override file is configured.
pub const EMBEDDED_REFERENCE_DATA: &str = include_str!("../reference/default.yaml");

/// City recorded for a patient when intake leaves it blank.
pub const DEFAULT_CITY: &str = "St. Louis";

/// State recorded for a patient when intake leaves it blank.
pub const DEFAULT_STATE: &str = "MO";

/// Largest accepted clinic offset from UTC, in hours.
pub const MAX_UTC_OFFSET_HOURS: i32 = 14;

/// Date format used in attribution text.
pub const ATTRIBUTION_DATE_FORMAT: &str = "%Y-%m-%d";
