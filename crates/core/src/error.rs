use crate::ids::RecordKind;
use crate::reference::LookupKind;

#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid text: {0}")]
    Text(#[from] pttrack_types::TextError),

    #[error("{kind} {id} does not exist")]
    NotFound { kind: RecordKind, id: u64 },
    #[error("unknown {kind} reference: {id}")]
    UnknownReference { kind: LookupKind, id: u32 },
    #[error("{kind} {id} does not belong to {owner_kind} {owner_id}")]
    Mismatched {
        kind: RecordKind,
        id: u64,
        owner_kind: RecordKind,
        owner_id: u64,
    },

    #[error("unsupported sort: {0:?} (expected one of: last_name, latest_workup)")]
    UnsupportedSort(String),
    #[error(
        "unsupported filter: {0:?} (expected one of: unsigned_workup, active, ai_active, ai_inactive)"
    )]
    UnsupportedFilter(String),

    #[error("failed to create storage directory: {0}")]
    StorageDirCreation(std::io::Error),
    #[error("failed to write store file: {0}")]
    FileWrite(std::io::Error),
    #[error("failed to read store file: {0}")]
    FileRead(std::io::Error),
    #[error("failed to serialize store: {0}")]
    Serialization(serde_json::Error),
    #[error("failed to deserialize store: {0}")]
    Deserialization(serde_json::Error),
    #[error("invalid reference data: {0}")]
    ReferenceData(String),
    #[error("store lock poisoned")]
    StorePoisoned,
}

impl ClinicError {
    /// Returns true when the failure was caused by the caller's input rather than by the
    /// store or the host.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ClinicError::InvalidInput(_)
                | ClinicError::Text(_)
                | ClinicError::NotFound { .. }
                | ClinicError::UnknownReference { .. }
                | ClinicError::Mismatched { .. }
                | ClinicError::UnsupportedSort(_)
                | ClinicError::UnsupportedFilter(_)
        )
    }
}

pub type ClinicResult<T> = std::result::Result<T, ClinicError>;
