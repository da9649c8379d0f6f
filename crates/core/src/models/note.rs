use crate::ids::{LookupId, PatientId, ProviderId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fields common to everything authored about a patient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteMeta {
    pub author: ProviderId,
    /// Provider type of the author at the time of writing.
    pub author_type: LookupId,
    pub patient: PatientId,
    pub written_datetime: DateTime<Utc>,
}
