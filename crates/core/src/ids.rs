//! Typed record identifiers.
//!
//! Identifiers are allocated from a single monotonically increasing sequence held by the
//! store, so comparing two ids of the same kind compares their insertion order.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            pub const KIND: RecordKind = RecordKind::$kind;

            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

record_id!(PatientId => Patient);
record_id!(ProviderId => Provider);
record_id!(ClinicDateId => ClinicDate);
record_id!(ActionItemId => ActionItem);
record_id!(WorkupId => Workup);
record_id!(FollowupId => Followup);
record_id!(ReferralId => Referral);
record_id!(FollowupRequestId => FollowupRequest);
record_id!(PatientContactId => PatientContact);

/// Identifier of an entry in one of the reference (lookup) tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupId(pub u32);

impl fmt::Display for LookupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The kinds of record the store owns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordKind {
    Patient,
    Provider,
    ClinicDate,
    ActionItem,
    Workup,
    Followup,
    Referral,
    FollowupRequest,
    PatientContact,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Patient => "patient",
            RecordKind::Provider => "provider",
            RecordKind::ClinicDate => "clinic date",
            RecordKind::ActionItem => "action item",
            RecordKind::Workup => "workup",
            RecordKind::Followup => "followup",
            RecordKind::Referral => "referral",
            RecordKind::FollowupRequest => "followup request",
            RecordKind::PatientContact => "patient contact",
        };
        f.write_str(name)
    }
}
