//! Shared service plumbing.
//!
//! Every service holds a [`ClinicContext`]: the startup configuration, the store and the
//! clock. Cloning a context is cheap and shares all three.

use crate::completion::Transition;
use crate::config::CoreConfig;
use crate::ids::RecordKind;
use crate::reference::ReferenceData;
use crate::store::ClinicStore;
use crate::temporal::{Clock, SystemClock};
use crate::ClinicResult;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct ClinicContext {
    cfg: Arc<CoreConfig>,
    store: Arc<ClinicStore>,
    clock: Arc<dyn Clock>,
}

impl ClinicContext {
    pub fn new(cfg: Arc<CoreConfig>, store: Arc<ClinicStore>, clock: Arc<dyn Clock>) -> Self {
        Self { cfg, store, clock }
    }

    /// Open the file-backed store under the configured data directory, on a wall clock at
    /// the configured offset.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created, the reference data cannot
    /// be loaded, or an existing snapshot cannot be read.
    pub fn open(cfg: Arc<CoreConfig>) -> ClinicResult<Self> {
        let store = ClinicStore::open(&cfg)?;
        let clock = SystemClock::new(cfg.utc_offset());
        Ok(Self::new(cfg, Arc::new(store), Arc::new(clock)))
    }

    /// A context over an empty in-memory store with the configured reference data.
    pub fn in_memory(cfg: Arc<CoreConfig>, clock: Arc<dyn Clock>) -> ClinicResult<Self> {
        let reference = ReferenceData::load(cfg.reference_data_path())?;
        let store = ClinicStore::in_memory(reference);
        Ok(Self::new(cfg, Arc::new(store), clock))
    }

    pub fn cfg(&self) -> &CoreConfig {
        &self.cfg
    }

    pub fn store(&self) -> &ClinicStore {
        &self.store
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}

/// Log a completion change, warning on tolerated misuse.
pub(crate) fn log_transition(kind: RecordKind, id: u64, transition: Transition) {
    match transition {
        Transition::Resolved => tracing::info!("{kind} {id} marked done"),
        Transition::Cleared => tracing::info!("{kind} {id} reopened"),
        Transition::Overwritten => {
            tracing::warn!("{kind} {id} was already done; resolution overwritten")
        }
        Transition::AlreadyOpen => tracing::warn!("{kind} {id} cleared but was not done"),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::temporal::FixedClock;
    use chrono::FixedOffset;
    use std::path::PathBuf;

    /// A context over an empty in-memory store, frozen at noon UTC on `today`.
    pub fn context_on(today: NaiveDate) -> ClinicContext {
        let cfg = CoreConfig::new(
            PathBuf::from("unused"),
            None,
            FixedOffset::east_opt(0).unwrap(),
        )
        .unwrap();
        ClinicContext::in_memory(Arc::new(cfg), Arc::new(FixedClock::on(today)))
            .expect("in-memory context")
    }
}
