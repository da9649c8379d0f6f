//! Action item management.
//!
//! Adding, resolving and reopening action items, and the per-patient active / inactive /
//! done sets shown next to each patient.

use crate::author::Author;
use crate::completion::Completable;
use crate::ids::{ActionItemId, PatientId, ProviderId, RecordKind};
use crate::models::{ActionItem, NewActionItem};
use crate::reference::LookupKind;
use crate::repositories::shared::{log_transition, ClinicContext};
use crate::scheduler::{action_item_sets, ObligationSets};
use crate::store::ClinicData;
use crate::temporal::Clock;
use crate::ClinicResult;
use serde::Serialize;

/// An action item with its display labels resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActionItemEntry {
    #[serde(flatten)]
    pub item: ActionItem,
    pub instruction_label: String,
    pub attribution: String,
}

impl ActionItemEntry {
    pub(crate) fn build(
        data: &ClinicData,
        item: &ActionItem,
        clock: &dyn Clock,
    ) -> ClinicResult<Self> {
        let author = data.provider_name(item.note.author);
        let completer = item
            .completion
            .completion_author
            .map(|id| data.provider_name(id));

        Ok(Self {
            item: item.clone(),
            instruction_label: data
                .reference
                .require(LookupKind::ActionInstruction, item.instruction)?
                .to_string(),
            attribution: item.attribution(&author, completer.as_deref(), clock),
        })
    }
}

/// Partition a patient's action items as of `clock`'s today and resolve their labels.
pub(crate) fn action_item_entries(
    data: &ClinicData,
    patient: PatientId,
    clock: &dyn Clock,
) -> ClinicResult<ObligationSets<ActionItemEntry>> {
    data.patient(patient)?;
    let sets = action_item_sets(data, patient, clock.today())
        .map(|item| ActionItemEntry::build(data, item, clock));

    Ok(ObligationSets {
        active: sets.active.into_iter().collect::<ClinicResult<_>>()?,
        inactive: sets.inactive.into_iter().collect::<ClinicResult<_>>()?,
        done: sets.done.into_iter().collect::<ClinicResult<_>>()?,
    })
}

#[derive(Clone, Debug)]
pub struct ActionItemService {
    ctx: ClinicContext,
}

impl ActionItemService {
    pub fn new(ctx: ClinicContext) -> Self {
        Self { ctx }
    }

    /// Add an action item for `patient`, written by `provider` now.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::NotFound` for an unknown patient or provider and
    /// `ClinicError::UnknownReference` for an unknown instruction.
    pub fn add(
        &self,
        provider: ProviderId,
        patient: PatientId,
        new: NewActionItem,
    ) -> ClinicResult<ActionItem> {
        let now = self.ctx.now();
        let item = self.ctx.store().write(|data| {
            let author = Author::resolve(data, provider)?;
            let id: ActionItemId = data.allocate();
            let item = ActionItem {
                id,
                note: author.note_meta(patient, now),
                due_date: new.due_date,
                instruction: new.instruction,
                comments: new.comments.trim().to_string(),
                completion: Default::default(),
            };
            data.insert_action_item(item.clone())?;
            Ok(item)
        })?;

        tracing::info!(
            "action item {} added for patient {}, due {}",
            item.id,
            patient,
            item.due_date
        );
        Ok(item)
    }

    /// Mark an action item done by `resolver`, now.
    ///
    /// Marking an item that is already done overwrites its resolution and logs a warning.
    pub fn mark_done(&self, id: ActionItemId, resolver: ProviderId) -> ClinicResult<ActionItem> {
        let now = self.ctx.now();
        let (item, transition) = self.ctx.store().write(|data| {
            data.provider(resolver)?;
            let item = data.action_item_mut(id)?;
            let transition = item.mark_done(resolver, now);
            Ok((item.clone(), transition))
        })?;

        log_transition(RecordKind::ActionItem, id.get(), transition);
        Ok(item)
    }

    /// Reopen an action item. Clearing an open item is tolerated and logs a warning.
    pub fn clear_done(&self, id: ActionItemId) -> ClinicResult<ActionItem> {
        let (item, transition) = self.ctx.store().write(|data| {
            let item = data.action_item_mut(id)?;
            let transition = item.clear_done();
            Ok((item.clone(), transition))
        })?;

        log_transition(RecordKind::ActionItem, id.get(), transition);
        Ok(item)
    }

    pub fn get(&self, id: ActionItemId) -> ClinicResult<ActionItem> {
        self.ctx.store().read(|data| data.action_item(id).cloned())?
    }

    /// The patient's action items as of today.
    pub fn sets(&self, patient: PatientId) -> ClinicResult<ObligationSets<ActionItemEntry>> {
        let clock = self.ctx.clock();
        self.ctx
            .store()
            .read(|data| action_item_entries(data, patient, clock))?
    }
}
