//! Roster queries over the store.

use crate::repositories::shared::ClinicContext;
use crate::roster::{run, PatientSummary, RosterQuery};
use crate::ClinicResult;

#[derive(Clone, Debug)]
pub struct RosterService {
    ctx: ClinicContext,
}

impl RosterService {
    pub fn new(ctx: ClinicContext) -> Self {
        Self { ctx }
    }

    /// Run a roster query from raw `sort` and `filter` parameters.
    ///
    /// # Errors
    ///
    /// Returns `ClinicError::UnsupportedSort` or `ClinicError::UnsupportedFilter` for
    /// unrecognised parameter values.
    pub fn query(
        &self,
        sort: Option<&str>,
        filter: Option<&str>,
    ) -> ClinicResult<Vec<PatientSummary>> {
        let query = RosterQuery::from_params(sort, filter)?;
        self.run(query)
    }

    pub fn run(&self, query: RosterQuery) -> ClinicResult<Vec<PatientSummary>> {
        let today = self.ctx.today();
        self.ctx
            .store()
            .read(|data| run(data, query, today, self.ctx.clock()))?
    }
}
