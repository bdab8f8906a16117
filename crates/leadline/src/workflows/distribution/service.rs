use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use super::executor::{DistributionExecutor, ExecutionError};
use super::planner::{Assignment, DecisionEntry, DistributionPlanner, PlanningError};
use crate::workflows::contacts::{Contact, ContactStore, StoreError};

pub const NO_CONTACTS_MESSAGE: &str = "No unassigned contacts to distribute";
pub const NO_ADVISORS_MESSAGE: &str = "No active advisors with available capacity";

/// Caller-facing summary of a distribution run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DistributionReport {
    pub assignments: Vec<Assignment>,
    pub unassigned_contacts: Vec<Contact>,
    pub message: String,
    pub log: Vec<DecisionEntry>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DistributionError {
    #[error("could not load distribution input: {0}")]
    Load(#[source] StoreError),
    #[error("invalid distribution input: {0}")]
    Planning(#[from] PlanningError),
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// Loads unassigned contacts and active advisors, plans, and applies in one batch.
///
/// Runs are not serialised here; callers keep at most one distribution in flight.
pub struct ContactDistributor<S: ?Sized> {
    store: Arc<S>,
    planner: DistributionPlanner,
    executor: DistributionExecutor<S>,
}

impl<S> ContactDistributor<S>
where
    S: ContactStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            executor: DistributionExecutor::new(store.clone()),
            planner: DistributionPlanner::new(),
            store,
        }
    }

    pub fn distribute(&self) -> Result<DistributionReport, DistributionError> {
        let contacts = self
            .store
            .find_unassigned_contacts()
            .map_err(DistributionError::Load)?;
        if contacts.is_empty() {
            info!("distribution skipped: no unassigned contacts");
            return Ok(DistributionReport {
                assignments: Vec::new(),
                unassigned_contacts: Vec::new(),
                message: NO_CONTACTS_MESSAGE.to_string(),
                log: Vec::new(),
            });
        }

        let advisors = self
            .store
            .find_active_advisors()
            .map_err(DistributionError::Load)?;

        let plan = self.planner.plan(&contacts, &advisors)?;
        if plan.assignments.is_empty() {
            info!(
                unassigned = plan.unassigned.len(),
                "distribution skipped: no advisor capacity"
            );
            return Ok(DistributionReport {
                assignments: Vec::new(),
                unassigned_contacts: plan.unassigned,
                message: NO_ADVISORS_MESSAGE.to_string(),
                log: plan.log,
            });
        }

        let result = self.executor.apply(plan)?;
        let message = format!(
            "Distributed {} contact(s); {} left unassigned",
            result.assignments.len(),
            result.unassigned_contacts.len()
        );

        Ok(DistributionReport {
            assignments: result.assignments,
            unassigned_contacts: result.unassigned_contacts,
            message,
            log: result.log,
        })
    }
}
