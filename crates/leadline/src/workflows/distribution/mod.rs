//! Batch assignment of unassigned contacts to advisors with spare capacity.

mod executor;
mod planner;
mod service;

#[cfg(test)]
mod tests;

pub use executor::{DistributionExecutor, ExecutionError, ExecutionResult};
pub use planner::{
    Assignment, AssignmentPlan, DecisionEntry, DecisionKind, DistributionPlanner, PlanningError,
};
pub use service::{
    ContactDistributor, DistributionError, DistributionReport, NO_ADVISORS_MESSAGE,
    NO_CONTACTS_MESSAGE,
};

use serde::{Deserialize, Serialize};

/// Knobs for advisor capacity when the caller does not supply one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionOptions {
    /// Ceiling applied to advisors registered without an explicit `max_contacts`.
    pub default_max_contacts: u32,
}

impl Default for DistributionOptions {
    fn default() -> Self {
        Self {
            default_max_contacts: 50,
        }
    }
}
