use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use super::planner::{Assignment, AssignmentPlan, DecisionEntry, DecisionKind};
use crate::workflows::contacts::{Contact, ContactId, ContactStore, StoreError};

/// Outcome of a committed plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub assignments: Vec<Assignment>,
    pub unassigned_contacts: Vec<Contact>,
    pub log: Vec<DecisionEntry>,
}

/// Persistence failure during a batch. The batch was rolled back before this was returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("distribution batch rolled back: {source}")]
pub struct ExecutionError {
    #[source]
    pub source: StoreError,
    /// Contact whose write failed; `None` when the commit itself failed.
    pub failed_at: Option<ContactId>,
    /// The plan exactly as received, none of it applied.
    pub plan: Box<AssignmentPlan>,
}

/// Applies a plan inside one store transaction.
pub struct DistributionExecutor<S: ?Sized> {
    store: Arc<S>,
}

impl<S> DistributionExecutor<S>
where
    S: ContactStore + ?Sized,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Apply every assignment in plan order; any failure rolls back the whole batch.
    pub fn apply(&self, plan: AssignmentPlan) -> Result<ExecutionResult, ExecutionError> {
        if plan.assignments.is_empty() {
            return Ok(ExecutionResult {
                assignments: Vec::new(),
                unassigned_contacts: plan.unassigned,
                log: plan.log,
            });
        }

        let mut tx = match self.store.begin() {
            Ok(tx) => tx,
            Err(source) => return Err(rejected(source, None, plan)),
        };

        let failure = plan.assignments.iter().find_map(|assignment| {
            tx.set_contact_advisor(assignment.contact_id, assignment.advisor_id)
                .and_then(|_| tx.increment_advisor_load(assignment.advisor_id, 1))
                .err()
                .map(|source| (assignment.contact_id, assignment.advisor_id, source))
        });

        if let Some((contact, advisor, source)) = failure {
            tx.rollback();
            error!(
                contact = %contact,
                advisor = %advisor,
                error = %source,
                "distribution batch rolled back"
            );
            return Err(rejected(source, Some(contact), plan));
        }

        if let Err(source) = tx.commit() {
            error!(error = %source, "distribution commit failed");
            return Err(rejected(source, None, plan));
        }

        let AssignmentPlan {
            assignments,
            unassigned,
            mut log,
        } = plan;
        log.push(DecisionEntry::new(
            DecisionKind::Committed,
            format!("committed {} assignment(s)", assignments.len()),
        ));
        info!(
            assigned = assignments.len(),
            unassigned = unassigned.len(),
            "distribution batch committed"
        );

        Ok(ExecutionResult {
            assignments,
            unassigned_contacts: unassigned,
            log,
        })
    }
}

fn rejected(
    source: StoreError,
    failed_at: Option<ContactId>,
    mut plan: AssignmentPlan,
) -> ExecutionError {
    plan.log.push(DecisionEntry::new(
        DecisionKind::RolledBack,
        format!("batch rolled back, nothing applied: {source}"),
    ));
    ExecutionError {
        source,
        failed_at,
        plan: Box::new(plan),
    }
}
