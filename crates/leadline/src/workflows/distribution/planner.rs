use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::workflows::contacts::{Advisor, AdvisorId, Contact, ContactId};

/// One contact-to-advisor pairing decided by the planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub contact_id: ContactId,
    pub contact_name: String,
    pub quality_score: u8,
    pub advisor_id: AdvisorId,
    pub advisor_name: String,
}

/// Category of a planner or executor log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    Assigned,
    Unassigned,
    NoCapacity,
    Committed,
    RolledBack,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionEntry {
    pub kind: DecisionKind,
    pub message: String,
}

impl DecisionEntry {
    pub fn new(kind: DecisionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Pure output of a planning pass; nothing has been written yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPlan {
    pub assignments: Vec<Assignment>,
    pub unassigned: Vec<Contact>,
    pub log: Vec<DecisionEntry>,
}

impl AssignmentPlan {
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

/// Input the planner refuses to work with.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlanningError {
    #[error("contact {0} appears more than once in the distribution input")]
    DuplicateContact(ContactId),
    #[error("advisor {0} appears more than once in the distribution input")]
    DuplicateAdvisor(AdvisorId),
    #[error("contact {0} is already assigned to an advisor")]
    ContactAlreadyAssigned(ContactId),
}

struct Slot<'a> {
    advisor: &'a Advisor,
    load: u32,
}

/// Greedy planner: best contacts first, least-loaded advisor first, performance as tie-break.
#[derive(Debug, Clone, Copy, Default)]
pub struct DistributionPlanner;

impl DistributionPlanner {
    pub fn new() -> Self {
        Self
    }

    pub fn plan(
        &self,
        contacts: &[Contact],
        advisors: &[Advisor],
    ) -> Result<AssignmentPlan, PlanningError> {
        check_input(contacts, advisors)?;

        let mut plan = AssignmentPlan::default();
        if contacts.is_empty() {
            return Ok(plan);
        }

        let mut slots: BTreeMap<AdvisorId, Slot<'_>> = advisors
            .iter()
            .filter(|advisor| advisor.can_accept())
            .map(|advisor| {
                (
                    advisor.id,
                    Slot {
                        advisor,
                        load: advisor.current_contact_count,
                    },
                )
            })
            .collect();

        if slots.is_empty() {
            plan.log.push(DecisionEntry::new(
                DecisionKind::NoCapacity,
                format!(
                    "no active advisor has capacity; {} contact(s) left unassigned",
                    contacts.len()
                ),
            ));
            plan.unassigned = contacts.to_vec();
            return Ok(plan);
        }

        let mut ordered: Vec<&Contact> = contacts.iter().collect();
        ordered.sort_by(|a, b| {
            b.quality_score
                .cmp(&a.quality_score)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| a.id.cmp(&b.id))
        });

        for contact in ordered {
            let chosen = slots
                .values_mut()
                .filter(|slot| slot.load < slot.advisor.max_contacts)
                .min_by(|a, b| candidate_order(a, b));

            match chosen {
                Some(slot) => {
                    slot.load += 1;
                    plan.log.push(DecisionEntry::new(
                        DecisionKind::Assigned,
                        format!(
                            "contact {} ({}, score {}) -> advisor {} ({}), load {}/{}",
                            contact.id,
                            contact.name,
                            contact.quality_score,
                            slot.advisor.id,
                            slot.advisor.name,
                            slot.load,
                            slot.advisor.max_contacts
                        ),
                    ));
                    plan.assignments.push(Assignment {
                        contact_id: contact.id,
                        contact_name: contact.name.clone(),
                        quality_score: contact.quality_score,
                        advisor_id: slot.advisor.id,
                        advisor_name: slot.advisor.name.clone(),
                    });
                }
                None => {
                    plan.log.push(DecisionEntry::new(
                        DecisionKind::Unassigned,
                        format!(
                            "contact {} ({}, score {}) left unassigned: every advisor is at capacity",
                            contact.id, contact.name, contact.quality_score
                        ),
                    ));
                    plan.unassigned.push(contact.clone());
                }
            }
        }

        debug!(
            assigned = plan.assignments.len(),
            unassigned = plan.unassigned.len(),
            "distribution plan built"
        );
        Ok(plan)
    }
}

// Lower live load first, then higher performance, then lower id so ties stay stable.
fn candidate_order(a: &Slot<'_>, b: &Slot<'_>) -> Ordering {
    a.load
        .cmp(&b.load)
        .then_with(|| {
            b.advisor
                .performance_score
                .total_cmp(&a.advisor.performance_score)
        })
        .then_with(|| a.advisor.id.cmp(&b.advisor.id))
}

fn check_input(contacts: &[Contact], advisors: &[Advisor]) -> Result<(), PlanningError> {
    let mut seen_contacts = HashSet::new();
    for contact in contacts {
        if !seen_contacts.insert(contact.id) {
            return Err(PlanningError::DuplicateContact(contact.id));
        }
        if contact.assigned_advisor_id.is_some() {
            return Err(PlanningError::ContactAlreadyAssigned(contact.id));
        }
    }

    let mut seen_advisors = HashSet::new();
    for advisor in advisors {
        if !seen_advisors.insert(advisor.id) {
            return Err(PlanningError::DuplicateAdvisor(advisor.id));
        }
    }
    Ok(())
}
