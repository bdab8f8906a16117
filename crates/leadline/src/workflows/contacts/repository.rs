use super::domain::{
    Advisor, AdvisorId, Contact, ContactId, NewAdvisor, NewContact, QualityStamp,
};

/// Storage abstraction so scoring and distribution can run against any backend.
///
/// Writes that must land together go through [`ContactStore::begin`]; dropping the
/// returned transaction without calling [`StoreTransaction::commit`] rolls it back.
pub trait ContactStore: Send + Sync {
    fn insert_contact(&self, contact: NewContact) -> Result<Contact, StoreError>;
    fn insert_advisor(&self, advisor: NewAdvisor, max_contacts: u32)
        -> Result<Advisor, StoreError>;
    fn fetch_contact(&self, id: ContactId) -> Result<Option<Contact>, StoreError>;
    fn fetch_advisor(&self, id: AdvisorId) -> Result<Option<Advisor>, StoreError>;
    fn list_contacts(&self) -> Result<Vec<Contact>, StoreError>;
    fn list_advisors(&self) -> Result<Vec<Advisor>, StoreError>;
    fn update_contact_quality(
        &self,
        id: ContactId,
        quality: QualityStamp,
    ) -> Result<Contact, StoreError>;
    fn find_unassigned_contacts(&self) -> Result<Vec<Contact>, StoreError>;
    fn find_active_advisors(&self) -> Result<Vec<Advisor>, StoreError>;
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>, StoreError>;
}

/// Unit of work spanning several assignment writes.
pub trait StoreTransaction {
    /// Point an unassigned contact at an advisor.
    fn set_contact_advisor(
        &mut self,
        contact: ContactId,
        advisor: AdvisorId,
    ) -> Result<(), StoreError>;

    /// Atomically add `delta` to the advisor's load, refusing to pass `max_contacts`.
    fn increment_advisor_load(&mut self, advisor: AdvisorId, delta: u32)
        -> Result<(), StoreError>;

    fn commit(self: Box<Self>) -> Result<(), StoreError>;

    fn rollback(self: Box<Self>) {}
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("contact {0} not found")]
    ContactNotFound(ContactId),
    #[error("advisor {0} not found")]
    AdvisorNotFound(AdvisorId),
    #[error("contact {0} is already assigned")]
    AlreadyAssigned(ContactId),
    #[error("advisor {advisor} cannot take {requested} more contact(s) ({current}/{max})")]
    CapacityExceeded {
        advisor: AdvisorId,
        current: u32,
        max: u32,
        requested: u32,
    },
    #[error("record already exists: {0}")]
    Conflict(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
