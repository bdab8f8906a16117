//! Contact and advisor records, their storage backends, and the caller-facing desk service.

pub mod domain;
pub mod import;
mod memory;
pub mod repository;
pub mod router;
pub mod service;
mod sqlite;

#[cfg(test)]
mod tests;

pub use domain::{
    Advisor, AdvisorId, Contact, ContactDraft, ContactId, ContactStatus, NewAdvisor, NewContact,
    QualityStamp, UnknownStatus,
};
pub use import::{ContactCsvImporter, ContactImportError};
pub use memory::MemoryContactStore;
pub use repository::{ContactStore, StoreError, StoreTransaction};
pub use router::contact_router;
pub use service::{
    AdvisorWorkload, BulkAnalysis, BulkAnalysisEntry, ContactDeskService, ContactServiceError,
    DatabaseHealth, Improvement, ImprovementKind, ImprovementPriority, ImprovementReport,
    IntakeError, QualityDistribution, RegisteredContact, ScoreBuckets,
};
pub use sqlite::SqliteContactStore;
