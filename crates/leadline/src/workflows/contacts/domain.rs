use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier wrapper for stored contacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(pub i64);

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier wrapper for advisors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdvisorId(pub i64);

impl fmt::Display for AdvisorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pipeline stage a contact moves through as advisors work it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ContactStatus {
    #[default]
    New,
    Contacted,
    FollowUp,
    NotInterested,
    Converted,
}

impl ContactStatus {
    pub const ALL: [ContactStatus; 5] = [
        ContactStatus::New,
        ContactStatus::Contacted,
        ContactStatus::FollowUp,
        ContactStatus::NotInterested,
        ContactStatus::Converted,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ContactStatus::New => "New",
            ContactStatus::Contacted => "Contacted",
            ContactStatus::FollowUp => "FollowUp",
            ContactStatus::NotInterested => "NotInterested",
            ContactStatus::Converted => "Converted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown contact status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for ContactStatus {
    type Err = UnknownStatus;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized: String = value
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "new" => Ok(ContactStatus::New),
            "contacted" => Ok(ContactStatus::Contacted),
            "followup" => Ok(ContactStatus::FollowUp),
            "notinterested" => Ok(ContactStatus::NotInterested),
            "converted" => Ok(ContactStatus::Converted),
            _ => Err(UnknownStatus(value.to_string())),
        }
    }
}

/// Sales lead as persisted by the contact store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub status: ContactStatus,
    pub quality_score: u8,
    pub is_suspicious: bool,
    pub ai_details: Option<Value>,
    pub assigned_advisor_id: Option<AdvisorId>,
    pub contact_count: u32,
    pub last_contact_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Contact {
    pub fn draft(&self) -> ContactDraft {
        ContactDraft {
            name: Some(self.name.clone()),
            phone: Some(self.phone.clone()),
            email: self.email.clone(),
            source: self.source.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Human agent who works assigned contacts up to a capacity ceiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Advisor {
    pub id: AdvisorId,
    pub name: String,
    pub email: String,
    pub is_active: bool,
    pub performance_score: f64,
    pub current_contact_count: u32,
    pub max_contacts: u32,
}

impl Advisor {
    pub fn available_capacity(&self) -> u32 {
        self.max_contacts.saturating_sub(self.current_contact_count)
    }

    pub fn can_accept(&self) -> bool {
        self.is_active && self.current_contact_count < self.max_contacts
    }
}

/// Loosely-typed contact fields as received from intake, imports, or the scoring API.
///
/// Every field is optional so that scoring can run against any input shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ContactDraft {
    pub fn trimmed_name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Derived quality fields written back onto a contact after scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityStamp {
    pub quality_score: u8,
    pub is_suspicious: bool,
    pub ai_details: Option<Value>,
}

/// Validated contact ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewContact {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub source: Option<String>,
    pub notes: Option<String>,
    pub quality: QualityStamp,
}

/// Administrative input for a new advisor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAdvisor {
    pub name: String,
    pub email: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub performance_score: f64,
    #[serde(default)]
    pub max_contacts: Option<u32>,
}

fn default_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_loose_labels() {
        assert_eq!("Not Interested".parse(), Ok(ContactStatus::NotInterested));
        assert_eq!("follow_up".parse(), Ok(ContactStatus::FollowUp));
        assert!("archived".parse::<ContactStatus>().is_err());
    }

    #[test]
    fn advisor_capacity_saturates() {
        let advisor = Advisor {
            id: AdvisorId(1),
            name: "Alfa".to_string(),
            email: "alfa@example.com".to_string(),
            is_active: true,
            performance_score: 80.0,
            current_contact_count: 7,
            max_contacts: 5,
        };
        assert_eq!(advisor.available_capacity(), 0);
        assert!(!advisor.can_accept());
    }

    #[test]
    fn trimmed_name_ignores_blank_values() {
        let draft = ContactDraft {
            name: Some("   ".to_string()),
            ..ContactDraft::default()
        };
        assert!(draft.trimmed_name().is_none());
    }
}
