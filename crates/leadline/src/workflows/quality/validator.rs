use std::sync::OnceLock;

use phonenumber::{country, Mode};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::analysis::{IssueSource, QualityNote};
use crate::workflows::contacts::ContactDraft;

fn re_email() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*\.[A-Za-z]{2,}$",
        )
        .expect("email pattern compiles")
    })
}

fn re_placeholder() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(test|demo|fake)").expect("placeholder pattern compiles"))
}

fn re_keyboard_mash() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(asdf|qwerty)").expect("keyboard pattern compiles"))
}

/// How much of a "first + last" name the contact carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NameCompleteness {
    Full,
    Partial,
    Missing,
}

/// Name shapes that usually indicate test, placeholder, or junk data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspiciousPattern {
    PlaceholderPrefix,
    AllDigits,
    RepeatedCharacters,
    KeyboardMash,
    TooShort,
    SingleCase,
}

impl SuspiciousPattern {
    pub fn describe(&self) -> &'static str {
        match self {
            SuspiciousPattern::PlaceholderPrefix => "starts with a placeholder word",
            SuspiciousPattern::AllDigits => "contains only digits",
            SuspiciousPattern::RepeatedCharacters => "repeats the same character three times",
            SuspiciousPattern::KeyboardMash => "contains a keyboard sequence",
            SuspiciousPattern::TooShort => "is one or two characters long",
            SuspiciousPattern::SingleCase => "is written entirely in one case",
        }
    }
}

/// Deterministic field checks for a contact draft.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub phone_valid: bool,
    pub normalized_phone: Option<String>,
    pub email_present: bool,
    pub email_valid: bool,
    pub name: NameCompleteness,
    pub has_required_fields: bool,
    pub suspicious_pattern: Option<SuspiciousPattern>,
    pub issues: Vec<QualityNote>,
    pub recommendations: Vec<QualityNote>,
}

impl ValidationReport {
    pub fn is_suspicious_by_pattern(&self) -> bool {
        self.suspicious_pattern.is_some()
    }
}

/// Pure validator; the only configuration is the region used for national phone formats.
#[derive(Debug, Clone, Copy)]
pub struct Validator {
    region: country::Id,
}

impl Validator {
    pub fn new(region: country::Id) -> Self {
        Self { region }
    }

    pub fn region(&self) -> country::Id {
        self.region
    }

    /// Parse `raw` in the configured region and return its E.164 form when dialable.
    pub fn normalize_phone(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let number = phonenumber::parse(Some(self.region), trimmed).ok()?;
        if !phonenumber::is_valid(&number) {
            return None;
        }
        Some(number.format().mode(Mode::E164).to_string())
    }

    pub fn is_valid_email(&self, raw: &str) -> bool {
        let trimmed = raw.trim();
        trimmed.len() <= 254 && re_email().is_match(trimmed)
    }

    pub fn validate(&self, draft: &ContactDraft) -> ValidationReport {
        let mut issues = Vec::new();
        let mut recommendations = Vec::new();

        let normalized_phone = draft
            .phone
            .as_deref()
            .and_then(|phone| self.normalize_phone(phone));
        let phone_valid = normalized_phone.is_some();
        if !phone_valid {
            issues.push(QualityNote::validator(format!(
                "invalid or missing phone number: {}",
                draft.phone.as_deref().unwrap_or("N/A")
            )));
            recommendations.push(QualityNote::validator(
                "verify the phone number and store it in international format",
            ));
        }

        let email = draft
            .email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty());
        let email_present = email.is_some();
        let email_valid = email.map(|email| self.is_valid_email(email)).unwrap_or(false);
        if let (Some(email), false) = (email, email_valid) {
            issues.push(QualityNote::validator(format!(
                "invalid email format: {email}"
            )));
            recommendations.push(QualityNote::validator(
                "correct the email address or remove it",
            ));
        }

        let name = name_completeness(draft.trimmed_name());
        match name {
            NameCompleteness::Full => {}
            NameCompleteness::Partial => {
                issues.push(QualityNote::validator(format!(
                    "name looks incomplete: {}",
                    draft.trimmed_name().unwrap_or_default()
                )));
                recommendations.push(QualityNote::validator(
                    "record both first and last name",
                ));
            }
            NameCompleteness::Missing => {
                issues.push(QualityNote::validator(format!(
                    "name missing or too short: {}",
                    draft.trimmed_name().unwrap_or("N/A")
                )));
                recommendations.push(QualityNote::validator(
                    "record the contact's full name",
                ));
            }
        }

        let has_required_fields = draft.trimmed_name().is_some() && phone_valid;
        if !has_required_fields {
            issues.push(QualityNote::validator(
                "basic information incomplete (name and/or phone)",
            ));
            recommendations.push(QualityNote::validator(
                "fill in every required contact field",
            ));
        }

        let suspicious_pattern = draft.trimmed_name().and_then(suspicious_name_pattern);
        if let (Some(pattern), Some(name)) = (suspicious_pattern, draft.trimmed_name()) {
            issues.push(QualityNote::new(
                IssueSource::Pattern,
                format!("name \"{name}\" looks suspicious: it {}", pattern.describe()),
            ));
            recommendations.push(QualityNote::new(
                IssueSource::Pattern,
                "review whether the contact name is genuine",
            ));
        }

        ValidationReport {
            phone_valid,
            normalized_phone,
            email_present,
            email_valid,
            name,
            has_required_fields,
            suspicious_pattern,
            issues,
            recommendations,
        }
    }
}

fn name_completeness(name: Option<&str>) -> NameCompleteness {
    match name {
        Some(name) if name.chars().count() >= 3 => {
            if name.contains(char::is_whitespace) {
                NameCompleteness::Full
            } else {
                NameCompleteness::Partial
            }
        }
        _ => NameCompleteness::Missing,
    }
}

/// First matching junk-name pattern, checked in a fixed order.
pub fn suspicious_name_pattern(name: &str) -> Option<SuspiciousPattern> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    if re_placeholder().is_match(name) {
        return Some(SuspiciousPattern::PlaceholderPrefix);
    }
    if name.chars().all(|c| c.is_ascii_digit()) {
        return Some(SuspiciousPattern::AllDigits);
    }
    if has_repeated_run(name, 3) {
        return Some(SuspiciousPattern::RepeatedCharacters);
    }
    if re_keyboard_mash().is_match(name) {
        return Some(SuspiciousPattern::KeyboardMash);
    }
    if name.chars().count() <= 2 {
        return Some(SuspiciousPattern::TooShort);
    }
    if name.chars().all(|c| c.is_ascii_lowercase()) || name.chars().all(|c| c.is_ascii_uppercase())
    {
        return Some(SuspiciousPattern::SingleCase);
    }
    None
}

// `regex` has no backreferences, so runs are counted by hand.
fn has_repeated_run(value: &str, run: usize) -> bool {
    let mut previous = None;
    let mut length = 0;
    for c in value.chars() {
        if Some(c) == previous {
            length += 1;
        } else {
            previous = Some(c);
            length = 1;
        }
        if length >= run {
            return true;
        }
    }
    false
}
