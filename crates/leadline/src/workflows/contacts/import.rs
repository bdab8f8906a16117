use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::ContactDraft;

/// Failure while reading a bulk contact export.
#[derive(Debug, thiserror::Error)]
pub enum ContactImportError {
    #[error("failed to read contact export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid contact CSV data: {0}")]
    Csv(#[from] csv::Error),
}

/// Reads `name,phone,email,source,notes` exports into scoring drafts.
///
/// Header names are matched case-insensitively; missing optional columns are allowed.
pub struct ContactCsvImporter;

impl ContactCsvImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<ContactDraft>, ContactImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<ContactDraft>, ContactImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = csv_reader
            .headers()?
            .iter()
            .map(|header| header.trim().to_ascii_lowercase())
            .collect::<Vec<_>>();
        csv_reader.set_headers(csv::StringRecord::from(headers));

        let mut drafts = Vec::new();
        for record in csv_reader.deserialize::<ContactRow>() {
            let row = record?;
            if row.is_blank() {
                continue;
            }
            drafts.push(row.into_draft());
        }
        Ok(drafts)
    }
}

#[derive(Debug, Deserialize)]
struct ContactRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    name: Option<String>,
    #[serde(
        default,
        alias = "telefono",
        alias = "mobile",
        deserialize_with = "empty_string_as_none"
    )]
    phone: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    email: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    source: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    notes: Option<String>,
}

impl ContactRow {
    fn is_blank(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.email.is_none()
    }

    fn into_draft(self) -> ContactDraft {
        ContactDraft {
            name: self.name,
            phone: self.phone,
            email: self.email,
            source: self.source,
            notes: self.notes,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
