//! SQLite-backed contact store.
//!
//! Mirrors the relational layout the CRM front end expects: a `contacts` table with a
//! unique phone column and a nullable advisor reference, and an `advisors` table whose
//! load counter is guarded by a `CHECK` against its capacity.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row};
use tracing::{debug, warn};

use super::domain::{
    Advisor, AdvisorId, Contact, ContactId, ContactStatus, NewAdvisor, NewContact, QualityStamp,
};
use super::repository::{ContactStore, StoreError, StoreTransaction};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS advisors (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE COLLATE NOCASE,
    is_active INTEGER NOT NULL DEFAULT 1,
    performance_score REAL NOT NULL DEFAULT 0,
    current_contact_count INTEGER NOT NULL DEFAULT 0,
    max_contacts INTEGER NOT NULL DEFAULT 50,
    CHECK (current_contact_count <= max_contacts)
);
CREATE TABLE IF NOT EXISTS contacts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    phone TEXT NOT NULL UNIQUE,
    email TEXT,
    source TEXT,
    notes TEXT,
    status TEXT NOT NULL DEFAULT 'New',
    quality_score INTEGER NOT NULL DEFAULT 0,
    is_suspicious INTEGER NOT NULL DEFAULT 0,
    ai_details TEXT,
    assigned_advisor_id INTEGER REFERENCES advisors(id),
    contact_count INTEGER NOT NULL DEFAULT 0,
    last_contact_date TEXT,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_contacts_assignment ON contacts (assigned_advisor_id, status);
CREATE INDEX IF NOT EXISTS idx_contacts_quality ON contacts (quality_score);
CREATE INDEX IF NOT EXISTS idx_advisor_availability
    ON advisors (is_active, performance_score, current_contact_count);
";

const CONTACT_COLUMNS: &str = "id, name, phone, email, source, notes, status, quality_score, \
     is_suspicious, ai_details, assigned_advisor_id, contact_count, last_contact_date, created_at";

const ADVISOR_COLUMNS: &str =
    "id, name, email, is_active, performance_score, current_contact_count, max_contacts";

pub struct SqliteContactStore {
    conn: Mutex<Connection>,
}

impl SqliteContactStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("sqlite connection lock poisoned".to_string()))
    }

    fn query_contacts(&self, filter: &str) -> Result<Vec<Contact>, StoreError> {
        let conn = self.lock()?;
        let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts {filter} ORDER BY id");
        let mut stmt = conn.prepare(&sql)?;
        let contacts = stmt
            .query_map([], contact_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(contacts)
    }

    fn query_advisors(&self, filter: &str) -> Result<Vec<Advisor>, StoreError> {
        let conn = self.lock()?;
        let sql = format!("SELECT {ADVISOR_COLUMNS} FROM advisors {filter} ORDER BY id");
        let mut stmt = conn.prepare(&sql)?;
        let advisors = stmt
            .query_map([], advisor_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(advisors)
    }
}

impl ContactStore for SqliteContactStore {
    fn insert_contact(&self, contact: NewContact) -> Result<Contact, StoreError> {
        let conn = self.lock()?;
        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO contacts (name, phone, email, source, notes, status, quality_score, \
             is_suspicious, ai_details, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                contact.name,
                contact.phone,
                contact.email,
                contact.source,
                contact.notes,
                ContactStatus::New.label(),
                contact.quality.quality_score,
                contact.quality.is_suspicious,
                contact.quality.ai_details,
                created_at,
            ],
        )?;
        let id = ContactId(conn.last_insert_rowid());
        let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1");
        Ok(conn.query_row(&sql, params![id.0], contact_from_row)?)
    }

    fn insert_advisor(
        &self,
        advisor: NewAdvisor,
        max_contacts: u32,
    ) -> Result<Advisor, StoreError> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO advisors (name, email, is_active, performance_score, max_contacts) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                advisor.name,
                advisor.email,
                advisor.is_active,
                advisor.performance_score,
                advisor.max_contacts.unwrap_or(max_contacts),
            ],
        )?;
        let id = conn.last_insert_rowid();
        let sql = format!("SELECT {ADVISOR_COLUMNS} FROM advisors WHERE id = ?1");
        Ok(conn.query_row(&sql, params![id], advisor_from_row)?)
    }

    fn fetch_contact(&self, id: ContactId) -> Result<Option<Contact>, StoreError> {
        let conn = self.lock()?;
        let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1");
        Ok(conn
            .query_row(&sql, params![id.0], contact_from_row)
            .optional()?)
    }

    fn fetch_advisor(&self, id: AdvisorId) -> Result<Option<Advisor>, StoreError> {
        let conn = self.lock()?;
        let sql = format!("SELECT {ADVISOR_COLUMNS} FROM advisors WHERE id = ?1");
        Ok(conn
            .query_row(&sql, params![id.0], advisor_from_row)
            .optional()?)
    }

    fn list_contacts(&self) -> Result<Vec<Contact>, StoreError> {
        self.query_contacts("")
    }

    fn list_advisors(&self) -> Result<Vec<Advisor>, StoreError> {
        self.query_advisors("")
    }

    fn update_contact_quality(
        &self,
        id: ContactId,
        quality: QualityStamp,
    ) -> Result<Contact, StoreError> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE contacts SET quality_score = ?1, is_suspicious = ?2, \
             ai_details = ?3 WHERE id = ?4",
            params![
                quality.quality_score,
                quality.is_suspicious,
                quality.ai_details,
                id.0
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::ContactNotFound(id));
        }
        let sql = format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1");
        Ok(conn.query_row(&sql, params![id.0], contact_from_row)?)
    }

    fn find_unassigned_contacts(&self) -> Result<Vec<Contact>, StoreError> {
        self.query_contacts("WHERE assigned_advisor_id IS NULL")
    }

    fn find_active_advisors(&self) -> Result<Vec<Advisor>, StoreError> {
        self.query_advisors("WHERE is_active = 1")
    }

    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>, StoreError> {
        let conn = self.lock()?;
        conn.execute_batch("BEGIN IMMEDIATE")?;
        Ok(Box::new(SqliteTransaction { conn, open: true }))
    }
}

struct SqliteTransaction<'a> {
    conn: MutexGuard<'a, Connection>,
    open: bool,
}

impl SqliteTransaction<'_> {
    fn exists(&self, table: &str, id: i64) -> Result<bool, StoreError> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {table} WHERE id = ?1)");
        Ok(self.conn.query_row(&sql, params![id], |row| row.get(0))?)
    }
}

impl StoreTransaction for SqliteTransaction<'_> {
    fn set_contact_advisor(
        &mut self,
        contact: ContactId,
        advisor: AdvisorId,
    ) -> Result<(), StoreError> {
        if !self.exists("advisors", advisor.0)? {
            return Err(StoreError::AdvisorNotFound(advisor));
        }
        let changed = self.conn.execute(
            "UPDATE contacts SET assigned_advisor_id = ?1 \
             WHERE id = ?2 AND assigned_advisor_id IS NULL",
            params![advisor.0, contact.0],
        )?;
        if changed == 1 {
            return Ok(());
        }
        if self.exists("contacts", contact.0)? {
            Err(StoreError::AlreadyAssigned(contact))
        } else {
            Err(StoreError::ContactNotFound(contact))
        }
    }

    fn increment_advisor_load(&mut self, advisor: AdvisorId, delta: u32) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE advisors SET current_contact_count = current_contact_count + ?1 \
             WHERE id = ?2 AND current_contact_count + ?1 <= max_contacts",
            params![delta, advisor.0],
        )?;
        if changed == 1 {
            return Ok(());
        }

        let load = self
            .conn
            .query_row(
                "SELECT current_contact_count, max_contacts FROM advisors WHERE id = ?1",
                params![advisor.0],
                |row| Ok((row.get::<_, u32>(0)?, row.get::<_, u32>(1)?)),
            )
            .optional()?;
        match load {
            Some((current, max)) => Err(StoreError::CapacityExceeded {
                advisor,
                current,
                max,
                requested: delta,
            }),
            None => Err(StoreError::AdvisorNotFound(advisor)),
        }
    }

    fn commit(mut self: Box<Self>) -> Result<(), StoreError> {
        self.conn.execute_batch("COMMIT")?;
        self.open = false;
        Ok(())
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        match self.conn.execute_batch("ROLLBACK") {
            Ok(()) => debug!("sqlite transaction rolled back"),
            Err(err) => warn!(error = %err, "failed to roll back sqlite transaction"),
        }
    }
}

fn contact_from_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    let status: String = row.get("status")?;
    let status = status
        .parse::<ContactStatus>()
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(err)))?;

    Ok(Contact {
        id: ContactId(row.get("id")?),
        name: row.get("name")?,
        phone: row.get("phone")?,
        email: row.get("email")?,
        source: row.get("source")?,
        notes: row.get("notes")?,
        status,
        quality_score: row.get("quality_score")?,
        is_suspicious: row.get("is_suspicious")?,
        ai_details: row.get("ai_details")?,
        assigned_advisor_id: row
            .get::<_, Option<i64>>("assigned_advisor_id")?
            .map(AdvisorId),
        contact_count: row.get("contact_count")?,
        last_contact_date: row.get("last_contact_date")?,
        created_at: row.get("created_at")?,
    })
}

fn advisor_from_row(row: &Row<'_>) -> rusqlite::Result<Advisor> {
    Ok(Advisor {
        id: AdvisorId(row.get("id")?),
        name: row.get("name")?,
        email: row.get("email")?,
        is_active: row.get("is_active")?,
        performance_score: row.get("performance_score")?,
        current_contact_count: row.get("current_contact_count")?,
        max_contacts: row.get("max_contacts")?,
    })
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, _)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                StoreError::Conflict(err.to_string())
            }
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}
