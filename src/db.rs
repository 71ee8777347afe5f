use anyhow::{Context, Result};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

use crate::models::ApplicationRecord;

/// Storage slot holding the serialized application list.
const APPLICATIONS_SLOT: &str = "jobApplications";

pub struct Database {
    conn: Connection,
    path: PathBuf,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database at {}", path.display()))?;
        let db = Self {
            conn,
            path: path.to_path_buf(),
        };
        db.init()?;
        Ok(db)
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub fn default_path() -> PathBuf {
        // Use XDG data directory or fallback
        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "jobtrack") {
            proj_dirs.data_dir().join("jobtrack.db")
        } else {
            PathBuf::from("jobtrack.db")
        }
    }

    fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS storage (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;
        Ok(())
    }

    /// Load the stored applications. A missing or unreadable slot is an empty list.
    pub fn load_applications(&self) -> Vec<ApplicationRecord> {
        let raw = match self.read_slot(APPLICATIONS_SLOT) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read '{}' slot: {:#}", APPLICATIONS_SLOT, e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<ApplicationRecord>>(&raw) {
            Ok(records) => {
                debug!("Loaded {} application(s) from {}", records.len(), self.path.display());
                records
            }
            Err(e) => {
                warn!("Stored applications are unreadable, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    pub fn save_applications(&self, records: &[ApplicationRecord]) -> Result<()> {
        let raw = serde_json::to_string(records).context("Failed to serialize applications")?;
        self.write_slot(APPLICATIONS_SLOT, &raw)?;
        debug!("Saved {} application(s)", records.len());
        Ok(())
    }

    fn read_slot(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM storage WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .with_context(|| format!("Failed to read storage slot '{}'", key))
    }

    fn write_slot(&self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO storage (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
                params![key, value],
            )
            .with_context(|| format!("Failed to write storage slot '{}'", key))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;

    fn sample(id: i64) -> ApplicationRecord {
        ApplicationRecord {
            id,
            job_title: "Staff Engineer".to_string(),
            company: "Hooli".to_string(),
            location: "Remote".to_string(),
            salary_range: String::new(),
            application_link: String::new(),
            date_applied: "2024-04-02".to_string(),
            notes: "referral".to_string(),
            status: Status::Offer,
            specific_salary: "$180,000".to_string(),
        }
    }

    #[test]
    fn test_load_from_fresh_database_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("jobtrack.db")).unwrap();
        assert!(db.load_applications().is_empty());
    }

    #[test]
    fn test_save_then_reopen_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("jobtrack.db");
        {
            let db = Database::open(&path).unwrap();
            db.save_applications(&[sample(1), sample(2)]).unwrap();
            // Second save replaces the slot rather than appending
            db.save_applications(&[sample(2)]).unwrap();
        }
        let db = Database::open(&path).unwrap();
        let loaded = db.load_applications();
        assert_eq!(loaded, vec![sample(2)]);
    }

    #[test]
    fn test_corrupt_slot_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("jobtrack.db")).unwrap();
        db.write_slot(APPLICATIONS_SLOT, "{not json").unwrap();
        assert!(db.load_applications().is_empty());

        db.write_slot(APPLICATIONS_SLOT, r#"[{"id":1,"status":"Ghosted"}]"#).unwrap();
        assert!(db.load_applications().is_empty());
    }
}
