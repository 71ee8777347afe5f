use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::db::Database;
use crate::filter::Filter;
use crate::models::{ApplicationRecord, NewApplication, Status};
use crate::state::Applications;
use crate::stats::{compute_stats, StatsReport};

/// Owns the collection and its storage. Every mutation is persisted before returning.
pub struct Tracker {
    db: Database,
    apps: Applications,
}

impl Tracker {
    pub fn load(db: Database) -> Self {
        let apps = Applications::from_records(db.load_applications());
        debug!(
            "{} application(s) loaded, next id is {}",
            apps.records().len(),
            apps.next_id()
        );
        Self { db, apps }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn applications(&self) -> &Applications {
        &self.apps
    }

    pub fn get(&self, id: i64) -> Option<&ApplicationRecord> {
        self.apps.get(id)
    }

    /// Like `get`, but an unknown id is an error.
    pub fn require(&self, id: i64) -> Result<&ApplicationRecord> {
        self.get(id).ok_or_else(|| anyhow!("Application #{} not found", id))
    }

    pub fn filtered(&self, filter: &Filter) -> Vec<ApplicationRecord> {
        self.apps.filtered(filter).cloned().collect()
    }

    /// Stats always cover the whole collection, whatever is filtered on screen.
    pub fn stats(&self, now: DateTime<Utc>) -> StatsReport {
        compute_stats(self.apps.records(), now)
    }

    pub fn add(&mut self, new: NewApplication) -> Result<i64> {
        let id = self.commit(|apps| apps.add(new))?;
        info!("Added application #{}", id);
        Ok(id)
    }

    pub fn update_status(&mut self, id: i64, status: Status, specific_salary: &str) -> Result<()> {
        self.commit(|apps| apps.update_status(id, status, specific_salary))?;
        info!("Application #{} is now {}", id, status);
        Ok(())
    }

    pub fn delete(&mut self, id: i64) -> Result<()> {
        self.commit(|apps| {
            if apps.delete(id) {
                Ok(())
            } else {
                Err(anyhow!("Application #{} not found", id))
            }
        })?;
        info!("Deleted application #{}", id);
        Ok(())
    }

    pub fn delete_many(&mut self, ids: &[i64]) -> Result<usize> {
        let removed = self.commit(|apps| Ok(apps.delete_many(ids)))?;
        info!("Deleted {} of {} selected application(s)", removed, ids.len());
        Ok(removed)
    }

    /// Apply `change` to a copy, persist it, and only then replace the
    /// in-memory collection. A failed save leaves memory as it was.
    fn commit<T>(&mut self, change: impl FnOnce(&mut Applications) -> Result<T>) -> Result<T> {
        let mut next = self.apps.clone();
        let value = change(&mut next)?;
        self.db.save_applications(next.records())?;
        self.apps = next;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn open(path: &Path) -> Tracker {
        Tracker::load(Database::open(path).unwrap())
    }

    fn new_app(title: &str, date: &str) -> NewApplication {
        NewApplication {
            job_title: title.to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            date_applied: date.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_mutations_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobtrack.db");
        {
            let mut tracker = open(&path);
            let a = tracker.add(new_app("Backend", "2024-06-01")).unwrap();
            let b = tracker.add(new_app("Frontend", "2024-06-02")).unwrap();
            tracker.add(new_app("Infra", "2024-06-03")).unwrap();
            tracker.update_status(a, Status::Offer, "$110,000").unwrap();
            tracker.delete(b).unwrap();
        }

        let tracker = open(&path);
        let records = tracker.applications().records();
        assert_eq!(records.len(), 2);
        assert_eq!(tracker.get(1).unwrap().status, Status::Offer);
        assert_eq!(tracker.get(1).unwrap().specific_salary, "$110,000");
        assert!(tracker.get(2).is_none());
        // Counter resumes past the highest stored id
        assert_eq!(tracker.applications().next_id(), 4);
    }

    #[test]
    fn test_failed_save_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobtrack.db");
        let mut tracker = open(&path);
        let id = tracker.add(new_app("Backend", "2024-06-01")).unwrap();

        // Pull the table out from under the tracker so the next save fails
        let conn = rusqlite::Connection::open(&path).unwrap();
        conn.execute_batch("DROP TABLE storage;").unwrap();

        assert!(tracker.add(new_app("Frontend", "2024-06-02")).is_err());
        assert!(tracker.update_status(id, Status::Rejected, "").is_err());
        assert!(tracker.delete(id).is_err());
        assert!(tracker.delete_many(&[id]).is_err());

        let records = tracker.applications().records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, Status::Applied);
        assert_eq!(tracker.applications().next_id(), 2);
    }

    #[test]
    fn test_delete_unknown_id_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut tracker = open(&dir.path().join("jobtrack.db"));
        assert!(tracker.delete(5).is_err());
    }

    #[test]
    fn test_require_unknown_id_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut tracker = open(&dir.path().join("jobtrack.db"));
        let id = tracker.add(new_app("Backend", "2024-06-01")).unwrap();
        assert_eq!(tracker.require(id).unwrap().job_title, "Backend");
        let err = tracker.require(42).unwrap_err();
        assert_eq!(err.to_string(), "Application #42 not found");
    }

    #[test]
    fn test_bulk_delete() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jobtrack.db");
        {
            let mut tracker = open(&path);
            for i in 0..4 {
                tracker.add(new_app(&format!("Job {}", i), "2024-06-01")).unwrap();
            }
            assert_eq!(tracker.delete_many(&[1, 3]).unwrap(), 2);
        }
        let tracker = open(&path);
        let ids: Vec<i64> = tracker.applications().records().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 4]);
    }

    #[test]
    fn test_stats_ignore_filter() {
        let dir = tempfile::tempdir().unwrap();
        let mut tracker = open(&dir.path().join("jobtrack.db"));
        tracker.add(new_app("Rust", "2024-06-01")).unwrap();
        tracker.add(new_app("Go", "2024-06-01")).unwrap();

        let filter = Filter::new(Some("rust"), None);
        assert_eq!(tracker.filtered(&filter).len(), 1);

        let now = DateTime::parse_from_rfc3339("2024-06-02T00:00:00Z").unwrap().with_timezone(&Utc);
        let report = tracker.stats(now);
        assert_eq!(report.total, 2);
        assert_eq!(report.location_breakdown.get("Remote"), Some(&2));
    }
}
