use anyhow::{anyhow, bail, Result};
use std::collections::HashSet;

use crate::filter::Filter;
use crate::models::{ApplicationRecord, NewApplication, Status};

/// In-memory application collection plus the id counter.
#[derive(Debug, Clone)]
pub struct Applications {
    records: Vec<ApplicationRecord>,
    next_id: i64,
}

impl Default for Applications {
    fn default() -> Self {
        Self::from_records(Vec::new())
    }
}

impl Applications {
    pub fn from_records(records: Vec<ApplicationRecord>) -> Self {
        let next_id = records.iter().map(|r| r.id).max().map_or(1, |max| max + 1);
        Self { records, next_id }
    }

    pub fn records(&self) -> &[ApplicationRecord] {
        &self.records
    }

    pub fn get(&self, id: i64) -> Option<&ApplicationRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.get(id).is_some()
    }

    pub fn filtered<'a>(&'a self, filter: &'a Filter) -> impl Iterator<Item = &'a ApplicationRecord> + 'a {
        self.records.iter().filter(move |r| filter.matches(r))
    }

    pub fn next_id(&self) -> i64 {
        self.next_id
    }

    pub fn allocate_id(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn add(&mut self, new: NewApplication) -> Result<i64> {
        if new.job_title.trim().is_empty() {
            bail!("Job title is required");
        }
        if new.company.trim().is_empty() {
            bail!("Company is required");
        }
        let id = self.allocate_id();
        self.records.push(new.into_record(id));
        Ok(id)
    }

    pub fn update_status(&mut self, id: i64, status: Status, specific_salary: &str) -> Result<()> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| anyhow!("Application #{} not found", id))?;
        record.status = status;
        record.specific_salary = specific_salary.trim().to_string();
        Ok(())
    }

    pub fn delete(&mut self, id: i64) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }

    /// Remove every record whose id is in `ids`. Returns how many went.
    pub fn delete_many(&mut self, ids: &[i64]) -> usize {
        let ids: HashSet<i64> = ids.iter().copied().collect();
        let before = self.records.len();
        self.records.retain(|r| !ids.contains(&r.id));
        before - self.records.len()
    }
}
