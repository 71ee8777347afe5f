use crate::models::{ApplicationRecord, Status};

/// Narrows the list shown to the user. Never applied to stats input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    pub search: String,
    pub status: Option<Status>,
}

impl Filter {
    pub fn new(search: Option<&str>, status: Option<Status>) -> Self {
        Self {
            search: search.unwrap_or_default().to_string(),
            status,
        }
    }

    pub fn matches(&self, record: &ApplicationRecord) -> bool {
        self.matches_search(record) && self.status.is_none_or(|s| record.status == s)
    }

    fn matches_search(&self, record: &ApplicationRecord) -> bool {
        let term = self.search.to_lowercase();
        if term.is_empty() {
            return true;
        }
        [
            &record.job_title,
            &record.company,
            &record.location,
            &record.notes,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&term))
    }

    /// Step the status filter: all -> Applied -> ... -> Accepted -> all.
    pub fn cycle_status(&mut self) {
        self.status = match self.status {
            None => Some(Status::ALL[0]),
            Some(Status::Accepted) => None,
            Some(s) => Some(s.next()),
        };
    }

    pub fn is_active(&self) -> bool {
        !self.search.is_empty() || self.status.is_some()
    }
}
