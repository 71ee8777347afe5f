use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    Applied,
    Interviewing,
    Offer,
    Rejected,
    Accepted,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Applied,
        Status::Interviewing,
        Status::Offer,
        Status::Rejected,
        Status::Accepted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Applied => "Applied",
            Status::Interviewing => "Interviewing",
            Status::Offer => "Offer",
            Status::Rejected => "Rejected",
            Status::Accepted => "Accepted",
        }
    }

    /// Next status in declaration order, wrapping around.
    pub fn next(&self) -> Status {
        let idx = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Status {
        let idx = Self::ALL.iter().position(|s| s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// An offer is on the table (or was taken).
    pub fn has_offer(&self) -> bool {
        matches!(self, Status::Offer | Status::Accepted)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Status::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                anyhow!(
                    "Unknown status '{}'. Expected one of: applied, interviewing, offer, rejected, accepted",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub id: i64,
    pub job_title: String,
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub salary_range: String,
    #[serde(default)]
    pub application_link: String,
    pub date_applied: String, // ISO date, kept verbatim
    #[serde(default)]
    pub notes: String,
    pub status: Status,
    #[serde(default)]
    pub specific_salary: String,
}

/// Field values as entered by the user, before an id is assigned.
#[derive(Debug, Clone, Default)]
pub struct NewApplication {
    pub job_title: String,
    pub company: String,
    pub location: String,
    pub salary_range: String,
    pub application_link: String,
    pub date_applied: String,
    pub notes: String,
}

impl NewApplication {
    pub fn into_record(self, id: i64) -> ApplicationRecord {
        ApplicationRecord {
            id,
            job_title: self.job_title.trim().to_string(),
            company: self.company.trim().to_string(),
            location: self.location.trim().to_string(),
            salary_range: self.salary_range.trim().to_string(),
            application_link: self.application_link.trim().to_string(),
            date_applied: self.date_applied,
            notes: self.notes,
            status: Status::Applied,
            specific_salary: String::new(),
        }
    }
}
