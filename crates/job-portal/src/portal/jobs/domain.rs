use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::portal::actor::ActorId;

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(pub String);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    FullTime,
    PartTime,
    Contract,
    Internship,
    Temporary,
}

impl EmploymentType {
    pub const fn label(self) -> &'static str {
        match self {
            EmploymentType::FullTime => "full_time",
            EmploymentType::PartTime => "part_time",
            EmploymentType::Contract => "contract",
            EmploymentType::Internship => "internship",
            EmploymentType::Temporary => "temporary",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "full_time" | "fulltime" => Some(Self::FullTime),
            "part_time" | "parttime" => Some(Self::PartTime),
            "contract" => Some(Self::Contract),
            "internship" => Some(Self::Internship),
            "temporary" | "temp" => Some(Self::Temporary),
            _ => None,
        }
    }
}

/// Publication state of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    Active,
    Paused,
    Closed,
    Filled,
}

impl JobStatus {
    pub const fn label(self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Active => "active",
            JobStatus::Paused => "paused",
            JobStatus::Closed => "closed",
            JobStatus::Filled => "filled",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryRange {
    pub min: u32,
    pub max: u32,
    pub currency: String,
}

impl SalaryRange {
    pub fn overlaps(&self, floor: Option<u32>, ceiling: Option<u32>) -> bool {
        floor.map_or(true, |floor| self.max >= floor)
            && ceiling.map_or(true, |ceiling| self.min <= ceiling)
    }
}

/// A published (or draft) job posting owned by an employer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: JobId,
    pub title: String,
    pub company: String,
    pub location: String,
    pub category: String,
    pub description: String,
    pub requirements: Vec<String>,
    pub salary: SalaryRange,
    pub employment_type: EmploymentType,
    pub remote: bool,
    pub status: JobStatus,
    pub owner: ActorId,
    pub applications_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl JobPosting {
    pub fn from_draft(id: JobId, owner: ActorId, draft: JobDraft, now: DateTime<Utc>) -> Self {
        let mut posting = Self {
            id,
            title: draft.title,
            company: draft.company,
            location: draft.location,
            category: draft.category,
            description: draft.description,
            requirements: draft.requirements,
            salary: draft.salary,
            employment_type: draft.employment_type,
            remote: draft.remote,
            status: draft.status.unwrap_or(JobStatus::Active),
            owner,
            applications_count: 0,
            created_at: now,
            updated_at: now,
            expires_at: draft.expires_at,
        };
        posting.normalize();
        posting
    }

    pub fn is_owned_by(&self, actor: &ActorId) -> bool {
        &self.owner == actor
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    /// Only active, unexpired postings take new applications.
    pub fn accepts_applications(&self, now: DateTime<Utc>) -> bool {
        self.status == JobStatus::Active && !self.is_expired(now)
    }

    /// Soft-closes an open posting whose expiry has elapsed. Returns whether anything changed.
    pub fn expire_if_due(&mut self, now: DateTime<Utc>) -> bool {
        let open = matches!(self.status, JobStatus::Active | JobStatus::Paused);
        if open && self.is_expired(now) {
            self.status = JobStatus::Closed;
            self.updated_at = now;
            true
        } else {
            false
        }
    }

    pub fn validate(&self) -> Result<(), JobValidationError> {
        let required = [
            ("title", &self.title),
            ("company", &self.company),
            ("location", &self.location),
            ("description", &self.description),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(JobValidationError::MissingField(*field));
        }

        if self.salary.min > self.salary.max {
            return Err(JobValidationError::SalaryRange {
                min: self.salary.min,
                max: self.salary.max,
            });
        }

        let currency = &self.salary.currency;
        if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(JobValidationError::Currency(currency.clone()));
        }

        Ok(())
    }

    fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
        self.company = self.company.trim().to_string();
        self.location = self.location.trim().to_string();
        self.category = self.category.trim().to_string();
        self.salary.currency = self.salary.currency.trim().to_ascii_uppercase();
        self.requirements.retain(|item| !item.trim().is_empty());
    }
}

/// Payload accepted when an employer publishes a posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDraft {
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(default)]
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub requirements: Vec<String>,
    pub salary: SalaryRange,
    pub employment_type: EmploymentType,
    #[serde(default)]
    pub remote: bool,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

/// Partial update applied by a posting's owner.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobPatch {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub requirements: Option<Vec<String>>,
    pub salary: Option<SalaryRange>,
    pub employment_type: Option<EmploymentType>,
    pub remote: Option<bool>,
    pub status: Option<JobStatus>,
    /// Absent leaves the expiry alone; `null` clears it.
    #[serde(
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<Option<DateTime<Utc>>>,
}

fn present_or_null<'de, D>(deserializer: D) -> Result<Option<Option<DateTime<Utc>>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<DateTime<Utc>>::deserialize(deserializer).map(Some)
}

impl JobPatch {
    pub fn apply_to(self, posting: &mut JobPosting, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            posting.title = title;
        }
        if let Some(company) = self.company {
            posting.company = company;
        }
        if let Some(location) = self.location {
            posting.location = location;
        }
        if let Some(category) = self.category {
            posting.category = category;
        }
        if let Some(description) = self.description {
            posting.description = description;
        }
        if let Some(requirements) = self.requirements {
            posting.requirements = requirements;
        }
        if let Some(salary) = self.salary {
            posting.salary = salary;
        }
        if let Some(employment_type) = self.employment_type {
            posting.employment_type = employment_type;
        }
        if let Some(remote) = self.remote {
            posting.remote = remote;
        }
        if let Some(status) = self.status {
            posting.status = status;
        }
        if let Some(expires_at) = self.expires_at {
            posting.expires_at = expires_at;
        }
        posting.updated_at = now;
        posting.normalize();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JobValidationError {
    #[error("{0} must not be empty")]
    MissingField(&'static str),
    #[error("salary minimum {min} exceeds maximum {max}")]
    SalaryRange { min: u32, max: u32 },
    #[error("currency '{0}' must be a three letter code")]
    Currency(String),
}
