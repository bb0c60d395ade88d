use serde::{Deserialize, Serialize};

use super::domain::{EmploymentType, JobPosting, JobStatus};
use crate::config::MAX_PAGE_SIZE;
use crate::portal::actor::ActorId;

/// Filters accepted by the job listing endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobQuery {
    pub category: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<EmploymentType>,
    pub remote: Option<bool>,
    pub min_salary: Option<u32>,
    pub max_salary: Option<u32>,
    pub search: Option<String>,
    pub status: Option<JobStatus>,
    pub owner: Option<ActorId>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl JobQuery {
    /// Listings show active postings unless a status is requested explicitly.
    pub fn effective_status(&self) -> JobStatus {
        self.status.unwrap_or(JobStatus::Active)
    }

    pub fn matches(&self, job: &JobPosting) -> bool {
        if job.status != self.effective_status() {
            return false;
        }

        if let Some(category) = non_blank(&self.category) {
            if !job.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }

        if let Some(location) = non_blank(&self.location) {
            if !contains_ignore_case(&job.location, location) {
                return false;
            }
        }

        if self
            .employment_type
            .is_some_and(|kind| kind != job.employment_type)
        {
            return false;
        }

        if self.remote.is_some_and(|remote| remote != job.remote) {
            return false;
        }

        if !job.salary.overlaps(self.min_salary, self.max_salary) {
            return false;
        }

        if let Some(owner) = &self.owner {
            if !job.is_owned_by(owner) {
                return false;
            }
        }

        if let Some(term) = non_blank(&self.search) {
            let hit = contains_ignore_case(&job.title, term)
                || contains_ignore_case(&job.company, term)
                || contains_ignore_case(&job.description, term);
            if !hit {
                return false;
            }
        }

        true
    }

    /// Resolves `(page, limit)` against the configured default, rejecting out of range values.
    pub fn pagination(&self, default_limit: u32) -> Result<(u32, u32), PaginationError> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(default_limit);

        if page == 0 {
            return Err(PaginationError::Page);
        }
        if !(1..=MAX_PAGE_SIZE).contains(&limit) {
            return Err(PaginationError::Limit);
        }

        Ok((page, limit))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaginationError {
    #[error("page must be 1 or greater")]
    Page,
    #[error("limit must be between 1 and {MAX_PAGE_SIZE}")]
    Limit,
}

/// One page of listing results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobPage {
    pub items: Vec<JobPosting>,
    pub page: u32,
    pub limit: u32,
    pub total: usize,
}

impl JobPage {
    /// Orders newest first and slices out the requested page.
    pub fn paginate(mut matches: Vec<JobPosting>, page: u32, limit: u32) -> Self {
        matches.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        let total = matches.len();
        let offset = (page as usize - 1).saturating_mul(limit as usize);
        let items = matches
            .into_iter()
            .skip(offset)
            .take(limit as usize)
            .collect();

        Self {
            items,
            page,
            limit,
            total,
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
