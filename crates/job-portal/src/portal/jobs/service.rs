use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::domain::{JobDraft, JobId, JobPatch, JobPosting, JobValidationError};
use super::query::{JobPage, JobQuery, PaginationError};
use super::repository::JobRepository;
use crate::config::DEFAULT_PAGE_SIZE;
use crate::portal::actor::Actor;
use crate::portal::repository::RepositoryError;

/// Service owning job posting creation, listing, and owner-gated edits.
pub struct JobService<J> {
    repository: Arc<J>,
    default_page_size: u32,
}

static JOB_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_job_id() -> JobId {
    let id = JOB_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    JobId(format!("job-{id:06}"))
}

impl<J> JobService<J>
where
    J: JobRepository + 'static,
{
    pub fn new(repository: Arc<J>) -> Self {
        Self::with_page_size(repository, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(repository: Arc<J>, default_page_size: u32) -> Self {
        Self {
            repository,
            default_page_size,
        }
    }

    pub fn repository(&self) -> Arc<J> {
        Arc::clone(&self.repository)
    }

    /// Publish a new posting owned by the acting employer.
    pub fn create(
        &self,
        actor: &Actor,
        draft: JobDraft,
        now: DateTime<Utc>,
    ) -> Result<JobPosting, JobServiceError> {
        if !actor.role.can_post_jobs() {
            warn!(actor = %actor.id, role = actor.role.label(), "job creation refused");
            return Err(JobServiceError::Forbidden(format!(
                "role '{}' cannot post jobs",
                actor.role.label()
            )));
        }

        let posting = JobPosting::from_draft(next_job_id(), actor.id.clone(), draft, now);
        posting.validate()?;

        let stored = self.repository.insert(posting)?;
        info!(job_id = %stored.id, owner = %stored.owner, "job posted");
        Ok(stored)
    }

    /// Filtered, paginated listing. Expired postings are soft-closed first.
    pub fn list(&self, query: &JobQuery, now: DateTime<Utc>) -> Result<JobPage, JobServiceError> {
        let (page, limit) = query.pagination(self.default_page_size)?;
        self.close_expired(now)?;

        let matches = self
            .repository
            .all()?
            .into_iter()
            .filter(|job| query.matches(job))
            .collect();

        Ok(JobPage::paginate(matches, page, limit))
    }

    pub fn get(&self, id: &JobId) -> Result<JobPosting, JobServiceError> {
        self.repository
            .fetch(id)?
            .ok_or_else(|| JobServiceError::NotFound(id.clone()))
    }

    pub fn update(
        &self,
        id: &JobId,
        actor: &Actor,
        patch: JobPatch,
        now: DateTime<Utc>,
    ) -> Result<JobPosting, JobServiceError> {
        let mut posting = self.owned(id, actor)?;
        patch.apply_to(&mut posting, now);
        posting.validate()?;

        self.repository.update(posting.clone())?;
        info!(job_id = %posting.id, status = %posting.status, "job updated");
        Ok(posting)
    }

    pub fn delete(&self, id: &JobId, actor: &Actor) -> Result<JobPosting, JobServiceError> {
        self.owned(id, actor)?;
        let removed = self.repository.delete(id)?;
        info!(job_id = %removed.id, "job deleted");
        Ok(removed)
    }

    /// Moves every open posting past its expiry to `closed`, returning the affected ids.
    pub fn close_expired(&self, now: DateTime<Utc>) -> Result<Vec<JobId>, JobServiceError> {
        let mut closed = Vec::new();
        for mut job in self.repository.all()? {
            if job.expire_if_due(now) {
                self.repository.update(job.clone())?;
                closed.push(job.id);
            }
        }

        if !closed.is_empty() {
            info!(count = closed.len(), "expired jobs closed");
        }
        Ok(closed)
    }

    fn owned(&self, id: &JobId, actor: &Actor) -> Result<JobPosting, JobServiceError> {
        let posting = self.get(id)?;
        if !posting.is_owned_by(&actor.id) {
            warn!(job_id = %id, actor = %actor.id, "job edit refused for non-owner");
            return Err(JobServiceError::Forbidden(format!(
                "job {id} belongs to another employer"
            )));
        }
        Ok(posting)
    }
}

/// Error raised by the job service.
#[derive(Debug, thiserror::Error)]
pub enum JobServiceError {
    #[error("job {0} not found")]
    NotFound(JobId),
    #[error("{0}")]
    Forbidden(String),
    #[error(transparent)]
    Validation(#[from] JobValidationError),
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
