use super::domain::{JobId, JobPosting};
use crate::portal::repository::RepositoryError;

/// Storage abstraction for postings so services can be exercised in isolation.
pub trait JobRepository: Send + Sync {
    fn insert(&self, job: JobPosting) -> Result<JobPosting, RepositoryError>;
    fn update(&self, job: JobPosting) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &JobId) -> Result<Option<JobPosting>, RepositoryError>;
    fn delete(&self, id: &JobId) -> Result<JobPosting, RepositoryError>;
    fn all(&self) -> Result<Vec<JobPosting>, RepositoryError>;
    /// Atomically shifts the application counter, saturating at zero.
    fn adjust_applications(&self, id: &JobId, delta: i32) -> Result<JobPosting, RepositoryError>;
}
