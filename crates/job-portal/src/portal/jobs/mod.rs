//! Job record store: postings, filtered listings, and owner-gated edits.

pub mod domain;
pub mod query;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    EmploymentType, JobDraft, JobId, JobPatch, JobPosting, JobStatus, JobValidationError,
    SalaryRange,
};
pub use query::{JobPage, JobQuery, PaginationError};
pub use repository::JobRepository;
pub use router::job_router;
pub use service::{JobService, JobServiceError};
