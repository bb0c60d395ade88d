use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::portal::actor::{Actor, ActorId};
use crate::portal::applications::domain::{
    ApplicationDocuments, ApplicationId, ApplicationSubmission, PersonalInfo, ScreeningAnswer,
};
use crate::portal::applications::lifecycle::ApplicationStatus;
use crate::portal::applications::repository::{ApplicationRecord, ApplicationRepository};
use crate::portal::applications::{application_router, ApplicationService};
use crate::portal::jobs::{
    EmploymentType, JobDraft, JobId, JobPosting, JobRepository, JobService, SalaryRange,
};
use crate::portal::memory::{InMemoryApplicationRepository, InMemoryJobRepository};
use crate::portal::RepositoryError;

pub(super) type Service = ApplicationService<InMemoryApplicationRepository, InMemoryJobRepository>;

pub(super) struct Harness {
    pub(super) service: Service,
    pub(super) jobs: JobService<InMemoryJobRepository>,
    pub(super) applications: Arc<InMemoryApplicationRepository>,
    pub(super) job: JobPosting,
}

impl Harness {
    pub(super) fn job_count(&self) -> u32 {
        self.jobs
            .get(&self.job.id)
            .expect("job stored")
            .applications_count
    }
}

pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 14, 10, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub(super) fn later(minutes: i64) -> DateTime<Utc> {
    now() + Duration::minutes(minutes)
}

pub(super) fn employer() -> Actor {
    Actor::employer("emp-acme")
}

pub(super) fn applicant() -> Actor {
    Actor::applicant("seeker-ana")
}

pub(super) fn job_draft() -> JobDraft {
    JobDraft {
        title: "Site Reliability Engineer".to_string(),
        company: "Acme Freight".to_string(),
        location: "Porto".to_string(),
        category: "Engineering".to_string(),
        description: "Keep dispatch services healthy.".to_string(),
        requirements: vec!["Linux".to_string(), "On-call".to_string()],
        salary: SalaryRange {
            min: 55_000,
            max: 70_000,
            currency: "EUR".to_string(),
        },
        employment_type: EmploymentType::FullTime,
        remote: false,
        status: None,
        expires_at: None,
    }
}

pub(super) fn submission() -> ApplicationSubmission {
    ApplicationSubmission {
        personal_info: PersonalInfo {
            full_name: "Ana Ribeiro".to_string(),
            email: "ana@example.com".to_string(),
            phone: Some("+351 900 000 000".to_string()),
        },
        documents: ApplicationDocuments {
            resume: Some("uploads/ana/resume.pdf".to_string()),
            cover_letter: None,
        },
        answers: vec![ScreeningAnswer {
            question: "Notice period".to_string(),
            answer: "30 days".to_string(),
        }],
    }
}

pub(super) fn harness() -> Harness {
    let job_store = Arc::new(InMemoryJobRepository::default());
    let applications = Arc::new(InMemoryApplicationRepository::default());
    let jobs = JobService::new(job_store.clone());
    let job = jobs
        .create(&employer(), job_draft(), now())
        .expect("job created");
    let service = ApplicationService::new(applications.clone(), job_store);

    Harness {
        service,
        jobs,
        applications,
        job,
    }
}

pub(super) fn applied(harness: &Harness) -> ApplicationRecord {
    harness
        .service
        .apply(&harness.job.id, &applicant(), submission(), later(1))
        .expect("application accepted")
}

pub(super) fn router(harness: Harness) -> (axum::Router, JobPosting) {
    let job = harness.job.clone();
    (application_router(Arc::new(harness.service)), job)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store whose every call fails, for exercising 500 handling.
pub(super) struct UnavailableRepository;

fn unavailable<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("connection refused".to_string()))
}

impl ApplicationRepository for UnavailableRepository {
    fn insert(&self, _record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        unavailable()
    }

    fn update(&self, _record: ApplicationRecord, _expected: u64) -> Result<(), RepositoryError> {
        unavailable()
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        unavailable()
    }

    fn find_by_pair(
        &self,
        _job_id: &JobId,
        _applicant: &ActorId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        unavailable()
    }

    fn delete(
        &self,
        _id: &ApplicationId,
        _expected_version: u64,
    ) -> Result<ApplicationRecord, RepositoryError> {
        unavailable()
    }

    fn for_job(&self, _job_id: &JobId) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        unavailable()
    }

    fn for_applicant(
        &self,
        _applicant: &ActorId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        unavailable()
    }
}

/// Job store that accepts reads but refuses counter updates.
#[derive(Default)]
pub(super) struct FrozenCounterJobs {
    pub(super) inner: InMemoryJobRepository,
}

impl JobRepository for FrozenCounterJobs {
    fn insert(&self, job: JobPosting) -> Result<JobPosting, RepositoryError> {
        self.inner.insert(job)
    }

    fn update(&self, job: JobPosting) -> Result<(), RepositoryError> {
        self.inner.update(job)
    }

    fn fetch(&self, id: &JobId) -> Result<Option<JobPosting>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn delete(&self, id: &JobId) -> Result<JobPosting, RepositoryError> {
        self.inner.delete(id)
    }

    fn all(&self) -> Result<Vec<JobPosting>, RepositoryError> {
        self.inner.all()
    }

    fn adjust_applications(&self, _id: &JobId, _delta: i32) -> Result<JobPosting, RepositoryError> {
        unavailable()
    }
}

/// Application store where the employer accepts the application right after the next read,
/// so the reader's snapshot is stale by the time it writes.
#[derive(Default)]
pub(super) struct AcceptAfterReadRepository {
    pub(super) inner: InMemoryApplicationRepository,
    armed: AtomicBool,
}

impl AcceptAfterReadRepository {
    pub(super) fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

impl ApplicationRepository for AcceptAfterReadRepository {
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn update(&self, record: ApplicationRecord, expected: u64) -> Result<(), RepositoryError> {
        self.inner.update(record, expected)
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError> {
        let snapshot = self.inner.fetch(id)?;
        if let Some(record) = &snapshot {
            if self.armed.swap(false, Ordering::SeqCst) {
                let mut accepted = record.clone();
                accepted.record_status(
                    ApplicationStatus::Accepted,
                    ActorId::new("emp-acme"),
                    None,
                    record.updated_at,
                );
                accepted.touch(record.updated_at);
                self.inner.update(accepted, record.version)?;
            }
        }
        Ok(snapshot)
    }

    fn find_by_pair(
        &self,
        job_id: &JobId,
        applicant: &ActorId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError> {
        self.inner.find_by_pair(job_id, applicant)
    }

    fn delete(
        &self,
        id: &ApplicationId,
        expected_version: u64,
    ) -> Result<ApplicationRecord, RepositoryError> {
        self.inner.delete(id, expected_version)
    }

    fn for_job(&self, job_id: &JobId) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.inner.for_job(job_id)
    }

    fn for_applicant(
        &self,
        applicant: &ActorId,
    ) -> Result<Vec<ApplicationRecord>, RepositoryError> {
        self.inner.for_applicant(applicant)
    }
}
