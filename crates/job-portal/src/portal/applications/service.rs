use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use super::domain::{
    ApplicationId, ApplicationSubmission, EmployerFeedback, InterviewRecord, InterviewRequest,
    StatusChange,
};
use super::lifecycle::ApplicationStatus;
use super::repository::{ApplicationRecord, ApplicationRepository};
use crate::portal::actor::Actor;
use crate::portal::jobs::{JobId, JobRepository};
use crate::portal::repository::RepositoryError;

/// Lifecycle manager composing the application store with the job store it references.
pub struct ApplicationService<A, J> {
    applications: Arc<A>,
    jobs: Arc<J>,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("app-{id:06}"))
}

impl<A, J> ApplicationService<A, J>
where
    A: ApplicationRepository + 'static,
    J: JobRepository + 'static,
{
    pub fn new(applications: Arc<A>, jobs: Arc<J>) -> Self {
        Self { applications, jobs }
    }

    /// Create a `pending` application and bump the job's application counter.
    pub fn apply(
        &self,
        job_id: &JobId,
        actor: &Actor,
        submission: ApplicationSubmission,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let mut job = self
            .jobs
            .fetch(job_id)?
            .ok_or_else(|| ApplicationServiceError::JobNotFound(job_id.clone()))?;

        if job.expire_if_due(now) {
            self.jobs.update(job.clone())?;
            info!(job_id = %job.id, "expired job closed during apply");
        }
        if !job.accepts_applications(now) {
            warn!(job_id = %job.id, status = %job.status, "application to closed job refused");
            return Err(ApplicationServiceError::JobClosed(job.id));
        }
        if job.is_owned_by(&actor.id) {
            return Err(ApplicationServiceError::Forbidden(
                "employers cannot apply to their own postings".to_string(),
            ));
        }

        submission
            .personal_info
            .validate()
            .map_err(ApplicationServiceError::Validation)?;

        if self
            .applications
            .find_by_pair(job_id, &actor.id)?
            .is_some()
        {
            warn!(job_id = %job_id, applicant = %actor.id, "duplicate application refused");
            return Err(ApplicationServiceError::DuplicateApplication(job_id.clone()));
        }

        let record = ApplicationRecord::new(
            next_application_id(),
            job_id.clone(),
            actor.id.clone(),
            submission,
            now,
        );

        let stored = self.applications.insert(record).map_err(|err| match err {
            RepositoryError::Conflict => ApplicationServiceError::DuplicateApplication(job_id.clone()),
            other => other.into(),
        })?;

        if let Err(err) = self.jobs.adjust_applications(job_id, 1) {
            error!(job_id = %job_id, error = %err, "counter update failed, rolling back application");
            self.applications.delete(&stored.id, stored.version)?;
            return Err(err.into());
        }

        info!(application_id = %stored.id, job_id = %job_id, applicant = %actor.id, "application received");
        Ok(stored)
    }

    /// Move an application to a new status on behalf of the job owner.
    pub fn transition(
        &self,
        application_id: &ApplicationId,
        actor: &Actor,
        change: StatusChange,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let mut record = self.fetch(application_id)?;
        self.require_job_owner(&record, actor)?;

        let stored_version = record.version;
        if let Some(expected) = change.expected_version {
            if expected != stored_version {
                return Err(ApplicationServiceError::StaleVersion(application_id.clone()));
            }
        }

        if !record.status.can_transition_to(change.status) {
            warn!(
                application_id = %application_id,
                from = %record.status,
                to = %change.status,
                "transition refused"
            );
            return Err(ApplicationServiceError::InvalidTransition {
                from: record.status,
                to: change.status,
            });
        }

        let from = record.status;
        record.record_status(change.status, actor.id.clone(), change.notes, now);
        record.touch(now);
        self.save(&record, stored_version)?;

        info!(application_id = %application_id, %from, to = %record.status, "application status changed");
        Ok(record)
    }

    /// Applicant-initiated withdrawal: deletes the record and releases the job counter.
    /// The delete is conditional on the version that was read, and the record is restored
    /// when the counter cannot be released.
    pub fn withdraw(
        &self,
        application_id: &ApplicationId,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let mut record = self.fetch(application_id)?;
        if !actor.is(&record.applicant) {
            return Err(ApplicationServiceError::Forbidden(
                "only the applicant may withdraw an application".to_string(),
            ));
        }
        if !record.status.can_withdraw() {
            return Err(ApplicationServiceError::InvalidTransition {
                from: record.status,
                to: ApplicationStatus::Withdrawn,
            });
        }

        let removed = self
            .applications
            .delete(application_id, record.version)
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    ApplicationServiceError::StaleVersion(application_id.clone())
                }
                RepositoryError::NotFound => {
                    ApplicationServiceError::NotFound(application_id.clone())
                }
                other => other.into(),
            })?;

        match self.jobs.adjust_applications(&record.job_id, -1) {
            Ok(_) => {}
            Err(RepositoryError::NotFound) => {
                warn!(job_id = %record.job_id, "withdrawn application referenced a deleted job");
            }
            Err(err) => {
                error!(
                    application_id = %application_id,
                    error = %err,
                    "counter update failed, restoring application"
                );
                self.applications.insert(removed)?;
                return Err(err.into());
            }
        }

        record.record_status(ApplicationStatus::Withdrawn, actor.id.clone(), None, now);
        record.touch(now);
        info!(application_id = %application_id, job_id = %record.job_id, "application withdrawn");
        Ok(record)
    }

    /// Readable by the applicant and by the owner of the referenced job.
    pub fn get(
        &self,
        application_id: &ApplicationId,
        actor: &Actor,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        let record = self.fetch(application_id)?;
        if actor.is(&record.applicant) {
            return Ok(record);
        }

        let owns_job = self
            .jobs
            .fetch(&record.job_id)?
            .is_some_and(|job| job.is_owned_by(&actor.id));
        if owns_job {
            Ok(record)
        } else {
            Err(ApplicationServiceError::Forbidden(format!(
                "application {application_id} is not visible to {}",
                actor.id
            )))
        }
    }

    /// Owner view of every application to a job, oldest first.
    pub fn list_for_job(
        &self,
        job_id: &JobId,
        actor: &Actor,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<ApplicationRecord>, ApplicationServiceError> {
        let job = self
            .jobs
            .fetch(job_id)?
            .ok_or_else(|| ApplicationServiceError::JobNotFound(job_id.clone()))?;
        if !job.is_owned_by(&actor.id) {
            return Err(ApplicationServiceError::Forbidden(format!(
                "job {job_id} belongs to another employer"
            )));
        }

        let mut records: Vec<_> = self
            .applications
            .for_job(job_id)?
            .into_iter()
            .filter(|record| status.map_or(true, |status| record.status == status))
            .collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(records)
    }

    /// The acting applicant's own applications, newest first.
    pub fn list_for_applicant(
        &self,
        actor: &Actor,
    ) -> Result<Vec<ApplicationRecord>, ApplicationServiceError> {
        let mut records = self.applications.for_applicant(&actor.id)?;
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(records)
    }

    /// Book an interview; a shortlisted application moves to `interviewing`.
    pub fn schedule_interview(
        &self,
        application_id: &ApplicationId,
        actor: &Actor,
        request: InterviewRequest,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        if request.scheduled_at <= now {
            return Err(ApplicationServiceError::Validation(
                "interviews must be scheduled in the future".to_string(),
            ));
        }

        let mut record = self.fetch(application_id)?;
        self.require_job_owner(&record, actor)?;
        let stored_version = record.version;

        match record.status {
            ApplicationStatus::Shortlisted => {
                record.record_status(
                    ApplicationStatus::Interviewing,
                    actor.id.clone(),
                    Some("interview scheduled".to_string()),
                    now,
                );
            }
            ApplicationStatus::Interviewing => {}
            other => {
                return Err(ApplicationServiceError::InvalidTransition {
                    from: other,
                    to: ApplicationStatus::Interviewing,
                });
            }
        }

        record.interviews.push(InterviewRecord {
            scheduled_at: request.scheduled_at,
            mode: request.mode,
            location: request.location,
            notes: request.notes,
            scheduled_by: actor.id.clone(),
            created_at: now,
        });
        record.touch(now);
        self.save(&record, stored_version)?;

        info!(application_id = %application_id, scheduled_at = %request.scheduled_at, "interview scheduled");
        Ok(record)
    }

    /// Replace the employer's rating and notes for an application.
    pub fn record_feedback(
        &self,
        application_id: &ApplicationId,
        actor: &Actor,
        feedback: EmployerFeedback,
        now: DateTime<Utc>,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        feedback
            .validate()
            .map_err(ApplicationServiceError::Validation)?;

        let mut record = self.fetch(application_id)?;
        self.require_job_owner(&record, actor)?;

        let stored_version = record.version;
        record.feedback = Some(feedback);
        record.touch(now);
        self.save(&record, stored_version)?;
        Ok(record)
    }

    fn fetch(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ApplicationRecord, ApplicationServiceError> {
        self.applications
            .fetch(application_id)?
            .ok_or_else(|| ApplicationServiceError::NotFound(application_id.clone()))
    }

    fn require_job_owner(
        &self,
        record: &ApplicationRecord,
        actor: &Actor,
    ) -> Result<(), ApplicationServiceError> {
        let job = self
            .jobs
            .fetch(&record.job_id)?
            .ok_or_else(|| ApplicationServiceError::JobNotFound(record.job_id.clone()))?;
        if job.is_owned_by(&actor.id) {
            Ok(())
        } else {
            warn!(application_id = %record.id, actor = %actor.id, "non-owner attempted employer action");
            Err(ApplicationServiceError::Forbidden(format!(
                "only the owner of job {} may manage its applications",
                record.job_id
            )))
        }
    }

    fn save(
        &self,
        record: &ApplicationRecord,
        expected_version: u64,
    ) -> Result<(), ApplicationServiceError> {
        self.applications
            .update(record.clone(), expected_version)
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    ApplicationServiceError::StaleVersion(record.id.clone())
                }
                RepositoryError::NotFound => ApplicationServiceError::NotFound(record.id.clone()),
                other => other.into(),
            })
    }
}

/// Error raised by the application lifecycle service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error("job {0} not found")]
    JobNotFound(JobId),
    #[error("job {0} is not accepting applications")]
    JobClosed(JobId),
    #[error("application {0} not found")]
    NotFound(ApplicationId),
    #[error("{0}")]
    Forbidden(String),
    #[error("an application to job {0} already exists for this applicant")]
    DuplicateApplication(JobId),
    #[error("cannot move application from {from} to {to}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("application {0} was modified by another request")]
    StaleVersion(ApplicationId),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
