use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    ApplicationDocuments, ApplicationId, ApplicationSubmission, EmployerFeedback, InterviewRecord,
    PersonalInfo, ScreeningAnswer,
};
use super::lifecycle::{ApplicationStatus, Timeline, TimelineEntry};
use crate::portal::actor::ActorId;
use crate::portal::jobs::JobId;
use crate::portal::repository::RepositoryError;

/// Stored application: submission data, lifecycle state, and employer-side records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationRecord {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub applicant: ActorId,
    pub status: ApplicationStatus,
    pub personal_info: PersonalInfo,
    pub documents: ApplicationDocuments,
    pub answers: Vec<ScreeningAnswer>,
    pub timeline: Timeline,
    pub interviews: Vec<InterviewRecord>,
    pub feedback: Option<EmployerFeedback>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: u64,
}

impl ApplicationRecord {
    pub fn new(
        id: ApplicationId,
        job_id: JobId,
        applicant: ActorId,
        submission: ApplicationSubmission,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            job_id,
            applicant,
            status: ApplicationStatus::Pending,
            personal_info: submission.personal_info,
            documents: submission.documents,
            answers: submission.answers,
            timeline: Timeline::default(),
            interviews: Vec::new(),
            feedback: None,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Sets the status and appends the matching timeline entry. Graph checks happen in the service.
    pub(crate) fn record_status(
        &mut self,
        status: ApplicationStatus,
        actor: ActorId,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.status = status;
        self.timeline.append(TimelineEntry {
            status,
            actor,
            at: now,
            notes,
        });
    }

    /// Marks a completed mutation: bumps the version and the modification time.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }

    pub fn summary(&self) -> ApplicationSummary {
        ApplicationSummary {
            id: self.id.clone(),
            job_id: self.job_id.clone(),
            applicant: self.applicant.clone(),
            full_name: self.personal_info.full_name.clone(),
            status: self.status.label(),
            timeline_entries: self.timeline.len(),
            rating: self.feedback.as_ref().map(|feedback| feedback.rating),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Storage abstraction so the lifecycle service can be exercised in isolation.
pub trait ApplicationRepository: Send + Sync {
    /// Fails with `Conflict` when the id or the `(job, applicant)` pair is already stored.
    fn insert(&self, record: ApplicationRecord) -> Result<ApplicationRecord, RepositoryError>;
    /// Replaces the stored record only if its version still equals `expected_version`.
    fn update(&self, record: ApplicationRecord, expected_version: u64)
        -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<ApplicationRecord>, RepositoryError>;
    fn find_by_pair(
        &self,
        job_id: &JobId,
        applicant: &ActorId,
    ) -> Result<Option<ApplicationRecord>, RepositoryError>;
    /// Removes the record only while its stored version still equals `expected_version`.
    fn delete(
        &self,
        id: &ApplicationId,
        expected_version: u64,
    ) -> Result<ApplicationRecord, RepositoryError>;
    fn for_job(&self, job_id: &JobId) -> Result<Vec<ApplicationRecord>, RepositoryError>;
    fn for_applicant(&self, applicant: &ActorId)
        -> Result<Vec<ApplicationRecord>, RepositoryError>;
}

/// Compact listing view of an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationSummary {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub applicant: ActorId,
    pub full_name: String,
    pub status: &'static str,
    pub timeline_entries: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
