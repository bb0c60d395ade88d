//! Application lifecycle: intake, employer-driven status changes, interviews, and withdrawal.

pub mod domain;
pub mod lifecycle;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    ApplicationDocuments, ApplicationId, ApplicationSubmission, EmployerFeedback, InterviewMode,
    InterviewRecord, InterviewRequest, PersonalInfo, ScreeningAnswer, StatusChange,
};
pub use lifecycle::{ApplicationStatus, Timeline, TimelineEntry};
pub use repository::{ApplicationRecord, ApplicationRepository, ApplicationSummary};
pub use router::application_router;
pub use service::{ApplicationService, ApplicationServiceError};
