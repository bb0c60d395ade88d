use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{
    ApplicationId, ApplicationSubmission, EmployerFeedback, InterviewRequest, StatusChange,
};
use super::lifecycle::ApplicationStatus;
use super::repository::{ApplicationRecord, ApplicationRepository, ApplicationSummary};
use super::service::{ApplicationService, ApplicationServiceError};
use crate::portal::actor::Actor;
use crate::portal::jobs::{JobId, JobRepository};
use crate::portal::repository::RepositoryError;

type SharedService<A, J> = Arc<ApplicationService<A, J>>;

/// Router builder exposing the application lifecycle endpoints.
pub fn application_router<A, J>(service: SharedService<A, J>) -> Router
where
    A: ApplicationRepository + 'static,
    J: JobRepository + 'static,
{
    // `:id` names the job on `/apply` and the application elsewhere; the router needs one name per segment.
    Router::new()
        .route(
            "/api/v1/applications/:id/apply",
            post(apply_handler::<A, J>),
        )
        .route(
            "/api/v1/applications/:id",
            get(get_handler::<A, J>).delete(withdraw_handler::<A, J>),
        )
        .route(
            "/api/v1/applications/:id/status",
            put(transition_handler::<A, J>),
        )
        .route(
            "/api/v1/applications/:id/interviews",
            post(interview_handler::<A, J>),
        )
        .route(
            "/api/v1/applications/:id/feedback",
            put(feedback_handler::<A, J>),
        )
        .route(
            "/api/v1/jobs/:job_id/applications",
            get(job_applications_handler::<A, J>),
        )
        .route("/api/v1/me/applications", get(my_applications_handler::<A, J>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApplicationListQuery {
    #[serde(default)]
    pub(crate) status: Option<ApplicationStatus>,
}

pub(crate) async fn apply_handler<A, J>(
    State(service): State<SharedService<A, J>>,
    actor: Actor,
    Path(job_id): Path<String>,
    Json(submission): Json<ApplicationSubmission>,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobRepository + 'static,
{
    match service.apply(&JobId(job_id), &actor, submission, Utc::now()) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_handler<A, J>(
    State(service): State<SharedService<A, J>>,
    actor: Actor,
    Path(application_id): Path<String>,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobRepository + 'static,
{
    record_response(service.get(&ApplicationId(application_id), &actor))
}

pub(crate) async fn transition_handler<A, J>(
    State(service): State<SharedService<A, J>>,
    actor: Actor,
    Path(application_id): Path<String>,
    Json(change): Json<StatusChange>,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobRepository + 'static,
{
    record_response(service.transition(
        &ApplicationId(application_id),
        &actor,
        change,
        Utc::now(),
    ))
}

pub(crate) async fn withdraw_handler<A, J>(
    State(service): State<SharedService<A, J>>,
    actor: Actor,
    Path(application_id): Path<String>,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobRepository + 'static,
{
    match service.withdraw(&ApplicationId(application_id), &actor, Utc::now()) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn interview_handler<A, J>(
    State(service): State<SharedService<A, J>>,
    actor: Actor,
    Path(application_id): Path<String>,
    Json(request): Json<InterviewRequest>,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobRepository + 'static,
{
    record_response(service.schedule_interview(
        &ApplicationId(application_id),
        &actor,
        request,
        Utc::now(),
    ))
}

pub(crate) async fn feedback_handler<A, J>(
    State(service): State<SharedService<A, J>>,
    actor: Actor,
    Path(application_id): Path<String>,
    Json(feedback): Json<EmployerFeedback>,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobRepository + 'static,
{
    record_response(service.record_feedback(
        &ApplicationId(application_id),
        &actor,
        feedback,
        Utc::now(),
    ))
}

pub(crate) async fn job_applications_handler<A, J>(
    State(service): State<SharedService<A, J>>,
    actor: Actor,
    Path(job_id): Path<String>,
    Query(query): Query<ApplicationListQuery>,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobRepository + 'static,
{
    summaries_response(service.list_for_job(&JobId(job_id), &actor, query.status))
}

pub(crate) async fn my_applications_handler<A, J>(
    State(service): State<SharedService<A, J>>,
    actor: Actor,
) -> Response
where
    A: ApplicationRepository + 'static,
    J: JobRepository + 'static,
{
    summaries_response(service.list_for_applicant(&actor))
}

fn record_response(result: Result<ApplicationRecord, ApplicationServiceError>) -> Response {
    match result {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

fn summaries_response(result: Result<Vec<ApplicationRecord>, ApplicationServiceError>) -> Response {
    match result {
        Ok(records) => {
            let summaries: Vec<ApplicationSummary> =
                records.iter().map(ApplicationRecord::summary).collect();
            (StatusCode::OK, Json(summaries)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) fn status_for(err: &ApplicationServiceError) -> StatusCode {
    match err {
        ApplicationServiceError::JobNotFound(_)
        | ApplicationServiceError::JobClosed(_)
        | ApplicationServiceError::NotFound(_)
        | ApplicationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ApplicationServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        ApplicationServiceError::DuplicateApplication(_)
        | ApplicationServiceError::InvalidTransition { .. }
        | ApplicationServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ApplicationServiceError::StaleVersion(_)
        | ApplicationServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ApplicationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(err: ApplicationServiceError) -> Response {
    let status = status_for(&err);
    let payload = if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %err, "application store failure");
        json!({ "error": "internal server error" })
    } else {
        json!({ "error": err.to_string() })
    };
    (status, Json(payload)).into_response()
}
