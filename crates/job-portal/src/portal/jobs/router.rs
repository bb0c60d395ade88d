use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tracing::error;

use super::domain::{JobDraft, JobId, JobPatch};
use super::query::JobQuery;
use super::repository::JobRepository;
use super::service::{JobService, JobServiceError};
use crate::portal::actor::Actor;
use crate::portal::repository::RepositoryError;

/// Router builder exposing the job posting endpoints.
pub fn job_router<J>(service: Arc<JobService<J>>) -> Router
where
    J: JobRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/jobs",
            get(list_handler::<J>).post(create_handler::<J>),
        )
        .route(
            "/api/v1/jobs/:job_id",
            get(get_handler::<J>)
                .put(update_handler::<J>)
                .delete(delete_handler::<J>),
        )
        .with_state(service)
}

pub(crate) async fn create_handler<J>(
    State(service): State<Arc<JobService<J>>>,
    actor: Actor,
    Json(draft): Json<JobDraft>,
) -> Response
where
    J: JobRepository + 'static,
{
    match service.create(&actor, draft, Utc::now()) {
        Ok(posting) => (StatusCode::CREATED, Json(posting)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<J>(
    State(service): State<Arc<JobService<J>>>,
    Query(query): Query<JobQuery>,
) -> Response
where
    J: JobRepository + 'static,
{
    match service.list(&query, Utc::now()) {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_handler<J>(
    State(service): State<Arc<JobService<J>>>,
    Path(job_id): Path<String>,
) -> Response
where
    J: JobRepository + 'static,
{
    match service.get(&JobId(job_id)) {
        Ok(posting) => (StatusCode::OK, Json(posting)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_handler<J>(
    State(service): State<Arc<JobService<J>>>,
    actor: Actor,
    Path(job_id): Path<String>,
    Json(patch): Json<JobPatch>,
) -> Response
where
    J: JobRepository + 'static,
{
    match service.update(&JobId(job_id), &actor, patch, Utc::now()) {
        Ok(posting) => (StatusCode::OK, Json(posting)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_handler<J>(
    State(service): State<Arc<JobService<J>>>,
    actor: Actor,
    Path(job_id): Path<String>,
) -> Response
where
    J: JobRepository + 'static,
{
    match service.delete(&JobId(job_id), &actor) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: JobServiceError) -> Response {
    let status = match &err {
        JobServiceError::NotFound(_) | JobServiceError::Repository(RepositoryError::NotFound) => {
            StatusCode::NOT_FOUND
        }
        JobServiceError::Forbidden(_) => StatusCode::FORBIDDEN,
        JobServiceError::Validation(_) | JobServiceError::Pagination(_) => StatusCode::BAD_REQUEST,
        JobServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        JobServiceError::Repository(RepositoryError::Unavailable(_)) => {
            error!(error = %err, "job store failure");
            let payload = json!({ "error": "internal server error" });
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response();
        }
    };

    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}
