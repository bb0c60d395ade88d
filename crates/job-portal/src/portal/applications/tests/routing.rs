use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{Request, StatusCode};
use axum::Json;
use chrono::{Duration, Utc};
use serde_json::json;
use tower::ServiceExt;

use super::common::*;
use crate::portal::actor::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
use crate::portal::applications::domain::StatusChange;
use crate::portal::applications::lifecycle::ApplicationStatus;
use crate::portal::applications::router::{status_for, transition_handler};
use crate::portal::applications::{
    application_router, ApplicationService, ApplicationServiceError,
};
use crate::portal::jobs::JobId;
use crate::portal::memory::InMemoryJobRepository;
use crate::portal::RepositoryError;

fn request(
    method: &str,
    uri: &str,
    actor: (&str, &str),
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(ACTOR_ID_HEADER, actor.0)
        .header(ACTOR_ROLE_HEADER, actor.1);
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request"),
        None => builder.body(Body::empty()).expect("request"),
    }
}

const OWNER: (&str, &str) = ("emp-acme", "employer");
const SEEKER: (&str, &str) = ("seeker-ana", "applicant");

fn submission_json() -> serde_json::Value {
    serde_json::to_value(submission()).expect("serializable submission")
}

#[tokio::test]
async fn apply_returns_created_record() {
    let (router, job) = router(harness());
    let response = router
        .oneshot(request(
            "POST",
            &format!("/api/v1/applications/{}/apply", job.id),
            SEEKER,
            Some(submission_json()),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "pending");
    assert_eq!(body["job_id"], job.id.0.as_str());
    assert_eq!(body["version"], 0);
}

#[tokio::test]
async fn duplicate_apply_is_bad_request() {
    let harness = harness();
    applied(&harness);
    let (router, job) = router(harness);

    let response = router
        .oneshot(request(
            "POST",
            &format!("/api/v1/applications/{}/apply", job.id),
            SEEKER,
            Some(submission_json()),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert!(body["error"]
        .as_str()
        .is_some_and(|message| message.contains("already exists")));
}

#[tokio::test]
async fn apply_to_missing_job_is_not_found() {
    let (router, _) = router(harness());
    let response = router
        .oneshot(request(
            "POST",
            "/api/v1/applications/job-nope/apply",
            SEEKER,
            Some(submission_json()),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_identity_is_unauthorized() {
    let (router, job) = router(harness());
    let response = router
        .oneshot(
            Request::post(format!("/api/v1/applications/{}/apply", job.id))
                .header("content-type", "application/json")
                .body(Body::from(submission_json().to_string()))
                .expect("request"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn transition_by_non_owner_is_forbidden() {
    let harness = harness();
    let record = applied(&harness);
    let (router, _) = router(harness);

    let response = router
        .oneshot(request(
            "PUT",
            &format!("/api/v1/applications/{}/status", record.id),
            ("emp-rival", "employer"),
            Some(json!({ "status": "reviewing" })),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn invalid_transition_and_stale_version_map_to_client_errors() {
    let harness = harness();
    let record = applied(&harness);
    let router = router(harness).0;

    let response = router
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/v1/applications/{}/status", record.id),
            OWNER,
            Some(json!({ "status": "withdrawn" })),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = router
        .oneshot(request(
            "PUT",
            &format!("/api/v1/applications/{}/status", record.id),
            OWNER,
            Some(json!({ "status": "reviewing", "expected_version": 7 })),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn owner_drives_the_pipeline_over_http() {
    let harness = harness();
    let record = applied(&harness);
    let router = router(harness).0;

    let response = router
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/v1/applications/{}/status", record.id),
            OWNER,
            Some(json!({ "status": "shortlisted", "notes": "fast-track" })),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let scheduled_at = Utc::now() + Duration::days(2);
    let response = router
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/v1/applications/{}/interviews", record.id),
            OWNER,
            Some(json!({ "scheduled_at": scheduled_at, "mode": "onsite", "location": "Porto HQ" })),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], "interviewing");
    assert_eq!(body["timeline"].as_array().map(Vec::len), Some(2));

    let response = router
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/v1/applications/{}/feedback", record.id),
            OWNER,
            Some(json!({ "rating": 4 })),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .oneshot(request(
            "GET",
            &format!("/api/v1/jobs/{}/applications?status=interviewing", record.job_id),
            OWNER,
            None,
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body[0]["id"], record.id.0.as_str());
    assert_eq!(body[0]["rating"], 4);
}

#[tokio::test]
async fn withdraw_returns_no_content_then_not_found() {
    let harness = harness();
    let record = applied(&harness);
    let router = router(harness).0;
    let uri = format!("/api/v1/applications/{}", record.id);

    let response = router
        .clone()
        .oneshot(request("DELETE", &uri, SEEKER, None))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = router
        .clone()
        .oneshot(request("GET", &uri, SEEKER, None))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router
        .oneshot(request("GET", "/api/v1/me/applications", SEEKER, None))
        .await
        .expect("router responds");
    let body = read_json_body(response).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn store_outage_is_internal_error_without_details() {
    let service = ApplicationService::new(
        Arc::new(UnavailableRepository),
        Arc::new(InMemoryJobRepository::default()),
    );
    let router = application_router(Arc::new(service));

    let response = router
        .oneshot(request("GET", "/api/v1/me/applications", SEEKER, None))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = read_json_body(response).await;
    assert_eq!(body, json!({ "error": "internal server error" }));
}

#[tokio::test]
async fn transition_handler_can_be_called_directly() {
    let harness = harness();
    let record = applied(&harness);
    let service = Arc::new(harness.service);

    let response = transition_handler(
        State(service),
        employer(),
        Path(record.id.0.clone()),
        Json(StatusChange {
            status: ApplicationStatus::Reviewing,
            notes: None,
            expected_version: Some(0),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["version"], 1);
}

#[test]
fn error_statuses_follow_the_http_contract() {
    let job = JobId("job-000001".to_string());
    let cases = [
        (ApplicationServiceError::JobNotFound(job.clone()), StatusCode::NOT_FOUND),
        (ApplicationServiceError::JobClosed(job.clone()), StatusCode::NOT_FOUND),
        (
            ApplicationServiceError::Forbidden("no".to_string()),
            StatusCode::FORBIDDEN,
        ),
        (
            ApplicationServiceError::DuplicateApplication(job),
            StatusCode::BAD_REQUEST,
        ),
        (
            ApplicationServiceError::InvalidTransition {
                from: ApplicationStatus::Accepted,
                to: ApplicationStatus::Rejected,
            },
            StatusCode::BAD_REQUEST,
        ),
        (
            ApplicationServiceError::Repository(RepositoryError::Conflict),
            StatusCode::CONFLICT,
        ),
        (
            ApplicationServiceError::Repository(RepositoryError::Unavailable("down".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (err, expected) in cases {
        assert_eq!(status_for(&err), expected, "{err}");
    }
}
