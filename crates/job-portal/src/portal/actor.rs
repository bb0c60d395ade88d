//! Caller identity as asserted by the upstream identity provider.
//!
//! The service never manages sessions itself. Every operation receives the acting user
//! explicitly; over HTTP the identity arrives in the `x-actor-id` and `x-actor-role` headers.

use std::fmt;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Identifier of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub String);

impl ActorId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Employer,
    Applicant,
    Admin,
}

impl ActorRole {
    pub const fn label(self) -> &'static str {
        match self {
            ActorRole::Employer => "employer",
            ActorRole::Applicant => "applicant",
            ActorRole::Admin => "admin",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "employer" | "recruiter" => Some(Self::Employer),
            "applicant" | "candidate" | "job_seeker" => Some(Self::Applicant),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    /// Employers and admins may publish postings.
    pub const fn can_post_jobs(self) -> bool {
        matches!(self, ActorRole::Employer | ActorRole::Admin)
    }
}

/// The acting user for a single operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: ActorId,
    pub role: ActorRole,
}

impl Actor {
    pub fn employer(id: impl Into<String>) -> Self {
        Self {
            id: ActorId::new(id),
            role: ActorRole::Employer,
        }
    }

    pub fn applicant(id: impl Into<String>) -> Self {
        Self {
            id: ActorId::new(id),
            role: ActorRole::Applicant,
        }
    }

    pub fn is(&self, id: &ActorId) -> bool {
        &self.id == id
    }
}

/// Rejection returned when the identity headers are missing or malformed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActorRejection {
    #[error("missing {ACTOR_ID_HEADER} header")]
    MissingId,
    #[error("unrecognised actor role '{0}'")]
    UnknownRole(String),
}

impl IntoResponse for ActorRejection {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.to_string() });
        (StatusCode::UNAUTHORIZED, Json(payload)).into_response()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = ActorRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get(ACTOR_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ActorRejection::MissingId)?;

        let role = match parts
            .headers
            .get(ACTOR_ROLE_HEADER)
            .and_then(|value| value.to_str().ok())
        {
            Some(raw) => {
                ActorRole::parse(raw).ok_or_else(|| ActorRejection::UnknownRole(raw.to_string()))?
            }
            None => ActorRole::Applicant,
        };

        Ok(Actor {
            id: ActorId::new(id),
            role,
        })
    }
}
