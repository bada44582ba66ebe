#![forbid(unsafe_code)]

use crate::ids::JobId;
use crate::jobs::{JobStatus, LifecycleError};

/// Credential failures. Messages are fixed strings so a rejected token never
/// learns anything about the configured secret.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("bearer credential is required")]
    MissingCredential,
    #[error("malformed Authorization header (expected 2 parts, got {parts})")]
    MalformedCredential { parts: usize },
    #[error("invalid authentication scheme: {scheme}. Expected 'Bearer'")]
    UnsupportedScheme { scheme: String },
    #[error("invalid bearer token")]
    InvalidCredential,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {constraint}")]
pub struct ValidationError {
    pub field: String,
    pub constraint: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            constraint: constraint.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("job not found: {job_id}")]
    JobNotFound { job_id: JobId },
    #[error("job {job_id} has not completed yet (status={status})")]
    JobNotCompleted { job_id: JobId, status: JobStatus },
    #[error("job {job_id} has already completed (status={status})")]
    JobAlreadyCompleted { job_id: JobId, status: JobStatus },
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("failed to connect to backend: {0}")]
    Connection(String),
    #[error("backend request timed out: {0}")]
    Timeout(String),
    #[error("{message}")]
    Api {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
    },
}

impl BackendError {
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an unclassified failure, keeping the original error as `source()`.
    pub fn wrap<E>(message: impl Into<String>, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Api {
            message: format!("{}: {err}", message.into()),
            source: Some(Box::new(err)),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_))
    }
}

/// Everything a tool call can fail with, in the order the checks run.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthError),
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl GatewayError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Authentication(_) => "UNAUTHENTICATED",
            Self::Validation(_) => "INVALID_INPUT",
            Self::Backend(err) => match err {
                BackendError::JobNotFound { .. } => "JOB_NOT_FOUND",
                BackendError::JobNotCompleted { .. } => "JOB_NOT_COMPLETED",
                BackendError::JobAlreadyCompleted { .. } => "JOB_ALREADY_COMPLETED",
                BackendError::InvalidRequest(_) => "INVALID_INPUT",
                BackendError::Lifecycle(_) => "INVALID_TRANSITION",
                BackendError::Connection(_) => "BACKEND_UNAVAILABLE",
                BackendError::Timeout(_) => "BACKEND_TIMEOUT",
                BackendError::Api { .. } => "BACKEND_ERROR",
            },
        }
    }
}
