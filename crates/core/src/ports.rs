#![forbid(unsafe_code)]

use crate::error::{AuthError, BackendError, ValidationError};
use crate::ids::JobId;
use crate::jobs::{Job, JobResult, JobSpec, JobStatus};
use async_trait::async_trait;
use std::path::Path;

pub const DEFAULT_LIST_LIMIT: usize = 10;
pub const MAX_LIST_LIMIT: usize = 100;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListQuery {
    pub limit: usize,
    pub offset: usize,
    pub status_filter: Option<JobStatus>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            offset: 0,
            status_filter: None,
        }
    }
}

impl ListQuery {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(1..=MAX_LIST_LIMIT).contains(&self.limit) {
            return Err(ValidationError::new(
                "limit",
                format!("must be between 1 and {MAX_LIST_LIMIT} (got {})", self.limit),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct JobPage {
    pub jobs: Vec<Job>,
    /// Size of the filtered set, independent of paging.
    pub total_count: usize,
}

/// The remote compute service. Implementations own all job state; callers only
/// ever see immutable snapshots.
#[async_trait]
pub trait BackendGateway: Send + Sync {
    async fn submit(&self, spec: JobSpec) -> Result<Job, BackendError>;

    async fn get_status(&self, job_id: &JobId) -> Result<Job, BackendError>;

    async fn retrieve_results(
        &self,
        job_id: &JobId,
        output_path: Option<&Path>,
    ) -> Result<JobResult, BackendError>;

    async fn cancel(&self, job_id: &JobId, reason: Option<&str>) -> Result<Job, BackendError>;

    async fn list(&self, query: ListQuery) -> Result<JobPage, BackendError>;
}

pub trait Authenticator: Send + Sync {
    fn extract_credential(&self, header: Option<&str>) -> Result<String, AuthError> {
        extract_bearer_token(header).map(str::to_string)
    }

    fn validate(&self, token: &str) -> Result<bool, AuthError>;

    fn authenticate(&self, header: Option<&str>) -> Result<(), AuthError> {
        let token = self.extract_credential(header)?;
        self.validate(&token)?;
        Ok(())
    }
}

/// Parses `Bearer <token>`. The scheme is case-insensitive; the token is
/// returned verbatim.
pub fn extract_bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let Some(header) = header.filter(|h| !h.is_empty()) else {
        tracing::warn!("missing Authorization header");
        return Err(AuthError::MissingCredential);
    };

    let parts = header.split_whitespace().collect::<Vec<_>>();
    let [scheme, token] = parts.as_slice() else {
        tracing::warn!(parts_count = parts.len(), "malformed Authorization header");
        return Err(AuthError::MalformedCredential { parts: parts.len() });
    };

    if !scheme.eq_ignore_ascii_case("bearer") {
        tracing::warn!(scheme = %scheme, "unsupported authentication scheme");
        return Err(AuthError::UnsupportedScheme {
            scheme: (*scheme).to_string(),
        });
    }
    Ok(*token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_extraction() {
        assert_eq!(extract_bearer_token(Some("Bearer abc123")), Ok("abc123"));
        assert_eq!(extract_bearer_token(Some("bearer abc123")), Ok("abc123"));
        assert_eq!(extract_bearer_token(Some("BEARER  abc123 ")), Ok("abc123"));
        assert_eq!(
            extract_bearer_token(Some("Basic abc123")),
            Err(AuthError::UnsupportedScheme {
                scheme: "Basic".into()
            })
        );
        assert_eq!(
            extract_bearer_token(Some("OnlyOneToken")),
            Err(AuthError::MalformedCredential { parts: 1 })
        );
        assert_eq!(
            extract_bearer_token(Some("Bearer a b")),
            Err(AuthError::MalformedCredential { parts: 3 })
        );
        assert_eq!(extract_bearer_token(None), Err(AuthError::MissingCredential));
        assert_eq!(extract_bearer_token(Some("")), Err(AuthError::MissingCredential));
        assert_eq!(
            extract_bearer_token(Some("   ")),
            Err(AuthError::MalformedCredential { parts: 0 })
        );
    }

    #[test]
    fn list_limit_bounds() {
        let query = |limit| ListQuery {
            limit,
            ..ListQuery::default()
        };
        assert!(query(0).validate().is_err());
        assert!(query(1).validate().is_ok());
        assert!(query(100).validate().is_ok());
        assert!(query(101).validate().is_err());
        assert_eq!(ListQuery::default().limit, 10);
    }
}
