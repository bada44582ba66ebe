#![forbid(unsafe_code)]

use super::{JobSpec, JobStatus, ResourceType};
use crate::error::ValidationError;
use crate::ids::JobId;
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LifecycleError {
    #[error("illegal transition {from} -> {to}")]
    IllegalTransition { from: JobStatus, to: JobStatus },
    #[error("job is already {status}")]
    Terminal { status: JobStatus },
    #[error("progress must be within 0..=100 (got {value})")]
    ProgressOutOfRange { value: f64 },
    #[error("progress cannot move backward ({current} -> {requested})")]
    ProgressRegression { current: f64, requested: f64 },
}

/// Snapshot of a job. Never mutated: every lifecycle step returns a successor.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Job {
    job_id: JobId,
    name: String,
    status: JobStatus,
    instance_count: u32,
    resource_type: ResourceType,
    priority: i32,
    tags: Vec<String>,
    config: JsonMap<String, JsonValue>,
    #[serde(with = "time::serde::rfc3339")]
    created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    started_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    updated_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    completed_at: Option<OffsetDateTime>,
    progress: f64,
    error_message: Option<String>,
}

impl Job {
    pub fn submitted(
        job_id: JobId,
        spec: JobSpec,
        now: OffsetDateTime,
    ) -> Result<Self, ValidationError> {
        spec.validate()?;
        let JobSpec {
            name,
            config,
            instance_count,
            resource_type,
            priority,
            tags,
        } = spec;
        Ok(Self {
            job_id,
            name,
            status: JobStatus::Submitted,
            instance_count,
            resource_type,
            priority,
            tags,
            config,
            created_at: now,
            started_at: None,
            updated_at: now,
            completed_at: None,
            progress: 0.0,
            error_message: None,
        })
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn config(&self) -> &JsonMap<String, JsonValue> {
        &self.config
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub fn started_at(&self) -> Option<OffsetDateTime> {
        self.started_at
    }

    pub fn updated_at(&self) -> OffsetDateTime {
        self.updated_at
    }

    pub fn completed_at(&self) -> Option<OffsetDateTime> {
        self.completed_at
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn transition(&self, next: JobStatus, at: OffsetDateTime) -> Result<Self, LifecycleError> {
        if self.status.is_terminal() {
            return Err(LifecycleError::Terminal {
                status: self.status,
            });
        }
        if !self.status.can_transition_to(next) {
            return Err(LifecycleError::IllegalTransition {
                from: self.status,
                to: next,
            });
        }

        let mut next_job = self.clone();
        next_job.status = next;
        next_job.updated_at = at;
        if next == JobStatus::Running && next_job.started_at.is_none() {
            next_job.started_at = Some(at);
        }
        if next.is_terminal() {
            next_job.completed_at = Some(at);
        }
        if next == JobStatus::Completed {
            next_job.progress = 100.0;
        }
        Ok(next_job)
    }

    pub fn with_progress(&self, progress: f64, at: OffsetDateTime) -> Result<Self, LifecycleError> {
        if self.status.is_terminal() {
            return Err(LifecycleError::Terminal {
                status: self.status,
            });
        }
        if !progress.is_finite() || !(0.0..=100.0).contains(&progress) {
            return Err(LifecycleError::ProgressOutOfRange { value: progress });
        }
        if progress < self.progress {
            return Err(LifecycleError::ProgressRegression {
                current: self.progress,
                requested: progress,
            });
        }

        let mut next_job = self.clone();
        next_job.progress = progress;
        next_job.updated_at = at;
        Ok(next_job)
    }

    pub fn fail(&self, message: impl Into<String>, at: OffsetDateTime) -> Result<Self, LifecycleError> {
        let mut next_job = self.transition(JobStatus::Failed, at)?;
        next_job.error_message = Some(message.into());
        Ok(next_job)
    }

    pub fn cancel(&self, at: OffsetDateTime) -> Result<Self, LifecycleError> {
        self.transition(JobStatus::Cancelled, at)
    }
}
