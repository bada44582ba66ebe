#![forbid(unsafe_code)]

use crate::error::BackendError;
use crate::ids::JobId;
use crate::jobs::{Job, JobResult, JobSpec};
use crate::ports::{BackendGateway, ListQuery};
use std::path::Path;
use std::sync::Arc;

/// One use case per job-lifecycle action; all share the same backend.
#[derive(Clone)]
pub struct UseCases {
    pub submit_job: SubmitJob,
    pub get_job_status: GetJobStatus,
    pub retrieve_results: RetrieveResults,
    pub cancel_job: CancelJob,
    pub list_jobs: ListJobs,
}

impl UseCases {
    pub fn new(backend: Arc<dyn BackendGateway>) -> Self {
        Self {
            submit_job: SubmitJob::new(backend.clone()),
            get_job_status: GetJobStatus::new(backend.clone()),
            retrieve_results: RetrieveResults::new(backend.clone()),
            cancel_job: CancelJob::new(backend.clone()),
            list_jobs: ListJobs::new(backend),
        }
    }
}

#[derive(Clone)]
pub struct SubmitJob {
    backend: Arc<dyn BackendGateway>,
}

impl SubmitJob {
    pub fn new(backend: Arc<dyn BackendGateway>) -> Self {
        Self { backend }
    }

    pub async fn execute(&self, spec: JobSpec) -> Result<Job, BackendError> {
        tracing::info!(
            name = %spec.name,
            instance_count = spec.instance_count,
            resource_type = %spec.resource_type,
            priority = spec.priority,
            "submitting job"
        );
        let job = self
            .backend
            .submit(spec)
            .await
            .inspect_err(|err| tracing::error!(error = %err, "job submission failed"))?;
        tracing::info!(job_id = %job.job_id(), "job submitted");
        Ok(job)
    }
}

#[derive(Clone)]
pub struct GetJobStatus {
    backend: Arc<dyn BackendGateway>,
}

impl GetJobStatus {
    pub fn new(backend: Arc<dyn BackendGateway>) -> Self {
        Self { backend }
    }

    pub async fn execute(&self, job_id: &JobId) -> Result<Job, BackendError> {
        tracing::debug!(job_id = %job_id, "getting job status");
        let job = self.backend.get_status(job_id).await.inspect_err(|err| {
            tracing::warn!(job_id = %job_id, error = %err, "job status lookup failed")
        })?;
        tracing::debug!(
            job_id = %job_id,
            status = %job.status(),
            progress = job.progress(),
            "job status retrieved"
        );
        Ok(job)
    }
}

#[derive(Clone)]
pub struct RetrieveResults {
    backend: Arc<dyn BackendGateway>,
}

impl RetrieveResults {
    pub fn new(backend: Arc<dyn BackendGateway>) -> Self {
        Self { backend }
    }

    pub async fn execute(
        &self,
        job_id: &JobId,
        output_path: Option<&Path>,
    ) -> Result<JobResult, BackendError> {
        tracing::info!(job_id = %job_id, output_path = ?output_path, "retrieving job results");
        let result = self
            .backend
            .retrieve_results(job_id, output_path)
            .await
            .inspect_err(|err| {
                tracing::warn!(job_id = %job_id, error = %err, "results retrieval failed")
            })?;
        tracing::info!(
            job_id = %job_id,
            file_count = result.file_count(),
            file_size_bytes = result.file_size_bytes(),
            "results retrieved"
        );
        Ok(result)
    }
}

#[derive(Clone)]
pub struct CancelJob {
    backend: Arc<dyn BackendGateway>,
}

impl CancelJob {
    pub fn new(backend: Arc<dyn BackendGateway>) -> Self {
        Self { backend }
    }

    pub async fn execute(&self, job_id: &JobId, reason: Option<&str>) -> Result<Job, BackendError> {
        tracing::info!(job_id = %job_id, reason = ?reason, "cancelling job");
        let job = self.backend.cancel(job_id, reason).await.inspect_err(|err| {
            tracing::warn!(job_id = %job_id, error = %err, "job cancellation failed")
        })?;
        tracing::info!(job_id = %job_id, status = %job.status(), "job cancelled");
        Ok(job)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ListedJobs {
    pub jobs: Vec<Job>,
    pub total_count: usize,
    pub next_offset: Option<usize>,
}

#[derive(Clone)]
pub struct ListJobs {
    backend: Arc<dyn BackendGateway>,
}

impl ListJobs {
    pub fn new(backend: Arc<dyn BackendGateway>) -> Self {
        Self { backend }
    }

    pub async fn execute(&self, query: ListQuery) -> Result<ListedJobs, BackendError> {
        tracing::info!(
            limit = query.limit,
            offset = query.offset,
            status_filter = ?query.status_filter,
            "listing jobs"
        );
        let page = self
            .backend
            .list(query)
            .await
            .inspect_err(|err| tracing::warn!(error = %err, "job listing failed"))?;
        let next_offset = next_offset(query.offset, query.limit, page.jobs.len(), page.total_count);
        tracing::info!(
            count = page.jobs.len(),
            total = page.total_count,
            next_offset = ?next_offset,
            "jobs listed"
        );
        Ok(ListedJobs {
            jobs: page.jobs,
            total_count: page.total_count,
            next_offset,
        })
    }
}

/// Advances by the requested `limit`, not by the number of jobs returned.
pub fn next_offset(offset: usize, limit: usize, returned: usize, total_count: usize) -> Option<usize> {
    if offset.saturating_add(returned) >= total_count {
        None
    } else {
        Some(offset.saturating_add(limit))
    }
}
