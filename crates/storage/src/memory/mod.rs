#![forbid(unsafe_code)]

use async_trait::async_trait;
use jg_core::error::BackendError;
use jg_core::ids::JobId;
use jg_core::jobs::{Job, JobResult, JobSpec, JobStatus, LifecycleError};
use jg_core::ports::{BackendGateway, JobPage, ListQuery};
use std::collections::HashMap;
use std::path::Path;
use time::OffsetDateTime;
use tokio::sync::RwLock;

mod results;

pub const DEFAULT_RESULTS_BASE_URL: &str = "https://storage.jobgate.local";

/// Output metadata recorded when a job completes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResultManifest {
    pub file_count: u64,
    pub file_size_bytes: u64,
}

#[derive(Clone, Debug)]
struct JobRecord {
    job: Job,
    manifest: ResultManifest,
    cancel_reason: Option<String>,
}

#[derive(Default)]
struct JobTable {
    next_seq: u64,
    // Submission order; ids are never removed or reused.
    order: Vec<JobId>,
    records: HashMap<JobId, JobRecord>,
}

impl JobTable {
    fn get(&self, job_id: &JobId) -> Result<&JobRecord, BackendError> {
        self.records
            .get(job_id)
            .ok_or_else(|| BackendError::JobNotFound {
                job_id: job_id.clone(),
            })
    }

    fn get_mut(&mut self, job_id: &JobId) -> Result<&mut JobRecord, BackendError> {
        self.records
            .get_mut(job_id)
            .ok_or_else(|| BackendError::JobNotFound {
                job_id: job_id.clone(),
            })
    }
}

/// In-process job backend. A single lock guards the table so a
/// check-then-transition on one job can never interleave with another writer.
pub struct MemoryBackend {
    table: RwLock<JobTable>,
    results_base_url: String,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_results_base_url(DEFAULT_RESULTS_BASE_URL)
    }

    pub fn with_results_base_url(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            table: RwLock::new(JobTable::default()),
            results_base_url: url.trim_end_matches('/').to_string(),
        }
    }

    pub fn results_base_url(&self) -> &str {
        &self.results_base_url
    }

    /// Non-terminal jobs in submission order.
    pub async fn active_job_ids(&self) -> Vec<JobId> {
        let table = self.table.read().await;
        table
            .order
            .iter()
            .filter(|id| {
                table
                    .records
                    .get(*id)
                    .is_some_and(|record| !record.job.is_terminal())
            })
            .cloned()
            .collect()
    }

    pub async fn mark_queued(&self, job_id: &JobId) -> Result<Job, BackendError> {
        self.apply(job_id, |job, now| job.transition(JobStatus::Queued, now))
            .await
    }

    pub async fn mark_running(&self, job_id: &JobId) -> Result<Job, BackendError> {
        self.apply(job_id, |job, now| job.transition(JobStatus::Running, now))
            .await
    }

    pub async fn report_progress(&self, job_id: &JobId, progress: f64) -> Result<Job, BackendError> {
        self.apply(job_id, |job, now| job.with_progress(progress, now))
            .await
    }

    pub async fn fail(&self, job_id: &JobId, message: &str) -> Result<Job, BackendError> {
        self.apply(job_id, |job, now| job.fail(message, now)).await
    }

    pub async fn complete(
        &self,
        job_id: &JobId,
        manifest: ResultManifest,
    ) -> Result<Job, BackendError> {
        let mut table = self.table.write().await;
        let record = table.get_mut(job_id)?;
        let next = record
            .job
            .transition(JobStatus::Completed, OffsetDateTime::now_utc())?;
        record.job = next.clone();
        record.manifest = manifest;
        tracing::info!(
            job_id = %job_id,
            file_count = manifest.file_count,
            file_size_bytes = manifest.file_size_bytes,
            "job completed"
        );
        Ok(next)
    }

    pub async fn cancel_reason(&self, job_id: &JobId) -> Result<Option<String>, BackendError> {
        let table = self.table.read().await;
        Ok(table.get(job_id)?.cancel_reason.clone())
    }

    async fn apply<F>(&self, job_id: &JobId, step: F) -> Result<Job, BackendError>
    where
        F: FnOnce(&Job, OffsetDateTime) -> Result<Job, LifecycleError>,
    {
        let mut table = self.table.write().await;
        let record = table.get_mut(job_id)?;
        let next = step(&record.job, OffsetDateTime::now_utc())?;
        tracing::debug!(
            job_id = %job_id,
            from = %record.job.status(),
            to = %next.status(),
            progress = next.progress(),
            "job updated"
        );
        record.job = next.clone();
        Ok(next)
    }
}

#[async_trait]
impl BackendGateway for MemoryBackend {
    async fn submit(&self, spec: JobSpec) -> Result<Job, BackendError> {
        // Callers validate too; the backend never trusts that.
        spec.validate()?;

        let mut table = self.table.write().await;
        table.next_seq += 1;
        let raw_id = format!("JOB-{:06}", table.next_seq);
        let job_id = JobId::try_new(raw_id.clone())
            .map_err(|err| BackendError::api(format!("generated invalid job id {raw_id}: {err:?}")))?;
        let job = Job::submitted(job_id.clone(), spec, OffsetDateTime::now_utc())?;

        table.order.push(job_id.clone());
        table.records.insert(
            job_id,
            JobRecord {
                job: job.clone(),
                manifest: ResultManifest::default(),
                cancel_reason: None,
            },
        );
        Ok(job)
    }

    async fn get_status(&self, job_id: &JobId) -> Result<Job, BackendError> {
        let table = self.table.read().await;
        Ok(table.get(job_id)?.job.clone())
    }

    async fn retrieve_results(
        &self,
        job_id: &JobId,
        output_path: Option<&Path>,
    ) -> Result<JobResult, BackendError> {
        let record = {
            let table = self.table.read().await;
            table.get(job_id)?.clone()
        };
        let status = record.job.status();
        if !status.is_terminal() {
            return Err(BackendError::JobNotCompleted {
                job_id: job_id.clone(),
                status,
            });
        }

        let results_url = format!("{}/results/{job_id}", self.results_base_url);
        let result = JobResult::new(job_id.clone(), status, results_url)?.with_files(
            record.manifest.file_count,
            record.manifest.file_size_bytes,
        );

        match output_path {
            Some(dir) => results::write_manifest(dir, &record.job, result).await,
            None => Ok(result.with_download_url(format!(
                "{}/download/{job_id}",
                self.results_base_url
            ))),
        }
    }

    async fn cancel(&self, job_id: &JobId, reason: Option<&str>) -> Result<Job, BackendError> {
        let mut table = self.table.write().await;
        let record = table.get_mut(job_id)?;
        let status = record.job.status();
        if status.is_terminal() {
            return Err(BackendError::JobAlreadyCompleted {
                job_id: job_id.clone(),
                status,
            });
        }
        let next = record.job.cancel(OffsetDateTime::now_utc())?;
        record.job = next.clone();
        record.cancel_reason = reason.map(str::to_string);
        Ok(next)
    }

    async fn list(&self, query: ListQuery) -> Result<JobPage, BackendError> {
        query.validate()?;

        let table = self.table.read().await;
        // Newest first; creation order never changes, so pages stay stable.
        let matching = table
            .order
            .iter()
            .rev()
            .filter_map(|id| table.records.get(id))
            .filter(|record| {
                query
                    .status_filter
                    .is_none_or(|status| record.job.status() == status)
            })
            .collect::<Vec<_>>();

        let total_count = matching.len();
        let jobs = matching
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .map(|record| record.job.clone())
            .collect();
        Ok(JobPage { jobs, total_count })
    }
}
