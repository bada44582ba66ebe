#![forbid(unsafe_code)]

use super::JobStatus;
use crate::error::ValidationError;
use crate::ids::JobId;
use serde::Serialize;

/// Result metadata for a job that reached a terminal state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JobResult {
    job_id: JobId,
    status: JobStatus,
    results_url: String,
    file_size_bytes: u64,
    file_count: u64,
    download_url: Option<String>,
    checksum: Option<String>,
}

impl JobResult {
    pub fn new(
        job_id: JobId,
        status: JobStatus,
        results_url: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        if !status.is_terminal() {
            return Err(ValidationError::new(
                "status",
                format!("must be completed|failed|cancelled (got {status})"),
            ));
        }
        let results_url = results_url.into();
        if results_url.trim().is_empty() {
            return Err(ValidationError::new("results_url", "must not be empty"));
        }
        Ok(Self {
            job_id,
            status,
            results_url,
            file_size_bytes: 0,
            file_count: 0,
            download_url: None,
            checksum: None,
        })
    }

    pub fn with_files(mut self, file_count: u64, file_size_bytes: u64) -> Self {
        self.file_count = file_count;
        self.file_size_bytes = file_size_bytes;
        self
    }

    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = Some(url.into());
        self
    }

    pub fn with_checksum(mut self, checksum: impl Into<String>) -> Self {
        self.checksum = Some(checksum.into());
        self
    }

    pub fn job_id(&self) -> &JobId {
        &self.job_id
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn results_url(&self) -> &str {
        &self.results_url
    }

    pub fn file_size_bytes(&self) -> u64 {
        self.file_size_bytes
    }

    pub fn file_count(&self) -> u64 {
        self.file_count
    }

    pub fn download_url(&self) -> Option<&str> {
        self.download_url.as_deref()
    }

    pub fn checksum(&self) -> Option<&str> {
        self.checksum.as_deref()
    }
}
