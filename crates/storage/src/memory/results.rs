#![forbid(unsafe_code)]

use jg_core::error::BackendError;
use jg_core::jobs::{Job, JobResult};
use serde::Serialize;
use sha2::Digest as _;
use std::fmt::Write as _;
use std::path::Path;

#[derive(Serialize)]
struct ManifestFile<'a> {
    job: &'a Job,
    result: &'a JobResult,
}

/// Writes `<job_id>.results.json` into `dir` and points the result at it.
pub(super) async fn write_manifest(
    dir: &Path,
    job: &Job,
    result: JobResult,
) -> Result<JobResult, BackendError> {
    let bytes = serde_json::to_vec_pretty(&ManifestFile {
        job,
        result: &result,
    })
    .map_err(|err| BackendError::wrap("failed to encode results manifest", err))?;

    tokio::fs::create_dir_all(dir).await.map_err(|err| {
        BackendError::wrap(format!("failed to create {}", dir.display()), err)
    })?;
    let path = dir.join(format!("{}.results.json", job.job_id()));
    tokio::fs::write(&path, &bytes).await.map_err(|err| {
        BackendError::wrap(format!("failed to write {}", path.display()), err)
    })?;
    let path = tokio::fs::canonicalize(&path).await.unwrap_or(path);

    tracing::info!(
        job_id = %job.job_id(),
        path = %path.display(),
        bytes = bytes.len(),
        "results manifest written"
    );
    Ok(result
        .with_download_url(format!("file://{}", path.display()))
        .with_checksum(format!("sha256:{}", sha256_hex(&bytes))))
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(64);
    for b in digest {
        let _ = write!(&mut out, "{b:02x}");
    }
    out
}
