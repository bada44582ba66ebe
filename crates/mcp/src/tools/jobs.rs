#![forbid(unsafe_code)]

use crate::support::args::{
    in_range, optional_i64, optional_string, optional_string_list, require_i64, require_object,
    require_string,
};
use crate::support::time::{rfc3339, rfc3339_opt};
use jg_core::error::{GatewayError, ValidationError};
use jg_core::ids::{JobId, JobIdError};
use jg_core::jobs::{
    Job, JobResult, JobSpec, JobStatus, MAX_INSTANCE_COUNT, MAX_PRIORITY, MIN_INSTANCE_COUNT,
    MIN_PRIORITY, ResourceType,
};
use jg_core::ports::{DEFAULT_LIST_LIMIT, ListQuery, MAX_LIST_LIMIT};
use jg_core::usecases::{ListedJobs, UseCases};
use serde_json::{Map, Value, json};
use std::path::PathBuf;

pub(crate) const MAX_CANCEL_REASON_LEN: usize = 500;

type Args = Map<String, Value>;

#[derive(Debug)]
pub(crate) struct RetrieveResultsInput {
    pub(crate) job_id: JobId,
    pub(crate) output_path: Option<PathBuf>,
}

#[derive(Debug)]
pub(crate) struct CancelJobInput {
    pub(crate) job_id: JobId,
    pub(crate) reason: Option<String>,
}

pub(crate) fn parse_submit(args: &Args) -> Result<JobSpec, ValidationError> {
    let name = require_string(args, "job_name")?;
    let config = require_object(args, "job_config")?;
    let instance_count = in_range(
        "instance_count",
        require_i64(args, "instance_count")?,
        MIN_INSTANCE_COUNT,
        MAX_INSTANCE_COUNT,
    )?;
    let raw_resource = require_string(args, "resource_type")?;
    let resource_type = ResourceType::parse(&raw_resource)
        .ok_or_else(|| ValidationError::new("resource_type", "must be CPU or GPU"))?;
    let priority = match optional_i64(args, "priority")? {
        Some(raw) => in_range("priority", raw, MIN_PRIORITY, MAX_PRIORITY)?,
        None => 0,
    };
    let tags = optional_string_list(args, "tags")?;

    let spec = JobSpec::new(name, resource_type, instance_count)
        .with_config(config)
        .with_priority(priority)
        .with_tags(tags);
    spec.validate()?;
    Ok(spec)
}

pub(crate) fn parse_job_id(args: &Args) -> Result<JobId, ValidationError> {
    let raw = require_string(args, "job_id")?;
    JobId::try_new(raw).map_err(|err| {
        let constraint = match err {
            JobIdError::Empty => "must not be empty",
            JobIdError::TooLong => "is too long",
            JobIdError::ContainsControl => "must not contain control characters",
        };
        ValidationError::new("job_id", constraint)
    })
}

pub(crate) fn parse_retrieve(args: &Args) -> Result<RetrieveResultsInput, ValidationError> {
    let job_id = parse_job_id(args)?;
    let output_path = optional_string(args, "output_path")?
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from);
    Ok(RetrieveResultsInput {
        job_id,
        output_path,
    })
}

pub(crate) fn parse_cancel(args: &Args) -> Result<CancelJobInput, ValidationError> {
    let job_id = parse_job_id(args)?;
    let reason = optional_string(args, "reason")?;
    if let Some(reason) = reason.as_deref() {
        let len = reason.chars().count();
        if len > MAX_CANCEL_REASON_LEN {
            return Err(ValidationError::new(
                "reason",
                format!("must be at most {MAX_CANCEL_REASON_LEN} characters (got {len})"),
            ));
        }
    }
    Ok(CancelJobInput { job_id, reason })
}

pub(crate) fn parse_list(args: &Args) -> Result<ListQuery, ValidationError> {
    let limit = match optional_i64(args, "limit")? {
        Some(raw) => in_range("limit", raw, 1_u32, MAX_LIST_LIMIT as u32)? as usize,
        None => DEFAULT_LIST_LIMIT,
    };
    let offset = match optional_i64(args, "offset")? {
        Some(raw) if raw < 0 => {
            return Err(ValidationError::new(
                "offset",
                format!("must be >= 0 (got {raw})"),
            ));
        }
        Some(raw) => usize::try_from(raw)
            .map_err(|_| ValidationError::new("offset", "is too large"))?,
        None => 0,
    };
    let status_filter = match optional_string(args, "status_filter")? {
        None => None,
        Some(raw) => Some(
            JobStatus::parse(&raw)
                .filter(|status| *status != JobStatus::Submitted)
                .ok_or_else(|| {
                    ValidationError::new(
                        "status_filter",
                        "must be one of: queued, running, completed, failed, cancelled",
                    )
                })?,
        ),
    };
    Ok(ListQuery {
        limit,
        offset,
        status_filter,
    })
}

pub(crate) fn job_submitted(job: &Job) -> Value {
    json!({
        "job_id": job.job_id().as_str(),
        "status": job.status().as_str(),
        "name": job.name(),
        "created_at": rfc3339(job.created_at()),
        "instance_count": job.instance_count(),
        "resource_type": job.resource_type().as_str(),
    })
}

pub(crate) fn job_status(job: &Job) -> Value {
    json!({
        "job_id": job.job_id().as_str(),
        "status": job.status().as_str(),
        "progress": job.progress(),
        "started_at": rfc3339_opt(job.started_at()),
        "updated_at": rfc3339(job.updated_at()),
        "error_message": job.error_message(),
    })
}

pub(crate) fn job_results(result: &JobResult) -> Value {
    json!({
        "job_id": result.job_id().as_str(),
        "status": result.status().as_str(),
        "results_url": result.results_url(),
        "file_size_bytes": result.file_size_bytes(),
        "file_count": result.file_count(),
        "download_url": result.download_url(),
        "checksum": result.checksum(),
    })
}

pub(crate) fn job_cancelled(job: &Job, reason: Option<&str>) -> Value {
    json!({
        "job_id": job.job_id().as_str(),
        "cancelled_at": rfc3339(job.completed_at().unwrap_or(job.updated_at())),
        "status": job.status().as_str(),
        "reason": reason,
    })
}

pub(crate) fn jobs_list(listed: &ListedJobs) -> Value {
    let jobs = listed
        .jobs
        .iter()
        .map(|job| {
            json!({
                "job_id": job.job_id().as_str(),
                "status": job.status().as_str(),
                "name": job.name(),
                "created_at": rfc3339(job.created_at()),
            })
        })
        .collect::<Vec<_>>();
    json!({
        "total_count": listed.total_count,
        "jobs": jobs,
        "next_offset": listed.next_offset,
    })
}

pub(crate) async fn submit_job(usecases: &UseCases, args: &Args) -> Result<Value, GatewayError> {
    let spec = parse_submit(args)?;
    let job = usecases.submit_job.execute(spec).await?;
    Ok(job_submitted(&job))
}

pub(crate) async fn get_job_status(usecases: &UseCases, args: &Args) -> Result<Value, GatewayError> {
    let job_id = parse_job_id(args)?;
    let job = usecases.get_job_status.execute(&job_id).await?;
    Ok(job_status(&job))
}

pub(crate) async fn retrieve_job_results(
    usecases: &UseCases,
    args: &Args,
) -> Result<Value, GatewayError> {
    let input = parse_retrieve(args)?;
    let result = usecases
        .retrieve_results
        .execute(&input.job_id, input.output_path.as_deref())
        .await?;
    Ok(job_results(&result))
}

pub(crate) async fn cancel_job(usecases: &UseCases, args: &Args) -> Result<Value, GatewayError> {
    let input = parse_cancel(args)?;
    let job = usecases
        .cancel_job
        .execute(&input.job_id, input.reason.as_deref())
        .await?;
    Ok(job_cancelled(&job, input.reason.as_deref()))
}

pub(crate) async fn list_jobs(usecases: &UseCases, args: &Args) -> Result<Value, GatewayError> {
    let query = parse_list(args)?;
    let listed = usecases.list_jobs.execute(query).await?;
    Ok(jobs_list(&listed))
}
