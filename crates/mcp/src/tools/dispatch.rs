#![forbid(unsafe_code)]

use jg_core::error::GatewayError;
use jg_core::usecases::UseCases;
use serde_json::{Map, Value};

use super::jobs;

pub(crate) const TOOL_NAMES: [&str; 5] = [
    "submit_job",
    "get_job_status",
    "retrieve_job_results",
    "cancel_job",
    "list_jobs",
];

/// Runs one tool. `None` means the name is not a known tool.
pub(crate) async fn dispatch_tool(
    usecases: &UseCases,
    name: &str,
    args: &Map<String, Value>,
) -> Option<Result<Value, GatewayError>> {
    let resp = match name {
        "submit_job" => jobs::submit_job(usecases, args).await,
        "get_job_status" => jobs::get_job_status(usecases, args).await,
        "retrieve_job_results" => jobs::retrieve_job_results(usecases, args).await,
        "cancel_job" => jobs::cancel_job(usecases, args).await,
        "list_jobs" => jobs::list_jobs(usecases, args).await,
        _ => return None,
    };
    Some(resp)
}
