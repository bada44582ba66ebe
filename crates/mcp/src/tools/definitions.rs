#![forbid(unsafe_code)]

use jg_core::jobs::{MAX_INSTANCE_COUNT, MAX_JOB_NAME_LEN, MAX_PRIORITY, MIN_INSTANCE_COUNT, MIN_PRIORITY};
use jg_core::ports::{DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};
use serde_json::{Value, json};

use super::jobs::MAX_CANCEL_REASON_LEN;

fn job_id_property() -> Value {
    json!({ "type": "string", "minLength": 1, "description": "Identifier returned by submit_job" })
}

fn annotations(read_only: bool) -> Value {
    json!({ "readOnlyHint": read_only, "destructiveHint": !read_only })
}

pub(crate) fn tool_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": "submit_job",
            "description": "Submit a compute job to the backend. Returns the new job in status `submitted`.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "job_name": { "type": "string", "minLength": 1, "maxLength": MAX_JOB_NAME_LEN },
                    "job_config": {
                        "type": "object",
                        "description": "Opaque job configuration (image, script, environment, ...)"
                    },
                    "instance_count": {
                        "type": "integer",
                        "minimum": MIN_INSTANCE_COUNT,
                        "maximum": MAX_INSTANCE_COUNT
                    },
                    "resource_type": { "type": "string", "enum": ["CPU", "GPU"] },
                    "priority": {
                        "type": "integer",
                        "minimum": MIN_PRIORITY,
                        "maximum": MAX_PRIORITY,
                        "default": 0
                    },
                    "tags": { "type": "array", "items": { "type": "string" }, "default": [] }
                },
                "required": ["job_name", "job_config", "instance_count", "resource_type"]
            },
            "annotations": annotations(false),
        }),
        json!({
            "name": "get_job_status",
            "description": "Current status and progress of a job.",
            "inputSchema": {
                "type": "object",
                "properties": { "job_id": job_id_property() },
                "required": ["job_id"]
            },
            "annotations": annotations(true),
        }),
        json!({
            "name": "retrieve_job_results",
            "description": "Result metadata of a finished job. Fails with JOB_NOT_COMPLETED while the job is still active.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "job_id": job_id_property(),
                    "output_path": {
                        "type": "string",
                        "description": "Local directory to write the result manifest into"
                    }
                },
                "required": ["job_id"]
            },
            "annotations": annotations(true),
        }),
        json!({
            "name": "cancel_job",
            "description": "Cancel a job that has not reached a terminal status.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "job_id": job_id_property(),
                    "reason": { "type": "string", "maxLength": MAX_CANCEL_REASON_LEN }
                },
                "required": ["job_id"]
            },
            "annotations": annotations(false),
        }),
        json!({
            "name": "list_jobs",
            "description": "Page through known jobs, newest first, optionally filtered by status.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "limit": {
                        "type": "integer",
                        "minimum": 1,
                        "maximum": MAX_LIST_LIMIT,
                        "default": DEFAULT_LIST_LIMIT
                    },
                    "offset": { "type": "integer", "minimum": 0, "default": 0 },
                    "status_filter": {
                        "type": "string",
                        "enum": ["queued", "running", "completed", "failed", "cancelled"]
                    }
                }
            },
            "annotations": annotations(true),
        }),
    ]
}
