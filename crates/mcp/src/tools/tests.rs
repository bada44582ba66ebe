use super::jobs::{parse_cancel, parse_list, parse_retrieve, parse_submit};
use super::*;
use jg_core::jobs::{JobStatus, ResourceType};
use jg_core::usecases::UseCases;
use jg_storage::MemoryBackend;
use serde_json::{Map, Value, json};
use std::collections::BTreeSet;
use std::sync::Arc;

fn obj(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap()
}

fn submit_args(instance_count: Value) -> Map<String, Value> {
    obj(json!({
        "job_name": "render-frames",
        "job_config": { "image": "blender:4" },
        "instance_count": instance_count,
        "resource_type": "GPU"
    }))
}

#[test]
fn every_defined_tool_is_dispatchable() {
    let defined = tool_definitions()
        .iter()
        .filter_map(|tool| tool.get("name").and_then(Value::as_str).map(str::to_string))
        .collect::<BTreeSet<_>>();
    let dispatched = TOOL_NAMES.iter().map(|n| n.to_string()).collect::<BTreeSet<_>>();
    assert_eq!(defined, dispatched);

    for tool in tool_definitions() {
        assert_eq!(tool["inputSchema"]["type"], json!("object"), "{tool}");
        let read_only = tool["annotations"]["readOnlyHint"].as_bool().unwrap();
        let destructive = tool["annotations"]["destructiveHint"].as_bool().unwrap();
        assert_ne!(read_only, destructive);
        let name = tool["name"].as_str().unwrap();
        assert_eq!(destructive, matches!(name, "submit_job" | "cancel_job"), "{name}");
    }
}

#[test]
fn instance_count_boundaries() {
    assert!(parse_submit(&submit_args(json!(0))).is_err());
    assert!(parse_submit(&submit_args(json!(10_001))).is_err());
    assert_eq!(parse_submit(&submit_args(json!(1))).unwrap().instance_count, 1);
    assert_eq!(
        parse_submit(&submit_args(json!(10_000))).unwrap().instance_count,
        10_000
    );
    assert_eq!(
        parse_submit(&submit_args(json!(0))).unwrap_err().field,
        "instance_count"
    );
    assert!(parse_submit(&submit_args(json!(2.5))).is_err());
    assert!(parse_submit(&submit_args(json!("4"))).is_err());
}

#[test]
fn submit_defaults_and_field_errors() {
    let spec = parse_submit(&submit_args(json!(4))).unwrap();
    assert_eq!(spec.priority, 0);
    assert!(spec.tags.is_empty());
    assert_eq!(spec.resource_type, ResourceType::Gpu);
    assert_eq!(spec.config["image"], json!("blender:4"));

    let mut args = submit_args(json!(4));
    args.insert("resource_type".into(), json!("gpu"));
    assert_eq!(parse_submit(&args).unwrap_err().field, "resource_type");

    let mut args = submit_args(json!(4));
    args.insert("priority".into(), json!(101));
    assert_eq!(parse_submit(&args).unwrap_err().field, "priority");

    let mut args = submit_args(json!(4));
    args.insert("job_name".into(), json!(""));
    assert_eq!(parse_submit(&args).unwrap_err().field, "job_name");

    let mut args = submit_args(json!(4));
    args.insert("job_name".into(), json!("n".repeat(101)));
    assert_eq!(parse_submit(&args).unwrap_err().field, "job_name");

    let mut args = submit_args(json!(4));
    args.remove("job_config");
    assert_eq!(parse_submit(&args).unwrap_err().field, "job_config");

    let mut args = submit_args(json!(4));
    args.insert("tags".into(), json!(["prod", "prod"]));
    assert_eq!(parse_submit(&args).unwrap().tags, vec!["prod", "prod"]);
}

#[test]
fn list_and_cancel_inputs() {
    let query = parse_list(&Map::new()).unwrap();
    assert_eq!((query.limit, query.offset, query.status_filter), (10, 0, None));

    assert!(parse_list(&obj(json!({ "limit": 0 }))).is_err());
    assert!(parse_list(&obj(json!({ "limit": 101 }))).is_err());
    assert!(parse_list(&obj(json!({ "offset": -1 }))).is_err());
    assert!(parse_list(&obj(json!({ "status_filter": "submitted" }))).is_err());
    assert!(parse_list(&obj(json!({ "status_filter": "RUNNING" }))).is_err());
    assert_eq!(
        parse_list(&obj(json!({ "status_filter": "running", "limit": 100 })))
            .unwrap()
            .status_filter,
        Some(JobStatus::Running)
    );

    assert!(parse_cancel(&obj(json!({ "job_id": "" }))).is_err());
    assert!(parse_cancel(&obj(json!({ "job_id": "J", "reason": "r".repeat(501) }))).is_err());
    assert!(parse_cancel(&obj(json!({ "job_id": "J", "reason": "r".repeat(500) }))).is_ok());

    let input = parse_retrieve(&obj(json!({ "job_id": "J", "output_path": "" }))).unwrap();
    assert!(input.output_path.is_none());
}

#[tokio::test]
async fn dispatch_maps_outputs_and_errors() {
    let backend = Arc::new(MemoryBackend::new());
    let usecases = UseCases::new(backend.clone());

    let submitted = dispatch_tool(&usecases, "submit_job", &submit_args(json!(2)))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(submitted["status"], json!("submitted"));
    assert_eq!(submitted["resource_type"], json!("GPU"));
    assert_eq!(submitted["instance_count"], json!(2));
    let job_id = submitted["job_id"].as_str().unwrap().to_string();

    let status = dispatch_tool(&usecases, "get_job_status", &obj(json!({ "job_id": job_id })))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(status["progress"], json!(0.0));
    assert_eq!(status["started_at"], Value::Null);

    let err = dispatch_tool(
        &usecases,
        "retrieve_job_results",
        &obj(json!({ "job_id": job_id })),
    )
    .await
    .unwrap()
    .unwrap_err();
    assert_eq!(err.code(), "JOB_NOT_COMPLETED");

    let cancelled = dispatch_tool(
        &usecases,
        "cancel_job",
        &obj(json!({ "job_id": job_id, "reason": "wrong scene" })),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(cancelled["status"], json!("cancelled"));
    assert_eq!(cancelled["reason"], json!("wrong scene"));
    assert!(cancelled["cancelled_at"].is_string());

    let err = dispatch_tool(&usecases, "cancel_job", &obj(json!({ "job_id": job_id })))
        .await
        .unwrap()
        .unwrap_err();
    assert_eq!(err.code(), "JOB_ALREADY_COMPLETED");

    let listed = dispatch_tool(&usecases, "list_jobs", &Map::new())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(listed["total_count"], json!(1));
    assert_eq!(listed["next_offset"], Value::Null);
    assert_eq!(listed["jobs"][0]["job_id"], json!(job_id));

    let err = dispatch_tool(
        &usecases,
        "get_job_status",
        &obj(json!({ "job_id": "JOB-424242" })),
    )
    .await
    .unwrap()
    .unwrap_err();
    assert_eq!(err.code(), "JOB_NOT_FOUND");

    assert!(dispatch_tool(&usecases, "delete_job", &Map::new()).await.is_none());
}

#[tokio::test]
async fn results_with_output_path_report_a_local_manifest() {
    let backend = Arc::new(MemoryBackend::new());
    let usecases = UseCases::new(backend.clone());
    let submitted = dispatch_tool(&usecases, "submit_job", &submit_args(json!(1)))
        .await
        .unwrap()
        .unwrap();
    let job_id = submitted["job_id"].as_str().unwrap().to_string();
    dispatch_tool(&usecases, "cancel_job", &obj(json!({ "job_id": job_id })))
        .await
        .unwrap()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let results = dispatch_tool(
        &usecases,
        "retrieve_job_results",
        &obj(json!({ "job_id": job_id, "output_path": dir.path().to_str().unwrap() })),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(results["status"], json!("cancelled"));
    assert!(results["download_url"].as_str().unwrap().starts_with("file://"));
    assert!(results["checksum"].as_str().unwrap().starts_with("sha256:"));
    assert!(dir.path().join(format!("{job_id}.results.json")).exists());

    let remote = dispatch_tool(
        &usecases,
        "retrieve_job_results",
        &obj(json!({ "job_id": job_id })),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(remote["checksum"], Value::Null);
    assert!(remote["download_url"].as_str().unwrap().starts_with("https://"));
}
