#![forbid(unsafe_code)]

use jg_core::error::{BackendError, GatewayError};
use serde_json::{Value, json};

pub(crate) fn ai_ok(intent: &str, result: Value) -> Value {
    json!({
        "success": true,
        "intent": intent,
        "result": result,
        "warnings": [],
        "error": null
    })
}

pub(crate) fn ai_error_with(code: &str, message: &str, recovery: Option<&str>) -> Value {
    let mut error_obj = serde_json::Map::new();
    error_obj.insert("code".to_string(), Value::String(code.to_string()));
    error_obj.insert(
        "message".to_string(),
        Value::String(message.trim().to_string()),
    );
    if let Some(recovery) = recovery {
        error_obj.insert(
            "recovery".to_string(),
            Value::String(recovery.trim().to_string()),
        );
    }

    json!({
        "success": false,
        "intent": "error",
        "result": {},
        "warnings": [],
        "error": Value::Object(error_obj)
    })
}

pub(crate) fn ai_error(code: &str, message: &str) -> Value {
    ai_error_with(code, message, None)
}

/// Renders any gateway failure as a tool error envelope.
pub(crate) fn gateway_error(err: &GatewayError) -> Value {
    ai_error_with(err.code(), &err.to_string(), recovery_hint(err))
}

fn recovery_hint(err: &GatewayError) -> Option<&'static str> {
    match err {
        GatewayError::Authentication(_) => {
            Some("Send `Authorization: Bearer <token>` with the gateway's configured token.")
        }
        GatewayError::Validation(_) => Some("Fix the named argument and retry the call."),
        GatewayError::Backend(backend) => match backend {
            BackendError::JobNotFound { .. } => {
                Some("Check the job_id; use list_jobs to see known jobs.")
            }
            BackendError::JobNotCompleted { .. } => {
                Some("Poll get_job_status until the job reaches a terminal status.")
            }
            BackendError::JobAlreadyCompleted { .. } => {
                Some("The job is terminal; use retrieve_job_results instead of cancelling.")
            }
            BackendError::InvalidRequest(_) => Some("Fix the named argument and retry the call."),
            BackendError::Lifecycle(_) => {
                Some("Re-read the job with get_job_status; its state changed concurrently.")
            }
            BackendError::Connection(_) | BackendError::Timeout(_) => {
                Some("The compute backend is unreachable; retry later.")
            }
            BackendError::Api { .. } => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jg_core::error::{AuthError, ValidationError};
    use jg_core::ids::JobId;
    use jg_core::jobs::JobStatus;

    #[test]
    fn envelopes_have_a_fixed_shape() {
        let ok = ai_ok("submit_job", json!({ "job_id": "JOB-000001" }));
        assert_eq!(ok["success"], json!(true));
        assert_eq!(ok["error"], Value::Null);
        assert_eq!(ok["warnings"], json!([]));

        let err = ai_error("INVALID_INPUT", "  job_id is required ");
        assert_eq!(err["success"], json!(false));
        assert_eq!(err["error"]["message"], json!("job_id is required"));
        assert!(err["error"].get("recovery").is_none());
    }

    #[test]
    fn gateway_errors_carry_code_and_recovery() {
        let err = GatewayError::from(BackendError::JobNotCompleted {
            job_id: JobId::try_new("JOB-000001").unwrap(),
            status: JobStatus::Running,
        });
        let body = gateway_error(&err);
        assert_eq!(body["error"]["code"], json!("JOB_NOT_COMPLETED"));
        assert!(body["error"]["message"].as_str().unwrap().contains("running"));
        assert!(body["error"]["recovery"].is_string());

        let body = gateway_error(&GatewayError::from(AuthError::InvalidCredential));
        assert_eq!(body["error"]["code"], json!("UNAUTHENTICATED"));
        assert_eq!(
            body["error"]["message"],
            json!("authentication failed: invalid bearer token")
        );

        let body = gateway_error(&GatewayError::from(ValidationError::new(
            "instance_count",
            "must be between 1 and 10000",
        )));
        assert_eq!(body["error"]["code"], json!("INVALID_INPUT"));

        let body = gateway_error(&GatewayError::from(BackendError::api("boom")));
        assert_eq!(body["error"]["code"], json!("BACKEND_ERROR"));
        assert!(body["error"].get("recovery").is_none());
    }
}
