#![forbid(unsafe_code)]

use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub(crate) fn rfc3339(at: OffsetDateTime) -> Value {
    Value::String(
        at.format(&Rfc3339)
            .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string()),
    )
}

pub(crate) fn rfc3339_opt(at: Option<OffsetDateTime>) -> Value {
    at.map(rfc3339).unwrap_or(Value::Null)
}
