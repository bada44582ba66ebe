#![forbid(unsafe_code)]

use jg_core::error::ValidationError;
use serde_json::{Map, Value};

type Args = Map<String, Value>;

fn invalid(key: &str, constraint: impl Into<String>) -> ValidationError {
    ValidationError::new(key, constraint)
}

pub(crate) fn require_string(args: &Args, key: &str) -> Result<String, ValidationError> {
    match args.get(key) {
        Some(Value::String(v)) => Ok(v.clone()),
        None | Some(Value::Null) => Err(invalid(key, "is required")),
        Some(_) => Err(invalid(key, "must be a string")),
    }
}

pub(crate) fn optional_string(args: &Args, key: &str) -> Result<Option<String>, ValidationError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(v)) => Ok(Some(v.clone())),
        Some(_) => Err(invalid(key, "must be a string")),
    }
}

/// Integer arguments must be integral JSON numbers; `4.0` and `"4"` are rejected.
pub(crate) fn require_i64(args: &Args, key: &str) -> Result<i64, ValidationError> {
    optional_i64(args, key)?.ok_or_else(|| invalid(key, "is required"))
}

pub(crate) fn optional_i64(args: &Args, key: &str) -> Result<Option<i64>, ValidationError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| invalid(key, "must be an integer")),
        Some(_) => Err(invalid(key, "must be an integer")),
    }
}

pub(crate) fn require_object(args: &Args, key: &str) -> Result<Args, ValidationError> {
    match args.get(key) {
        Some(Value::Object(obj)) => Ok(obj.clone()),
        None | Some(Value::Null) => Err(invalid(key, "is required")),
        Some(_) => Err(invalid(key, "must be an object")),
    }
}

pub(crate) fn optional_string_list(args: &Args, key: &str) -> Result<Vec<String>, ValidationError> {
    match args.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid(key, "must be a list of strings"))
            })
            .collect(),
        Some(_) => Err(invalid(key, "must be a list of strings")),
    }
}

/// Narrows an integer into `lo..=hi`, reporting the range on failure.
pub(crate) fn in_range<T>(key: &str, value: i64, lo: T, hi: T) -> Result<T, ValidationError>
where
    T: Copy + std::fmt::Display + TryFrom<i64> + Into<i64>,
{
    if value < lo.into() || value > hi.into() {
        return Err(invalid(key, format!("must be between {lo} and {hi} (got {value})")));
    }
    T::try_from(value).map_err(|_| invalid(key, format!("must be between {lo} and {hi}")))
}
