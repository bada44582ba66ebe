#![forbid(unsafe_code)]

use super::ResourceType;
use crate::error::ValidationError;
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};

pub const MAX_JOB_NAME_LEN: usize = 100;
pub const MIN_INSTANCE_COUNT: u32 = 1;
pub const MAX_INSTANCE_COUNT: u32 = 10_000;
pub const MIN_PRIORITY: i32 = -100;
pub const MAX_PRIORITY: i32 = 100;

/// Everything a caller supplies when submitting a job. `config` is opaque and
/// handed to the backend untouched.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct JobSpec {
    pub name: String,
    pub config: JsonMap<String, JsonValue>,
    pub instance_count: u32,
    pub resource_type: ResourceType,
    pub priority: i32,
    pub tags: Vec<String>,
}

impl JobSpec {
    pub fn new(name: impl Into<String>, resource_type: ResourceType, instance_count: u32) -> Self {
        Self {
            name: name.into(),
            config: JsonMap::new(),
            instance_count,
            resource_type,
            priority: 0,
            tags: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: JsonMap<String, JsonValue>) -> Self {
        self.config = config;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let name_len = self.name.chars().count();
        if name_len == 0 || name_len > MAX_JOB_NAME_LEN {
            return Err(ValidationError::new(
                "job_name",
                format!("must be 1-{MAX_JOB_NAME_LEN} characters (got {name_len})"),
            ));
        }
        if !(MIN_INSTANCE_COUNT..=MAX_INSTANCE_COUNT).contains(&self.instance_count) {
            return Err(ValidationError::new(
                "instance_count",
                format!(
                    "must be between {MIN_INSTANCE_COUNT} and {MAX_INSTANCE_COUNT} (got {})",
                    self.instance_count
                ),
            ));
        }
        if !(MIN_PRIORITY..=MAX_PRIORITY).contains(&self.priority) {
            return Err(ValidationError::new(
                "priority",
                format!(
                    "must be between {MIN_PRIORITY} and {MAX_PRIORITY} (got {})",
                    self.priority
                ),
            ));
        }
        Ok(())
    }
}
