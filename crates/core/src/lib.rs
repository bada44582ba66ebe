#![forbid(unsafe_code)]

pub mod error;
pub mod jobs;
pub mod ports;
pub mod usecases;

pub mod ids {
    use serde::{Deserialize, Serialize};

    const MAX_JOB_ID_LEN: usize = 256;

    /// Opaque job identifier assigned by the backend at submission time.
    #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct JobId(String);

    impl JobId {
        pub fn as_str(&self) -> &str {
            &self.0
        }

        pub fn into_string(self) -> String {
            self.0
        }

        pub fn try_new(value: impl Into<String>) -> Result<Self, JobIdError> {
            let value = value.into();
            validate_job_id(&value)?;
            Ok(Self(value))
        }
    }

    impl std::fmt::Display for JobId {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(&self.0)
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum JobIdError {
        Empty,
        TooLong,
        ContainsControl,
    }

    fn validate_job_id(value: &str) -> Result<(), JobIdError> {
        if value.trim().is_empty() {
            return Err(JobIdError::Empty);
        }
        if value.len() > MAX_JOB_ID_LEN {
            return Err(JobIdError::TooLong);
        }
        if value.chars().any(|ch| ch.is_control()) {
            return Err(JobIdError::ContainsControl);
        }
        Ok(())
    }

}
