//! Dispatcher configuration.

use std::env::VarError;

use tracing::debug;

use notifyq_core::{DEFAULT_JOB_TYPE_PREFIX, DispatchError, DispatchResult};

/// Environment variable overriding the job type prefix.
pub const JOB_TYPE_PREFIX_ENV: &str = "NOTIFYQ_JOB_TYPE_PREFIX";

/// Settings for [`crate::JobBatchDispatcher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Jobs are named `<job_type_prefix>_<index>`.
    pub job_type_prefix: String,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            job_type_prefix: DEFAULT_JOB_TYPE_PREFIX.to_string(),
        }
    }
}

impl DispatcherConfig {
    pub fn with_job_type_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.job_type_prefix = prefix.into();
        self
    }

    /// Load from the process environment.
    pub fn from_env() -> DispatchResult<Self> {
        Self::from_vars(|key| std::env::var(key))
    }

    /// Load using `lookup` in place of `std::env::var`.
    pub fn from_vars<F>(lookup: F) -> DispatchResult<Self>
    where
        F: Fn(&str) -> Result<String, VarError>,
    {
        match lookup(JOB_TYPE_PREFIX_ENV) {
            Ok(prefix) if prefix.trim().is_empty() => Err(DispatchError::config(format!(
                "{JOB_TYPE_PREFIX_ENV} must not be empty"
            ))),
            Ok(prefix) => Ok(Self::default().with_job_type_prefix(prefix.trim())),
            Err(VarError::NotPresent) => {
                debug!(
                    prefix = DEFAULT_JOB_TYPE_PREFIX,
                    "{JOB_TYPE_PREFIX_ENV} not set; using default job type prefix"
                );
                Ok(Self::default())
            }
            Err(VarError::NotUnicode(_)) => Err(DispatchError::config(format!(
                "{JOB_TYPE_PREFIX_ENV} is not valid unicode"
            ))),
        }
    }
}
