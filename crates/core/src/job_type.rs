//! Job type labels used by the queue service to route work.

use serde::{Deserialize, Serialize};

/// Prefix for push-notification jobs.
pub const DEFAULT_JOB_TYPE_PREFIX: &str = "push_notification_code";

/// A job type label such as `push_notification_code_0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobType(String);

impl JobType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// `<prefix>_<index>`, where `index` is the payload's position in its batch.
    pub fn indexed(prefix: &str, index: usize) -> Self {
        Self(format!("{prefix}_{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for JobType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for JobType {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for JobType {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
