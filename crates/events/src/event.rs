use serde::{Deserialize, Serialize};

/// Lifecycle events a queue service emits for a job.
///
/// Observers are always registered in declaration order:
/// `Complete`, `Progress`, `Failed`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobEvent {
    Complete,
    Progress,
    Failed,
}

impl JobEvent {
    /// Observer registration order.
    pub const ALL: [JobEvent; 3] = [JobEvent::Complete, JobEvent::Progress, JobEvent::Failed];

    /// Event name as the queue service spells it.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobEvent::Complete => "complete",
            JobEvent::Progress => "progress",
            JobEvent::Failed => "failed",
        }
    }
}

impl core::fmt::Display for JobEvent {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Observable state of a submitted job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Saved, waiting for a worker.
    Queued,
    /// Finished successfully.
    Complete,
    /// Finished with an error.
    Failed { error: String },
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Complete | JobState::Failed { .. })
    }
}
