//! `notifyq-events`
//!
//! Queue service capability (create/save jobs, observe their lifecycle events)
//! plus an in-memory test-mode queue.

pub mod event;
pub mod queue;
pub mod test_mode;

pub use event::{JobEvent, JobState};
pub use queue::{CompleteHandler, FailedHandler, JobHandle, ProgressHandler, QueueClient, QueueError};
pub use test_mode::{SubmittedJob, TestJobHandle, TestModeQueue};
