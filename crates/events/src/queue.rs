//! Queue service capability (mechanics only).
//!
//! The dispatcher talks to a job queue exclusively through these traits. The
//! queue service owns durability, delivery, retries and event scheduling; the
//! traits only describe what a client must be able to ask of it:
//!
//! - create a job of a given type carrying a payload
//! - persist (`save`) that job, learning whether it succeeded
//! - register observers for the job's `complete`, `progress` and `failed` events
//!
//! ## Event delivery
//!
//! Events for a job are only delivered after `create` has returned its handle,
//! so observers registered on the handle straight away can never miss one.
//! Handlers run on whatever thread the queue service delivers on; they must be
//! `Send + Sync` and should not block.

use std::sync::Arc;

use notifyq_core::{JobId, JobPayload, JobType};

/// Observer for the `complete` event.
pub type CompleteHandler = Box<dyn Fn() + Send + Sync>;

/// Observer for the `progress` event; receives a percentage in `0..=100`.
pub type ProgressHandler = Box<dyn Fn(u8) + Send + Sync>;

/// Observer for the `failed` event; receives the error message.
pub type FailedHandler = Box<dyn Fn(&str) + Send + Sync>;

/// Errors reported by a queue service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("save failed: {0}")]
    Save(String),
    #[error("job not found: {0}")]
    UnknownJob(JobId),
    #[error("job {0} is already in a terminal state")]
    InvalidTransition(JobId),
    #[error("progress out of range: {0}")]
    InvalidProgress(u32),
}

/// Handle to a job created by a [`QueueClient`].
///
/// Observer registration is chainable:
///
/// ```ignore
/// let mut job = queue.create(&job_type, &payload);
/// job.on_complete(Box::new(|| ()))
///     .on_progress(Box::new(|_| ()))
///     .on_failed(Box::new(|_| ()));
/// job.save()?;
/// ```
pub trait JobHandle {
    /// Identifier assigned by the queue service.
    fn id(&self) -> JobId;

    /// Persist the job. Reports the outcome exactly once per call.
    fn save(&mut self) -> Result<(), QueueError>;

    fn on_complete(&mut self, handler: CompleteHandler) -> &mut Self;

    fn on_progress(&mut self, handler: ProgressHandler) -> &mut Self;

    fn on_failed(&mut self, handler: FailedHandler) -> &mut Self;
}

/// Job queue service client.
///
/// Injected into callers explicitly; nothing in this workspace reaches for a
/// process-wide client.
pub trait QueueClient: Send + Sync {
    type Handle: JobHandle;

    /// Create (but do not yet persist) a job of `job_type` carrying `data`.
    fn create(&self, job_type: &JobType, data: &JobPayload) -> Self::Handle;
}

impl<Q> QueueClient for Arc<Q>
where
    Q: QueueClient + ?Sized,
{
    type Handle = Q::Handle;

    fn create(&self, job_type: &JobType, data: &JobPayload) -> Self::Handle {
        (**self).create(job_type, data)
    }
}
