//! Batch submission of push-notification jobs.
//!
//! ```text
//! jobs (untyped)
//!   ↓
//! 1. Validate: must be a sequence of payloads (nothing is submitted otherwise)
//!   ↓
//! 2. For each payload, in batch order:
//!      create `<prefix>_<index>` → observe complete/progress/failed → save
//! ```
//!
//! The dispatcher never waits for a job to finish and never retries. A job
//! whose `save` fails is logged and skipped; the rest of the batch still goes
//! out. Outcomes (`complete`, `progress`, `failed`) arrive later from the queue
//! service and are only logged.

use serde_json::Value as JsonValue;
use tracing::{debug, error, info, warn};

use notifyq_core::{DispatchResult, JobBatch, JobType};
use notifyq_events::{JobHandle, QueueClient};

use crate::config::DispatcherConfig;

/// Submits batches of payloads to an injected [`QueueClient`].
#[derive(Debug, Clone, Default)]
pub struct JobBatchDispatcher {
    config: DispatcherConfig,
}

impl JobBatchDispatcher {
    pub fn new(config: DispatcherConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Validate `jobs` and submit one queue job per payload.
    ///
    /// Fails with `InvalidArgument("Jobs is not an array")` if `jobs` is not a
    /// sequence, or with an index-specific `InvalidArgument` if an element is
    /// not a payload. In both cases `queue` is never touched.
    pub fn dispatch<Q>(&self, jobs: &JsonValue, queue: &Q) -> DispatchResult<()>
    where
        Q: QueueClient + ?Sized,
    {
        let batch = JobBatch::try_from(jobs)
            .inspect_err(|e| warn!(error = %e, "rejected job batch"))?;

        self.dispatch_batch(&batch, queue);
        Ok(())
    }

    /// Submit an already-typed batch. Per-job save failures are logged only.
    pub fn dispatch_batch<Q>(&self, batch: &JobBatch, queue: &Q)
    where
        Q: QueueClient + ?Sized,
    {
        debug!(jobs = batch.len(), prefix = %self.config.job_type_prefix, "dispatching job batch");

        for (index, payload) in batch.iter().enumerate() {
            let job_type = JobType::indexed(&self.config.job_type_prefix, index);
            let mut job = queue.create(&job_type, payload);
            let id = job.id();

            observe(&mut job);

            match job.save() {
                Ok(()) => info!(job_id = %id, job_type = %job_type, "Notification job created: {id}"),
                Err(e) => error!(
                    job_id = %id,
                    job_type = %job_type,
                    error = %e,
                    "Notification job {id} failed to save: {e}"
                ),
            }
        }
    }
}

/// Validate and submit `jobs` with the default configuration.
pub fn dispatch<Q>(jobs: &JsonValue, queue: &Q) -> DispatchResult<()>
where
    Q: QueueClient + ?Sized,
{
    JobBatchDispatcher::default().dispatch(jobs, queue)
}

/// Attach the logging observers, always in the order complete, progress, failed.
fn observe<H: JobHandle>(job: &mut H) {
    let id = job.id();

    job.on_complete(Box::new(move || {
        info!(job_id = %id, "Notification job {id} completed");
    }))
    .on_progress(Box::new(move |percent: u8| {
        info!(job_id = %id, percent, "Notification job {id} {percent}% complete");
    }))
    .on_failed(Box::new(move |message: &str| {
        warn!(job_id = %id, "Notification job {id} failed: {message}");
    }));
}
