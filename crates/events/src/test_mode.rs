//! In-memory queue for tests/dev ("test mode").
//!
//! Jobs are never processed: saved jobs are recorded in submission order and
//! the test drives their lifecycle by hand (`progress`, `complete`, `fail`),
//! which fires the observers registered through the job handle.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use tracing::debug;

use notifyq_core::{JobId, JobPayload, JobType};

use crate::event::JobState;
use crate::queue::{CompleteHandler, FailedHandler, JobHandle, ProgressHandler, QueueClient, QueueError};

/// A job recorded by the test-mode queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedJob {
    pub id: JobId,
    pub job_type: JobType,
    pub data: JobPayload,
    pub state: JobState,
    /// Last reported progress percentage.
    pub progress: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct Observers {
    complete: Vec<Arc<dyn Fn() + Send + Sync>>,
    progress: Vec<Arc<dyn Fn(u8) + Send + Sync>>,
    failed: Vec<Arc<dyn Fn(&str) + Send + Sync>>,
}

#[derive(Default)]
struct State {
    next_id: u64,
    jobs: Vec<SubmittedJob>,
    observers: HashMap<JobId, Observers>,
    save_failure: Option<String>,
}

impl State {
    /// Look up a saved job that can still change state.
    fn live_job(&mut self, id: JobId) -> Result<&mut SubmittedJob, QueueError> {
        let job = self
            .jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or(QueueError::UnknownJob(id))?;

        if job.state.is_terminal() {
            return Err(QueueError::InvalidTransition(id));
        }
        Ok(job)
    }
}

// Observers never run while the lock is held, so a poisoned lock still holds
// consistent data.
fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory [`QueueClient`] that records jobs instead of running them.
///
/// Clones share the same recorded state.
#[derive(Clone, Default)]
pub struct TestModeQueue {
    state: Arc<Mutex<State>>,
}

impl core::fmt::Debug for TestModeQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("TestModeQueue")
            .field("jobs", &state.jobs)
            .field("save_failure", &state.save_failure)
            .finish_non_exhaustive()
    }
}

impl TestModeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `save` fail with `reason`.
    pub fn fail_saves(&self, reason: impl Into<String>) {
        lock(&self.state).save_failure = Some(reason.into());
    }

    /// Undo [`TestModeQueue::fail_saves`].
    pub fn accept_saves(&self) {
        lock(&self.state).save_failure = None;
    }

    /// Saved jobs, in submission order.
    pub fn jobs(&self) -> Vec<SubmittedJob> {
        lock(&self.state).jobs.clone()
    }

    pub fn job(&self, id: JobId) -> Option<SubmittedJob> {
        lock(&self.state).jobs.iter().find(|j| j.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        lock(&self.state).jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.state).jobs.is_empty()
    }

    /// Forget recorded jobs and their observers. Ids keep increasing.
    pub fn clear(&self) {
        let mut state = lock(&self.state);
        state.jobs.clear();
        state.observers.clear();
    }

    /// Report progress for a queued job and notify its `progress` observers.
    pub fn progress(&self, id: JobId, percent: u32) -> Result<(), QueueError> {
        let percent = u8::try_from(percent)
            .ok()
            .filter(|p| *p <= 100)
            .ok_or(QueueError::InvalidProgress(percent))?;

        let handlers = {
            let mut state = lock(&self.state);
            let job = state.live_job(id)?;
            job.progress = percent;
            job.updated_at = Utc::now();
            state
                .observers
                .get(&id)
                .map(|o| o.progress.clone())
                .unwrap_or_default()
        };

        for handler in handlers {
            handler(percent);
        }
        Ok(())
    }

    /// Mark a queued job complete and notify its `complete` observers.
    pub fn complete(&self, id: JobId) -> Result<(), QueueError> {
        let handlers = {
            let mut state = lock(&self.state);
            let job = state.live_job(id)?;
            job.state = JobState::Complete;
            job.progress = 100;
            job.updated_at = Utc::now();
            state
                .observers
                .get(&id)
                .map(|o| o.complete.clone())
                .unwrap_or_default()
        };

        for handler in handlers {
            handler();
        }
        Ok(())
    }

    /// Mark a queued job failed and notify its `failed` observers.
    pub fn fail(&self, id: JobId, error: impl Into<String>) -> Result<(), QueueError> {
        let error = error.into();
        let handlers = {
            let mut state = lock(&self.state);
            let job = state.live_job(id)?;
            job.state = JobState::Failed {
                error: error.clone(),
            };
            job.updated_at = Utc::now();
            state
                .observers
                .get(&id)
                .map(|o| o.failed.clone())
                .unwrap_or_default()
        };

        for handler in handlers {
            handler(&error);
        }
        Ok(())
    }
}

impl QueueClient for TestModeQueue {
    type Handle = TestJobHandle;

    fn create(&self, job_type: &JobType, data: &JobPayload) -> TestJobHandle {
        let id = {
            let mut state = lock(&self.state);
            state.next_id += 1;
            JobId::new(state.next_id)
        };

        TestJobHandle {
            id,
            job_type: job_type.clone(),
            data: data.clone(),
            saved: false,
            state: Arc::clone(&self.state),
        }
    }
}

/// Handle returned by [`TestModeQueue::create`].
pub struct TestJobHandle {
    id: JobId,
    job_type: JobType,
    data: JobPayload,
    saved: bool,
    state: Arc<Mutex<State>>,
}

impl core::fmt::Debug for TestJobHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TestJobHandle")
            .field("id", &self.id)
            .field("job_type", &self.job_type)
            .field("saved", &self.saved)
            .finish_non_exhaustive()
    }
}

impl JobHandle for TestJobHandle {
    fn id(&self) -> JobId {
        self.id
    }

    fn save(&mut self) -> Result<(), QueueError> {
        let mut state = lock(&self.state);
        if let Some(reason) = &state.save_failure {
            return Err(QueueError::Save(reason.clone()));
        }

        // A repeated save persists the same job again; it is not a new job.
        if !self.saved {
            let now = Utc::now();
            state.jobs.push(SubmittedJob {
                id: self.id,
                job_type: self.job_type.clone(),
                data: self.data.clone(),
                state: JobState::Queued,
                progress: 0,
                created_at: now,
                updated_at: now,
            });
            self.saved = true;
            debug!(job_id = %self.id, job_type = %self.job_type, "test-mode job recorded");
        }
        Ok(())
    }

    fn on_complete(&mut self, handler: CompleteHandler) -> &mut Self {
        lock(&self.state)
            .observers
            .entry(self.id)
            .or_default()
            .complete
            .push(Arc::from(handler));
        self
    }

    fn on_progress(&mut self, handler: ProgressHandler) -> &mut Self {
        lock(&self.state)
            .observers
            .entry(self.id)
            .or_default()
            .progress
            .push(Arc::from(handler));
        self
    }

    fn on_failed(&mut self, handler: FailedHandler) -> &mut Self {
        lock(&self.state)
            .observers
            .entry(self.id)
            .or_default()
            .failed
            .push(Arc::from(handler));
        self
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn payload() -> JobPayload {
        JobPayload::new("44556677889", "Use the code 1982 to verify your account")
    }

    fn saved_job(queue: &TestModeQueue) -> TestJobHandle {
        let mut job = queue.create(&JobType::new("push_notification_code"), &payload());
        job.save().unwrap();
        job
    }

    #[test]
    fn jobs_are_recorded_on_save_not_on_create() {
        let queue = TestModeQueue::new();
        let mut job = queue.create(&JobType::new("push_notification_code"), &payload());
        assert!(queue.is_empty());

        job.save().unwrap();
        job.save().unwrap();

        let jobs = queue.jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, job.id());
        assert_eq!(jobs[0].job_type, "push_notification_code");
        assert_eq!(jobs[0].data, payload());
        assert_eq!(jobs[0].state, JobState::Queued);
    }

    #[test]
    fn ids_are_unique_and_survive_clear() {
        let queue = TestModeQueue::new();
        let first = saved_job(&queue).id();
        queue.clear();
        let second = saved_job(&queue).id();

        assert_ne!(first, second);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn failing_saves_record_nothing() {
        let queue = TestModeQueue::new();
        queue.fail_saves("connection refused");

        let mut job = queue.create(&JobType::new("push_notification_code"), &payload());
        assert_eq!(
            job.save(),
            Err(QueueError::Save("connection refused".to_string()))
        );
        assert!(queue.is_empty());

        queue.accept_saves();
        job.save().unwrap();
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn lifecycle_events_reach_observers() {
        let queue = TestModeQueue::new();
        let completed = Arc::new(AtomicUsize::new(0));
        let last_progress = Arc::new(AtomicUsize::new(0));

        let mut job = queue.create(&JobType::new("push_notification_code"), &payload());
        let c = completed.clone();
        let p = last_progress.clone();
        job.on_complete(Box::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }))
        .on_progress(Box::new(move |pct: u8| {
            p.store(pct as usize, Ordering::SeqCst);
        }));
        job.save().unwrap();

        queue.progress(job.id(), 50).unwrap();
        assert_eq!(last_progress.load(Ordering::SeqCst), 50);

        queue.complete(job.id()).unwrap();
        assert_eq!(completed.load(Ordering::SeqCst), 1);
        assert_eq!(queue.job(job.id()).unwrap().state, JobState::Complete);
    }

    #[test]
    fn failed_observers_receive_the_error_message() {
        let queue = TestModeQueue::new();
        let seen = Arc::new(Mutex::new(Vec::<String>::new()));

        let mut job = queue.create(&JobType::new("push_notification_code"), &payload());
        let s = seen.clone();
        job.on_failed(Box::new(move |err: &str| s.lock().unwrap().push(err.to_string())));
        job.save().unwrap();

        queue.fail(job.id(), "Phone number 44556677889 is blacklisted").unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec!["Phone number 44556677889 is blacklisted".to_string()]
        );
    }

    #[test]
    fn terminal_jobs_reject_further_transitions() {
        let queue = TestModeQueue::new();
        let id = saved_job(&queue).id();

        queue.complete(id).unwrap();
        assert_eq!(queue.fail(id, "late"), Err(QueueError::InvalidTransition(id)));
        assert_eq!(queue.progress(id, 10), Err(QueueError::InvalidTransition(id)));
        assert_eq!(queue.complete(id), Err(QueueError::InvalidTransition(id)));
    }

    #[test]
    fn unsaved_and_unknown_jobs_are_rejected() {
        let queue = TestModeQueue::new();
        let unsaved = queue.create(&JobType::new("push_notification_code"), &payload());

        assert_eq!(
            queue.complete(unsaved.id()),
            Err(QueueError::UnknownJob(unsaved.id()))
        );
        assert_eq!(
            queue.progress(JobId::new(999), 1),
            Err(QueueError::UnknownJob(JobId::new(999)))
        );
    }

    #[test]
    fn progress_above_one_hundred_is_rejected() {
        let queue = TestModeQueue::new();
        let id = saved_job(&queue).id();

        assert_eq!(queue.progress(id, 101), Err(QueueError::InvalidProgress(101)));
        assert_eq!(queue.progress(id, 300), Err(QueueError::InvalidProgress(300)));
        queue.progress(id, 100).unwrap();
    }
}
