//! `notifyq-core` — payloads, job naming and the dispatch error model.
//!
//! Pure data types only; queue mechanics live in `notifyq-events`.

pub mod error;
pub mod id;
pub mod job_type;
pub mod payload;

pub use error::{DispatchError, DispatchResult, JOBS_NOT_AN_ARRAY};
pub use id::JobId;
pub use job_type::{DEFAULT_JOB_TYPE_PREFIX, JobType};
pub use payload::{JobBatch, JobPayload};
