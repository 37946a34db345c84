//! Dispatcher wiring: configuration and batch submission to a queue service.

pub mod config;
pub mod dispatcher;

pub use config::{DispatcherConfig, JOB_TYPE_PREFIX_ENV};
pub use dispatcher::{JobBatchDispatcher, dispatch};
