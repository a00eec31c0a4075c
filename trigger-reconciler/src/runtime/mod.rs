//! Host runtime.
//!
//! Drives the reconcile engine the way a cluster controller would: keys flow
//! through a de-duplicating queue to a pool of workers, failed passes are
//! retried with per-key exponential backoff, and results are written back to
//! the object store with optimistic concurrency.

pub(crate) mod backoff;
pub(crate) mod controller;
pub(crate) mod work_queue;

pub use backoff::ExponentialBackoff;
pub use controller::{EventRecorder, TracingEventRecorder, TriggerController};
pub use work_queue::WorkQueue;
