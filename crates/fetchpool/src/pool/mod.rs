//! Fixed-size worker pool for dispatching attempts.
//!
//! This module owns the long-lived worker tasks and the single bounded queue
//! they share. It provides:
//!
//! - Backpressure: the queue holds at most one unclaimed attempt per worker
//! - Exactly-once execution: an attempt is handed to exactly one worker
//! - Forceful, terminal shutdown via per-worker cancellation tokens
//!
//! ## Submodules
//!
//! - [`worker`] - The worker task loop and attempt execution.
//! - [`manager`] - Pool construction, submission and shutdown.

pub mod manager;
pub(crate) mod worker;
