//! Pool configuration.
//!
//! The pool is fixed-capacity: the number of workers also sizes the shared
//! queue, so at most one unclaimed attempt per worker can be buffered before
//! submitters start waiting.

use crate::error::{Error, Result};
use core::time::Duration;

/// Ceiling for a single transport call made by a worker.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How long [`shutdown`](crate::Pool::shutdown) waits for worker tasks to
/// exit after they have been cancelled.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(3);

/// Runtime configuration for a [`Pool`](crate::Pool).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub num_workers: usize,
    pub request_timeout: Duration,
    pub shutdown_timeout: Duration,
}

impl PoolConfig {
    /// A configuration with `num_workers` workers and default timeouts.
    pub const fn new(num_workers: usize) -> Self {
        Self {
            num_workers,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Capacity of the shared work queue.
    pub const fn queue_capacity(&self) -> usize {
        self.num_workers
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.num_workers == 0 {
            return Err(Error::invalid_config("num_workers must be greater than 0"));
        }
        if self.request_timeout.is_zero() {
            return Err(Error::invalid_config("request_timeout must be non-zero"));
        }
        if self.shutdown_timeout.is_zero() {
            return Err(Error::invalid_config("shutdown_timeout must be non-zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_workers_is_rejected() {
        let err = PoolConfig::new(0).validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn zero_timeouts_are_rejected() {
        assert!(
            PoolConfig::new(1)
                .with_request_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
        assert!(
            PoolConfig::new(1)
                .with_shutdown_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn queue_matches_worker_count() {
        let config = PoolConfig::new(5);
        assert!(config.validate().is_ok());
        assert_eq!(config.queue_capacity(), 5);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }
}
