//! Error types for the fetch pool.
//!
//! This module defines the central [`Error`] enum, which captures every
//! terminal outcome an attempt can reach besides success. None of these are
//! retried internally: the first error recorded on an attempt is the one its
//! caller observes.
//!
//! ## Error Cases
//! - `InvalidConfig`: The pool was configured with zero workers or a zero
//!   timeout.
//! - `InvalidRequest`: Missing method/URL, or a payload/response target that
//!   is not a record.
//! - `EncodeFailure`: The request payload could not be serialized.
//! - `Network`: The transport failed (connect, timeout, body read).
//! - `EmptyBody`: The transport succeeded but returned no body bytes.
//! - `DecodeFailure`: The response body could not be decoded into the target.
//! - `WorkerPanic`: The worker panicked while executing the attempt.
//! - `Shutdown`: The pool was shut down before the attempt could run.

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for pool construction, submission and execution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The pool configuration was rejected.
    #[error("Invalid pool config: {reason}")]
    InvalidConfig { reason: String },

    /// The request description or its payload/response shape was rejected.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// The request payload could not be serialized.
    #[error("Failed to encode request body: {context}")]
    EncodeFailure { context: String },

    /// The transport call failed or timed out.
    #[error("Network error: {context}")]
    Network { context: String },

    /// The response carried no body to decode.
    #[error("Response body is empty (status {status_code})")]
    EmptyBody { status_code: u16 },

    /// The response body could not be decoded into the response target.
    #[error("Failed to decode response body: {context}")]
    DecodeFailure { context: String },

    /// The worker panicked while executing the attempt. The worker itself
    /// keeps running.
    #[error("Worker panicked: {context}")]
    WorkerPanic { context: String },

    /// The pool is shut down and will not execute the attempt.
    #[error("Pool is shut down")]
    Shutdown,
}

/// Fieldless discriminant of [`Error`], convenient for matching and metrics
/// attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidConfig,
    InvalidRequest,
    EncodeFailure,
    Network,
    EmptyBody,
    DecodeFailure,
    WorkerPanic,
    Shutdown,
}

impl Error {
    /// Returns the kind of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidConfig { .. } => ErrorKind::InvalidConfig,
            Self::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            Self::EncodeFailure { .. } => ErrorKind::EncodeFailure,
            Self::Network { .. } => ErrorKind::Network,
            Self::EmptyBody { .. } => ErrorKind::EmptyBody,
            Self::DecodeFailure { .. } => ErrorKind::DecodeFailure,
            Self::WorkerPanic { .. } => ErrorKind::WorkerPanic,
            Self::Shutdown => ErrorKind::Shutdown,
        }
    }

    pub(crate) fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

impl ErrorKind {
    /// Stable lowercase label, used as a metrics attribute value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidConfig => "invalid_config",
            Self::InvalidRequest => "invalid_request",
            Self::EncodeFailure => "encode_failure",
            Self::Network => "network",
            Self::EmptyBody => "empty_body",
            Self::DecodeFailure => "decode_failure",
            Self::WorkerPanic => "worker_panic",
            Self::Shutdown => "shutdown",
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let context = if err.is_timeout() {
            format!("request timed out: {err}")
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            err.to_string()
        };
        Self::Network { context }
    }
}
