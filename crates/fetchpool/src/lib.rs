//! # `fetchpool`: Bounded Dispatch of Typed HTTP Calls
//!
//! `fetchpool` runs JSON HTTP request/response cycles on a fixed set of
//! [`tokio`] worker tasks. A caller submits a method, a URL, an optional typed
//! payload and a typed response target, then suspends until one worker has
//! executed the call and decoded the response into that target.
//!
//! ## Highlights
//!
//! - **Fixed Capacity**: `N` workers share one queue of capacity `N`.
//!   Submitters wait when every worker is busy and the queue is full.
//! - **Exactly Once**: each attempt is claimed by exactly one worker and its
//!   completion fires exactly once, on every success and failure path.
//! - **Typed**: payloads and responses are any `serde` records; malformed
//!   attempts are rejected before they are queued.
//! - **Private Transports**: every worker owns its own client, bounded by a
//!   per-call timeout. No retries, no shared connection state.
//! - **Forceful Shutdown**: shutdown cancels idle workers, fails anything
//!   still queued with [`Error::Shutdown`], and refuses further submissions.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use fetchpool::{Pool, PoolConfig};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize, Default)]
//! struct Info {
//!     count: u32,
//!     pages: u32,
//! }
//!
//! #[derive(Serialize, Deserialize, Default)]
//! struct Page {
//!     info: Info,
//! }
//!
//! # async fn run() -> fetchpool::Result<()> {
//! let pool = Pool::new(PoolConfig::new(5)).await?;
//!
//! let mut page = Page::default();
//! let fetched = pool
//!     .get("https://rickandmortyapi.com/api/character", &mut page)
//!     .await?;
//! println!("{} characters (status {})", fetched.data.info.count, fetched.status_code);
//!
//! pool.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Features
//!
//! - `tracing`: structured log events at each protocol step.
//! - `metrics`: OpenTelemetry instruments, see [`telemetry`].
//!
//! ## Module Overview
//!
//! - [`pool`] - Pool construction, submission, shutdown and the worker loop.
//! - [`transport`] - The transport contract and the `reqwest` implementation.
//! - [`resolve`] - The per-attempt result carrier.
//! - [`config`] - Pool configuration.
//! - [`error`] - The unified error type.

mod attempt;
pub mod config;
pub mod error;
pub mod pool;
pub mod resolve;
pub mod telemetry;
pub mod transport;

pub use attempt::JSON_CONTENT_TYPE;
pub use config::PoolConfig;
pub use error::{Error, ErrorKind, Result};
pub use pool::manager::{Fetched, Pool};
pub use transport::{HttpTransport, Transport, TransportRequest, TransportResponse};
