//! Fixed-capacity pool of HTTP workers.
//!
//! This module defines the [`Pool`] struct, which owns a set of long-lived
//! worker tasks and the bounded queue they pull attempts from. Callers submit
//! a typed request and suspend until the worker that claimed it has executed
//! the call and decoded the response.
//!
//! The queue capacity equals the worker count. Once every worker is busy and
//! the queue is full, [`Pool::submit`] waits for room, which gives natural
//! backpressure without any extra bookkeeping.

use super::worker::{Job, SharedQueue, worker_loop};
use crate::{
    attempt::{Attempt, Attempter},
    config::PoolConfig,
    error::{Error, Result},
    telemetry::{
        decrement_attempts_inflight, increment_attempt_errors, increment_attempts,
        increment_attempts_inflight, record_attempt_duration,
    },
    transport::{HttpTransport, Transport},
};
use futures::future::join_all;
use serde::{Serialize, de::DeserializeOwned};
use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Instant,
};
use tokio::{
    sync::{Mutex, mpsc, oneshot},
    task::JoinHandle,
    time::timeout,
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// A response written into the caller's target, with the status it came with.
#[derive(Debug)]
pub struct Fetched<'t, T> {
    pub data: &'t mut T,
    pub status_code: u16,
}

/// A fixed set of workers sharing one bounded work queue.
///
/// Workers are spawned on the current Tokio runtime when the pool is created
/// and live until [`Pool::shutdown`] is called or the pool is dropped.
#[derive(Debug)]
pub struct Pool {
    id: Uuid,
    config: PoolConfig,
    queue: mpsc::Sender<Job>,
    receiver: SharedQueue,
    workers: Vec<CancellationToken>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    idle: Arc<AtomicUsize>,
    inflight: AtomicUsize,
    shutdown_token: CancellationToken,
}

/// Counts one submitted attempt as in flight until dropped, so a caller that
/// abandons `submit` mid-wait still releases its slot.
struct InflightGuard<'p> {
    inflight: &'p AtomicUsize,
}

impl<'p> InflightGuard<'p> {
    fn new(inflight: &'p AtomicUsize) -> Self {
        inflight.fetch_add(1, Ordering::SeqCst);
        increment_attempts_inflight();
        Self { inflight }
    }
}

impl Drop for InflightGuard<'_> {
    fn drop(&mut self) {
        self.inflight.fetch_sub(1, Ordering::SeqCst);
        decrement_attempts_inflight();
    }
}

impl Pool {
    /// Creates a pool whose workers each own an [`HttpTransport`] bounded by
    /// `config.request_timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` is invalid or an HTTP
    /// client cannot be built.
    pub async fn new(config: PoolConfig) -> Result<Self> {
        let request_timeout = config.request_timeout;
        Self::with_transport(config, |_| HttpTransport::new(request_timeout)).await
    }

    /// Creates a pool whose workers each own a transport produced by
    /// `make_transport`, which receives the worker id.
    ///
    /// Every worker has entered its idle wait by the time this returns.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `config` is invalid, or the first
    /// error returned by `make_transport`. Nothing is spawned on error.
    pub async fn with_transport<T, F>(config: PoolConfig, mut make_transport: F) -> Result<Self>
    where
        T: Transport,
        F: FnMut(usize) -> Result<T>,
    {
        config.validate()?;

        let transports = (0..config.num_workers)
            .map(&mut make_transport)
            .collect::<Result<Vec<_>>>()?;

        let id = Uuid::new_v4();
        let (queue, rx) = mpsc::channel(config.queue_capacity());
        let receiver = Arc::new(Mutex::new(rx));
        let idle = Arc::new(AtomicUsize::new(0));

        let mut workers = Vec::with_capacity(config.num_workers);
        let mut handles = Vec::with_capacity(config.num_workers);
        let mut ready = Vec::with_capacity(config.num_workers);

        for (worker_id, transport) in transports.into_iter().enumerate() {
            let cancel = CancellationToken::new();
            let (ready_tx, ready_rx) = oneshot::channel();

            handles.push(tokio::spawn(worker_loop(
                worker_id,
                Arc::clone(&receiver),
                transport,
                cancel.clone(),
                Arc::clone(&idle),
                ready_tx,
            )));
            workers.push(cancel);
            ready.push(ready_rx);
        }

        for (worker_id, result) in join_all(ready).await.into_iter().enumerate() {
            if result.is_err() {
                // Dropping `queue` on return closes the channel, which stops
                // the workers that did start.
                return Err(Error::invalid_config(format!(
                    "worker {worker_id} exited before becoming ready"
                )));
            }
        }

        #[cfg(feature = "tracing")]
        tracing::info!("Pool {id} started with {} workers", config.num_workers);

        Ok(Self {
            id,
            config,
            queue,
            receiver,
            workers,
            handles: Mutex::new(handles),
            idle,
            inflight: AtomicUsize::new(0),
            shutdown_token: CancellationToken::new(),
        })
    }

    /// Opaque identity of this pool.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    pub const fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Number of workers owned by the pool.
    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    /// Number of workers currently waiting for work.
    pub fn idle_workers(&self) -> usize {
        self.idle.load(Ordering::SeqCst)
    }

    /// Number of attempts sitting in the queue, not yet claimed by a worker.
    pub fn queued_attempts(&self) -> usize {
        self.queue.max_capacity() - self.queue.capacity()
    }

    /// Number of submissions currently waiting on a queued or running
    /// attempt.
    pub fn inflight_attempts(&self) -> usize {
        self.inflight.load(Ordering::SeqCst)
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown_token.is_cancelled()
    }

    /// Submits a request and waits for its decoded response.
    ///
    /// `target` is the caller's pre-allocated response value. It must be a
    /// record (a type that serializes to a JSON object) and is overwritten
    /// only on success; on any error it is left untouched.
    ///
    /// `body` is required, and must be a record, for every method except
    /// `GET`. When present it is sent as JSON with a
    /// `Content-Type: application/json` header.
    ///
    /// `method` is case-sensitive, as HTTP methods are. Only the exact token
    /// `GET` skips the payload check; `"get"` is sent verbatim as an
    /// extension method and needs a body like any other write.
    ///
    /// The call suspends while the queue is full and then until a worker has
    /// resolved the attempt. There is no per-call cancellation; dropping the
    /// returned future abandons the wait but not the attempt.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRequest`] / [`Error::EncodeFailure`] for a malformed
    ///   attempt, returned before anything is queued.
    /// - [`Error::Network`], [`Error::EmptyBody`] or [`Error::DecodeFailure`]
    ///   as recorded by the worker.
    /// - [`Error::WorkerPanic`] if the worker panicked while executing the
    ///   attempt.
    /// - [`Error::Shutdown`] if the pool is, or becomes, shut down before the
    ///   attempt runs.
    pub async fn submit<'t, Req, Resp>(
        &self,
        method: &str,
        url: &str,
        body: Option<Req>,
        target: &'t mut Resp,
    ) -> Result<Fetched<'t, Resp>>
    where
        Req: Serialize + Send + 'static,
        Resp: Serialize + DeserializeOwned + Send + 'static,
    {
        if self.is_shut_down() {
            return Err(Error::Shutdown);
        }

        let (attempt, waiter) = match Attempt::new(url, method, body, &*target) {
            Ok(created) => created,
            Err(err) => {
                increment_attempt_errors(err.kind());
                return Err(err);
            }
        };

        #[cfg(feature = "tracing")]
        tracing::debug!("Pool {} accepted {method} {url}", self.id);

        let start = Instant::now();
        if self.queue.send(Box::new(attempt)).await.is_err() {
            increment_attempt_errors(Error::Shutdown.kind());
            return Err(Error::Shutdown);
        }
        increment_attempts();
        let inflight = InflightGuard::new(&self.inflight);

        let outcome = match waiter.wait().await {
            Some(resolve) => resolve.into_result(),
            None if self.is_shut_down() => Err(Error::Shutdown),
            // Workers resolve every attempt they claim, including on panic, so
            // this is a worker task torn down from outside the pool.
            None => Err(Error::WorkerPanic {
                context: "attempt dropped before it was resolved".to_string(),
            }),
        };

        drop(inflight);
        record_attempt_duration(start.elapsed().as_secs_f64() * 1_000.0);

        #[cfg(feature = "tracing")]
        tracing::debug!("Pool {} resolved {method} {url}", self.id);

        match outcome {
            Ok((data, status_code)) => {
                *target = data;
                Ok(Fetched {
                    data: target,
                    status_code,
                })
            }
            Err(err) => {
                increment_attempt_errors(err.kind());
                Err(err)
            }
        }
    }

    /// Submits a `GET` request with no body. See [`Pool::submit`].
    ///
    /// # Errors
    ///
    /// Same as [`Pool::submit`].
    pub async fn get<'t, Resp>(&self, url: &str, target: &'t mut Resp) -> Result<Fetched<'t, Resp>>
    where
        Resp: Serialize + DeserializeOwned + Send + 'static,
    {
        self.submit::<(), Resp>("GET", url, None, target).await
    }

    /// Forcefully shuts down the pool.
    ///
    /// - Refuses new submissions.
    /// - Cancels every worker's token, one signal per worker.
    /// - Closes the queue and resolves every attempt still buffered in it
    ///   with [`Error::Shutdown`].
    /// - Waits up to `shutdown_timeout` for worker tasks to exit.
    ///
    /// This is not a graceful drain. Attempts already claimed by a worker run
    /// to completion because cancellation is only observed between attempts.
    /// Shutdown is terminal; calling it again does nothing.
    pub async fn shutdown(&self) {
        if self.shutdown_token.is_cancelled() {
            return;
        }

        // === Phase 1: Stop accepting new attempts ===
        #[cfg(feature = "tracing")]
        tracing::info!("Pool {} refusing new attempts", self.id);
        self.shutdown_token.cancel();

        // === Phase 2: Cancel every worker ===
        #[cfg(feature = "tracing")]
        tracing::debug!("Cancelling {} workers", self.workers.len());
        for cancel in &self.workers {
            cancel.cancel();
        }

        // === Phase 3: Close the queue and fail whatever is still buffered ===
        {
            let mut rx = self.receiver.lock().await;
            rx.close();
            let mut _dropped = 0_usize;
            while let Ok(mut attempt) = rx.try_recv() {
                attempt.fail(Error::Shutdown);
                _dropped += 1;
            }

            #[cfg(feature = "tracing")]
            {
                if _dropped > 0 {
                    tracing::warn!("Pool {} discarded {_dropped} queued attempts", self.id);
                }
            }
        }

        // === Phase 4: Wait for workers to exit ===
        let handles = core::mem::take(&mut *self.handles.lock().await);
        match timeout(self.config.shutdown_timeout, join_all(handles)).await {
            Ok(_results) => {
                #[cfg(feature = "tracing")]
                {
                    for (worker_id, result) in _results.into_iter().enumerate() {
                        if let Err(e) = result {
                            tracing::error!("Worker {worker_id} terminated abnormally: {e}");
                        }
                    }
                }
            }
            Err(_) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    "Pool {} shutdown timed out with workers still running",
                    self.id
                );
            }
        }

        #[cfg(feature = "tracing")]
        tracing::info!("Pool {} shutdown complete", self.id);
    }
}
