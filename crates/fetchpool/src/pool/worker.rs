use crate::{attempt::Attempter, error::Error, transport::Transport};
use core::{any::Any, panic::AssertUnwindSafe};
use futures::FutureExt;
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// An attempt as carried by the queue.
pub(crate) type Job = Box<dyn Attempter>;

/// The receiving end of the work queue, shared by every worker.
pub(crate) type SharedQueue = Arc<Mutex<mpsc::Receiver<Job>>>;

/// Asynchronous task representing a single worker's lifecycle.
///
/// The worker alternates between two states:
///
/// - **Idle**: waiting on either the shared queue or its own cancellation
///   token, whichever resolves first.
/// - **Executing**: running one dequeued attempt to completion.
///
/// Cancellation is only observed while idle. A token cancelled during
/// execution is seen once the current attempt has been resolved, so an
/// in-flight transport call always finishes (bounded by the transport's own
/// timeout). The loop also exits when the queue is closed.
///
/// A panic while executing an attempt is caught. The attempt is resolved with
/// [`Error::WorkerPanic`] if it was not resolved yet, and the worker returns
/// to idle.
///
/// # Arguments
/// - `worker_id`: Identifier used for logging.
/// - `queue`: The shared work queue.
/// - `transport`: This worker's private transport.
/// - `cancel`: This worker's private cancellation token.
/// - `idle`: Pool-wide count of workers currently idle.
/// - `ready`: Fired once the worker has entered its first idle wait.
pub(crate) async fn worker_loop<T: Transport>(
    worker_id: usize,
    queue: SharedQueue,
    transport: T,
    cancel: CancellationToken,
    idle: Arc<AtomicUsize>,
    ready: oneshot::Sender<()>,
) {
    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} started");

    idle.fetch_add(1, Ordering::SeqCst);
    let _ = ready.send(());

    loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                #[cfg(feature = "tracing")]
                tracing::debug!("Worker {worker_id} received cancellation");
                None
            }
            job = recv(&queue) => {
                #[cfg(feature = "tracing")]
                {
                    if job.is_none() {
                        tracing::debug!("Worker {worker_id} queue closed");
                    }
                }
                job
            }
        };

        let Some(mut attempt) = next else {
            break;
        };

        idle.fetch_sub(1, Ordering::SeqCst);
        let outcome = AssertUnwindSafe(execute(worker_id, &transport, attempt.as_mut()))
            .catch_unwind()
            .await;
        if let Err(payload) = outcome {
            let context = panic_message(payload.as_ref());

            #[cfg(feature = "tracing")]
            tracing::error!("Worker {worker_id} panicked executing attempt: {context}");

            if !attempt.is_resolved() {
                attempt.fail(Error::WorkerPanic { context });
            }
        }
        debug_assert!(attempt.is_resolved(), "attempt left unresolved");
        idle.fetch_add(1, Ordering::SeqCst);
    }

    idle.fetch_sub(1, Ordering::SeqCst);

    #[cfg(feature = "tracing")]
    tracing::trace!("Worker {worker_id} stopped");
}

/// Takes the next attempt off the shared queue. Returns `None` once the queue
/// is closed and drained.
///
/// The lock is held only while waiting, never while executing, so an idle
/// worker is always the one to claim the next attempt.
async fn recv(queue: &SharedQueue) -> Option<Job> {
    queue.lock().await.recv().await
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

/// Runs one attempt end to end. Every path resolves the attempt exactly once.
#[allow(clippy::used_underscore_binding)]
async fn execute<T: Transport>(_worker_id: usize, transport: &T, attempt: &mut dyn Attempter) {
    let Some(request) = attempt.build_request() else {
        #[cfg(feature = "tracing")]
        tracing::debug!("Worker {_worker_id} skipped transport: request could not be built");
        return;
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(
        "Worker {_worker_id} executing {} {}",
        request.method,
        request.url
    );

    match transport.execute(request).await {
        Ok(response) => attempt.apply_response(response),
        Err(err) => {
            #[cfg(feature = "tracing")]
            tracing::warn!("Worker {_worker_id} transport failed: {err}");
            attempt.fail(err);
        }
    }
}
