//! Result carrier and one-shot completion signal for a single attempt.
//!
//! A [`Resolve`] holds what an attempt produced: the decoded response, the
//! HTTP status code and the terminal error, if any. It is written only by the
//! worker that owns the attempt and handed to the caller through a
//! [`Completion`], which fires exactly once. Once the caller's [`Waiter`]
//! returns, the carrier is frozen and owned by the caller.

use crate::error::{Error, Result};
use tokio::sync::oneshot;

/// The outcome slot of an attempt.
#[derive(Debug)]
pub struct Resolve<T> {
    data: Option<T>,
    status_code: Option<u16>,
    status: Option<Error>,
}

impl<T> Default for Resolve<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Resolve<T> {
    pub(crate) const fn new() -> Self {
        Self {
            data: None,
            status_code: None,
            status: None,
        }
    }

    /// The decoded response, present only on success.
    pub const fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// The HTTP status code, recorded only when decoding succeeded.
    pub const fn status_code(&self) -> Option<u16> {
        self.status_code
    }

    /// The terminal error recorded for the attempt, if any.
    pub const fn status(&self) -> Option<&Error> {
        self.status.as_ref()
    }

    pub(crate) fn set_data(&mut self, data: T) {
        self.data = Some(data);
    }

    pub(crate) fn set_status_code(&mut self, code: u16) {
        self.status_code = Some(code);
    }

    pub(crate) fn set_error(&mut self, err: Error) {
        self.status = Some(err);
    }

    /// Collapses the carrier into the caller-facing result.
    ///
    /// A recorded error always wins. There is no partial success: data
    /// without a status code (or the reverse) cannot be produced by an
    /// attempt and is reported as a decode failure.
    pub fn into_result(self) -> Result<(T, u16)> {
        if let Some(err) = self.status {
            return Err(err);
        }
        match (self.data, self.status_code) {
            (Some(data), Some(code)) => Ok((data, code)),
            _ => Err(Error::DecodeFailure {
                context: "attempt resolved without a response".to_string(),
            }),
        }
    }
}

/// Creates a connected completion signal and waiter.
pub(crate) fn completion<T>() -> (Completion<T>, Waiter<T>) {
    let (tx, rx) = oneshot::channel();
    (Completion { tx: Some(tx) }, Waiter { rx })
}

/// The firing half of a one-shot completion signal.
///
/// Dropping an unfired `Completion` wakes the waiter with no value.
#[derive(Debug)]
pub(crate) struct Completion<T> {
    tx: Option<oneshot::Sender<T>>,
}

impl<T> Completion<T> {
    /// Fires the signal, delivering `value` to the waiter.
    ///
    /// # Panics
    ///
    /// Panics if the signal has already fired. Every path through an attempt
    /// reaches exactly one fire; a second one is a protocol bug.
    pub(crate) fn fire(&mut self, value: T) {
        let Some(tx) = self.tx.take() else {
            panic!("completion signal fired twice");
        };
        // The waiter may have been dropped with its caller; nothing to do.
        let _ = tx.send(value);
    }

    pub(crate) const fn is_fired(&self) -> bool {
        self.tx.is_none()
    }
}

/// The waiting half of a one-shot completion signal.
#[derive(Debug)]
pub(crate) struct Waiter<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> Waiter<T> {
    /// Suspends until the signal fires. Returns `None` if the firing half was
    /// dropped without firing.
    pub(crate) async fn wait(self) -> Option<T> {
        self.rx.await.ok()
    }
}
