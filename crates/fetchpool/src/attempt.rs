//! Typed request/response units of work.
//!
//! An [`Attempt`] pairs a request description (method, URL, optional typed
//! payload) with the [`Resolve`] slot its caller is waiting on. Shape checks
//! on the payload and response target run once, at construction, before the
//! attempt can ever reach the queue. Everything after that happens on the
//! single worker that dequeues it:
//!
//! 1. [`Attempter::build_request`] serializes the payload. If the request
//!    cannot be built, the attempt records the error and signals completion
//!    itself, and the worker skips the transport entirely.
//! 2. [`Attempter::apply_response`] decodes the raw body and signals.
//! 3. [`Attempter::fail`] records a transport error and signals.
//!
//! These three paths are mutually exclusive, so completion fires exactly once.

use crate::{
    error::{Error, Result},
    resolve::{Completion, Resolve, Waiter, completion},
    transport::{TransportRequest, TransportResponse},
};
use bytes::Bytes;
use reqwest::{
    Method, Url,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

/// Content type attached to every request that carries a body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Method for which payload validation is skipped.
const READ_METHOD: &str = "GET";

/// Type-erased attempt, as carried by the pool's queue.
///
/// The queue holds attempts of arbitrary request/response types, so workers
/// only see this interface.
pub(crate) trait Attempter: Send {
    /// Builds the transport request, or records the error and signals
    /// completion and returns `None`.
    fn build_request(&mut self) -> Option<TransportRequest>;

    /// Decodes the transport response into the result slot and signals.
    fn apply_response(&mut self, response: TransportResponse);

    fn mark_error(&mut self, err: Error);

    fn signal_done(&mut self);

    /// Whether completion has been signaled.
    fn is_resolved(&self) -> bool;

    /// Records a terminal error and signals completion.
    fn fail(&mut self, err: Error) {
        self.mark_error(err);
        self.signal_done();
    }
}

/// One request/response cycle submitted to the pool.
pub(crate) struct Attempt<Req, Resp> {
    url: String,
    method: String,
    body: Option<Req>,
    result: Resolve<Resp>,
    done: Completion<Resolve<Resp>>,
}

impl<Req, Resp> Attempt<Req, Resp>
where
    Req: Serialize,
    Resp: Serialize + DeserializeOwned,
{
    /// Creates an attempt and the waiter its caller blocks on.
    ///
    /// `target` is the caller's pre-allocated response value; it is only
    /// inspected here, never written.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRequest`] if a non-GET attempt has no payload, or
    ///   the payload or response target is not a record.
    /// - [`Error::EncodeFailure`] if the payload cannot be serialized.
    pub(crate) fn new(
        url: impl Into<String>,
        method: impl Into<String>,
        body: Option<Req>,
        target: &Resp,
    ) -> Result<(Self, Waiter<Resolve<Resp>>)> {
        let (done, waiter) = completion();
        let attempt = Self {
            url: url.into(),
            method: method.into(),
            body,
            result: Resolve::new(),
            done,
        };

        if attempt.method != READ_METHOD {
            attempt.validate_payload()?;
        }
        validate_response_target(target)?;

        Ok((attempt, waiter))
    }

    fn validate_payload(&self) -> Result<()> {
        let Some(body) = &self.body else {
            return Err(Error::invalid_request(format!(
                "{} request requires a body",
                self.method
            )));
        };

        let value = serde_json::to_value(body).map_err(|e| Error::EncodeFailure {
            context: e.to_string(),
        })?;
        ensure_record(&value, "request body")
    }

    fn try_build_request(&self) -> Result<TransportRequest> {
        if self.method.is_empty() || self.url.is_empty() {
            return Err(Error::invalid_request("request has no method or url"));
        }

        let method = Method::from_bytes(self.method.as_bytes()).map_err(|e| {
            Error::invalid_request(format!("invalid method {:?}: {e}", self.method))
        })?;
        let url = Url::parse(&self.url)
            .map_err(|e| Error::invalid_request(format!("invalid url {:?}: {e}", self.url)))?;

        let mut headers = HeaderMap::new();
        let body = match &self.body {
            Some(payload) => {
                let bytes = serde_json::to_vec(payload).map_err(|e| Error::EncodeFailure {
                    context: e.to_string(),
                })?;
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
                Some(Bytes::from(bytes))
            }
            None => None,
        };

        Ok(TransportRequest {
            method,
            url,
            headers,
            body,
        })
    }
}

impl<Req, Resp> Attempter for Attempt<Req, Resp>
where
    Req: Serialize + Send,
    Resp: Serialize + DeserializeOwned + Send,
{
    fn build_request(&mut self) -> Option<TransportRequest> {
        match self.try_build_request() {
            Ok(request) => Some(request),
            Err(err) => {
                self.fail(err);
                None
            }
        }
    }

    fn apply_response(&mut self, response: TransportResponse) {
        if response.body.is_empty() {
            self.fail(Error::EmptyBody {
                status_code: response.status_code,
            });
            return;
        }

        match serde_json::from_slice::<Resp>(&response.body) {
            Ok(data) => {
                self.result.set_data(data);
                self.result.set_status_code(response.status_code);
            }
            Err(e) => self.mark_error(Error::DecodeFailure {
                context: format!("status {}: {e}", response.status_code),
            }),
        }

        self.signal_done();
    }

    fn mark_error(&mut self, err: Error) {
        self.result.set_error(err);
    }

    fn signal_done(&mut self) {
        let result = core::mem::take(&mut self.result);
        self.done.fire(result);
    }

    fn is_resolved(&self) -> bool {
        self.done.is_fired()
    }
}

fn validate_response_target<Resp: Serialize>(target: &Resp) -> Result<()> {
    let value = serde_json::to_value(target).map_err(|e| {
        Error::invalid_request(format!("response target cannot be inspected: {e}"))
    })?;
    ensure_record(&value, "response target")
}

fn ensure_record(value: &Value, what: &str) -> Result<()> {
    let kind = match value {
        Value::Object(_) => return Ok(()),
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
    };
    Err(Error::invalid_request(format!(
        "{what} must be a record, got {kind}"
    )))
}
