//! Pool metrics.
//!
//! With the `metrics` feature, the pool records OpenTelemetry instruments
//! through handles registered by [`init_metric_handles`]. The host process owns
//! the meter provider and exporter; until it registers a meter, recording is a
//! silent no-op. Without the feature every recording function compiles to an
//! empty body.
//!
//! | Instrument          | Kind           | Meaning                              |
//! |---------------------|----------------|--------------------------------------|
//! | `attempts`          | counter        | Attempts accepted onto the queue     |
//! | `attempt_errors`    | counter        | Attempts resolved with an error      |
//! | `attempts_inflight` | up/down counter| Attempts submitted and not resolved  |
//! | `attempt_duration`  | histogram (ms) | Submit-to-resolve latency            |

#[cfg(feature = "metrics")]
use crate::error::ErrorKind;
#[cfg(feature = "metrics")]
use opentelemetry::{
    KeyValue,
    metrics::{Counter, Histogram, Meter, UpDownCounter},
};
#[cfg(feature = "metrics")]
use std::sync::OnceLock;

#[cfg(feature = "metrics")]
static ATTEMPTS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static ATTEMPT_ERRORS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static ATTEMPTS_INFLIGHT: OnceLock<UpDownCounter<i64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static ATTEMPT_DURATION_MS: OnceLock<Histogram<f64>> = OnceLock::new();

/// Registers the pool's instruments on `meter`. Later calls are ignored.
#[cfg(feature = "metrics")]
pub fn init_metric_handles(meter: &Meter) {
    let _ = ATTEMPTS.set(
        meter
            .u64_counter("attempts")
            .with_description("Attempts accepted onto the work queue")
            .build(),
    );

    let _ = ATTEMPT_ERRORS.set(
        meter
            .u64_counter("attempt_errors")
            .with_description("Attempts resolved with an error")
            .build(),
    );

    let _ = ATTEMPTS_INFLIGHT.set(
        meter
            .i64_up_down_counter("attempts_inflight")
            .with_description("Attempts submitted and not yet resolved")
            .build(),
    );

    let _ = ATTEMPT_DURATION_MS.set(
        meter
            .f64_histogram("attempt_duration")
            .with_unit("ms")
            .with_description("Submit-to-resolve latency")
            .build(),
    );
}

#[cfg(feature = "metrics")]
pub(crate) fn increment_attempts() {
    if let Some(counter) = ATTEMPTS.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub(crate) fn increment_attempts() {}

#[cfg(feature = "metrics")]
pub(crate) fn increment_attempt_errors(kind: ErrorKind) {
    if let Some(counter) = ATTEMPT_ERRORS.get() {
        counter.add(1, &[KeyValue::new("kind", kind.as_str())]);
    }
}

#[cfg(not(feature = "metrics"))]
pub(crate) fn increment_attempt_errors(_kind: crate::error::ErrorKind) {}

#[cfg(feature = "metrics")]
pub(crate) fn increment_attempts_inflight() {
    if let Some(counter) = ATTEMPTS_INFLIGHT.get() {
        counter.add(1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub(crate) fn increment_attempts_inflight() {}

#[cfg(feature = "metrics")]
pub(crate) fn decrement_attempts_inflight() {
    if let Some(counter) = ATTEMPTS_INFLIGHT.get() {
        counter.add(-1, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub(crate) fn decrement_attempts_inflight() {}

#[cfg(feature = "metrics")]
pub(crate) fn record_attempt_duration(duration_ms: f64) {
    if let Some(histogram) = ATTEMPT_DURATION_MS.get() {
        histogram.record(duration_ms, &[]);
    }
}

#[cfg(not(feature = "metrics"))]
pub(crate) fn record_attempt_duration(_duration_ms: f64) {}
