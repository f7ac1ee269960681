/*!
 * Structured Tracing
 * Tracing initialization and per-request spans for the control surface
 */

use crate::core::limits::SLOW_REQUEST_MS;
use std::time::Instant;
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - UNIQSET_TRACE_JSON: Enable JSON output (default: false)
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("UNIQSET_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    if use_json {
        // JSON output for production/parsing
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_current_span(true),
            )
            .init();
        info!("Structured tracing initialized with JSON output");
    } else {
        // Human-readable output for development
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true).compact())
            .init();
        info!("Structured tracing initialized");
    }
}

/// Generate a unique trace ID for request correlation
pub fn generate_trace_id() -> String {
    Uuid::new_v4().to_string()
}

/// Span for one control request with structured fields
///
/// Records the endpoint, request kind, and outcome; logs the duration on
/// drop and warns when a request was slow.
pub struct RequestSpan {
    _span: tracing::Span,
    start: Instant,
    trace_id: String,
}

impl RequestSpan {
    pub fn new(endpoint: &str) -> Self {
        let trace_id = generate_trace_id();

        let span = span!(
            Level::DEBUG,
            "control_request",
            trace_id = %trace_id,
            endpoint = endpoint,
            kind = tracing::field::Empty,
            outcome = tracing::field::Empty,
            error = tracing::field::Empty,
            duration_us = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
        );

        let _entered = span.enter();
        debug!(endpoint, trace_id = %trace_id, "control request started");
        drop(_entered);

        Self {
            _span: span,
            start: Instant::now(),
            trace_id,
        }
    }

    /// Get the trace ID for this request
    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    /// Record whether this is a read or a write request
    pub fn record_kind(&self, kind: &str) {
        self._span.record("kind", kind);
    }

    /// Record the request outcome
    pub fn record_outcome(&self, outcome: &str) {
        self._span.record("outcome", outcome);
    }

    /// Record an error
    pub fn record_error(&self, error: &str) {
        self._span.record("error", error);
        self._span.record("outcome", "error");
    }
}

impl Drop for RequestSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self._span.enter();

        if duration.as_millis() > SLOW_REQUEST_MS {
            self._span.record("duration_ms", duration.as_millis() as u64);
            warn!(
                trace_id = %self.trace_id,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow control request"
            );
        } else {
            self._span.record("duration_us", duration.as_micros() as u64);
            debug!(
                trace_id = %self.trace_id,
                duration_us = duration.as_micros() as u64,
                "control request completed"
            );
        }
    }
}
