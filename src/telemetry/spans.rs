//! Span utilities for checklist tracing.

use tracing::{info_span, Span};

/// Extension trait for adding context to spans.
pub trait SpanExt {
    /// Record the result of an operation into the span.
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }
}

/// Factory for per-group spans.
pub struct GroupSpan;

impl GroupSpan {
    /// Fields included:
    /// - `run_id`, `group`
    /// - `status`, `error.message`: filled in by `SpanExt::record_result`
    /// - `latency_ms`: filled in after the group finishes
    pub fn new(run_id: &str, group: &str) -> Span {
        info_span!(
            "checklist_group",
            run_id = %run_id,
            group = %group,
            status = tracing::field::Empty,
            error.message = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
        )
    }
}
