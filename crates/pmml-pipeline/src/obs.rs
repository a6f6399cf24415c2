//! Structured tracing hooks for fit and verification.
//!
//! Events are emitted with an `event` field so log pipelines can filter on
//! them. Enable JSON output through [`crate::telemetry::init_tracing`].

use std::fmt::Display;

use tracing::{debug, info, warn};

use crate::data::fields::FieldNames;

/// RAII guard for a span covering one pipeline operation.
///
/// ```ignore
/// let _span = PipelineSpan::enter("verify", 3);
/// // events emitted here carry operation = "verify", steps = 3
/// ```
pub struct PipelineSpan {
    _span: tracing::span::EnteredSpan,
}

impl PipelineSpan {
    pub fn enter(operation: &str, steps: usize) -> Self {
        let span = tracing::info_span!("pmml.pipeline", operation = %operation, steps = steps);
        Self {
            _span: span.entered(),
        }
    }
}

/// Field names captured during fit. `role` is `"active"` or `"target"`.
pub fn emit_fields_captured(role: &str, fields: &FieldNames) {
    info!(
        event = "fields.captured",
        role = %role,
        count = fields.len(),
        fields = %fields,
    );
}

/// Fit data carried no names; any previously captured names are kept.
pub fn emit_fields_unavailable(role: &str, retained: bool) {
    debug!(event = "fields.unavailable", role = %role, retained = retained);
}

pub fn emit_verification_built(samples: usize, has_probabilities: bool, precision: f64, zero_threshold: f64) {
    info!(
        event = "verification.built",
        samples = samples,
        has_probabilities = has_probabilities,
        precision = precision,
        zero_threshold = zero_threshold,
    );
}

/// The final step advertised probabilities but could not produce them.
pub fn emit_probability_skipped(estimator: &str, reason: &dyn Display) {
    debug!(event = "verification.probability_skipped", estimator = %estimator, reason = %reason);
}

pub fn emit_verification_rejected(error: &dyn Display) {
    warn!(event = "verification.rejected", error = %error);
}
