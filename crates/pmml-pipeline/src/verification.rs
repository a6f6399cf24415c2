//! Verification snapshots.
//!
//! A [`Verification`] records a sample of inputs together with the pipeline's
//! predictions (and class probabilities, when the final step offers them) and
//! the numeric tolerances a downstream consumer should apply when replaying
//! the sample against an exported model.

use ndarray::Array2;
use serde::Serialize;

use crate::data::fields::{extract_names, FieldNames};
use crate::data::{serialize_matrix, serialize_optional_matrix, Data, Values};
use crate::error::{DataSide, PmmlError, Result};
use crate::obs;
use crate::pipeline::Pipeline;
use crate::stage::Capability;

/// Default relative tolerance.
pub const DEFAULT_PRECISION: f64 = 1e-13;

/// Default absolute tolerance for values near zero.
pub const DEFAULT_ZERO_THRESHOLD: f64 = 1e-13;

/// Immutable verification sample.
///
/// Field names on the wire are the ones exporters look for:
/// `active_values`, `target_values`, `probability_values`, `precision`,
/// `zeroThreshold`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verification {
    #[serde(serialize_with = "serialize_matrix")]
    active_values: Array2<f64>,

    target_values: Values,

    #[serde(
        serialize_with = "serialize_optional_matrix",
        skip_serializing_if = "Option::is_none"
    )]
    probability_values: Option<Array2<f64>>,

    precision: f64,

    #[serde(rename = "zeroThreshold")]
    zero_threshold: f64,
}

impl Verification {
    /// Build a snapshot.
    ///
    /// # Errors
    ///
    /// - `NegativePrecision` / `NegativeZeroThreshold`: a tolerance is
    ///   negative or NaN.
    /// - `RowCountMismatch`: inputs and outputs disagree on sample count.
    pub fn new(
        active_values: Array2<f64>,
        target_values: Values,
        precision: f64,
        zero_threshold: f64,
    ) -> Result<Self> {
        check_tolerances(precision, zero_threshold)?;
        check_rows("target_values", active_values.nrows(), target_values.n_rows())?;
        Ok(Self {
            active_values,
            target_values,
            probability_values: None,
            precision,
            zero_threshold,
        })
    }

    /// Attach class probabilities; row count must match the targets.
    pub fn with_probability_values(mut self, probability_values: Array2<f64>) -> Result<Self> {
        check_rows(
            "probability_values",
            self.target_values.n_rows(),
            probability_values.nrows(),
        )?;
        self.probability_values = Some(probability_values);
        Ok(self)
    }

    pub fn active_values(&self) -> &Array2<f64> {
        &self.active_values
    }

    pub fn target_values(&self) -> &Values {
        &self.target_values
    }

    pub fn probability_values(&self) -> Option<&Array2<f64>> {
        self.probability_values.as_ref()
    }

    pub fn precision(&self) -> f64 {
        self.precision
    }

    pub fn zero_threshold(&self) -> f64 {
        self.zero_threshold
    }

    pub fn n_samples(&self) -> usize {
        self.active_values.nrows()
    }
}

/// Both tolerances must be non-negative numbers.
pub(crate) fn check_tolerances(precision: f64, zero_threshold: f64) -> Result<()> {
    if precision.is_nan() || precision < 0.0 {
        return Err(PmmlError::NegativePrecision(precision));
    }
    if zero_threshold.is_nan() || zero_threshold < 0.0 {
        return Err(PmmlError::NegativeZeroThreshold(zero_threshold));
    }
    Ok(())
}

fn check_rows(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(PmmlError::RowCountMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}

/// Validate `x` against the training field names and build a snapshot.
///
/// Nothing is stored here; the caller decides where the snapshot lives.
pub(crate) fn build(
    pipeline: &Pipeline,
    trained: Option<&FieldNames>,
    x: &Data,
    precision: f64,
    zero_threshold: f64,
) -> Result<Verification> {
    let observed = extract_names(x);
    let (expected, observed) = match (trained, observed) {
        (Some(expected), Some(observed)) => (expected, observed),
        (None, Some(_)) => return Err(anonymous(DataSide::Training)),
        (Some(_), None) => return Err(anonymous(DataSide::Verification)),
        (None, None) => return Err(anonymous(DataSide::Both)),
    };
    if *expected != observed {
        return Err(PmmlError::FieldMismatch {
            expected: expected.clone(),
            actual: observed,
        });
    }

    let active_values = x.to_matrix();
    let target_values = pipeline.predict(x)?.values();
    let verification = Verification::new(active_values, target_values, precision, zero_threshold)?;

    let estimator = pipeline.final_estimator();
    if !(estimator.has_capability(Capability::Classifier)
        && estimator.has_capability(Capability::PredictProba))
    {
        return Ok(verification);
    }

    match pipeline.predict_proba(x) {
        Ok(proba) => verification.with_probability_values(proba),
        Err(err) if err.is_unsupported(Capability::PredictProba) => {
            obs::emit_probability_skipped(estimator.kind(), &err);
            Ok(verification)
        }
        Err(err) => Err(err.into()),
    }
}

fn anonymous(side: DataSide) -> PmmlError {
    PmmlError::AnonymousData { side }
}
