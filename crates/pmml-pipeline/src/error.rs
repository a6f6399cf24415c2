//! Error taxonomy for pipelines, stages and verification snapshots.

use std::fmt;

use crate::data::fields::FieldNames;
use crate::stage::Capability;

/// Errors raised while assembling tabular inputs.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("{labels} column labels supplied for a matrix with {width} columns")]
    ColumnCount { labels: usize, width: usize },

    #[error("unknown column: {0}")]
    UnknownColumn(String),
}

/// Errors raised by an individual pipeline stage.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    #[error("stage does not support {0}")]
    Unsupported(Capability),

    #[error("stage has not been fitted")]
    NotFitted,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("stage failed: {0}")]
    Failed(String),
}

/// Errors raised by the delegate pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("pipeline must contain at least one step")]
    EmptyPipeline,

    #[error("duplicate step name: {0}")]
    DuplicateStep(String),

    #[error("invalid step name {name:?}: {reason}")]
    InvalidStepName { name: String, reason: &'static str },

    #[error("fit parameter {key:?} does not match any step")]
    UnknownFitParam { key: String },

    #[error("fit parameter {key:?} is not of the form <step>__<param>")]
    MalformedFitParam { key: String },

    #[error("step {step:?} failed: {source}")]
    Stage {
        step: String,
        #[source]
        source: StageError,
    },
}

impl PipelineError {
    /// The stage-level error behind this failure, if a stage raised it.
    pub fn stage_error(&self) -> Option<&StageError> {
        match self {
            PipelineError::Stage { source, .. } => Some(source),
            _ => None,
        }
    }

    /// True when a stage reported `capability` as unsupported at call time.
    pub fn is_unsupported(&self, capability: Capability) -> bool {
        matches!(self.stage_error(), Some(StageError::Unsupported(c)) if *c == capability)
    }
}

/// Which side of a verification lacked field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSide {
    Training,
    Verification,
    Both,
}

impl fmt::Display for DataSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSide::Training => write!(f, "training"),
            DataSide::Verification => write!(f, "verification"),
            DataSide::Both => write!(f, "training and verification"),
        }
    }
}

/// Errors surfaced by [`crate::PmmlPipeline`].
#[derive(Debug, thiserror::Error)]
pub enum PmmlError {
    #[error("precision must be a non-negative number, got {0}")]
    NegativePrecision(f64),

    #[error("zero threshold must be a non-negative number, got {0}")]
    NegativeZeroThreshold(f64),

    #[error("{what} has {actual} rows, expected {expected}")]
    RowCountMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("cannot perform model verification with anonymous {side} data")]
    AnonymousData { side: DataSide },

    #[error(
        "the columns between training data {expected} and verification data {actual} do not match"
    )]
    FieldMismatch {
        expected: FieldNames,
        actual: FieldNames,
    },

    /// Failures raised by the wrapped pipeline, passed through untouched.
    #[error(transparent)]
    Delegate(#[from] PipelineError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Coarse classification of [`PmmlError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Value,
    Schema,
    SchemaMismatch,
    Delegate,
    Config,
    Serialization,
}

impl PmmlError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PmmlError::NegativePrecision(_)
            | PmmlError::NegativeZeroThreshold(_)
            | PmmlError::RowCountMismatch { .. } => ErrorKind::Value,
            PmmlError::AnonymousData { .. } => ErrorKind::Schema,
            PmmlError::FieldMismatch { .. } => ErrorKind::SchemaMismatch,
            PmmlError::Delegate(_) => ErrorKind::Delegate,
            PmmlError::Config(_) => ErrorKind::Config,
            PmmlError::Serialization(_) => ErrorKind::Serialization,
        }
    }
}

/// Result type for pipeline wrapper operations.
pub type Result<T> = std::result::Result<T, PmmlError>;
