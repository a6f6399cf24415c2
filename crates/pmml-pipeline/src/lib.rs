//! PMML pipeline metadata
//!
//! Wraps a sequence of named model stages and records what an exporter needs
//! to embed a self-test in the exported document:
//! - the names of the input features and output labels seen during fit
//! - a verification snapshot: sample inputs, predictions, optional class
//!   probabilities, and the numeric tolerances to check them with
//!
//! The exporter itself lives elsewhere; it reads [`PmmlPipeline::metadata`].

pub mod config;
pub mod data;
pub mod error;
pub mod fakes;
pub mod metadata;
pub mod obs;
pub mod pipeline;
pub mod pmml;
pub mod stage;
pub mod telemetry;
pub mod verification;

pub use config::VerificationConfig;
pub use data::fields::{extract_names, FieldNames, InputKind};
pub use data::{ColumnLabel, Data, DataFrame, Series, Values};
pub use error::{DataError, DataSide, ErrorKind, PipelineError, PmmlError, Result, StageError};
pub use metadata::{write_metadata_json, PipelineMetadata, METADATA_SCHEMA_VERSION};
pub use obs::PipelineSpan;
pub use pipeline::Pipeline;
pub use pmml::PmmlPipeline;
pub use stage::{Capability, FitParams, Stage};
pub use telemetry::{init_tracing, LogFormat};
pub use verification::{Verification, DEFAULT_PRECISION, DEFAULT_ZERO_THRESHOLD};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
