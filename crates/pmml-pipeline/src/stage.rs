//! Pipeline stages and the capabilities they advertise.

use std::collections::BTreeMap;
use std::fmt;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::data::Data;
use crate::error::StageError;

/// Keyword parameters passed to `fit`, keyed by parameter name.
pub type FitParams = BTreeMap<String, serde_json::Value>;

/// What a stage can do besides being fitted.
///
/// The pipeline asks for these up front instead of calling an operation and
/// inspecting the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Transform,
    Predict,
    PredictProba,
    /// Tag only: the stage predicts class labels.
    Classifier,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Transform => write!(f, "transform"),
            Capability::Predict => write!(f, "predict"),
            Capability::PredictProba => write!(f, "predict_proba"),
            Capability::Classifier => write!(f, "classifier"),
        }
    }
}

/// A single step of a [`crate::Pipeline`].
///
/// Intermediate steps must support `transform`; the final step usually
/// supports `predict`. Operations a stage does not implement report
/// [`StageError::Unsupported`].
pub trait Stage: fmt::Debug + Send {
    /// Short type name used when rendering a pipeline, e.g. `"StandardScaler"`.
    fn kind(&self) -> &str;

    fn capabilities(&self) -> &[Capability];

    fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    fn fit(&mut self, x: &Data, y: Option<&Data>, params: &FitParams) -> Result<(), StageError>;

    fn transform(&self, _x: &Data) -> Result<Data, StageError> {
        Err(StageError::Unsupported(Capability::Transform))
    }

    fn predict(&self, _x: &Data) -> Result<Data, StageError> {
        Err(StageError::Unsupported(Capability::Predict))
    }

    /// Per-class probabilities, one row per sample.
    fn predict_proba(&self, _x: &Data) -> Result<Array2<f64>, StageError> {
        Err(StageError::Unsupported(Capability::PredictProba))
    }
}
