//! In-memory stages for tests and examples.
//!
//! These satisfy the [`Stage`] contract with trivial arithmetic; they are not
//! estimators anyone should deploy.

use ndarray::{Array1, Array2, Axis};

use crate::data::{Data, Values};
use crate::error::StageError;
use crate::stage::{Capability, FitParams, Stage};

// ---------------------------------------------------------------------------
// CenteringScaler
// ---------------------------------------------------------------------------

/// Subtracts the per-column training mean. Keeps column labels on frames.
#[derive(Debug, Default)]
pub struct CenteringScaler {
    means: Option<Array1<f64>>,
}

impl CenteringScaler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stage for CenteringScaler {
    fn kind(&self) -> &str {
        "CenteringScaler"
    }

    fn capabilities(&self) -> &[Capability] {
        &[Capability::Transform]
    }

    fn fit(&mut self, x: &Data, _y: Option<&Data>, params: &FitParams) -> Result<(), StageError> {
        reject_params(params)?;
        let means = x
            .to_matrix()
            .mean_axis(Axis(0))
            .ok_or_else(|| StageError::InvalidInput("cannot fit on zero rows".to_string()))?;
        self.means = Some(means);
        Ok(())
    }

    fn transform(&self, x: &Data) -> Result<Data, StageError> {
        let means = self.means.as_ref().ok_or(StageError::NotFitted)?;
        let matrix = x.to_matrix();
        if matrix.ncols() != means.len() {
            return Err(StageError::InvalidInput(format!(
                "expected {} columns, got {}",
                means.len(),
                matrix.ncols()
            )));
        }
        let centered = matrix - means;
        match x {
            Data::Frame(frame) => frame
                .with_values(centered)
                .map(Data::Frame)
                .map_err(|e| StageError::InvalidInput(e.to_string())),
            _ => Ok(Data::Matrix(centered)),
        }
    }
}

// ---------------------------------------------------------------------------
// MeanRegressor
// ---------------------------------------------------------------------------

/// Predicts the training-label mean (plus an optional `shift` fit parameter).
#[derive(Debug, Default)]
pub struct MeanRegressor {
    mean: Option<f64>,
}

impl MeanRegressor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Stage for MeanRegressor {
    fn kind(&self) -> &str {
        "MeanRegressor"
    }

    fn capabilities(&self) -> &[Capability] {
        &[Capability::Predict]
    }

    fn fit(&mut self, _x: &Data, y: Option<&Data>, params: &FitParams) -> Result<(), StageError> {
        let y = y.ok_or_else(|| StageError::InvalidInput("labels are required".to_string()))?;
        let mut shift = 0.0;
        for (key, value) in params {
            match (key.as_str(), value.as_f64()) {
                ("shift", Some(v)) => shift = v,
                _ => {
                    return Err(StageError::InvalidInput(format!(
                        "unsupported fit parameter {key}={value}"
                    )))
                }
            }
        }
        let mean = y
            .to_matrix()
            .mean()
            .ok_or_else(|| StageError::InvalidInput("cannot fit on zero rows".to_string()))?;
        self.mean = Some(mean + shift);
        Ok(())
    }

    fn predict(&self, x: &Data) -> Result<Data, StageError> {
        let mean = self.mean.ok_or(StageError::NotFitted)?;
        Ok(Data::Vector(Array1::from_elem(x.n_rows(), mean)))
    }
}

// ---------------------------------------------------------------------------
// ThresholdClassifier
// ---------------------------------------------------------------------------

/// How a [`ThresholdClassifier`] handles probability requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbabilityMode {
    /// Advertises and serves probabilities.
    Enabled,
    /// Neither advertises nor serves probabilities.
    Disabled,
    /// Advertises probabilities but reports them unsupported when called.
    Unavailable,
    /// Advertises probabilities but fails with a hard error when called.
    Broken,
}

/// Binary classifier on the first column: class 1 above the training mean.
#[derive(Debug)]
pub struct ThresholdClassifier {
    threshold: Option<f64>,
    mode: ProbabilityMode,
}

impl ThresholdClassifier {
    pub fn new() -> Self {
        Self::with_mode(ProbabilityMode::Enabled)
    }

    pub fn with_mode(mode: ProbabilityMode) -> Self {
        Self {
            threshold: None,
            mode,
        }
    }

    fn margins(&self, x: &Data) -> Result<Array1<f64>, StageError> {
        let threshold = self.threshold.ok_or(StageError::NotFitted)?;
        let matrix = x.to_matrix();
        if matrix.ncols() == 0 {
            return Err(StageError::InvalidInput("no feature columns".to_string()));
        }
        Ok(matrix.column(0).mapv(|v| v - threshold))
    }
}

impl Default for ThresholdClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for ThresholdClassifier {
    fn kind(&self) -> &str {
        "ThresholdClassifier"
    }

    fn capabilities(&self) -> &[Capability] {
        match self.mode {
            ProbabilityMode::Disabled => &[Capability::Predict, Capability::Classifier],
            _ => &[
                Capability::Predict,
                Capability::PredictProba,
                Capability::Classifier,
            ],
        }
    }

    fn fit(&mut self, x: &Data, _y: Option<&Data>, params: &FitParams) -> Result<(), StageError> {
        reject_params(params)?;
        let matrix = x.to_matrix();
        if matrix.ncols() == 0 {
            return Err(StageError::InvalidInput("no feature columns".to_string()));
        }
        let threshold = matrix
            .column(0)
            .mean()
            .ok_or_else(|| StageError::InvalidInput("cannot fit on zero rows".to_string()))?;
        self.threshold = Some(threshold);
        Ok(())
    }

    fn predict(&self, x: &Data) -> Result<Data, StageError> {
        let margins = self.margins(x)?;
        Ok(Data::Vector(margins.mapv(|m| if m > 0.0 { 1.0 } else { 0.0 })))
    }

    fn predict_proba(&self, x: &Data) -> Result<Array2<f64>, StageError> {
        match self.mode {
            ProbabilityMode::Enabled => {}
            ProbabilityMode::Disabled | ProbabilityMode::Unavailable => {
                return Err(StageError::Unsupported(Capability::PredictProba))
            }
            ProbabilityMode::Broken => {
                return Err(StageError::Failed("probability calibration diverged".to_string()))
            }
        }
        let margins = self.margins(x)?;
        let mut proba = Array2::zeros((margins.len(), 2));
        for (mut row, m) in proba.outer_iter_mut().zip(margins.iter()) {
            let p = 1.0 / (1.0 + (-m).exp());
            row[0] = 1.0 - p;
            row[1] = p;
        }
        Ok(proba)
    }
}

// ---------------------------------------------------------------------------
// FailingStage
// ---------------------------------------------------------------------------

/// Fails every operation with the configured message.
#[derive(Debug)]
pub struct FailingStage {
    message: String,
}

impl FailingStage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Stage for FailingStage {
    fn kind(&self) -> &str {
        "FailingStage"
    }

    fn capabilities(&self) -> &[Capability] {
        &[Capability::Predict]
    }

    fn fit(&mut self, _x: &Data, _y: Option<&Data>, _p: &FitParams) -> Result<(), StageError> {
        Err(StageError::Failed(self.message.clone()))
    }

    fn predict(&self, _x: &Data) -> Result<Data, StageError> {
        Err(StageError::Failed(self.message.clone()))
    }
}

// ---------------------------------------------------------------------------
// FixedOutputRegressor
// ---------------------------------------------------------------------------

/// Returns a fixed prediction regardless of input size.
///
/// Useful for exercising row-count checks on the verification snapshot.
#[derive(Debug)]
pub struct FixedOutputRegressor {
    output: Values,
}

impl FixedOutputRegressor {
    pub fn new(output: Values) -> Self {
        Self { output }
    }
}

impl Stage for FixedOutputRegressor {
    fn kind(&self) -> &str {
        "FixedOutputRegressor"
    }

    fn capabilities(&self) -> &[Capability] {
        &[Capability::Predict]
    }

    fn fit(&mut self, _x: &Data, _y: Option<&Data>, params: &FitParams) -> Result<(), StageError> {
        reject_params(params)
    }

    fn predict(&self, _x: &Data) -> Result<Data, StageError> {
        Ok(match &self.output {
            Values::Matrix(m) => Data::Matrix(m.clone()),
            Values::Vector(v) => Data::Vector(v.clone()),
        })
    }
}

fn reject_params(params: &FitParams) -> Result<(), StageError> {
    match params.keys().next() {
        Some(key) => Err(StageError::InvalidInput(format!(
            "unsupported fit parameter {key}"
        ))),
        None => Ok(()),
    }
}
