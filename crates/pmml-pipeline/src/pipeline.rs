//! Sequential execution of named stages.
//!
//! Fitting walks the steps in order: every intermediate step is fitted and
//! then transforms the data handed to the next one; the final step is only
//! fitted. Prediction transforms through the intermediates and asks the final
//! step to predict.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};

use ndarray::Array2;
use tracing::debug;

use crate::data::Data;
use crate::error::PipelineError;
use crate::stage::{FitParams, Stage};

/// Separator between step name and parameter name in fit parameter keys.
pub const PARAM_SEPARATOR: &str = "__";

/// An ordered list of uniquely named stages.
#[derive(Debug)]
pub struct Pipeline {
    steps: Vec<(String, Box<dyn Stage>)>,
}

impl Pipeline {
    /// Build a pipeline. Names must be non-empty, unique, and free of `__`.
    pub fn new<N: Into<String>>(steps: Vec<(N, Box<dyn Stage>)>) -> Result<Self, PipelineError> {
        if steps.is_empty() {
            return Err(PipelineError::EmptyPipeline);
        }

        let mut seen = HashSet::new();
        let mut named = Vec::with_capacity(steps.len());
        for (name, stage) in steps {
            let name = name.into();
            if name.is_empty() {
                return Err(PipelineError::InvalidStepName {
                    name,
                    reason: "step names must not be empty",
                });
            }
            if name.contains(PARAM_SEPARATOR) {
                return Err(PipelineError::InvalidStepName {
                    name,
                    reason: "step names must not contain \"__\"",
                });
            }
            if !seen.insert(name.clone()) {
                return Err(PipelineError::DuplicateStep(name));
            }
            named.push((name, stage));
        }

        Ok(Self { steps: named })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false; construction rejects empty pipelines.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> impl Iterator<Item = (&str, &dyn Stage)> {
        self.steps
            .iter()
            .map(|(name, stage)| (name.as_str(), stage.as_ref()))
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn named_step(&self, name: &str) -> Option<&dyn Stage> {
        self.steps
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, stage)| stage.as_ref())
    }

    /// The last step, responsible for predictions.
    pub fn final_estimator(&self) -> &dyn Stage {
        let (_, stage) = &self.steps[self.steps.len() - 1];
        stage.as_ref()
    }

    fn final_step(&self) -> (&str, &dyn Stage) {
        let (name, stage) = &self.steps[self.steps.len() - 1];
        (name.as_str(), stage.as_ref())
    }

    /// Fit every step in order.
    pub fn fit(&mut self, x: &Data, y: Option<&Data>, params: &FitParams) -> Result<(), PipelineError> {
        let mut routed = self.route_params(params)?;
        let last = self.steps.len() - 1;
        let mut current = Cow::Borrowed(x);

        for (idx, (name, stage)) in self.steps.iter_mut().enumerate() {
            let step_params = routed.remove(name.as_str()).unwrap_or_default();
            debug!(step = %name, kind = stage.kind(), rows = current.n_rows(), "fitting step");

            stage
                .fit(&current, y, &step_params)
                .map_err(|source| PipelineError::Stage {
                    step: name.clone(),
                    source,
                })?;

            if idx < last {
                let next = stage
                    .transform(&current)
                    .map_err(|source| PipelineError::Stage {
                        step: name.clone(),
                        source,
                    })?;
                current = Cow::Owned(next);
            }
        }

        Ok(())
    }

    /// Predict with the final step after transforming through the others.
    pub fn predict(&self, x: &Data) -> Result<Data, PipelineError> {
        let xt = self.transform_intermediate(x)?;
        let (name, stage) = self.final_step();
        stage.predict(&xt).map_err(|source| PipelineError::Stage {
            step: name.to_string(),
            source,
        })
    }

    /// Class probabilities from the final step.
    pub fn predict_proba(&self, x: &Data) -> Result<Array2<f64>, PipelineError> {
        let xt = self.transform_intermediate(x)?;
        let (name, stage) = self.final_step();
        stage.predict_proba(&xt).map_err(|source| PipelineError::Stage {
            step: name.to_string(),
            source,
        })
    }

    /// Apply every step's `transform`, the final one included.
    pub fn transform(&self, x: &Data) -> Result<Data, PipelineError> {
        let xt = self.transform_intermediate(x)?;
        let (name, stage) = self.final_step();
        stage.transform(&xt).map_err(|source| PipelineError::Stage {
            step: name.to_string(),
            source,
        })
    }

    fn transform_intermediate<'a>(&self, x: &'a Data) -> Result<Cow<'a, Data>, PipelineError> {
        let mut current = Cow::Borrowed(x);
        for (name, stage) in &self.steps[..self.steps.len() - 1] {
            let next = stage
                .transform(&current)
                .map_err(|source| PipelineError::Stage {
                    step: name.clone(),
                    source,
                })?;
            current = Cow::Owned(next);
        }
        Ok(current)
    }

    /// Split `<step>__<param>` keys into per-step parameter maps.
    fn route_params(&self, params: &FitParams) -> Result<BTreeMap<String, FitParams>, PipelineError> {
        let mut routed: BTreeMap<String, FitParams> = BTreeMap::new();
        for (key, value) in params {
            let Some((step, param)) = key.split_once(PARAM_SEPARATOR) else {
                return Err(PipelineError::MalformedFitParam { key: key.clone() });
            };
            if param.is_empty() {
                return Err(PipelineError::MalformedFitParam { key: key.clone() });
            }
            if self.named_step(step).is_none() {
                return Err(PipelineError::UnknownFitParam { key: key.clone() });
            }
            routed
                .entry(step.to_string())
                .or_default()
                .insert(param.to_string(), value.clone());
        }
        Ok(routed)
    }
}
