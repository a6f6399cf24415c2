//! Pipeline wrapper that remembers field names and carries a verification
//! snapshot for exporters.

use std::fmt;

use ndarray::Array2;

use crate::config::VerificationConfig;
use crate::data::fields::{extract_names, FieldNames};
use crate::data::Data;
use crate::error::Result;
use crate::metadata::PipelineMetadata;
use crate::obs::{self, PipelineSpan};
use crate::pipeline::Pipeline;
use crate::stage::{FitParams, Stage};
use crate::verification::{self, Verification, DEFAULT_PRECISION, DEFAULT_ZERO_THRESHOLD};

const CLASS_NAME: &str = "PMMLPipeline";

/// Drop-in replacement for [`Pipeline`] that captures field names on fit and
/// can record a [`Verification`] snapshot.
///
/// `active_fields` and `target_fields` are only overwritten when the fit data
/// carries names: fitting on raw arrays keeps whatever an earlier fit
/// captured. `verification` is replaced wholesale by every successful
/// `verify` call and left untouched by a failed one.
#[derive(Debug)]
pub struct PmmlPipeline {
    pipeline: Pipeline,
    active_fields: Option<FieldNames>,
    target_fields: Option<FieldNames>,
    verification: Option<Verification>,
}

impl PmmlPipeline {
    pub fn new<N: Into<String>>(steps: Vec<(N, Box<dyn Stage>)>) -> Result<Self> {
        Ok(Self::from_pipeline(Pipeline::new(steps)?))
    }

    pub fn from_pipeline(pipeline: Pipeline) -> Self {
        Self {
            pipeline,
            active_fields: None,
            target_fields: None,
            verification: None,
        }
    }

    pub fn fit(&mut self, x: &Data, y: Option<&Data>) -> Result<()> {
        self.fit_with_params(x, y, &FitParams::new())
    }

    /// Capture field names, then fit the wrapped pipeline.
    ///
    /// `params` use the `<step>__<param>` convention. Pipeline failures are
    /// returned as [`crate::PmmlError::Delegate`] with their message intact.
    pub fn fit_with_params(&mut self, x: &Data, y: Option<&Data>, params: &FitParams) -> Result<()> {
        let _span = PipelineSpan::enter("fit", self.pipeline.len());

        capture(&mut self.active_fields, "active", extract_names(x));
        capture(&mut self.target_fields, "target", extract_names(y));

        self.pipeline.fit(x, y, params)?;
        Ok(())
    }

    pub fn predict(&self, x: &Data) -> Result<Data> {
        Ok(self.pipeline.predict(x)?)
    }

    pub fn predict_proba(&self, x: &Data) -> Result<Array2<f64>> {
        Ok(self.pipeline.predict_proba(x)?)
    }

    pub fn transform(&self, x: &Data) -> Result<Data> {
        Ok(self.pipeline.transform(x)?)
    }

    /// Verify with the default tolerances (`1e-13` each).
    pub fn verify(&mut self, x: &Data) -> Result<&Verification> {
        self.verify_with(x, DEFAULT_PRECISION, DEFAULT_ZERO_THRESHOLD)
    }

    pub fn verify_with_config(&mut self, x: &Data, config: &VerificationConfig) -> Result<&Verification> {
        self.verify_with(x, config.precision, config.zero_threshold)
    }

    /// Record a verification snapshot of `x`.
    ///
    /// `x` must carry exactly the field names seen during fit, in the same
    /// order. Class probabilities are recorded when the final step is a
    /// classifier that can produce them.
    pub fn verify_with(&mut self, x: &Data, precision: f64, zero_threshold: f64) -> Result<&Verification> {
        let _span = PipelineSpan::enter("verify", self.pipeline.len());

        match verification::build(
            &self.pipeline,
            self.active_fields.as_ref(),
            x,
            precision,
            zero_threshold,
        ) {
            Ok(snapshot) => {
                obs::emit_verification_built(
                    snapshot.n_samples(),
                    snapshot.probability_values().is_some(),
                    precision,
                    zero_threshold,
                );
                Ok(&*self.verification.insert(snapshot))
            }
            Err(err) => {
                obs::emit_verification_rejected(&err);
                Err(err)
            }
        }
    }

    pub fn active_fields(&self) -> Option<&FieldNames> {
        self.active_fields.as_ref()
    }

    pub fn target_fields(&self) -> Option<&FieldNames> {
        self.target_fields.as_ref()
    }

    pub fn verification(&self) -> Option<&Verification> {
        self.verification.as_ref()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn final_estimator(&self) -> &dyn Stage {
        self.pipeline.final_estimator()
    }

    /// Snapshot of everything an exporter reads off this pipeline.
    pub fn metadata(&self) -> PipelineMetadata {
        PipelineMetadata::new(
            self.pipeline.step_names().into_iter().map(str::to_string).collect(),
            self.active_fields.clone(),
            self.target_fields.clone(),
            self.verification.clone(),
        )
    }
}

fn capture(slot: &mut Option<FieldNames>, role: &str, names: Option<FieldNames>) {
    match names {
        Some(names) => {
            obs::emit_fields_captured(role, &names);
            *slot = Some(names);
        }
        None => obs::emit_fields_unavailable(role, slot.is_some()),
    }
}

impl fmt::Display for PmmlPipeline {
    /// `PMMLPipeline(steps=[('a', Kind),\n       ('b', Kind)])`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let separator = format!(",\n{}", " ".repeat(1 + CLASS_NAME.len() / 2));
        let steps = self
            .pipeline
            .steps()
            .map(|(name, stage)| format!("('{}', {})", name, stage.kind()))
            .collect::<Vec<_>>()
            .join(&separator);
        write!(f, "{CLASS_NAME}(steps=[{steps}])")
    }
}
