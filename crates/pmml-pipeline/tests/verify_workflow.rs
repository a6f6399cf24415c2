//! End-to-end verification snapshots: schema checks, probability probing,
//! tolerance validation and snapshot replacement.

use ndarray::array;
use pmml_pipeline::fakes::{
    CenteringScaler, FixedOutputRegressor, MeanRegressor, ProbabilityMode, ThresholdClassifier,
};
use pmml_pipeline::{
    Data, DataFrame, DataSide, ErrorKind, FieldNames, PipelineError, PmmlError, PmmlPipeline,
    Series, Stage, StageError, Values, VerificationConfig,
};

fn features() -> DataFrame {
    DataFrame::new(
        ["x1", "x2", "x3"],
        array![[0.0, 1.0, 2.0], [2.0, 3.0, 4.0], [4.0, 5.0, 6.0]],
    )
    .unwrap()
}

fn labels() -> Data {
    Series::new("y", array![0.0, 0.0, 1.0]).into()
}

fn fitted(final_step: Box<dyn Stage>) -> PmmlPipeline {
    let mut model = PmmlPipeline::new(vec![
        ("scaler", Box::new(CenteringScaler::new()) as Box<dyn Stage>),
        ("model", final_step),
    ])
    .unwrap();
    model.fit(&features().into(), Some(&labels())).unwrap();
    model
}

fn classifier(mode: ProbabilityMode) -> PmmlPipeline {
    fitted(Box::new(ThresholdClassifier::with_mode(mode)))
}

fn regressor() -> PmmlPipeline {
    fitted(Box::new(MeanRegressor::new()))
}

// ── Happy paths ─────────────────────────────────────────────────────────

#[test]
fn regressor_snapshot_has_no_probabilities() {
    let mut model = regressor();
    let x: Data = features().into();

    let snapshot = model.verify(&x).unwrap();
    assert_eq!(snapshot.active_values(), features().values());
    assert_eq!(
        snapshot.target_values().as_vector(),
        Some(&array![1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0])
    );
    assert!(snapshot.probability_values().is_none());
    assert_eq!(snapshot.precision(), 1e-13);
    assert_eq!(snapshot.zero_threshold(), 1e-13);
}

#[test]
fn classifier_snapshot_records_probabilities_per_row() {
    let mut model = classifier(ProbabilityMode::Enabled);
    let x: Data = features().into();

    let snapshot = model.verify(&x).unwrap().clone();
    assert_eq!(snapshot.n_samples(), 3);
    assert_eq!(
        snapshot.target_values().as_vector(),
        Some(&array![0.0, 0.0, 1.0])
    );

    let proba = snapshot.probability_values().expect("probabilities recorded");
    assert_eq!(proba.nrows(), snapshot.target_values().n_rows());
    assert_eq!(proba.ncols(), 2);
    assert_eq!(model.verification(), Some(&snapshot));
}

#[test]
fn verification_on_a_row_subset() {
    let mut model = classifier(ProbabilityMode::Enabled);
    let subset = features()
        .with_values(array![[4.0, 5.0, 6.0]])
        .unwrap();

    let snapshot = model.verify(&subset.into()).unwrap();
    assert_eq!(snapshot.n_samples(), 1);
    assert_eq!(snapshot.target_values().as_vector(), Some(&array![1.0]));
    assert_eq!(snapshot.probability_values().map(|p| p.nrows()), Some(1));
}

#[test]
fn classifier_without_probability_support_is_not_probed() {
    let mut model = classifier(ProbabilityMode::Disabled);
    let snapshot = model.verify(&features().into()).unwrap();
    assert!(snapshot.probability_values().is_none());
}

#[test]
fn unsupported_probabilities_at_call_time_are_skipped() {
    let mut model = classifier(ProbabilityMode::Unavailable);
    let snapshot = model.verify(&features().into()).unwrap();
    assert!(snapshot.probability_values().is_none());
    assert!(model.verification().is_some());
}

#[test]
fn custom_tolerances_are_recorded() {
    let mut model = regressor();
    let snapshot = model.verify_with(&features().into(), 1e-6, 0.0).unwrap();
    assert_eq!(snapshot.precision(), 1e-6);
    assert_eq!(snapshot.zero_threshold(), 0.0);
}

#[test]
fn verify_with_config_uses_its_tolerances() {
    let mut model = regressor();
    let config = VerificationConfig::new(1e-9, 1e-12).unwrap();
    let snapshot = model.verify_with_config(&features().into(), &config).unwrap();
    assert_eq!(snapshot.precision(), 1e-9);
    assert_eq!(snapshot.zero_threshold(), 1e-12);
}

#[test]
fn second_verify_replaces_the_snapshot() {
    let mut model = classifier(ProbabilityMode::Enabled);
    model.verify(&features().into()).unwrap();

    let subset = features().with_values(array![[0.0, 1.0, 2.0]]).unwrap();
    model.verify_with(&subset.into(), 1e-3, 1e-3).unwrap();

    let snapshot = model.verification().unwrap();
    assert_eq!(snapshot.n_samples(), 1);
    assert_eq!(snapshot.precision(), 1e-3);
}

// ── Schema errors ───────────────────────────────────────────────────────

#[test]
fn verify_before_fit_reports_anonymous_training_data() {
    let mut model = PmmlPipeline::new(vec![(
        "model",
        Box::new(MeanRegressor::new()) as Box<dyn Stage>,
    )])
    .unwrap();

    let err = model.verify(&features().into()).unwrap_err();
    assert!(matches!(
        err,
        PmmlError::AnonymousData {
            side: DataSide::Training
        }
    ));
    assert!(err.to_string().contains("anonymous training data"));
}

#[test]
fn raw_verification_data_is_anonymous() {
    let mut model = regressor();
    let err = model
        .verify(&Data::Matrix(features().values().clone()))
        .unwrap_err();
    assert!(matches!(
        err,
        PmmlError::AnonymousData {
            side: DataSide::Verification
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Schema);
    assert!(model.verification().is_none());
}

#[test]
fn training_and_verification_both_raw() {
    let mut model = PmmlPipeline::new(vec![(
        "model",
        Box::new(MeanRegressor::new()) as Box<dyn Stage>,
    )])
    .unwrap();
    let x = Data::Matrix(array![[1.0], [2.0]]);
    model.fit(&x, Some(&Data::Vector(array![1.0, 2.0]))).unwrap();

    let err = model.verify(&x).unwrap_err();
    assert!(matches!(
        err,
        PmmlError::AnonymousData {
            side: DataSide::Both
        }
    ));
}

#[test]
fn permuted_columns_are_a_mismatch() {
    let mut model = regressor();
    let permuted = features().select(&["x2", "x1", "x3"]).unwrap();

    let err = model.verify(&permuted.into()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    let msg = err.to_string();
    assert!(msg.contains(r#"["x1", "x2", "x3"]"#), "{msg}");
    assert!(msg.contains(r#"["x2", "x1", "x3"]"#), "{msg}");
}

#[test]
fn column_subset_is_a_mismatch() {
    let mut model = regressor();
    let subset = features().select(&["x1", "x2"]).unwrap();

    match model.verify(&subset.into()).unwrap_err() {
        PmmlError::FieldMismatch { expected, actual } => {
            assert_eq!(expected, FieldNames::from(["x1", "x2", "x3"]));
            assert_eq!(actual, FieldNames::from(["x1", "x2"]));
        }
        other => panic!("Expected field mismatch, got {:?}", other),
    }
}

// ── Value errors ────────────────────────────────────────────────────────

#[test]
fn negative_tolerances_are_rejected() {
    let mut model = regressor();
    let x: Data = features().into();

    let err = model.verify_with(&x, -1e-13, 0.0).unwrap_err();
    assert!(matches!(err, PmmlError::NegativePrecision(_)));

    let err = model.verify_with(&x, 0.0, -1e-13).unwrap_err();
    assert!(matches!(err, PmmlError::NegativeZeroThreshold(_)));
    assert_eq!(err.kind(), ErrorKind::Value);

    assert!(model.verification().is_none());
}

#[test]
fn zero_tolerances_are_accepted() {
    let mut model = regressor();
    let snapshot = model.verify_with(&features().into(), 0.0, 0.0).unwrap();
    assert_eq!(snapshot.precision(), 0.0);
    assert_eq!(snapshot.zero_threshold(), 0.0);
}

#[test]
fn prediction_row_count_must_match_inputs() {
    let mut model = fitted(Box::new(FixedOutputRegressor::new(Values::Vector(
        array![1.0],
    ))));

    let err = model.verify(&features().into()).unwrap_err();
    assert!(matches!(
        err,
        PmmlError::RowCountMismatch {
            what: "target_values",
            expected: 3,
            actual: 1
        }
    ));
    assert!(model.verification().is_none());
}

// ── Delegate errors ─────────────────────────────────────────────────────

#[test]
fn hard_probability_failure_propagates_and_assigns_nothing() {
    let mut model = classifier(ProbabilityMode::Broken);

    let err = model.verify(&features().into()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Delegate);
    match err {
        PmmlError::Delegate(PipelineError::Stage { step, source }) => {
            assert_eq!(step, "model");
            assert!(matches!(source, StageError::Failed(_)));
        }
        other => panic!("Expected delegate stage error, got {:?}", other),
    }
    assert!(model.verification().is_none());
}

#[test]
fn failed_verify_keeps_earlier_snapshot() {
    let mut model = classifier(ProbabilityMode::Enabled);
    let before = model.verify(&features().into()).unwrap().clone();

    let permuted = features().select(&["x3", "x2", "x1"]).unwrap();
    assert!(model.verify(&permuted.into()).is_err());
    assert_eq!(model.verification(), Some(&before));
}

// ── Exporter view ───────────────────────────────────────────────────────

#[test]
fn snapshot_serializes_with_exporter_keys() {
    let mut model = classifier(ProbabilityMode::Enabled);
    let snapshot = model.verify(&features().into()).unwrap();

    let json = serde_json::to_value(snapshot).unwrap();
    assert_eq!(json["active_values"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["target_values"], serde_json::json!([0.0, 0.0, 1.0]));
    assert_eq!(json["probability_values"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["precision"], serde_json::json!(1e-13));
    assert_eq!(json["zeroThreshold"], serde_json::json!(1e-13));
}
