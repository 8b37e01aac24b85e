//! End-to-end inference over the Telco fixture artifacts

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use churn_core::logic::model::classifier::argmax;
use churn_core::{
    ArtifactKind, ArtifactPaths, ArtifactStore, ChurnError, CoreConfig, CustomerRecord, InferenceEngine,
    NumericPolicy,
};
use serde_json::json;
use tempfile::TempDir;

const EXAMPLE_CHURN_PROBABILITY: f64 = 0.824173519842481;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/telco")
}

fn fixture_copy() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    let src = ArtifactPaths::from_dir(fixture_dir());
    let dst = ArtifactPaths::from_dir(dir.path());
    for kind in ArtifactKind::ALL {
        fs::copy(src.path(kind), dst.path(kind)).unwrap();
    }
    dir
}

fn engine_for(dir: &Path, policy: NumericPolicy) -> InferenceEngine {
    init_logger();
    InferenceEngine::from_config(&CoreConfig::with_models_dir(dir).numeric_policy(policy))
}

fn record(value: serde_json::Value) -> CustomerRecord {
    serde_json::from_value(value).unwrap()
}

fn month_to_month_fiber() -> CustomerRecord {
    record(json!({
        "SeniorCitizen": 0,
        "tenure": 12,
        "MonthlyCharges": 70.35,
        "TotalCharges": 845.5,
        "gender": "Female",
        "Partner": "Yes",
        "Dependents": "No",
        "PhoneService": "Yes",
        "MultipleLines": "No",
        "InternetService": "Fiber optic",
        "OnlineSecurity": "No",
        "OnlineBackup": "Yes",
        "DeviceProtection": "No",
        "TechSupport": "No",
        "StreamingTV": "Yes",
        "StreamingMovies": "No",
        "Contract": "Month-to-month",
        "PaperlessBilling": "Yes",
        "PaymentMethod": "Electronic check"
    }))
}

fn two_year_dsl() -> CustomerRecord {
    month_to_month_fiber()
        .with("tenure", 60)
        .with("MonthlyCharges", 25.0)
        .with("TotalCharges", 1500.0)
        .with("InternetService", "DSL")
        .with("OnlineSecurity", "Yes")
        .with("TechSupport", "Yes")
        .with("StreamingTV", "No")
        .with("Contract", "Two year")
        .with("PaymentMethod", "Bank transfer (automatic)")
}

fn one_year_mailed_check() -> CustomerRecord {
    month_to_month_fiber()
        .with("tenure", 30)
        .with("TotalCharges", 2100.0)
        .with("Contract", "One year")
        .with("PaymentMethod", "Mailed check")
}

#[test]
fn test_single_prediction() {
    let engine = engine_for(&fixture_dir(), NumericPolicy::Zero);
    let resp = engine.predict_single(&month_to_month_fiber()).unwrap();

    assert_eq!(resp.prediction, 1);
    assert_eq!(resp.prediction_label, "Yes");

    let p = resp.probability_of_prediction.unwrap();
    assert!((p - EXAMPLE_CHURN_PROBABILITY).abs() < 1e-9);

    let probs = resp.probabilities.unwrap();
    assert_eq!(probs.len(), 2);
    assert!((probs.iter().sum::<f64>() - 1.0).abs() < 1e-6);
    assert_eq!(probs[1], p);
}

#[test]
fn test_batch_keeps_input_order() {
    let engine = engine_for(&fixture_dir(), NumericPolicy::Zero);
    let records = vec![month_to_month_fiber(), two_year_dsl(), one_year_mailed_check()];

    let batch = engine.predict_batch(&records).unwrap();
    assert_eq!(batch.len(), 3);
    assert_eq!(batch.predictions, vec![1, 0, 0]);
    assert_eq!(batch.prediction_labels, vec!["Yes", "No", "No"]);

    let probs = batch.probabilities.unwrap();
    assert!(probs[1][1] < 0.01);
    assert!(probs[2][1] > 0.4 && probs[2][1] < 0.5);
    for (row, predicted) in probs.iter().zip(&batch.predictions) {
        assert!(row.iter().all(|p| (0.0..=1.0).contains(p)));
        assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-6);
        assert_eq!(*predicted, argmax(row) as i64);
    }
}

#[test]
fn test_single_agrees_with_batch() {
    let engine = engine_for(&fixture_dir(), NumericPolicy::Zero);
    let records = vec![two_year_dsl(), one_year_mailed_check(), month_to_month_fiber()];
    let batch = engine.predict_batch(&records).unwrap();
    let batch_probs = batch.probabilities.clone().unwrap();

    for (i, record) in records.iter().enumerate() {
        let single = engine.predict_single(record).unwrap();
        assert_eq!(single.prediction, batch.predictions[i]);
        assert_eq!(single.prediction_label, batch.prediction_labels[i]);
        assert_eq!(single.probabilities.as_ref(), Some(&batch_probs[i]));
    }
}

#[test]
fn test_lazy_load_happens_once() {
    let engine = Arc::new(engine_for(&fixture_dir(), NumericPolicy::Zero));
    assert!(!engine.status().artifacts.loaded);

    std::thread::scope(|s| {
        for _ in 0..4 {
            let engine = Arc::clone(&engine);
            s.spawn(move || {
                engine.predict_single(&month_to_month_fiber()).unwrap();
            });
        }
    });

    let status = engine.status();
    assert!(status.artifacts.loaded);
    assert_eq!(status.artifacts.load_count, 5);
    assert_eq!(status.inference.predictions, 4);
}

#[test]
fn test_unknown_category_fails_whole_batch() {
    let engine = engine_for(&fixture_dir(), NumericPolicy::Zero);
    let records = vec![
        month_to_month_fiber(),
        month_to_month_fiber().with("InternetService", "Satellite"),
    ];

    let err = engine.predict_batch(&records).unwrap_err();
    assert!(err.is_client_error());
    assert_eq!(err.kind(), "UnknownCategoryError");
    assert_eq!(engine.status().inference.predictions, 0);
}

#[test]
fn test_blank_total_charges_policy() {
    let record = month_to_month_fiber().with("TotalCharges", "");

    let engine = engine_for(&fixture_dir(), NumericPolicy::Zero);
    let resp = engine.predict_single(&record).unwrap();
    assert!(resp.probability_of_prediction.is_some());

    let engine = engine_for(&fixture_dir(), NumericPolicy::Reject);
    let err = engine.predict_single(&record).unwrap_err();
    assert!(matches!(err, ChurnError::InvalidNumeric { ref field, .. } if field == "TotalCharges"));
}

#[test]
fn test_senior_citizen_as_string() {
    let engine = engine_for(&fixture_dir(), NumericPolicy::Zero);
    let a = engine.predict_single(&month_to_month_fiber()).unwrap();
    let b = engine
        .predict_single(&month_to_month_fiber().with("SeniorCitizen", "0"))
        .unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_deterministic_classifier_omits_probabilities() {
    let dir = fixture_copy();
    let logistic: serde_json::Value =
        serde_json::from_slice(&fs::read(dir.path().join("churn_model.json")).unwrap()).unwrap();
    let svc = json!({
        "kind": "linear_svc",
        "coef": logistic["coef"],
        "intercept": logistic["intercept"],
        "classes": [0, 1]
    });
    fs::write(dir.path().join("churn_model.json"), svc.to_string()).unwrap();

    let engine = engine_for(dir.path(), NumericPolicy::Zero);
    let resp = engine.predict_single(&month_to_month_fiber()).unwrap();
    assert_eq!(resp.prediction, 1);
    assert_eq!(resp.prediction_label, "Yes");

    let json = serde_json::to_value(&resp).unwrap();
    assert!(json.get("probability_of_prediction").is_none());
    assert!(json.get("probabilities").is_none());

    let batch = engine.predict_batch(&[month_to_month_fiber(), two_year_dsl()]).unwrap();
    assert_eq!(batch.predictions, vec![1, 0]);
    assert!(batch.probabilities.is_none());

    let status = engine.status();
    assert_eq!(status.artifacts.probabilistic, Some(false));
}

#[test]
fn test_label_fallback_for_unknown_index() {
    let dir = fixture_copy();
    fs::write(dir.path().join("label_encoder.json"), r#"{"classes": ["No"]}"#).unwrap();

    let engine = engine_for(dir.path(), NumericPolicy::Zero);
    let resp = engine.predict_single(&month_to_month_fiber()).unwrap();
    assert_eq!(resp.prediction, 1);
    assert_eq!(resp.prediction_label, "1");

    let resp = engine.predict_single(&two_year_dsl()).unwrap();
    assert_eq!(resp.prediction_label, "No");
}

#[test]
fn test_missing_artifacts_surface_per_request() {
    let dir = tempfile::tempdir().unwrap();
    let engine = engine_for(dir.path(), NumericPolicy::Zero);

    let err = engine.predict_single(&month_to_month_fiber()).unwrap_err();
    assert!(matches!(
        err,
        ChurnError::ArtifactLoad {
            artifact: ArtifactKind::Classifier,
            ..
        }
    ));
    assert!(!err.is_client_error());

    // store stays usable once the files appear
    let paths = ArtifactPaths::from_dir(dir.path());
    let src = ArtifactPaths::from_dir(fixture_dir());
    for kind in ArtifactKind::ALL {
        fs::copy(src.path(kind), paths.path(kind)).unwrap();
    }
    assert!(engine.predict_single(&month_to_month_fiber()).is_ok());
}

#[test]
fn test_shared_store_between_engines() {
    init_logger();
    let store = Arc::new(ArtifactStore::new(ArtifactPaths::from_dir(fixture_dir())));
    let lenient = InferenceEngine::new(Arc::clone(&store), NumericPolicy::Zero);
    let strict = InferenceEngine::new(Arc::clone(&store), NumericPolicy::Reject);

    lenient.predict_single(&month_to_month_fiber()).unwrap();
    strict.predict_single(&two_year_dsl()).unwrap();
    assert_eq!(store.load_count(), 5);
}

#[test]
fn test_forest_with_negative_leaf_weights_fails_load() {
    let dir = fixture_copy();
    let forest = json!({
        "kind": "random_forest",
        "n_features": 45,
        "classes": [0, 1],
        "trees": [{
            "children_left": [-1],
            "children_right": [-1],
            "feature": [-2],
            "threshold": [-2.0],
            "value": [[2.0, -1.0]]
        }]
    });
    fs::write(dir.path().join("churn_model.json"), forest.to_string()).unwrap();

    let engine = engine_for(dir.path(), NumericPolicy::Zero);
    let err = engine.predict_single(&month_to_month_fiber()).unwrap_err();
    assert!(matches!(
        err,
        ChurnError::ArtifactLoad {
            artifact: ArtifactKind::Classifier,
            ..
        }
    ));
    assert!(err.to_string().contains("invalid class weights"));
}

#[test]
fn test_ignore_encoder_fails_load() {
    let dir = fixture_copy();
    let path = dir.path().join("ohe_encoder.json");
    let mut encoder: serde_json::Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
    encoder["handle_unknown"] = json!("ignore");
    fs::write(&path, encoder.to_string()).unwrap();

    let engine = engine_for(dir.path(), NumericPolicy::Zero);
    let err = engine
        .predict_single(&month_to_month_fiber().with("InternetService", "Satellite"))
        .unwrap_err();
    assert!(matches!(
        err,
        ChurnError::ArtifactLoad {
            artifact: ArtifactKind::CategoricalEncoder,
            ..
        }
    ));
    assert!(!err.is_client_error());
}
