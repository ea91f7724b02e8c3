#![allow(dead_code)]

use std::fs;
use std::path::Path;

use sentiment_service::models::loaders::{CLASSIFIER_FILE, SCALER_FILE, VECTORIZER_FILE};

/// Stemmed vocabulary shared by the fixtures.
pub const VOCABULARY: &str = r#"{
    "vocabulary": {
        "absolut": 0,
        "love": 1,
        "product": 2,
        "great": 3,
        "terribl": 4,
        "film": 5
    }
}"#;

pub const MIN_MAX_SCALER: &str = r#"{
    "kind": "min_max",
    "scale": [1.0, 1.0, 1.0, 1.0, 1.0, 1.0],
    "min": [0.0, 0.0, 0.0, 0.0, 0.0, 0.0]
}"#;

/// `love` and `great` push towards positive, `terribl` towards negative.
pub const LOGISTIC: &str = r#"{
    "kind": "logistic",
    "coef": [0.5, 2.0, 0.0, 2.0, -3.0, 0.0],
    "intercept": -0.5
}"#;

/// One stump on `terribl`: absent is positive, present is negative.
pub const TREES: &str = r#"{
    "kind": "gradient_boosted_trees",
    "n_features": 6,
    "base_score": 0.5,
    "trees": [
        {"nodes": [
            {"feature": 4, "threshold": 0.5, "yes": 1, "no": 2},
            {"leaf": 1.2},
            {"leaf": -1.5}
        ]}
    ]
}"#;

pub fn write_artifacts(dir: &Path, classifier: &str) -> anyhow::Result<()> {
    fs::write(dir.join(VECTORIZER_FILE), VOCABULARY)?;
    fs::write(dir.join(SCALER_FILE), MIN_MAX_SCALER)?;
    fs::write(dir.join(CLASSIFIER_FILE), classifier)?;
    Ok(())
}

/// A temporary artifact directory with the logistic classifier.
pub fn logistic_artifacts() -> anyhow::Result<tempfile::TempDir> {
    let dir = tempfile::tempdir()?;
    write_artifacts(dir.path(), LOGISTIC)?;
    Ok(dir)
}

pub fn tree_artifacts() -> anyhow::Result<tempfile::TempDir> {
    let dir = tempfile::tempdir()?;
    write_artifacts(dir.path(), TREES)?;
    Ok(dir)
}
