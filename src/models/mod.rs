//! Fitted artifacts consumed by the sentiment pipeline.
//!
//! The pipeline only relies on three capabilities, one per artifact:
//!
//! - [`TextVectorizer`] maps normalized texts onto a fixed vocabulary
//! - [`FeatureScaler`] applies the fitted per-feature transform
//! - [`ProbabilisticClassifier`] produces class probabilities
//!
//! The JSON-backed implementations in this module are what
//! [`loaders::ArtifactLoader`] produces; tests and embedders can supply
//! their own.

pub mod classifier;
pub mod loaders;
pub mod scaler;
pub mod vectorizer;

use std::sync::Arc;

use candle_core::{Device, Tensor};

use crate::core::{Result, SentimentError};

pub use classifier::{ClassifierConfig, GradientBoostedTrees, LogisticRegression};
pub use loaders::ArtifactLoader;
pub use scaler::{AffineScaler, ScalerConfig};
pub use vectorizer::{CountVectorizer, Norm, VectorizerConfig};

/// A fitted text vectorizer over a fixed vocabulary.
pub trait TextVectorizer: Send + Sync {
    /// Width of every row produced by [`TextVectorizer::transform`].
    fn n_features(&self) -> usize;

    /// Returns a `(texts.len(), n_features)` f32 matrix. Terms outside the
    /// vocabulary contribute nothing.
    fn transform(&self, texts: &[String], device: &Device) -> Result<Tensor>;
}

/// A fitted elementwise feature transform.
pub trait FeatureScaler: Send + Sync {
    fn n_features(&self) -> usize;

    fn transform(&self, features: &Tensor) -> Result<Tensor>;
}

/// A fitted probabilistic classifier.
pub trait ProbabilisticClassifier: Send + Sync {
    fn n_features(&self) -> usize;

    fn n_classes(&self) -> usize {
        2
    }

    /// Returns a `(rows, n_classes)` matrix of class probabilities.
    fn predict_proba(&self, features: &Tensor) -> Result<Tensor>;
}

/// The three fitted artifacts, shared read-only between pipelines.
#[derive(Clone)]
pub struct SentimentModel {
    pub vectorizer: Arc<dyn TextVectorizer>,
    pub scaler: Arc<dyn FeatureScaler>,
    pub classifier: Arc<dyn ProbabilisticClassifier>,
}

impl SentimentModel {
    pub fn new(
        vectorizer: impl TextVectorizer + 'static,
        scaler: impl FeatureScaler + 'static,
        classifier: impl ProbabilisticClassifier + 'static,
    ) -> Self {
        Self {
            vectorizer: Arc::new(vectorizer),
            scaler: Arc::new(scaler),
            classifier: Arc::new(classifier),
        }
    }

    /// Checks that all three artifacts agree on the feature width and that
    /// the classifier is binary.
    pub fn check_dimensions(&self) -> Result<()> {
        let vocab = self.vectorizer.n_features();
        let scaled = self.scaler.n_features();
        let expected = self.classifier.n_features();
        if vocab != scaled {
            return Err(SentimentError::Encoding(format!(
                "vectorizer produces {vocab} features but the scaler expects {scaled}"
            )));
        }
        if scaled != expected {
            return Err(SentimentError::Encoding(format!(
                "scaler produces {scaled} features but the classifier expects {expected}"
            )));
        }
        let classes = self.classifier.n_classes();
        if classes != 2 {
            return Err(SentimentError::Encoding(format!(
                "classifier reports {classes} classes, expected 2"
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for SentimentModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentModel")
            .field("vectorizer_features", &self.vectorizer.n_features())
            .field("scaler_features", &self.scaler.n_features())
            .field("classifier_features", &self.classifier.n_features())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vectorizer(terms: &[&str]) -> CountVectorizer {
        CountVectorizer::new(terms.iter().enumerate().map(|(i, t)| (*t, i))).unwrap()
    }

    #[test]
    fn consistent_artifacts_pass() {
        let model = SentimentModel::new(
            vectorizer(&["great", "terribl"]),
            AffineScaler::identity(2),
            LogisticRegression::new(vec![1.0, -1.0], 0.0),
        );
        assert!(model.check_dimensions().is_ok());
    }

    #[test]
    fn scaler_width_mismatch_is_encoding_error() {
        let model = SentimentModel::new(
            vectorizer(&["great", "terribl"]),
            AffineScaler::identity(3),
            LogisticRegression::new(vec![1.0, -1.0, 0.0], 0.0),
        );
        assert!(matches!(
            model.check_dimensions(),
            Err(SentimentError::Encoding(_))
        ));
    }

    #[test]
    fn classifier_width_mismatch_is_encoding_error() {
        let model = SentimentModel::new(
            vectorizer(&["great", "terribl"]),
            AffineScaler::identity(2),
            LogisticRegression::new(vec![1.0], 0.0),
        );
        assert!(matches!(
            model.check_dimensions(),
            Err(SentimentError::Encoding(_))
        ));
    }
}
