use std::sync::Arc;

use candle_core::Tensor;

use super::label::SentimentLabel;
use crate::core::{Result, SentimentError};
use crate::models::ProbabilisticClassifier;

/// Turns class probabilities into labels.
#[derive(Clone)]
pub struct ClassifierAdapter {
    classifier: Arc<dyn ProbabilisticClassifier>,
}

impl ClassifierAdapter {
    pub fn new(classifier: Arc<dyn ProbabilisticClassifier>) -> Result<Self> {
        let classes = classifier.n_classes();
        if classes != 2 {
            return Err(SentimentError::Encoding(format!(
                "classifier reports {classes} classes, expected 2"
            )));
        }
        Ok(Self { classifier })
    }

    pub fn n_features(&self) -> usize {
        self.classifier.n_features()
    }

    pub fn classify(&self, features: &Tensor) -> Result<Vec<SentimentLabel>> {
        let (rows, width) = features.dims2()?;
        if width != self.classifier.n_features() {
            return Err(SentimentError::Encoding(format!(
                "feature matrix has {width} columns but the classifier expects {}",
                self.classifier.n_features()
            )));
        }

        let proba = self.classifier.predict_proba(features)?;
        let (proba_rows, classes) = proba.dims2()?;
        if classes != 2 || proba_rows != rows {
            return Err(SentimentError::Encoding(format!(
                "classifier returned a {proba_rows}x{classes} probability matrix for {rows} rows"
            )));
        }

        let labels: Vec<SentimentLabel> = proba
            .to_vec2::<f32>()?
            .iter()
            .map(|p| decide(p))
            .collect();
        tracing::debug!(rows, "classified feature matrix");
        Ok(labels)
    }
}

/// Argmax over one probability row, keeping the first index on ties.
pub fn decide(probabilities: &[f32]) -> SentimentLabel {
    let mut best = 0;
    for (i, p) in probabilities.iter().enumerate().skip(1) {
        if *p > probabilities[best] {
            best = i;
        }
    }
    SentimentLabel::from_class_index(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogisticRegression;
    use candle_core::Device;

    #[test]
    fn strict_majority_is_required_for_positive() {
        assert_eq!(decide(&[0.3, 0.7]), SentimentLabel::Positive);
        assert_eq!(decide(&[0.7, 0.3]), SentimentLabel::Negative);
        assert_eq!(decide(&[0.5, 0.5]), SentimentLabel::Negative);
    }

    #[test]
    fn classifies_each_row() -> anyhow::Result<()> {
        let adapter = ClassifierAdapter::new(Arc::new(LogisticRegression::new(vec![2.0, -2.0], 0.0)))?;
        let features = Tensor::new(&[[1f32, 0.], [0., 1.], [0., 0.]], &Device::Cpu)?;
        assert_eq!(
            adapter.classify(&features)?,
            vec![
                SentimentLabel::Positive,
                SentimentLabel::Negative,
                SentimentLabel::Negative
            ]
        );
        Ok(())
    }

    #[test]
    fn wrong_width_is_encoding_error() -> anyhow::Result<()> {
        let adapter = ClassifierAdapter::new(Arc::new(LogisticRegression::new(vec![1.0, 1.0], 0.0)))?;
        let features = Tensor::zeros((1, 3), candle_core::DType::F32, &Device::Cpu)?;
        assert!(matches!(
            adapter.classify(&features),
            Err(SentimentError::Encoding(_))
        ));
        Ok(())
    }

    struct ThreeWay;

    impl ProbabilisticClassifier for ThreeWay {
        fn n_features(&self) -> usize {
            1
        }

        fn n_classes(&self) -> usize {
            3
        }

        fn predict_proba(&self, _features: &Tensor) -> Result<Tensor> {
            unreachable!()
        }
    }

    #[test]
    fn non_binary_classifier_is_rejected() {
        assert!(matches!(
            ClassifierAdapter::new(Arc::new(ThreeWay)),
            Err(SentimentError::Encoding(_))
        ));
    }
}
