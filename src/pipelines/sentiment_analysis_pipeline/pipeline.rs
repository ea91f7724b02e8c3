use candle_core::Device;

use super::batch::{BatchPrediction, BatchTable, PREDICTION_COLUMN, SENTENCE_COLUMN};
use super::classifier::ClassifierAdapter;
use super::encoder::FeatureEncoder;
use super::label::SentimentLabel;
use super::summary::summarize;
use crate::core::{Result, SentimentError};
use crate::models::SentimentModel;
use crate::text::{StopwordSet, TextNormalizer};

/// Normalizes, encodes and classifies text with a fitted model.
///
/// Cloning is cheap: all fitted state is shared.
#[derive(Clone)]
pub struct SentimentAnalysisPipeline {
    normalizer: TextNormalizer,
    encoder: FeatureEncoder,
    classifier: ClassifierAdapter,
}

impl SentimentAnalysisPipeline {
    /// Fails with an encoding error when the artifacts disagree on width.
    pub fn new(model: SentimentModel, stopwords: StopwordSet, device: Device) -> Result<Self> {
        model.check_dimensions()?;
        let encoder = FeatureEncoder::new(model.vectorizer, model.scaler, device)?;
        let classifier = ClassifierAdapter::new(model.classifier)?;
        Ok(Self {
            normalizer: TextNormalizer::new(stopwords),
            encoder,
            classifier,
        })
    }

    pub fn device(&self) -> &Device {
        self.encoder.device()
    }

    pub fn n_features(&self) -> usize {
        self.encoder.n_features()
    }

    pub fn normalize(&self, text: &str) -> String {
        self.normalizer.normalize(text)
    }

    /// Predicts one text. Any stage failure comes back as
    /// [`SentimentError::Prediction`].
    pub fn predict(&self, text: &str) -> Result<SentimentLabel> {
        self.predict_one(text).map_err(SentimentError::into_prediction)
    }

    fn predict_one(&self, text: &str) -> Result<SentimentLabel> {
        let normalized = self.normalizer.normalize(text);
        tracing::debug!(normalized = %normalized, "normalized input");
        let features = self.encoder.encode(&[normalized])?;
        let mut labels = self.classifier.classify(&features)?;
        labels
            .pop()
            .ok_or_else(|| SentimentError::Encoding("classifier returned no rows".into()))
    }

    /// Predicts every text in one encode/classify pass, preserving order.
    pub fn predict_texts<S: AsRef<str>>(&self, texts: &[S]) -> Result<Vec<SentimentLabel>> {
        if texts.is_empty() {
            return Err(SentimentError::EmptyBatch);
        }
        let normalized = self.normalizer.normalize_batch(texts);
        let features = self.encoder.encode(&normalized)?;
        let labels = self.classifier.classify(&features)?;
        if labels.len() != texts.len() {
            return Err(SentimentError::Encoding(format!(
                "classifier returned {} labels for {} rows",
                labels.len(),
                texts.len()
            )));
        }
        Ok(labels)
    }

    /// Labels every `Sentence` cell of `table`, writes the labels to the
    /// `Predicted sentiment` column and summarizes their distribution.
    pub fn predict_batch(&self, mut table: BatchTable) -> Result<BatchPrediction> {
        let sentences: Vec<String> = table
            .column(SENTENCE_COLUMN)?
            .into_iter()
            .map(str::to_owned)
            .collect();
        if sentences.is_empty() {
            return Err(SentimentError::EmptyBatch);
        }

        let labels = self.predict_texts(&sentences)?;
        table.set_column(
            PREDICTION_COLUMN,
            labels.iter().map(|l| l.as_str().to_string()).collect(),
        )?;
        let summary = summarize(&labels)?;

        tracing::info!(
            rows = labels.len(),
            positive = summary.count(SentimentLabel::Positive),
            negative = summary.count(SentimentLabel::Negative),
            "batch prediction complete"
        );
        Ok(BatchPrediction {
            table,
            labels,
            summary,
        })
    }
}

impl std::fmt::Debug for SentimentAnalysisPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentimentAnalysisPipeline")
            .field("n_features", &self.n_features())
            .field("stopwords", &self.normalizer.stopwords().len())
            .finish()
    }
}
