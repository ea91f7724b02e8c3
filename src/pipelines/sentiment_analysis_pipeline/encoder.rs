use std::sync::Arc;

use candle_core::{Device, Tensor};

use crate::core::{Result, SentimentError};
use crate::models::{FeatureScaler, TextVectorizer};

/// Vectorizes normalized text and applies the fitted scaler.
#[derive(Clone)]
pub struct FeatureEncoder {
    vectorizer: Arc<dyn TextVectorizer>,
    scaler: Arc<dyn FeatureScaler>,
    device: Device,
}

impl FeatureEncoder {
    pub fn new(
        vectorizer: Arc<dyn TextVectorizer>,
        scaler: Arc<dyn FeatureScaler>,
        device: Device,
    ) -> Result<Self> {
        check_widths(vectorizer.as_ref(), scaler.as_ref())?;
        Ok(Self {
            vectorizer,
            scaler,
            device,
        })
    }

    pub fn n_features(&self) -> usize {
        self.scaler.n_features()
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Encodes every text into one `(texts.len(), n_features)` matrix.
    pub fn encode(&self, texts: &[String]) -> Result<Tensor> {
        encode(texts, self.vectorizer.as_ref(), self.scaler.as_ref(), &self.device)
    }

    pub fn encode_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut rows = self.encode(&[text.to_string()])?.to_vec2::<f32>()?;
        rows.pop()
            .ok_or_else(|| SentimentError::Encoding("vectorizer returned no rows".into()))
    }
}

fn check_widths(vectorizer: &dyn TextVectorizer, scaler: &dyn FeatureScaler) -> Result<()> {
    let (vocab, scaled) = (vectorizer.n_features(), scaler.n_features());
    if vocab != scaled {
        return Err(SentimentError::Encoding(format!(
            "vectorizer produces {vocab} features but the scaler expects {scaled}"
        )));
    }
    Ok(())
}

/// Vectorizes then scales `texts`. Fails with an encoding error when the two
/// artifacts disagree on width or the vectorizer returns a malformed matrix.
pub fn encode(
    texts: &[String],
    vectorizer: &dyn TextVectorizer,
    scaler: &dyn FeatureScaler,
    device: &Device,
) -> Result<Tensor> {
    check_widths(vectorizer, scaler)?;
    let raw = vectorizer.transform(texts, device)?;
    let (rows, width) = raw.dims2()?;
    if rows != texts.len() || width != scaler.n_features() {
        return Err(SentimentError::Encoding(format!(
            "vectorizer returned a {rows}x{width} matrix for {} texts of width {}",
            texts.len(),
            scaler.n_features()
        )));
    }
    let scaled = scaler.transform(&raw)?;
    tracing::debug!(rows, width, "encoded feature matrix");
    Ok(scaled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AffineScaler, CountVectorizer, ScalerConfig};

    fn encoder() -> FeatureEncoder {
        let vectorizer = CountVectorizer::new([("great", 0), ("film", 1)]).unwrap();
        let scaler = ScalerConfig::MinMax {
            scale: vec![0.5, 1.0],
            min: vec![0.0, 1.0],
        }
        .build()
        .unwrap();
        FeatureEncoder::new(Arc::new(vectorizer), Arc::new(scaler), Device::Cpu).unwrap()
    }

    #[test]
    fn vectorizes_then_scales() -> anyhow::Result<()> {
        assert_eq!(encoder().encode_one("great great film")?, vec![1.0, 2.0]);
        Ok(())
    }

    #[test]
    fn out_of_vocabulary_only_gives_scaled_zero_vector() -> anyhow::Result<()> {
        assert_eq!(encoder().encode_one("popcorn")?, vec![0.0, 1.0]);
        assert_eq!(encoder().encode_one("")?, vec![0.0, 1.0]);
        Ok(())
    }

    #[test]
    fn batch_equals_row_by_row() -> anyhow::Result<()> {
        let enc = encoder();
        let texts: Vec<String> = ["great film", "film", "terribl popcorn"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let batch = enc.encode(&texts)?.to_vec2::<f32>()?;
        for (row, text) in batch.iter().zip(&texts) {
            assert_eq!(row, &enc.encode_one(text)?);
        }
        Ok(())
    }

    #[test]
    fn mismatched_widths_fail_at_construction() {
        let vectorizer = CountVectorizer::new([("great", 0), ("film", 1)]).unwrap();
        let res = FeatureEncoder::new(
            Arc::new(vectorizer),
            Arc::new(AffineScaler::identity(3)),
            Device::Cpu,
        );
        assert!(matches!(res, Err(SentimentError::Encoding(_))));
    }

    #[test]
    fn free_function_checks_widths() {
        let vectorizer = CountVectorizer::new([("great", 0)]).unwrap();
        let res = encode(
            &["great".to_string()],
            &vectorizer,
            &AffineScaler::identity(2),
            &Device::Cpu,
        );
        assert!(matches!(res, Err(SentimentError::Encoding(_))));
    }
}
