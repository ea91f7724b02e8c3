use candle_core::Tensor;
use serde::{Deserialize, Serialize};

use super::FeatureScaler;
use crate::core::{Result, SentimentError};

/// On-disk form of a fitted scaler (`scaler.json`), tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerConfig {
    /// `x * scale + min`
    MinMax { scale: Vec<f64>, min: Vec<f64> },
    /// `(x - mean) / scale`; either part may be omitted.
    Standard {
        #[serde(default)]
        mean: Option<Vec<f64>>,
        #[serde(default)]
        scale: Option<Vec<f64>>,
        #[serde(default)]
        n_features: Option<usize>,
    },
    Identity { n_features: usize },
}

impl ScalerConfig {
    pub fn build(self) -> Result<AffineScaler> {
        match self {
            ScalerConfig::MinMax { scale, min } => {
                if scale.len() != min.len() {
                    return Err(SentimentError::artifact(
                        "scaler",
                        format!("min_max scale has {} values but min has {}", scale.len(), min.len()),
                    ));
                }
                AffineScaler::new("min_max", to_f32(&scale), to_f32(&min))
            }
            ScalerConfig::Standard {
                mean,
                scale,
                n_features,
            } => {
                let n = mean
                    .as_ref()
                    .map(Vec::len)
                    .or(scale.as_ref().map(Vec::len))
                    .or(n_features)
                    .ok_or_else(|| {
                        SentimentError::artifact(
                            "scaler",
                            "standard scaler needs mean, scale or n_features",
                        )
                    })?;
                let scale = scale.unwrap_or_else(|| vec![1.0; n]);
                let mean = mean.unwrap_or_else(|| vec![0.0; n]);
                if scale.len() != n || mean.len() != n {
                    return Err(SentimentError::artifact(
                        "scaler",
                        format!("standard mean has {} values but scale has {}", mean.len(), scale.len()),
                    ));
                }
                if let Some(i) = scale.iter().position(|s| *s == 0.0 || !s.is_finite()) {
                    return Err(SentimentError::artifact(
                        "scaler",
                        format!("scale[{i}] must be finite and non-zero"),
                    ));
                }
                let factor: Vec<f64> = scale.iter().map(|s| 1.0 / s).collect();
                let offset: Vec<f64> = mean.iter().zip(&factor).map(|(m, f)| -m * f).collect();
                AffineScaler::new("standard", to_f32(&factor), to_f32(&offset))
            }
            ScalerConfig::Identity { n_features } => Ok(AffineScaler::identity(n_features)),
        }
    }
}

fn to_f32(values: &[f64]) -> Vec<f32> {
    values.iter().map(|v| *v as f32).collect()
}

/// Per-feature `x * factor + offset`, the common form of min-max and
/// standard scaling.
#[derive(Debug, Clone)]
pub struct AffineScaler {
    kind: &'static str,
    factor: Vec<f32>,
    offset: Vec<f32>,
}

impl AffineScaler {
    pub fn new(kind: &'static str, factor: Vec<f32>, offset: Vec<f32>) -> Result<Self> {
        if factor.is_empty() || factor.len() != offset.len() {
            return Err(SentimentError::artifact(
                "scaler",
                format!("{kind} scaler has {} factors and {} offsets", factor.len(), offset.len()),
            ));
        }
        if factor.iter().chain(&offset).any(|v| !v.is_finite()) {
            return Err(SentimentError::artifact(
                "scaler",
                format!("{kind} scaler has non-finite parameters"),
            ));
        }
        Ok(Self {
            kind,
            factor,
            offset,
        })
    }

    pub fn identity(n_features: usize) -> Self {
        Self {
            kind: "identity",
            factor: vec![1.0; n_features],
            offset: vec![0.0; n_features],
        }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }
}

impl FeatureScaler for AffineScaler {
    fn n_features(&self) -> usize {
        self.factor.len()
    }

    fn transform(&self, features: &Tensor) -> Result<Tensor> {
        let (_, width) = features.dims2()?;
        if width != self.factor.len() {
            return Err(SentimentError::Encoding(format!(
                "{} scaler expects {} features, got {width}",
                self.kind,
                self.factor.len()
            )));
        }
        let device = features.device();
        let factor = Tensor::from_slice(&self.factor, (1, width), device)?;
        let offset = Tensor::from_slice(&self.offset, (1, width), device)?;
        Ok(features.broadcast_mul(&factor)?.broadcast_add(&offset)?)
    }
}
