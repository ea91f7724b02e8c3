use thiserror::Error;

/// Errors produced by the normalization, encoding and prediction stages.
#[derive(Debug, Error)]
pub enum SentimentError {
    /// A required column is missing from the batch input, or a record is too
    /// short to carry it.
    #[error("schema error: {0}")]
    Schema(String),

    /// The fitted artifacts disagree about the feature dimensionality.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// A single-item prediction failed; wraps the stage that failed first.
    #[error("prediction failed: {0}")]
    Prediction(#[source] Box<SentimentError>),

    /// Batch prediction was requested for zero rows.
    #[error("batch contains no rows")]
    EmptyBatch,

    /// A batch cell could not be read as text.
    #[error("row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    /// An artifact file parsed but failed validation.
    #[error("invalid {artifact} artifact: {reason}")]
    Artifact {
        artifact: &'static str,
        reason: String,
    },

    #[error(transparent)]
    Tensor(#[from] candle_core::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SentimentError {
    pub(crate) fn artifact(artifact: &'static str, reason: impl Into<String>) -> Self {
        SentimentError::Artifact {
            artifact,
            reason: reason.into(),
        }
    }

    /// Wraps `self` as a [`SentimentError::Prediction`], unless it already is one.
    pub fn into_prediction(self) -> Self {
        match self {
            SentimentError::Prediction(_) => self,
            other => SentimentError::Prediction(Box::new(other)),
        }
    }

    /// True for errors caused by the submitted data rather than the deployment.
    pub fn is_client_error(&self) -> bool {
        match self {
            SentimentError::Schema(_)
            | SentimentError::EmptyBatch
            | SentimentError::InvalidRow { .. }
            | SentimentError::Csv(_) => true,
            SentimentError::Prediction(inner) => inner.is_client_error(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, SentimentError>;
