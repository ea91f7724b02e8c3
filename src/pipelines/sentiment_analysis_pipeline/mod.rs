//! Sentiment analysis pipeline for classifying product reviews.
//!
//! Text is normalized (letters only, lowercase, stopwords removed, Porter
//! stemmed), vectorized over the fitted vocabulary, scaled and passed to a
//! binary classifier. Batches arrive as CSV tables with a `Sentence` column
//! and come back with a `Predicted sentiment` column and a pie chart of the
//! label distribution.
//!
//! ## Main Types
//!
//! - [`SentimentAnalysisPipeline`] - Single and batch prediction
//! - [`SentimentAnalysisPipelineBuilder`] - Artifact source, stopwords and device selection
//! - [`BatchTable`] - CSV table in, CSV table out
//! - [`DistributionSummary`] - Label counts plus the rendered chart
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use sentiment_service::pipelines::sentiment_analysis_pipeline::*;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let pipeline = SentimentAnalysisPipelineBuilder::from_dir("artifacts")
//!     .build()
//!     .await?;
//!
//! let label = pipeline.predict("I absolutely loved this product!!!")?;
//! println!("Sentiment: {label}");
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod builder;
pub mod classifier;
pub mod encoder;
pub mod label;
pub mod pipeline;
pub mod summary;

pub use batch::{BatchPrediction, BatchTable, PREDICTION_COLUMN, SENTENCE_COLUMN};
pub use builder::{DeviceRequest, SentimentAnalysisPipelineBuilder};
pub use classifier::{decide, ClassifierAdapter};
pub use encoder::{encode, FeatureEncoder};
pub use label::SentimentLabel;
pub use pipeline::SentimentAnalysisPipeline;
pub use summary::{summarize, DistributionSummary, CHART_TITLE};

pub use crate::core::{Result, SentimentError};
