//! Review sentiment classification on pre-fit text artifacts.
//!
//! Raw text is normalized, vectorized, scaled and classified as
//! [`SentimentLabel::Positive`] or [`SentimentLabel::Negative`]. Batches of
//! CSV rows are labelled in one pass and summarized as a pie chart. The
//! [`server`] module exposes the pipeline over HTTP.

pub mod chart;
pub mod core;
pub mod models;
pub mod pipelines;
pub mod server;
pub mod text;

// Re-export core types
pub use crate::core::{ArtifactSource, Result, SentimentError, ServiceConfig};

// Re-export pipeline types for easier access
pub use pipelines::{
    BatchPrediction, BatchTable, DistributionSummary, SentimentAnalysisPipeline,
    SentimentAnalysisPipelineBuilder, SentimentLabel,
};
pub use text::StopwordSet;
