pub mod cache;
pub mod config;
pub mod error;

pub use cache::{global_cache, ArtifactCache, ArtifactKey};
pub use config::{ArtifactSource, ServiceConfig};
pub use error::{Result, SentimentError};
