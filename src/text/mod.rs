//! Text normalization applied before feature extraction.

pub mod normalizer;
pub mod stem;
pub mod stopwords;

pub use normalizer::{normalize, TextNormalizer};
pub use stem::PorterStemmer;
pub use stopwords::StopwordSet;
