use std::collections::HashMap;

use candle_core::{Device, Tensor};
use serde::{Deserialize, Serialize};

use super::TextVectorizer;
use crate::core::{Result, SentimentError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_min_token_len() -> usize {
    2
}

/// On-disk form of a fitted count or TF-IDF vectorizer (`vectorizer.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerConfig {
    /// Term (or space-joined n-gram) to column index.
    pub vocabulary: HashMap<String, usize>,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    /// Tokens shorter than this are not counted.
    #[serde(default = "default_min_token_len")]
    pub min_token_len: usize,
    #[serde(default)]
    pub binary: bool,
    #[serde(default)]
    pub sublinear_tf: bool,
    /// Per-column inverse document frequencies; absent for plain counts.
    #[serde(default)]
    pub idf: Option<Vec<f64>>,
    #[serde(default)]
    pub norm: Option<Norm>,
}

/// Bag-of-words vectorizer with optional TF-IDF weighting and row norms.
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    vocabulary: HashMap<String, usize>,
    ngram_range: (usize, usize),
    min_token_len: usize,
    binary: bool,
    sublinear_tf: bool,
    idf: Option<Vec<f32>>,
    norm: Option<Norm>,
}

impl CountVectorizer {
    /// A plain count vectorizer over `vocabulary`.
    pub fn new<I, S>(vocabulary: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        Self::from_config(VectorizerConfig {
            vocabulary: vocabulary.into_iter().map(|(t, i)| (t.into(), i)).collect(),
            ngram_range: default_ngram_range(),
            min_token_len: default_min_token_len(),
            binary: false,
            sublinear_tf: false,
            idf: None,
            norm: None,
        })
    }

    pub fn from_config(config: VectorizerConfig) -> Result<Self> {
        let n = config.vocabulary.len();
        if n == 0 {
            return Err(SentimentError::artifact("vectorizer", "vocabulary is empty"));
        }

        let mut seen = vec![false; n];
        for (term, &index) in &config.vocabulary {
            if index >= n || std::mem::replace(&mut seen[index], true) {
                return Err(SentimentError::artifact(
                    "vectorizer",
                    format!("term {term:?} has index {index}; indices must cover 0..{n} exactly once"),
                ));
            }
        }

        let (min_n, max_n) = config.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(SentimentError::artifact(
                "vectorizer",
                format!("invalid ngram_range ({min_n}, {max_n})"),
            ));
        }

        if let Some(idf) = &config.idf {
            if idf.len() != n {
                return Err(SentimentError::artifact(
                    "vectorizer",
                    format!("idf has {} weights for {n} terms", idf.len()),
                ));
            }
        }

        Ok(Self {
            vocabulary: config.vocabulary,
            ngram_range: config.ngram_range,
            min_token_len: config.min_token_len,
            binary: config.binary,
            sublinear_tf: config.sublinear_tf,
            idf: config
                .idf
                .map(|idf| idf.into_iter().map(|w| w as f32).collect()),
            norm: config.norm,
        })
    }

    pub fn with_idf(mut self, idf: Vec<f32>) -> Result<Self> {
        if idf.len() != self.vocabulary.len() {
            return Err(SentimentError::artifact(
                "vectorizer",
                format!("idf has {} weights for {} terms", idf.len(), self.vocabulary.len()),
            ));
        }
        self.idf = Some(idf);
        Ok(self)
    }

    pub fn with_norm(mut self, norm: Norm) -> Self {
        self.norm = Some(norm);
        self
    }

    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Result<Self> {
        if min_n == 0 || min_n > max_n {
            return Err(SentimentError::artifact(
                "vectorizer",
                format!("invalid ngram_range ({min_n}, {max_n})"),
            ));
        }
        self.ngram_range = (min_n, max_n);
        Ok(self)
    }

    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Dense weights for one normalized text.
    pub fn transform_one(&self, text: &str) -> Vec<f32> {
        let mut row = vec![0f32; self.vocabulary.len()];
        let tokens: Vec<&str> = text
            .split_whitespace()
            .filter(|t| t.len() >= self.min_token_len)
            .collect();

        let (min_n, max_n) = self.ngram_range;
        for n in min_n..=max_n {
            for gram in tokens.windows(n) {
                let key = gram.join(" ");
                if let Some(&index) = self.vocabulary.get(&key) {
                    row[index] += 1.0;
                }
            }
        }

        if self.binary {
            row.iter_mut().filter(|v| **v > 0.0).for_each(|v| *v = 1.0);
        } else if self.sublinear_tf {
            row.iter_mut()
                .filter(|v| **v > 0.0)
                .for_each(|v| *v = 1.0 + v.ln());
        }

        if let Some(idf) = &self.idf {
            row.iter_mut().zip(idf).for_each(|(v, w)| *v *= w);
        }

        let length = match self.norm {
            Some(Norm::L2) => row.iter().map(|v| v * v).sum::<f32>().sqrt(),
            Some(Norm::L1) => row.iter().map(|v| v.abs()).sum::<f32>(),
            None => 0.0,
        };
        if length > 0.0 {
            row.iter_mut().for_each(|v| *v /= length);
        }

        row
    }
}

impl TextVectorizer for CountVectorizer {
    fn n_features(&self) -> usize {
        self.vocabulary.len()
    }

    fn transform(&self, texts: &[String], device: &Device) -> Result<Tensor> {
        let width = self.vocabulary.len();
        let mut data = Vec::with_capacity(texts.len() * width);
        for text in texts {
            data.extend(self.transform_one(text));
        }
        Ok(Tensor::from_vec(data, (texts.len(), width), device)?)
    }
}
