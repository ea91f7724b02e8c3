use candle_core::Tensor;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::ProbabilisticClassifier;
use crate::core::{Result, SentimentError};

fn default_base_score() -> f64 {
    0.5
}

/// On-disk form of a fitted binary classifier (`classifier.json`), tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierConfig {
    Logistic {
        coef: Vec<f64>,
        intercept: f64,
    },
    GradientBoostedTrees {
        n_features: usize,
        /// Prior probability of the positive class.
        #[serde(default = "default_base_score")]
        base_score: f64,
        trees: Vec<TreeConfig>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    pub nodes: Vec<NodeConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeConfig {
    /// Goes to `yes` when `x[feature] < threshold`, to `missing` (default
    /// `yes`) when the value is NaN, and to `no` otherwise.
    Split {
        feature: usize,
        threshold: f64,
        yes: usize,
        no: usize,
        #[serde(default)]
        missing: Option<usize>,
    },
    Leaf {
        leaf: f64,
    },
}

impl ClassifierConfig {
    pub fn build(self) -> Result<Arc<dyn ProbabilisticClassifier>> {
        Ok(match self {
            ClassifierConfig::Logistic { coef, intercept } => {
                if coef.is_empty() {
                    return Err(SentimentError::artifact("classifier", "logistic coef is empty"));
                }
                Arc::new(LogisticRegression::new(
                    coef.iter().map(|c| *c as f32).collect(),
                    intercept as f32,
                ))
            }
            ClassifierConfig::GradientBoostedTrees {
                n_features,
                base_score,
                trees,
            } => Arc::new(GradientBoostedTrees::new(n_features, base_score, trees)?),
        })
    }
}

/// Binary logistic regression: `p(positive) = sigmoid(x . coef + intercept)`.
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    coef: Vec<f32>,
    intercept: f32,
}

impl LogisticRegression {
    pub fn new(coef: Vec<f32>, intercept: f32) -> Self {
        Self { coef, intercept }
    }
}

impl ProbabilisticClassifier for LogisticRegression {
    fn n_features(&self) -> usize {
        self.coef.len()
    }

    fn predict_proba(&self, features: &Tensor) -> Result<Tensor> {
        let (_, width) = features.dims2()?;
        if width != self.coef.len() {
            return Err(SentimentError::Encoding(format!(
                "logistic classifier expects {} features, got {width}",
                self.coef.len()
            )));
        }
        let weights = Tensor::from_slice(&self.coef, (width, 1), features.device())?;
        let logits = features
            .matmul(&weights)?
            .affine(1.0, f64::from(self.intercept))?;
        let positive = candle_nn::ops::sigmoid(&logits)?;
        let negative = positive.affine(-1.0, 1.0)?;
        Ok(Tensor::cat(&[&negative, &positive], 1)?)
    }
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Split {
        feature: usize,
        threshold: f32,
        yes: usize,
        no: usize,
        missing: usize,
    },
    Leaf(f32),
}

/// Additive ensemble of regression trees with a logistic link, as produced
/// by gradient boosting with a binary logistic objective.
#[derive(Debug, Clone)]
pub struct GradientBoostedTrees {
    n_features: usize,
    base_margin: f32,
    trees: Vec<Vec<Node>>,
}

impl GradientBoostedTrees {
    /// Validates the trees: every child index points forward within its
    /// tree (so evaluation always terminates) and every split feature is in
    /// range.
    pub fn new(n_features: usize, base_score: f64, trees: Vec<TreeConfig>) -> Result<Self> {
        if !(base_score > 0.0 && base_score < 1.0) {
            return Err(SentimentError::artifact(
                "classifier",
                format!("base_score {base_score} must lie strictly between 0 and 1"),
            ));
        }

        let mut compiled = Vec::with_capacity(trees.len());
        for (t, tree) in trees.into_iter().enumerate() {
            if tree.nodes.is_empty() {
                return Err(SentimentError::artifact("classifier", format!("tree {t} has no nodes")));
            }
            let len = tree.nodes.len();
            let mut nodes = Vec::with_capacity(len);
            for (i, node) in tree.nodes.into_iter().enumerate() {
                nodes.push(match node {
                    NodeConfig::Leaf { leaf } => Node::Leaf(leaf as f32),
                    NodeConfig::Split {
                        feature,
                        threshold,
                        yes,
                        no,
                        missing,
                    } => {
                        let missing = missing.unwrap_or(yes);
                        if [yes, no, missing].iter().any(|&c| c <= i || c >= len) {
                            return Err(SentimentError::artifact(
                                "classifier",
                                format!("tree {t} node {i} has an out-of-order child"),
                            ));
                        }
                        if feature >= n_features {
                            return Err(SentimentError::artifact(
                                "classifier",
                                format!("tree {t} node {i} splits on feature {feature} of {n_features}"),
                            ));
                        }
                        Node::Split {
                            feature,
                            threshold: threshold as f32,
                            yes,
                            no,
                            missing,
                        }
                    }
                });
            }
            compiled.push(nodes);
        }

        Ok(Self {
            n_features,
            base_margin: (base_score / (1.0 - base_score)).ln() as f32,
            trees: compiled,
        })
    }

    fn margin(&self, row: &[f32]) -> f32 {
        let mut margin = self.base_margin;
        for tree in &self.trees {
            let mut i = 0;
            loop {
                match tree[i] {
                    Node::Leaf(value) => {
                        margin += value;
                        break;
                    }
                    Node::Split {
                        feature,
                        threshold,
                        yes,
                        no,
                        missing,
                    } => {
                        let x = row[feature];
                        i = if x.is_nan() {
                            missing
                        } else if x < threshold {
                            yes
                        } else {
                            no
                        };
                    }
                }
            }
        }
        margin
    }
}

impl ProbabilisticClassifier for GradientBoostedTrees {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict_proba(&self, features: &Tensor) -> Result<Tensor> {
        let (rows, width) = features.dims2()?;
        if width != self.n_features {
            return Err(SentimentError::Encoding(format!(
                "tree ensemble expects {} features, got {width}",
                self.n_features
            )));
        }
        let mut data = Vec::with_capacity(rows * 2);
        for row in features.to_vec2::<f32>()? {
            let p = 1.0 / (1.0 + (-self.margin(&row)).exp());
            data.push(1.0 - p);
            data.push(p);
        }
        Ok(Tensor::from_vec(data, (rows, 2), features.device())?)
    }
}
