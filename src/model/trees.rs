use super::{sigmoid, Classifier, ModelError};
use serde::{Deserialize, Serialize};

fn default_base_score() -> f64 {
    0.5
}

/// Boosted regression trees with a logistic link, in the layout XGBoost dumps:
/// each tree is a flat node array rooted at index 0.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostedTrees {
    pub feature_names: Vec<String>,
    /// Prior probability; contributes `logit(base_score)` to every margin.
    #[serde(default = "default_base_score")]
    pub base_score: f64,
    pub trees: Vec<Tree>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// Go to `yes` when `row[feature] < threshold`, else `no`.
    Split {
        feature: usize,
        threshold: f64,
        yes: usize,
        no: usize,
        /// Branch taken for NaN inputs, `yes` when unset.
        #[serde(default)]
        missing: Option<usize>,
    },
    Leaf {
        leaf: f64,
    },
}

impl Tree {
    /// Leaf value reached by `row`. A tree that fails validation
    /// (dangling child, cycle, no nodes) contributes 0.
    fn margin(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        for _ in 0..self.nodes.len() {
            let Some(node) = self.nodes.get(index) else {
                return 0.0;
            };
            match node {
                Node::Leaf { leaf } => return *leaf,
                Node::Split {
                    feature,
                    threshold,
                    yes,
                    no,
                    missing,
                } => {
                    let value = row.get(*feature).copied().unwrap_or(f64::NAN);
                    index = if value.is_nan() {
                        missing.unwrap_or(*yes)
                    } else if value < *threshold {
                        *yes
                    } else {
                        *no
                    };
                }
            }
        }
        0.0
    }

    /// Children must point forward so evaluation always terminates.
    fn validate(&self, tree: usize, features: usize) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::Tree(format!("tree {tree} has no nodes")));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { leaf } if !leaf.is_finite() => {
                    return Err(ModelError::Tree(format!("tree {tree} node {i}: leaf {leaf}")));
                }
                Node::Leaf { .. } => {}
                Node::Split {
                    feature,
                    threshold,
                    yes,
                    no,
                    missing,
                } => {
                    if *feature >= features {
                        return Err(ModelError::Tree(format!(
                            "tree {tree} node {i}: feature {feature} out of {features}"
                        )));
                    }
                    if threshold.is_nan() {
                        return Err(ModelError::Tree(format!(
                            "tree {tree} node {i}: NaN threshold"
                        )));
                    }
                    for child in [Some(*yes), Some(*no), *missing].into_iter().flatten() {
                        if child <= i || child >= self.nodes.len() {
                            return Err(ModelError::Tree(format!(
                                "tree {tree} node {i}: bad child index {child}"
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl GradientBoostedTrees {
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.feature_names.is_empty() {
            return Err(ModelError::Shape("feature_names is empty".to_string()));
        }
        if !(self.base_score > 0.0 && self.base_score < 1.0) {
            return Err(ModelError::Shape(format!(
                "base_score {} outside (0, 1)",
                self.base_score
            )));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i, self.feature_names.len())?;
        }
        Ok(())
    }

    fn probability(&self, row: &[f64]) -> f64 {
        let base_margin = (self.base_score / (1.0 - self.base_score)).ln();
        let margin: f64 = self.trees.iter().map(|t| t.margin(row)).sum();
        sigmoid(base_margin + margin)
    }
}

impl Classifier for GradientBoostedTrees {
    fn kind(&self) -> &'static str {
        "gradient_boosted_trees"
    }

    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, row: &[f64]) -> u8 {
        u8::from(self.probability(row) >= 0.5)
    }

    fn predict_proba(&self, row: &[f64]) -> Option<f64> {
        Some(self.probability(row))
    }
}
