use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::features::FEATURE_SLOTS;

/// One (scheme, link) recommendation from the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeMatch {
    pub scheme: String,
    pub link: String,
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Model was trained on features {expected:?} but this encoder produces {actual:?}")]
    FeatureShapeMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Feature vector has {got} values, model expects {expected}")]
    BadInputLength { got: usize, expected: usize },

    #[error("Malformed model artifact: {0}")]
    MalformedModel(String),
}

/// The eligibility classifier as this service sees it: a black box mapping a
/// fixed-order feature vector to ranked (scheme, link) recommendations. The
/// model itself is trained and persisted out of band.
pub trait SchemeClassifier: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<Vec<SchemeMatch>, ClassifierError>;
}

/// Node of one decision tree in the exported ensemble. A split routes on
/// `features[feature] <= threshold`; a leaf votes one (scheme, link) pair.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        scheme: String,
        link: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct Tree {
    nodes: Vec<TreeNode>,
}

#[derive(Debug, Deserialize)]
struct ModelArtifact {
    feature_names: Vec<String>,
    trees: Vec<Tree>,
}

/// Tree-ensemble classifier evaluated from an artifact the training pipeline
/// exports. Each tree votes one (scheme, link) pair; predictions are ranked
/// by vote count.
#[derive(Debug)]
pub struct ForestClassifier {
    trees: Vec<Tree>,
    n_features: usize,
}

impl ForestClassifier {
    /// Load the artifact from disk and check its feature contract against
    /// the encoder's slot order.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ClassifierError> {
        let artifact: ModelArtifact = serde_json::from_str(raw)?;

        let expected: Vec<String> = FEATURE_SLOTS.iter().map(|s| s.to_string()).collect();
        if artifact.feature_names != expected {
            return Err(ClassifierError::FeatureShapeMismatch {
                expected,
                actual: artifact.feature_names,
            });
        }
        if artifact.trees.is_empty() {
            return Err(ClassifierError::MalformedModel(
                "artifact contains no trees".to_string(),
            ));
        }

        info!(trees = artifact.trees.len(), "classifier model loaded");

        Ok(Self {
            trees: artifact.trees,
            n_features: artifact.feature_names.len(),
        })
    }
}

impl SchemeClassifier for ForestClassifier {
    fn predict(&self, features: &[f64]) -> Result<Vec<SchemeMatch>, ClassifierError> {
        if features.len() != self.n_features {
            return Err(ClassifierError::BadInputLength {
                got: features.len(),
                expected: self.n_features,
            });
        }

        let mut votes: Vec<(SchemeMatch, usize)> = Vec::new();
        for tree in &self.trees {
            let vote = eval_tree(tree, features)?;
            match votes.iter_mut().find(|(m, _)| *m == vote) {
                Some((_, count)) => *count += 1,
                None => votes.push((vote, 1)),
            }
        }

        votes.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(votes.into_iter().map(|(m, _)| m).collect())
    }
}

fn eval_tree(tree: &Tree, features: &[f64]) -> Result<SchemeMatch, ClassifierError> {
    let mut index = 0;
    // Any walk longer than the node count means the artifact has a cycle.
    for _ in 0..=tree.nodes.len() {
        let node = tree.nodes.get(index).ok_or_else(|| {
            ClassifierError::MalformedModel(format!("node index {index} out of range"))
        })?;
        match node {
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                let value = features.get(*feature).ok_or_else(|| {
                    ClassifierError::MalformedModel(format!("feature index {feature} out of range"))
                })?;
                index = if *value <= *threshold { *left } else { *right };
            }
            TreeNode::Leaf { scheme, link } => {
                return Ok(SchemeMatch {
                    scheme: scheme.clone(),
                    link: link.clone(),
                });
            }
        }
    }
    Err(ClassifierError::MalformedModel(
        "tree walk did not reach a leaf".to_string(),
    ))
}
