//! Decision-tree and random-forest classifiers.
//!
//! Trees are stored as flat node arrays rooted at index 0. A split sends
//! a sample left when `x[feature] <= threshold`. Leaves hold one weight
//! per class; the forest averages each tree's normalized leaf weights and
//! returns the arg-max class (lowest index wins ties).

use serde::{Deserialize, Serialize};

use super::{ClassLabel, Predictor};
use crate::{CropwiseError, Result};

/// Which ensemble layout an artifact uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// A single tree under the `tree` key.
    DecisionTree,
    /// One or more trees under the `trees` key.
    RandomForest,
}

/// One node of a tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

/// A single decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Walk from the root to a leaf and return its weights.
    fn leaf(&self, features: &[f64]) -> &[f64] {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => idx = if features[*feature] <= *threshold { *left } else { *right },
                Node::Leaf { value } => return value,
            }
        }
    }

    fn validate(&self, n_features: usize, n_classes: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(CropwiseError::InvalidModel("tree has no nodes".into()));
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(CropwiseError::InvalidModel(format!(
                            "node {idx} splits on feature {feature}, model has {n_features}"
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(CropwiseError::InvalidModel(format!(
                            "node {idx} has non-finite threshold"
                        )));
                    }
                    // Children always follow their parent, which rules out cycles.
                    for child in [left, right] {
                        if *child <= idx || *child >= self.nodes.len() {
                            return Err(CropwiseError::InvalidModel(format!(
                                "node {idx} has invalid child index {child}"
                            )));
                        }
                    }
                }
                Node::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(CropwiseError::InvalidModel(format!(
                            "leaf {idx} has {} weights, model has {n_classes} classes",
                            value.len()
                        )));
                    }
                    if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(CropwiseError::InvalidModel(format!(
                            "leaf {idx} has a negative or non-finite weight"
                        )));
                    }
                    if value.iter().sum::<f64>() <= 0.0 {
                        return Err(CropwiseError::InvalidModel(format!(
                            "leaf {idx} has zero total weight"
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// On-disk layout of a classifier artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    pub kind: ModelKind,
    pub n_features: usize,
    pub classes: Vec<ClassLabel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trees: Vec<Tree>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tree: Option<Tree>,
}

/// A validated tree-ensemble classifier.
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "ClassifierArtifact")]
pub struct TreeClassifier {
    kind: ModelKind,
    n_features: usize,
    classes: Vec<ClassLabel>,
    trees: Vec<Tree>,
}

impl TreeClassifier {
    /// Build a random forest from its parts.
    pub fn random_forest(
        n_features: usize,
        classes: Vec<ClassLabel>,
        trees: Vec<Tree>,
    ) -> Result<Self> {
        Self::try_from(ClassifierArtifact {
            kind: ModelKind::RandomForest,
            n_features,
            classes,
            trees,
            tree: None,
        })
    }

    /// Build a single decision tree classifier.
    pub fn decision_tree(n_features: usize, classes: Vec<ClassLabel>, tree: Tree) -> Result<Self> {
        Self::try_from(ClassifierArtifact {
            kind: ModelKind::DecisionTree,
            n_features,
            classes,
            trees: Vec::new(),
            tree: Some(tree),
        })
    }

    /// Parse and validate a classifier from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    /// Number of trees in the ensemble.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Averaged class proportions for one feature vector.
    pub fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>> {
        if features.len() != self.n_features {
            return Err(CropwiseError::Prediction(format!(
                "expected {} features, got {}",
                self.n_features,
                features.len()
            )));
        }

        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let leaf = tree.leaf(features);
            let total: f64 = leaf.iter().sum();
            for (p, w) in proba.iter_mut().zip(leaf) {
                *p += w / total;
            }
        }
        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        Ok(proba)
    }
}

impl TryFrom<ClassifierArtifact> for TreeClassifier {
    type Error = CropwiseError;

    fn try_from(artifact: ClassifierArtifact) -> Result<Self> {
        let ClassifierArtifact {
            kind,
            n_features,
            classes,
            trees,
            tree,
        } = artifact;

        let trees = match (kind, tree) {
            (ModelKind::DecisionTree, Some(tree)) if trees.is_empty() => vec![tree],
            (ModelKind::DecisionTree, _) => {
                return Err(CropwiseError::InvalidModel(
                    "decision_tree needs exactly one `tree` and no `trees`".into(),
                ));
            }
            (ModelKind::RandomForest, None) if !trees.is_empty() => trees,
            (ModelKind::RandomForest, _) => {
                return Err(CropwiseError::InvalidModel(
                    "random_forest needs a non-empty `trees` and no `tree`".into(),
                ));
            }
        };

        if n_features == 0 {
            return Err(CropwiseError::InvalidModel("n_features must be positive".into()));
        }
        if classes.is_empty() {
            return Err(CropwiseError::InvalidModel("no classes".into()));
        }
        for tree in &trees {
            tree.validate(n_features, classes.len())?;
        }

        Ok(Self {
            kind,
            n_features,
            classes,
            trees,
        })
    }
}

impl Predictor for TreeClassifier {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn classes(&self) -> &[ClassLabel] {
        &self.classes
    }

    fn predict(&self, features: &[f64]) -> Result<ClassLabel> {
        let proba = self.predict_proba(features)?;
        let mut best = 0;
        for (idx, p) in proba.iter().enumerate().skip(1) {
            if *p > proba[best] {
                best = idx;
            }
        }
        Ok(self.classes[best].clone())
    }
}
