//! Classifiers - fitted models behind a capability-tagged enum
//!
//! `Classifier::Probabilistic` yields a probability row per record,
//! `Classifier::Deterministic` only a class. Callers match on the variant
//! instead of probing the model at runtime.

use std::fmt::Debug;
use std::path::Path;

use ndarray::{Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{ArtifactError, ChurnError, ChurnResult};

// ============================================================================
// MODEL TRAITS
// ============================================================================

/// Model exposing a class-probability distribution
pub trait ProbabilisticModel: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Expected input width, if the model declares one
    fn n_features(&self) -> Option<usize>;

    fn n_classes(&self) -> usize;

    /// (M x n_classes), rows ordered by class index
    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> ChurnResult<Array2<f64>>;
}

/// Model exposing only a discrete class
pub trait DeterministicModel: Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn n_features(&self) -> Option<usize>;

    /// One class index per row
    fn predict(&self, x: ArrayView2<'_, f64>) -> ChurnResult<Vec<i64>>;
}

#[derive(Debug)]
pub enum Classifier {
    Probabilistic(Box<dyn ProbabilisticModel>),
    Deterministic(Box<dyn DeterministicModel>),
}

impl Classifier {
    pub fn name(&self) -> &'static str {
        match self {
            Classifier::Probabilistic(m) => m.name(),
            Classifier::Deterministic(m) => m.name(),
        }
    }

    pub fn n_features(&self) -> Option<usize> {
        match self {
            Classifier::Probabilistic(m) => m.n_features(),
            Classifier::Deterministic(m) => m.n_features(),
        }
    }

    pub fn is_probabilistic(&self) -> bool {
        matches!(self, Classifier::Probabilistic(_))
    }

    /// Parse a classifier artifact; `.onnx` files go through ONNX Runtime
    pub fn from_artifact(bytes: &[u8], path: &Path) -> Result<Self, ArtifactError> {
        let is_onnx = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("onnx"))
            .unwrap_or(false);

        if is_onnx {
            return load_onnx(bytes);
        }

        let spec: ClassifierSpec = serde_json::from_slice(bytes)?;
        spec.into_classifier()
    }
}

#[cfg(feature = "onnx")]
fn load_onnx(bytes: &[u8]) -> Result<Classifier, ArtifactError> {
    super::onnx::OnnxClassifier::from_bytes(bytes)
}

#[cfg(not(feature = "onnx"))]
fn load_onnx(_bytes: &[u8]) -> Result<Classifier, ArtifactError> {
    Err(ArtifactError::Invalid(
        "ONNX classifier requires the `onnx` feature".to_string(),
    ))
}

/// Serialized classifier, tagged by `kind`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    LogisticRegression(LogisticRegression),
    RandomForest(RandomForest),
    LinearSvc(LinearSvc),
}

impl ClassifierSpec {
    pub fn into_classifier(self) -> Result<Classifier, ArtifactError> {
        match self {
            ClassifierSpec::LogisticRegression(m) => {
                m.validate().map_err(ArtifactError::Invalid)?;
                Ok(Classifier::Probabilistic(Box::new(m)))
            }
            ClassifierSpec::RandomForest(m) => {
                m.validate().map_err(ArtifactError::Invalid)?;
                Ok(Classifier::Probabilistic(Box::new(m)))
            }
            ClassifierSpec::LinearSvc(m) => {
                m.validate().map_err(ArtifactError::Invalid)?;
                Ok(Classifier::Deterministic(Box::new(m)))
            }
        }
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn check_width(expected: usize, x: &ArrayView2<'_, f64>) -> ChurnResult<()> {
    if x.ncols() != expected {
        return Err(ChurnError::Inference(format!(
            "model expects {} features, got {}",
            expected,
            x.ncols()
        )));
    }
    Ok(())
}

fn dot(coef: &[f64], row: &ArrayView1<'_, f64>) -> f64 {
    coef.iter().zip(row.iter()).map(|(c, v)| c * v).sum()
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn softmax_inplace(scores: &mut [f64]) {
    let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for s in scores.iter_mut() {
        *s = (*s - max).exp();
        sum += *s;
    }
    for s in scores.iter_mut() {
        *s /= sum;
    }
}

/// Lowest index wins ties
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate().skip(1) {
        if *v > values[best] {
            best = i;
        }
    }
    best
}

fn validate_linear(coef: &[Vec<f64>], intercept: &[f64], n_classes: usize) -> Result<usize, String> {
    if n_classes < 2 {
        return Err("model needs at least two classes".to_string());
    }
    let expected_rows = if n_classes == 2 { 1 } else { n_classes };
    if coef.len() != expected_rows || intercept.len() != expected_rows {
        return Err(format!(
            "expected {} coefficient rows for {} classes, got {} (intercepts: {})",
            expected_rows,
            n_classes,
            coef.len(),
            intercept.len()
        ));
    }
    let width = coef[0].len();
    if width == 0 || coef.iter().any(|row| row.len() != width) {
        return Err("coefficient rows must be non-empty and equal width".to_string());
    }
    if coef.iter().flatten().chain(intercept).any(|v| !v.is_finite()) {
        return Err("coefficients must be finite".to_string());
    }
    Ok(width)
}

fn default_classes(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

// ============================================================================
// LOGISTIC REGRESSION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MultiClass {
    #[default]
    Multinomial,
    Ovr,
}

/// Fitted logistic regression (binary: one coefficient row)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    pub classes: Vec<i64>,
    #[serde(default)]
    pub multi_class: MultiClass,
}

impl LogisticRegression {
    pub fn validate(&self) -> Result<(), String> {
        validate_linear(&self.coef, &self.intercept, self.classes.len()).map(|_| ())
    }

    fn proba_row(&self, row: &ArrayView1<'_, f64>, out: &mut [f64]) {
        if self.classes.len() == 2 {
            let p1 = sigmoid(dot(&self.coef[0], row) + self.intercept[0]);
            out[0] = 1.0 - p1;
            out[1] = p1;
            return;
        }

        for (k, slot) in out.iter_mut().enumerate() {
            *slot = dot(&self.coef[k], row) + self.intercept[k];
        }
        match self.multi_class {
            MultiClass::Multinomial => softmax_inplace(out),
            MultiClass::Ovr => {
                out.iter_mut().for_each(|s| *s = sigmoid(*s));
                let sum: f64 = out.iter().sum();
                out.iter_mut().for_each(|s| *s /= sum);
            }
        }
    }
}

impl ProbabilisticModel for LogisticRegression {
    fn name(&self) -> &'static str {
        "logistic_regression"
    }

    fn n_features(&self) -> Option<usize> {
        self.coef.first().map(|row| row.len())
    }

    fn n_classes(&self) -> usize {
        self.classes.len()
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> ChurnResult<Array2<f64>> {
        check_width(self.coef[0].len(), &x)?;

        let mut out = Array2::<f64>::zeros((x.nrows(), self.n_classes()));
        for (row, mut target) in x.axis_iter(Axis(0)).zip(out.axis_iter_mut(Axis(0))) {
            let mut probs = vec![0.0; self.n_classes()];
            self.proba_row(&row, &mut probs);
            for (slot, p) in target.iter_mut().zip(probs) {
                *slot = p;
            }
        }
        Ok(out)
    }
}

// ============================================================================
// RANDOM FOREST
// ============================================================================

/// One fitted decision tree in flat-array form
///
/// Node `i` is a leaf when `children_left[i] == -1`. Otherwise go left when
/// `x[feature[i]] <= threshold[i]`. `value[i]` holds per-class weights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        let n = self.children_left.len();
        if n == 0 {
            return Err("tree has no nodes".to_string());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err("tree arrays have different lengths".to_string());
        }

        for i in 0..n {
            let (left, right) = (self.children_left[i], self.children_right[i]);
            if left == -1 {
                if right != -1 {
                    return Err(format!("node {} has only one child", i));
                }
                let weights = &self.value[i];
                let valid = weights.len() == n_classes
                    && weights.iter().all(|v| v.is_finite() && *v >= 0.0)
                    && weights.iter().sum::<f64>() > 0.0;
                if !valid {
                    return Err(format!("leaf {} has invalid class weights", i));
                }
                continue;
            }
            // children after parent ⇒ traversal always terminates
            for child in [left, right] {
                if child <= i as i64 || child >= n as i64 {
                    return Err(format!("node {} has invalid child {}", i, child));
                }
            }
            if self.feature[i] < 0 || self.feature[i] as usize >= n_features {
                return Err(format!("node {} splits on unknown feature {}", i, self.feature[i]));
            }
        }
        Ok(())
    }

    fn leaf(&self, row: &ArrayView1<'_, f64>) -> &[f64] {
        let mut node = 0usize;
        while self.children_left[node] != -1 {
            let feature = self.feature[node] as usize;
            node = if row[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        &self.value[node]
    }
}

/// Fitted random forest: mean of per-tree leaf distributions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub classes: Vec<i64>,
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<(), String> {
        if self.classes.len() < 2 {
            return Err("model needs at least two classes".to_string());
        }
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (t, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.classes.len())
                .map_err(|e| format!("tree {}: {}", t, e))?;
        }
        Ok(())
    }
}

impl ProbabilisticModel for RandomForest {
    fn name(&self) -> &'static str {
        "random_forest"
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }

    fn n_classes(&self) -> usize {
        self.classes.len()
    }

    fn predict_proba(&self, x: ArrayView2<'_, f64>) -> ChurnResult<Array2<f64>> {
        check_width(self.n_features, &x)?;

        let n_trees = self.trees.len() as f64;
        let mut out = Array2::<f64>::zeros((x.nrows(), self.n_classes()));

        for (row, mut target) in x.axis_iter(Axis(0)).zip(out.axis_iter_mut(Axis(0))) {
            for tree in &self.trees {
                let weights = tree.leaf(&row);
                let total: f64 = weights.iter().sum();
                for (slot, w) in target.iter_mut().zip(weights) {
                    *slot += w / total / n_trees;
                }
            }
        }
        Ok(out)
    }
}

// ============================================================================
// LINEAR SVC (no probabilities)
// ============================================================================

/// Fitted linear support vector classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvc {
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    #[serde(default)]
    pub classes: Vec<i64>,
}

impl LinearSvc {
    pub fn validate(&self) -> Result<(), String> {
        let n_classes = if self.classes.is_empty() {
            // sklearn stores one row for binary problems
            self.coef.len().max(2)
        } else {
            self.classes.len()
        };
        validate_linear(&self.coef, &self.intercept, n_classes).map(|_| ())
    }

    fn classes(&self) -> Vec<i64> {
        if self.classes.is_empty() {
            default_classes(self.coef.len().max(2))
        } else {
            self.classes.clone()
        }
    }
}

impl DeterministicModel for LinearSvc {
    fn name(&self) -> &'static str {
        "linear_svc"
    }

    fn n_features(&self) -> Option<usize> {
        self.coef.first().map(|row| row.len())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> ChurnResult<Vec<i64>> {
        check_width(self.coef[0].len(), &x)?;
        let classes = self.classes();

        Ok(x
            .axis_iter(Axis(0))
            .map(|row| {
                let scores: Vec<f64> = self
                    .coef
                    .iter()
                    .zip(&self.intercept)
                    .map(|(c, b)| dot(c, &row) + b)
                    .collect();
                if scores.len() == 1 {
                    if scores[0] > 0.0 {
                        classes[1]
                    } else {
                        classes[0]
                    }
                } else {
                    classes[argmax(&scores)]
                }
            })
            .collect())
    }
}

// ============================================================================
// TESTS
// ============================================================================
