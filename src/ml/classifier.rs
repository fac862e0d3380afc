//! Binary classifiers loaded from JSON artifacts
//!
//! Two families are supported:
//!
//! - [`TreeEnsemble`]: gradient boosted trees from an XGBoost JSON model export
//! - [`LogisticModel`]: a linear model `sigmoid(w . x + b)`
//!
//! Both score standardized rows in model feature order and return
//! `[P(class 0), P(class 1)]`.

use crate::error::ScreeningError;
use serde::Deserialize;
use serde_json::Value;

/// Probability threshold above which class 1 is predicted
pub const DECISION_THRESHOLD: f64 = 0.5;

/// Binary probabilistic classifier
pub trait Classifier: Send + Sync + std::fmt::Debug {
    /// Short name of the model family
    fn name(&self) -> &'static str;

    /// Expected input width, when the artifact records it
    fn n_features(&self) -> Option<usize>;

    /// Class probabilities `[P(0), P(1)]` for one standardized row
    fn predict_proba(&self, row: &[f64]) -> [f64; 2];

    /// Predicted class: 1 iff `P(1) > 0.5`
    fn predict(&self, row: &[f64]) -> usize {
        usize::from(self.predict_proba(row)[1] > DECISION_THRESHOLD)
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

fn artifact_error(msg: impl Into<String>) -> ScreeningError {
    ScreeningError::ArtifactError(msg.into())
}

/// Linear logistic model
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogisticModel {
    /// Weight per feature
    pub coefficients: Vec<f64>,
    /// Bias term
    pub intercept: f64,
}

impl Classifier for LogisticModel {
    fn name(&self) -> &'static str {
        "logistic"
    }

    fn n_features(&self) -> Option<usize> {
        Some(self.coefficients.len())
    }

    fn predict_proba(&self, row: &[f64]) -> [f64; 2] {
        debug_assert_eq!(row.len(), self.coefficients.len(), "logistic input length");
        let margin: f64 = self
            .coefficients
            .iter()
            .zip(row.iter())
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;
        let p = sigmoid(margin);
        [1.0 - p, p]
    }
}

/// One regression tree in XGBoost's flat array layout
///
/// Node `i` is a leaf when `left_children[i] == -1`; its value is then
/// `split_conditions[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    split_indices: Vec<usize>,
    split_conditions: Vec<f64>,
    default_left: Vec<bool>,
}

impl RegressionTree {
    fn validate(&self, tree_no: usize) -> Result<(), ScreeningError> {
        let n = self.left_children.len();
        if n == 0 {
            return Err(artifact_error(format!("Tree {} has no nodes", tree_no)));
        }
        if [
            self.right_children.len(),
            self.split_indices.len(),
            self.split_conditions.len(),
            self.default_left.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err(artifact_error(format!(
                "Tree {} has inconsistent node arrays",
                tree_no
            )));
        }
        for node in 0..n {
            let (l, r) = (self.left_children[node], self.right_children[node]);
            if l == -1 {
                continue;
            }
            // Children always follow their parent, which rules out cycles
            let valid = |c: i32| c > node as i32 && (c as usize) < n;
            if !valid(l) || !valid(r) {
                return Err(artifact_error(format!(
                    "Tree {} node {} has invalid children ({}, {})",
                    tree_no, node, l, r
                )));
            }
        }
        Ok(())
    }

    fn max_split_index(&self) -> Option<usize> {
        (0..self.left_children.len())
            .filter(|&i| self.left_children[i] != -1)
            .map(|i| self.split_indices[i])
            .max()
    }

    /// Leaf value reached by `row`
    ///
    /// `x < condition` goes left; a missing (NaN) value follows the node's
    /// default direction.
    pub fn leaf_value(&self, row: &[f64]) -> f64 {
        let mut node = 0usize;
        loop {
            let left = self.left_children[node];
            if left == -1 {
                return self.split_conditions[node];
            }
            let x = row.get(self.split_indices[node]).copied().unwrap_or(f64::NAN);
            let go_left = if x.is_nan() {
                self.default_left[node]
            } else {
                x < self.split_conditions[node]
            };
            node = if go_left {
                left as usize
            } else {
                self.right_children[node] as usize
            };
        }
    }
}

/// How the summed margin becomes a probability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Objective {
    /// `binary:logistic` / `reg:logistic`: base score is a probability
    Logistic,
    /// `binary:logitraw`: base score is already a margin
    LogitRaw,
}

/// Gradient boosted tree ensemble
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEnsemble {
    trees: Vec<RegressionTree>,
    base_margin: f64,
    num_feature: Option<usize>,
}

#[derive(Deserialize)]
struct XgbDocument {
    learner: XgbLearner,
}

#[derive(Deserialize)]
struct XgbLearner {
    learner_model_param: XgbModelParam,
    gradient_booster: XgbBooster,
    objective: XgbObjective,
}

#[derive(Deserialize)]
struct XgbModelParam {
    base_score: String,
    #[serde(default)]
    num_feature: Option<String>,
}

#[derive(Deserialize)]
struct XgbObjective {
    name: String,
}

#[derive(Deserialize)]
struct XgbBooster {
    model: XgbGbtree,
}

#[derive(Deserialize)]
struct XgbGbtree {
    trees: Vec<XgbTree>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl Flag {
    fn is_set(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Int(i) => *i != 0,
        }
    }
}

#[derive(Deserialize)]
struct XgbTree {
    left_children: Vec<i32>,
    right_children: Vec<i32>,
    split_indices: Vec<usize>,
    split_conditions: Vec<f64>,
    default_left: Vec<Flag>,
}

/// Parse XGBoost's numeric strings, e.g. `"5E-1"` or `"[5E-1]"`
fn parse_xgb_number(raw: &str) -> Option<f64> {
    raw.trim()
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim()
        .parse()
        .ok()
}

impl TreeEnsemble {
    /// Build from an XGBoost JSON model document
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError` for a malformed document, an unsupported
    /// objective, or an inconsistent tree
    pub fn from_json_value(value: Value) -> Result<Self, ScreeningError> {
        let doc: XgbDocument = serde_json::from_value(value)
            .map_err(|e| artifact_error(format!("Invalid XGBoost model: {}", e)))?;
        let learner = doc.learner;

        let objective = match learner.objective.name.as_str() {
            "binary:logistic" | "reg:logistic" => Objective::Logistic,
            "binary:logitraw" => Objective::LogitRaw,
            other => {
                return Err(artifact_error(format!(
                    "Unsupported objective '{}'",
                    other
                )))
            }
        };

        let base_score = parse_xgb_number(&learner.learner_model_param.base_score).ok_or_else(|| {
            artifact_error(format!(
                "Invalid base_score '{}'",
                learner.learner_model_param.base_score
            ))
        })?;
        let base_margin = match objective {
            Objective::Logistic => {
                if !(base_score > 0.0 && base_score < 1.0) {
                    return Err(artifact_error(format!(
                        "base_score {} is not a probability",
                        base_score
                    )));
                }
                (base_score / (1.0 - base_score)).ln()
            }
            Objective::LogitRaw => base_score,
        };

        let num_feature = learner
            .learner_model_param
            .num_feature
            .as_deref()
            .and_then(parse_xgb_number)
            .map(|n| n as usize)
            .filter(|&n| n > 0);

        let trees: Vec<RegressionTree> = learner
            .gradient_booster
            .model
            .trees
            .into_iter()
            .map(|t| RegressionTree {
                left_children: t.left_children,
                right_children: t.right_children,
                split_indices: t.split_indices,
                split_conditions: t.split_conditions,
                default_left: t.default_left.iter().map(Flag::is_set).collect(),
            })
            .collect();

        for (i, tree) in trees.iter().enumerate() {
            tree.validate(i)?;
            if let (Some(n), Some(max)) = (num_feature, tree.max_split_index()) {
                if max >= n {
                    return Err(artifact_error(format!(
                        "Tree {} splits on feature {} of {}",
                        i, max, n
                    )));
                }
            }
        }

        log::debug!(
            "Loaded tree ensemble: {} trees, base margin {:.4}",
            trees.len(),
            base_margin
        );

        Ok(Self {
            trees,
            base_margin,
            num_feature,
        })
    }

    /// Number of trees
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// True for an ensemble without trees
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Raw margin (log-odds) for one row
    pub fn margin(&self, row: &[f64]) -> f64 {
        self.base_margin + self.trees.iter().map(|t| t.leaf_value(row)).sum::<f64>()
    }
}

impl Classifier for TreeEnsemble {
    fn name(&self) -> &'static str {
        "gradient_boosted_trees"
    }

    fn n_features(&self) -> Option<usize> {
        self.num_feature
    }

    fn predict_proba(&self, row: &[f64]) -> [f64; 2] {
        let p = sigmoid(self.margin(row));
        [1.0 - p, p]
    }
}

/// Load whichever classifier family a JSON artifact holds
///
/// Documents with a `learner` key are XGBoost exports; documents with
/// `"kind": "logistic"` are linear models.
///
/// # Errors
///
/// Returns `ArtifactError` for malformed or unrecognized documents
pub fn load_classifier_json(json: &str) -> Result<Box<dyn Classifier>, ScreeningError> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| artifact_error(format!("Invalid model JSON: {}", e)))?;

    if value.get("learner").is_some() {
        return Ok(Box::new(TreeEnsemble::from_json_value(value)?));
    }

    match value.get("kind").and_then(Value::as_str) {
        Some("logistic") => {
            let model: LogisticModel = serde_json::from_value(value)
                .map_err(|e| artifact_error(format!("Invalid logistic model: {}", e)))?;
            Ok(Box::new(model))
        }
        Some(other) => Err(artifact_error(format!("Unknown model kind '{}'", other))),
        None => Err(artifact_error(
            "Model JSON is neither an XGBoost export nor a tagged model",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stump_json(base_score: &str, objective: &str, default_left: &str) -> String {
        format!(
            r#"{{
              "learner": {{
                "learner_model_param": {{"base_score": "{}", "num_feature": "2"}},
                "objective": {{"name": "{}"}},
                "gradient_booster": {{
                  "name": "gbtree",
                  "model": {{
                    "trees": [{{
                      "left_children": [1, -1, -1],
                      "right_children": [2, -1, -1],
                      "split_indices": [1, 0, 0],
                      "split_conditions": [0.5, -1.0, 2.0],
                      "default_left": {}
                    }}]
                  }}
                }}
              }}
            }}"#,
            base_score, objective, default_left
        )
    }

    #[test]
    fn test_tree_traversal() {
        let model = load_classifier_json(&stump_json("5E-1", "binary:logistic", "[1, 0, 0]")).unwrap();
        assert_eq!(model.name(), "gradient_boosted_trees");
        assert_eq!(model.n_features(), Some(2));

        // base margin 0 -> P = sigmoid(leaf)
        let left = model.predict_proba(&[0.0, 0.1]);
        assert!((left[1] - sigmoid(-1.0)).abs() < 1e-12);
        assert_eq!(model.predict(&[0.0, 0.1]), 0);

        let right = model.predict_proba(&[0.0, 0.5]);
        assert!((right[1] - sigmoid(2.0)).abs() < 1e-12);
        assert!((right[0] + right[1] - 1.0).abs() < 1e-12);
        assert_eq!(model.predict(&[0.0, 0.5]), 1);
    }

    #[test]
    fn test_missing_value_follows_default() {
        let model = load_classifier_json(&stump_json("5E-1", "binary:logistic", "[true, false, false]"))
            .unwrap();
        let p = model.predict_proba(&[0.0, f64::NAN]);
        assert!((p[1] - sigmoid(-1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_base_score_forms() {
        let bracketed = load_classifier_json(&stump_json("[2E-1]", "binary:logistic", "[1, 0, 0]")).unwrap();
        let p = bracketed.predict_proba(&[0.0, 0.1])[1];
        let expected = sigmoid((0.2f64 / 0.8).ln() - 1.0);
        assert!((p - expected).abs() < 1e-12);

        let raw = load_classifier_json(&stump_json("0.5", "binary:logitraw", "[1, 0, 0]")).unwrap();
        let p = raw.predict_proba(&[0.0, 0.1])[1];
        assert!((p - sigmoid(-0.5)).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_models() {
        assert!(load_classifier_json(&stump_json("5E-1", "multi:softprob", "[1, 0, 0]")).is_err());
        assert!(load_classifier_json(&stump_json("1.5", "binary:logistic", "[1, 0, 0]")).is_err());
        assert!(load_classifier_json(&stump_json("5E-1", "binary:logistic", "[1, 0]")).is_err());
        assert!(load_classifier_json(r#"{"kind": "forest"}"#).is_err());
        assert!(load_classifier_json("not json").is_err());
        assert!(load_classifier_json("{}").is_err());
    }

    #[test]
    fn test_cyclic_tree_rejected() {
        let json = stump_json("5E-1", "binary:logistic", "[1, 0, 0]")
            .replace("\"left_children\": [1, -1, -1]", "\"left_children\": [0, -1, -1]");
        assert!(load_classifier_json(&json).is_err());
    }

    #[test]
    fn test_logistic_model() {
        let model = load_classifier_json(
            r#"{"kind": "logistic", "coefficients": [1.0, -2.0], "intercept": 0.5}"#,
        )
        .unwrap();
        assert_eq!(model.name(), "logistic");
        let p = model.predict_proba(&[1.0, 1.0]);
        assert!((p[1] - sigmoid(-0.5)).abs() < 1e-12);
        assert_eq!(model.predict(&[1.0, 1.0]), 0);
        assert_eq!(model.predict(&[3.0, 0.0]), 1);
    }
}
