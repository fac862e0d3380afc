//! Training metadata document
//!
//! Written by the offline trainer next to the model: ordered feature names,
//! global importance weights, human readable descriptions and the scores of
//! the candidate models that were compared.

use crate::error::ScreeningError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// `{name: weight}` objects kept as ordered pairs
///
/// Relies on serde_json's `preserve_order` so the document's key order
/// survives parsing.
pub(crate) mod weight_map {
    use serde::de::Error as _;
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::{Map, Value};

    pub fn serialize<S: Serializer>(weights: &[(String, f64)], serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(weights.len()))?;
        for (name, weight) in weights {
            map.serialize_entry(name, weight)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<(String, f64)>, D::Error> {
        Map::<String, Value>::deserialize(deserializer)?
            .into_iter()
            .map(|(name, value)| match value.as_f64() {
                Some(weight) => Ok((name, weight)),
                None => Err(D::Error::custom(format!(
                    "weight for '{}' is not a number",
                    name
                ))),
            })
            .collect()
    }
}

/// Held-out scores of one candidate model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelScores {
    /// Accuracy
    pub accuracy: f64,
    /// Recall on the Parkinson's class
    pub recall: f64,
    /// Matthews correlation coefficient
    pub mcc: f64,
    /// ROC AUC, absent for models without probability output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auc: Option<f64>,
}

/// Parsed `metadata.json`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Canonical feature names in model input order
    pub feature_names: Vec<String>,

    /// Mean absolute SHAP value per feature, in document order
    #[serde(default, with = "weight_map")]
    pub shap_importance: Vec<(String, f64)>,

    /// Description per feature
    #[serde(default)]
    pub feature_descriptions: HashMap<String, String>,

    /// Candidate model name -> scores
    #[serde(default)]
    pub model_comparison: BTreeMap<String, ModelScores>,

    /// Name of the candidate with the highest recall
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_model_by_recall: Option<String>,
}

impl ModelMetadata {
    /// Parse the metadata document
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError` for malformed JSON or a negative or
    /// non-finite importance weight
    pub fn from_json_str(json: &str) -> Result<Self, ScreeningError> {
        let metadata: Self = serde_json::from_str(json)
            .map_err(|e| ScreeningError::ArtifactError(format!("Invalid metadata: {}", e)))?;

        if let Some((name, w)) = metadata
            .shap_importance
            .iter()
            .find(|(_, w)| !w.is_finite() || *w < 0.0)
        {
            return Err(ScreeningError::ArtifactError(format!(
                "Importance for '{}' is {}, expected a non-negative number",
                name, w
            )));
        }

        Ok(metadata)
    }
}
