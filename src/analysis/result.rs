//! Screening result types

use super::risk::RiskTier;
use crate::features::spiral::SpiralMetrics;
use crate::features::FeatureVector;
use crate::ml::ModelScores;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Input modality a result was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    /// Structured vocal measurements
    Voice,
    /// Voice recording
    Audio,
    /// Spiral drawing
    Handwriting,
}

impl Modality {
    /// True for the two voice-based modalities
    ///
    /// Audio uploads are reported with the same vocal wording as structured
    /// measurements, since both describe the voice.
    pub fn is_vocal(self) -> bool {
        matches!(self, Modality::Voice | Modality::Audio)
    }
}

/// One entry of the global-importance explanation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributingFeature {
    /// Canonical feature name
    pub feature: String,
    /// This request's value (5 decimals)
    pub value: f64,
    /// Global importance weight (4 decimals)
    pub importance: f64,
}

/// Screening outcome for one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// P(Parkinson's) >= 0.5
    pub parkinson_detected: bool,

    /// Probability of the more likely class (4 decimals)
    pub confidence: f64,

    /// P(healthy) (4 decimals)
    pub probability_healthy: f64,

    /// P(Parkinson's) (4 decimals)
    pub probability_parkinson: f64,

    /// Risk tier
    pub risk_level: RiskTier,

    /// Globally most important features with this request's values
    pub top_contributing_features: Vec<ContributingFeature>,

    /// Advice text
    pub recommendation: String,

    /// Modality tag
    pub input_type: Modality,
}

/// Result of a voice recording screening
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudioPrediction {
    /// Shared result fields
    #[serde(flatten)]
    pub prediction: PredictionResult,

    /// Biomarkers derived from the recording (5 decimals)
    pub extracted_features: FeatureVector,

    /// Recording length in seconds (2 decimals)
    pub audio_duration_s: f64,
}

/// Result of a spiral drawing screening
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HandwritingPrediction {
    /// Shared result fields
    #[serde(flatten)]
    pub prediction: PredictionResult,

    /// Shape measurements of the traced spiral (4 decimals)
    pub spiral_metrics: SpiralMetrics,
}

/// Description of the loaded model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSummary {
    /// Feature names in model input order
    pub feature_names: Vec<String>,

    /// Description per feature
    pub feature_descriptions: BTreeMap<String, String>,

    /// Recorded importance weights, heaviest first, serialized as a
    /// `{name: weight}` object in that order
    #[serde(serialize_with = "crate::ml::metadata::weight_map::serialize")]
    pub shap_importance: Vec<(String, f64)>,

    /// Candidate model scores from training
    pub model_comparison: BTreeMap<String, ModelScores>,

    /// Candidate with the highest recall
    pub best_model_by_recall: Option<String>,
}

/// Readiness report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatus {
    /// Service banner
    pub message: String,
    /// Always `"ready"` once a model is loaded
    pub status: String,
    /// Available screening modules
    pub modules: Vec<String>,
}
