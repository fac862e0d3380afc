//! Risk tiering and report assembly
//!
//! Converts class probabilities into the four-tier risk label, the
//! recommendation text and the top contributing features.
//!
//! # Tiers
//!
//! | P(Parkinson's) | Tier     |
//! |----------------|----------|
//! | >= 0.80        | High     |
//! | [0.50, 0.80)   | Moderate |
//! | [0.30, 0.50)   | Low      |
//! | < 0.30         | Very Low |
//!
//! # Example
//!
//! ```
//! use neurovox::analysis::risk::RiskTier;
//!
//! assert_eq!(RiskTier::from_probability(0.8), RiskTier::High);
//! assert_eq!(RiskTier::from_probability(0.4999), RiskTier::Low);
//! ```

use super::result::{ContributingFeature, Modality, PredictionResult};
use crate::features::vector::round_to;
use crate::features::{Biomarker, FeatureVector};
use crate::ml::InferenceOutcome;
use serde::{Deserialize, Serialize};
use std::fmt;

/// P(Parkinson's) at or above which the screen counts as positive
pub const DETECTION_THRESHOLD: f64 = 0.5;

const HIGH_THRESHOLD: f64 = 0.8;
const LOW_THRESHOLD: f64 = 0.3;

const NORMAL_RECOMMENDATION: &str =
    "Results appear within normal range. Continue regular health check-ups.";

/// Four-level risk label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskTier {
    /// P < 0.30
    #[serde(rename = "Very Low")]
    VeryLow,
    /// 0.30 <= P < 0.50
    Low,
    /// 0.50 <= P < 0.80
    Moderate,
    /// P >= 0.80
    High,
}

impl RiskTier {
    /// Tier for a Parkinson's probability
    pub fn from_probability(p: f64) -> Self {
        if p >= HIGH_THRESHOLD {
            RiskTier::High
        } else if p >= DETECTION_THRESHOLD {
            RiskTier::Moderate
        } else if p >= LOW_THRESHOLD {
            RiskTier::Low
        } else {
            RiskTier::VeryLow
        }
    }

    /// Display label
    pub fn label(self) -> &'static str {
        match self {
            RiskTier::VeryLow => "Very Low",
            RiskTier::Low => "Low",
            RiskTier::Moderate => "Moderate",
            RiskTier::High => "High",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Recommendation text for a result
pub fn recommendation(detected: bool, modality: Modality) -> String {
    if !detected {
        return NORMAL_RECOMMENDATION.to_string();
    }
    let source = if modality.is_vocal() {
        "Vocal biomarkers"
    } else {
        "Handwriting analysis"
    };
    format!(
        "{} suggest possible Parkinson's indicators. Please consult a neurologist promptly.",
        source
    )
}

/// Builds [`PredictionResult`]s from inference outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskClassifier {
    top_k: usize,
}

impl Default for RiskClassifier {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}

impl RiskClassifier {
    /// List `top_k` contributing features per result
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    /// Assemble the report
    ///
    /// # Arguments
    ///
    /// * `outcome` - Classifier output
    /// * `features` - The request's feature vector (unscaled)
    /// * `importance` - Global ranking, heaviest first
    /// * `modality` - Input tag
    pub fn classify(
        &self,
        outcome: &InferenceOutcome,
        features: &FeatureVector,
        importance: &[(Biomarker, f64)],
        modality: Modality,
    ) -> PredictionResult {
        let probs = outcome.probabilities;
        let detected = probs.parkinson >= DETECTION_THRESHOLD;
        let risk_level = RiskTier::from_probability(probs.parkinson);

        let top_contributing_features = importance
            .iter()
            .take(self.top_k)
            .map(|&(b, weight)| ContributingFeature {
                feature: b.name().to_string(),
                value: round_to(features[b], 5),
                importance: round_to(weight, 4),
            })
            .collect();

        log::debug!(
            "{:?} screen: P = {:.4}, tier {}",
            modality,
            probs.parkinson,
            risk_level
        );

        PredictionResult {
            parkinson_detected: detected,
            confidence: round_to(probs.max(), 4),
            probability_healthy: round_to(probs.healthy, 4),
            probability_parkinson: round_to(probs.parkinson, 4),
            risk_level,
            top_contributing_features,
            recommendation: recommendation(detected, modality),
            input_type: modality,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::ClassProbabilities;

    fn outcome(p: f64) -> InferenceOutcome {
        InferenceOutcome {
            predicted_class: usize::from(p > 0.5),
            probabilities: ClassProbabilities {
                healthy: 1.0 - p,
                parkinson: p,
            },
        }
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(RiskTier::from_probability(0.8), RiskTier::High);
        assert_eq!(RiskTier::from_probability(0.7999), RiskTier::Moderate);
        assert_eq!(RiskTier::from_probability(0.5), RiskTier::Moderate);
        assert_eq!(RiskTier::from_probability(0.4999), RiskTier::Low);
        assert_eq!(RiskTier::from_probability(0.3), RiskTier::Low);
        assert_eq!(RiskTier::from_probability(0.2999), RiskTier::VeryLow);
        assert_eq!(serde_json::to_value(RiskTier::VeryLow).unwrap(), "Very Low");
    }

    #[test]
    fn test_detected_at_exactly_half() {
        let features = FeatureVector::from_fn(|_| 0.0);
        let result = RiskClassifier::default().classify(&outcome(0.5), &features, &[], Modality::Voice);
        assert!(result.parkinson_detected);
        assert_eq!(result.risk_level, RiskTier::Moderate);
        assert_eq!(result.confidence, 0.5);
        assert!(result.recommendation.starts_with("Vocal biomarkers"));
        assert!(result.top_contributing_features.is_empty());
    }

    #[test]
    fn test_recommendation_phrasing() {
        assert!(recommendation(true, Modality::Audio).starts_with("Vocal biomarkers"));
        assert!(recommendation(true, Modality::Handwriting).starts_with("Handwriting analysis"));
        assert_eq!(recommendation(false, Modality::Handwriting), NORMAL_RECOMMENDATION);
    }

    #[test]
    fn test_top_features_use_request_values() {
        let features = FeatureVector::from_fn(|b| b.index() as f64 + 0.123456789);
        let importance = vec![
            (Biomarker::Ppe, 1.23456),
            (Biomarker::Spread1, 0.9),
            (Biomarker::Fo, 0.1),
        ];
        let result =
            RiskClassifier::new(2).classify(&outcome(0.123456), &features, &importance, Modality::Audio);

        assert_eq!(result.top_contributing_features.len(), 2);
        let first = &result.top_contributing_features[0];
        assert_eq!(first.feature, "PPE");
        assert_eq!(first.value, 21.12346);
        assert_eq!(first.importance, 1.2346);
        assert_eq!(result.probability_parkinson, 0.1235);
        assert_eq!(result.confidence, 0.8765);
        assert_eq!(result.risk_level, RiskTier::VeryLow);
        assert!(!result.parkinson_detected);
    }
}
