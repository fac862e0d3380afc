//! Turning classifier output into a screening report
//!
//! - Risk tiers and recommendations
//! - Result types returned to callers

pub mod result;
pub mod risk;

pub use result::{
    AudioPrediction, ContributingFeature, HandwritingPrediction, Modality,
    ModelSummary, PredictionResult, ServiceStatus,
};
pub use risk::{RiskClassifier, RiskTier};
