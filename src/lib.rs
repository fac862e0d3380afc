//! # neurovox
//!
//! A multimodal Parkinson's disease screening engine. Structured acoustic
//! measurements, voice recordings and hand-drawn spirals are all reduced to
//! the same 22 vocal biomarkers, scored by a previously trained classifier,
//! and reported as a risk tier with an explanation.
//!
//! ## Features
//!
//! - **Structured input**: range-validated identity mapping of 22 measurements
//! - **Voice recordings**: pYIN pitch tracking, jitter/shimmer, HPSS noise
//!   ratios and cepstral proxies for the nonlinear-dynamics measures
//! - **Spiral drawings**: contour geometry collapsed into a tremor score
//! - **Inference**: gradient boosted trees (XGBoost JSON) or logistic models
//!   behind a fitted standard scaler
//!
//! ## Quick Start
//!
//! ```no_run
//! use neurovox::config::{ArtifactPaths, ScreeningConfig};
//! use neurovox::Screener;
//!
//! let screener = Screener::load(&ArtifactPaths::in_dir("model"), ScreeningConfig::default())?;
//!
//! let bytes = std::fs::read("ahh.wav").unwrap();
//! let report = screener.predict_from_audio(bytes, "ahh.wav")?;
//!
//! println!(
//!     "Risk: {} (P = {:.2})",
//!     report.prediction.risk_level, report.prediction.probability_parkinson
//! );
//! # Ok::<(), neurovox::ScreeningError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Input -> Decoding -> Feature Extraction -> Scaling -> Classifier -> Risk Report
//! ```
//!
//! The derived biomarkers are heuristic approximations with fixed
//! calibration constants. They are not validated clinical measurements.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod ml;
pub mod preprocessing;
pub mod screener;

// Re-export main types
pub use analysis::{
    AudioPrediction, HandwritingPrediction, Modality, ModelSummary, PredictionResult, RiskTier,
    ServiceStatus,
};
pub use config::{ArtifactPaths, ScreeningConfig};
pub use error::{ErrorKind, ScreeningError};
pub use features::structured::{sample_data, VocalMeasurements};
pub use features::{Biomarker, FeatureVector};
pub use ml::ModelArtifact;
pub use screener::Screener;
