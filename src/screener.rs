//! Request surface: one entry point per input modality
//!
//! A [`Screener`] owns the shared model and the analysis settings. Each call
//! runs one extractor, then the common scoring tail:
//!
//! ```text
//! extractor -> FeatureVector -> InferenceEngine -> RiskClassifier -> PredictionResult
//! ```

use crate::analysis::{
    AudioPrediction, HandwritingPrediction, Modality, ModelSummary,
    PredictionResult, RiskClassifier, ServiceStatus,
};
use crate::config::{ArtifactPaths, ScreeningConfig};
use crate::error::{ErrorKind, ScreeningError};
use crate::features::spiral::ImageFeatureExtractor;
use crate::features::structured::{StructuredFeatureAdapter, VocalMeasurements};
use crate::features::vector::round_to;
use crate::features::voice::AudioFeatureExtractor;
use crate::features::{Biomarker, FeatureExtractor, FeatureVector};
use crate::io::{decode_audio_bytes, decode_image_bytes, AudioFormat, ImageFormat};
use crate::ml::{InferenceEngine, ModelArtifact};
use std::sync::Arc;
use std::time::Instant;

const SERVICE_BANNER: &str = "Multimodal Parkinson's Detection API v3.0";
const MODULES: [&str; 3] = ["voice_features", "voice_audio", "handwriting"];

/// Log unexpected failures in full; user-correctable ones are returned quietly
fn log_failure(context: &str, err: ScreeningError) -> ScreeningError {
    if err.kind() == ErrorKind::ProcessingFailure {
        log::error!("{} failed: {:?}", context, err);
    } else {
        log::debug!("{} rejected: {}", context, err);
    }
    err
}

/// Screening service over one trained model
///
/// Cheap to clone; all clones share the same model.
///
/// # Example
///
/// ```no_run
/// use neurovox::config::{ArtifactPaths, ScreeningConfig};
/// use neurovox::features::structured::sample_data;
/// use neurovox::Screener;
///
/// let screener = Screener::load(&ArtifactPaths::in_dir("model"), ScreeningConfig::default())?;
/// let result = screener.predict(&sample_data().healthy)?;
/// println!("{} ({:.1}%)", result.risk_level, result.probability_parkinson * 100.0);
/// # Ok::<(), neurovox::ScreeningError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Screener {
    artifact: Arc<ModelArtifact>,
    config: ScreeningConfig,
}

impl Screener {
    /// Screen with an already loaded model
    pub fn new(artifact: Arc<ModelArtifact>, config: ScreeningConfig) -> Self {
        Self { artifact, config }
    }

    /// Load the model artifacts and build a screener
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError` if the artifacts are missing or inconsistent
    pub fn load(paths: &ArtifactPaths, config: ScreeningConfig) -> Result<Self, ScreeningError> {
        let artifact = ModelArtifact::load(paths)?;
        Ok(Self::new(Arc::new(artifact), config))
    }

    /// Shared model
    pub fn artifact(&self) -> &Arc<ModelArtifact> {
        &self.artifact
    }

    /// Active settings
    pub fn config(&self) -> &ScreeningConfig {
        &self.config
    }

    /// Screen 22 structured vocal measurements
    ///
    /// # Errors
    ///
    /// Returns `Validation` naming the first out-of-range measurement
    pub fn predict(&self, measurements: &VocalMeasurements) -> Result<PredictionResult, ScreeningError> {
        let extraction = StructuredFeatureAdapter
            .extract(measurements)
            .map_err(|e| log_failure("Structured screening", e))?;
        Ok(self.predict_features(&extraction.features, Modality::Voice))
    }

    /// Screen a sustained-phonation recording
    ///
    /// # Arguments
    ///
    /// * `bytes` - Complete upload contents
    /// * `filename` - Upload name; its extension selects the container
    ///
    /// # Errors
    ///
    /// - `UnsupportedFormat` for anything other than WAV, MP3, OGG or FLAC
    /// - `InsufficientAudioDuration` for recordings under the minimum length
    /// - `NoVoicedSignal` when too few frames carry a pitch
    /// - a processing failure if decoding or extraction breaks
    pub fn predict_from_audio(
        &self,
        bytes: Vec<u8>,
        filename: &str,
    ) -> Result<AudioPrediction, ScreeningError> {
        let start = Instant::now();
        let context = format!("Audio screening of '{}'", filename);

        let format = AudioFormat::from_filename(filename).map_err(|e| log_failure(&context, e))?;
        let clip = decode_audio_bytes(bytes, format).map_err(|e| log_failure(&context, e))?;
        let extraction = AudioFeatureExtractor::new(self.config.voice.clone())
            .extract(&clip)
            .map_err(|e| log_failure(&context, e))?;

        let prediction = self.predict_features(&extraction.features, Modality::Audio);

        log::debug!(
            "{} done in {:.1} ms ({} of {} frames voiced)",
            context,
            start.elapsed().as_secs_f64() * 1000.0,
            extraction.report.voiced_frames,
            extraction.report.total_frames
        );

        Ok(AudioPrediction {
            prediction,
            extracted_features: extraction.features.rounded(5),
            audio_duration_s: round_to(extraction.report.duration_s, 2),
        })
    }

    /// Screen a hand-drawn spiral
    ///
    /// # Errors
    ///
    /// - `UnsupportedFormat` for anything other than PNG, JPG, BMP or TIFF
    /// - `NoSpiralDetected` when the image holds no ink
    /// - a processing failure if decoding breaks
    pub fn predict_from_handwriting(
        &self,
        bytes: &[u8],
        filename: &str,
    ) -> Result<HandwritingPrediction, ScreeningError> {
        let context = format!("Handwriting screening of '{}'", filename);

        let format = ImageFormat::from_filename(filename).map_err(|e| log_failure(&context, e))?;
        let gray = decode_image_bytes(bytes, format).map_err(|e| log_failure(&context, e))?;
        let extraction = ImageFeatureExtractor::new(self.config.spiral.clone())
            .extract(&gray)
            .map_err(|e| log_failure(&context, e))?;

        Ok(HandwritingPrediction {
            prediction: self.predict_features(&extraction.features, Modality::Handwriting),
            spiral_metrics: extraction.report.rounded(4),
        })
    }

    /// Score an already extracted feature vector
    pub fn predict_features(&self, features: &FeatureVector, modality: Modality) -> PredictionResult {
        let outcome = InferenceEngine::new(&self.artifact).score(features);
        RiskClassifier::new(self.config.top_features).classify(
            &outcome,
            features,
            self.artifact.importance(),
            modality,
        )
    }

    /// Feature list, descriptions, importance and training comparison
    pub fn metadata(&self) -> ModelSummary {
        let artifact = &self.artifact;
        ModelSummary {
            feature_names: artifact
                .layout()
                .names()
                .into_iter()
                .map(String::from)
                .collect(),
            feature_descriptions: Biomarker::ALL
                .iter()
                .map(|&b| (b.name().to_string(), artifact.description(b).to_string()))
                .collect(),
            shap_importance: artifact
                .importance()
                .iter()
                .map(|&(b, importance)| (b.name().to_string(), importance))
                .collect(),
            model_comparison: artifact.model_comparison().clone(),
            best_model_by_recall: artifact.best_model_by_recall().map(String::from),
        }
    }

    /// Readiness banner
    pub fn status(&self) -> ServiceStatus {
        ServiceStatus {
            message: SERVICE_BANNER.to_string(),
            status: "ready".to_string(),
            modules: MODULES.iter().map(|m| m.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::structured::sample_data;
    use crate::features::FEATURE_COUNT;
    use crate::ml::{LogisticModel, ModelMetadata, StandardScaler};

    fn constant_screener(intercept: f64) -> Screener {
        let artifact = ModelArtifact::from_parts(
            Box::new(LogisticModel {
                coefficients: vec![0.0; FEATURE_COUNT],
                intercept,
            }),
            StandardScaler::new(vec![0.0; FEATURE_COUNT], vec![1.0; FEATURE_COUNT]).unwrap(),
            ModelMetadata {
                feature_names: Biomarker::ALL.iter().map(|b| b.name().to_string()).collect(),
                ..Default::default()
            },
        )
        .unwrap();
        Screener::new(Arc::new(artifact), ScreeningConfig::default())
    }

    #[test]
    fn test_structured_validation_error() {
        let screener = constant_screener(0.0);
        let mut input = sample_data().healthy;
        input.mdvp_fo = 300.0;
        let err = screener.predict(&input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_constant_model_tiers() {
        let high = constant_screener(3.0).predict(&sample_data().healthy).unwrap();
        assert!(high.parkinson_detected);
        assert_eq!(high.risk_level, crate::analysis::RiskTier::High);
        assert_eq!(high.input_type, Modality::Voice);
        // No recorded importance, nothing to rank
        assert!(high.top_contributing_features.is_empty());

        let features = sample_data().parkinson.to_feature_vector();
        let from_audio = constant_screener(3.0).predict_features(&features, Modality::Audio);
        assert!(from_audio.recommendation.starts_with("Vocal biomarkers"));
        let from_drawing = constant_screener(3.0).predict_features(&features, Modality::Handwriting);
        assert!(from_drawing.recommendation.starts_with("Handwriting analysis"));

        let low = constant_screener(-3.0).predict(&sample_data().healthy).unwrap();
        assert!(!low.parkinson_detected);
        assert_eq!(low.risk_level, crate::analysis::RiskTier::VeryLow);
    }

    #[test]
    fn test_unsupported_formats() {
        let screener = constant_screener(0.0);
        let err = screener.predict_from_audio(vec![0; 16], "voice.aac").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        let err = screener.predict_from_handwriting(&[0; 16], "spiral.gif").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn test_status_and_metadata() {
        let screener = constant_screener(0.0);
        let status = screener.status();
        assert_eq!(status.status, "ready");
        assert_eq!(status.modules, vec!["voice_features", "voice_audio", "handwriting"]);

        let summary = screener.metadata();
        assert_eq!(summary.feature_names.len(), FEATURE_COUNT);
        assert_eq!(summary.feature_descriptions.len(), FEATURE_COUNT);
        assert!(summary.shap_importance.is_empty());
        assert!(summary.best_model_by_recall.is_none());
    }

    #[test]
    fn test_partial_importance_limits_top_features() {
        let mut metadata = ModelMetadata {
            feature_names: Biomarker::ALL.iter().map(|b| b.name().to_string()).collect(),
            ..Default::default()
        };
        metadata.shap_importance = vec![("PPE".into(), 1.2), ("spread1".into(), 0.9)];
        let artifact = ModelArtifact::from_parts(
            Box::new(LogisticModel {
                coefficients: vec![0.0; FEATURE_COUNT],
                intercept: 1.0,
            }),
            StandardScaler::new(vec![0.0; FEATURE_COUNT], vec![1.0; FEATURE_COUNT]).unwrap(),
            metadata,
        )
        .unwrap();
        let screener = Screener::new(Arc::new(artifact), ScreeningConfig::default());

        let result = screener.predict(&sample_data().parkinson).unwrap();
        let top: Vec<(&str, f64)> = result
            .top_contributing_features
            .iter()
            .map(|f| (f.feature.as_str(), f.importance))
            .collect();
        assert_eq!(top, vec![("PPE", 1.2), ("spread1", 0.9)]);

        let summary = screener.metadata();
        assert_eq!(
            summary.shap_importance,
            vec![("PPE".to_string(), 1.2), ("spread1".to_string(), 0.9)]
        );
    }
}
