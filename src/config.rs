//! Configuration parameters for screening
//!
//! Defaults reproduce the calibration the classifier was trained against.
//! All structs deserialize with per-field defaults, so a host only needs to
//! list the values it overrides.

use crate::error::ScreeningError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Probabilistic YIN parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PyinConfig {
    /// Number of YIN thresholds between 0 and 1 (default: 100)
    pub n_thresholds: usize,

    /// Beta prior over thresholds, shape parameters (default: (2, 18))
    pub beta_parameters: (f64, f64),

    /// Boltzmann prior over trough rank (default: 2.0)
    pub boltzmann_parameter: f64,

    /// Pitch bin resolution in semitones (default: 0.1)
    pub resolution: f64,

    /// Maximum pitch change in octaves per second (default: 35.92)
    pub max_transition_rate: f64,

    /// Probability of switching between voiced and unvoiced (default: 0.01)
    pub switch_prob: f64,

    /// Probability mass given to the global minimum when no trough is below threshold (default: 0.01)
    pub no_trough_prob: f64,
}

impl Default for PyinConfig {
    fn default() -> Self {
        Self {
            n_thresholds: 100,
            beta_parameters: (2.0, 18.0),
            boltzmann_parameter: 2.0,
            resolution: 0.1,
            max_transition_rate: 35.92,
            switch_prob: 0.01,
            no_trough_prob: 0.01,
        }
    }
}

/// Voice recording analysis parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Minimum recording length in seconds (default: 2.0)
    pub min_duration_s: f64,

    /// Minimum voiced pitch estimates for perturbation statistics (default: 10)
    pub min_voiced_frames: usize,

    /// Frame size for pitch tracking, RMS and STFT (default: 2048)
    pub frame_size: usize,

    /// Hop size between frames (default: 512)
    pub hop_size: usize,

    /// Lowest pitch considered, C2 (default: 65.406 Hz)
    pub fmin: f64,

    /// Highest pitch considered, C7 (default: 2093.005 Hz)
    pub fmax: f64,

    /// RMS below which a frame counts as silent (default: 1e-6)
    pub silence_rms: f32,

    /// Median filter length for harmonic/percussive separation (default: 31)
    pub hpss_kernel: usize,

    /// Mel bands (default: 128)
    pub n_mels: usize,

    /// Cepstral coefficients (default: 13)
    pub n_mfcc: usize,

    /// Dynamic range kept when converting mel power to dB (default: 80.0)
    pub top_db: f32,

    /// pYIN parameters
    pub pyin: PyinConfig,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            min_duration_s: 2.0,
            min_voiced_frames: 10,
            frame_size: 2048,
            hop_size: 512,
            fmin: 65.406_391_325_149_66,
            fmax: 2_093.004_522_404_789,
            silence_rms: 1e-6,
            hpss_kernel: 31,
            n_mels: 128,
            n_mfcc: 13,
            top_db: 80.0,
            pyin: PyinConfig::default(),
        }
    }
}

/// Spiral drawing analysis parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpiralConfig {
    /// Square analysis resolution in pixels (default: 256)
    pub resolution: u32,
}

impl Default for SpiralConfig {
    fn default() -> Self {
        Self { resolution: 256 }
    }
}

/// Screening configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    /// Voice recording analysis
    pub voice: VoiceConfig,

    /// Spiral drawing analysis
    pub spiral: SpiralConfig,

    /// Contributing features listed in each report (default: 5)
    pub top_features: usize,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            voice: VoiceConfig::default(),
            spiral: SpiralConfig::default(),
            top_features: 5,
        }
    }
}

impl ScreeningConfig {
    /// Parse a JSON document, filling unspecified fields with defaults
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the document is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, ScreeningError> {
        serde_json::from_str(json)
            .map_err(|e| ScreeningError::InvalidInput(format!("Invalid configuration: {}", e)))
    }
}

/// Locations of the three artifacts produced by offline training
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Serialized classifier
    pub model: PathBuf,
    /// Serialized scaler
    pub scaler: PathBuf,
    /// Feature metadata document
    pub metadata: PathBuf,
}

impl ArtifactPaths {
    /// Standard file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join("final_model.json"),
            scaler: dir.join("scaler.json"),
            metadata: dir.join("metadata.json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            ScreeningConfig::from_json_str(r#"{"top_features": 3, "voice": {"hop_size": 256}}"#)
                .unwrap();
        assert_eq!(config.top_features, 3);
        assert_eq!(config.voice.hop_size, 256);
        assert_eq!(config.voice.frame_size, 2048);
        assert_eq!(config.spiral.resolution, 256);
        assert_eq!(config.voice.pyin.beta_parameters, (2.0, 18.0));
    }

    #[test]
    fn test_fractional_beta_prior() {
        let config = ScreeningConfig::from_json_str(
            r#"{"voice": {"pyin": {"beta_parameters": [2.5, 18.0]}}}"#,
        )
        .unwrap();
        assert_eq!(config.voice.pyin.beta_parameters, (2.5, 18.0));
        assert_eq!(config.voice.pyin.n_thresholds, 100);
    }

    #[test]
    fn test_malformed_json_is_invalid_input() {
        let err = ScreeningConfig::from_json_str("{top_features: }").unwrap_err();
        assert!(matches!(err, ScreeningError::InvalidInput(_)));
    }

    #[test]
    fn test_artifact_paths_in_dir() {
        let paths = ArtifactPaths::in_dir("/srv/model");
        assert_eq!(paths.model, PathBuf::from("/srv/model/final_model.json"));
        assert_eq!(paths.metadata, PathBuf::from("/srv/model/metadata.json"));
    }
}
