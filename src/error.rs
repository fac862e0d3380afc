//! Error types for the screening engine

use thiserror::Error;

/// Errors that can occur while extracting biomarkers or scoring them
#[derive(Debug, Clone, Error)]
pub enum ScreeningError {
    /// Structured input outside its documented range
    #[error("Validation error: {feature} = {value} is outside [{min}, {max}]")]
    Validation {
        /// Canonical feature name
        feature: &'static str,
        /// Rejected value
        value: f64,
        /// Lower bound (inclusive)
        min: f64,
        /// Upper bound (inclusive)
        max: f64,
    },

    /// File extension not accepted for the modality
    #[error("Unsupported format '{filename}'. Upload a {expected} file.")]
    UnsupportedFormat {
        /// Filename as supplied by the caller
        filename: String,
        /// Human readable list of accepted formats
        expected: &'static str,
    },

    /// Recording shorter than the minimum analysis duration
    #[error(
        "Audio too short ({duration_s:.1}s). Need at least {required_s:.0} seconds of sustained 'ahh' phonation."
    )]
    InsufficientAudioDuration {
        /// Measured duration in seconds
        duration_s: f64,
        /// Required duration in seconds
        required_s: f64,
    },

    /// Not enough voiced pitch estimates for perturbation statistics
    #[error(
        "Could not detect a clear voiced signal ({voiced_frames} voiced frames, need {required}). Ensure the audio contains sustained 'ahh' phonation."
    )]
    NoVoicedSignal {
        /// Voiced frames found
        voiced_frames: usize,
        /// Minimum voiced frames required
        required: usize,
    },

    /// No foreground contour after binarization
    #[error(
        "Could not detect a spiral drawing in the image. Ensure the image contains a hand-drawn spiral on a white background."
    )]
    NoSpiralDetected,

    /// Invalid input parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Audio or image decoding error
    #[error("Decoding error: {0}")]
    DecodingError(String),

    /// Processing error during extraction
    #[error("Processing error: {0}")]
    ProcessingError(String),

    /// Numerical error (overflow, non-finite intermediate, etc.)
    #[error("Numerical error: {0}")]
    NumericalError(String),

    /// Model artifacts missing or malformed
    #[error("Model artifact error: {0}")]
    ArtifactError(String),
}

/// Closed classification of [`ScreeningError`] that callers branch on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Caller-supplied structured input out of range
    Validation,
    /// Unrecognized file extension
    UnsupportedFormat,
    /// Recording too short
    InsufficientAudioDuration,
    /// No usable voiced signal
    NoVoicedSignal,
    /// No spiral trace in the image
    NoSpiralDetected,
    /// Unexpected failure during decode or extraction
    ProcessingFailure,
    /// Artifact loading failure (startup only)
    Artifact,
}

impl ScreeningError {
    /// Classify the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::InsufficientAudioDuration { .. } => ErrorKind::InsufficientAudioDuration,
            Self::NoVoicedSignal { .. } => ErrorKind::NoVoicedSignal,
            Self::NoSpiralDetected => ErrorKind::NoSpiralDetected,
            Self::InvalidInput(_)
            | Self::DecodingError(_)
            | Self::ProcessingError(_)
            | Self::NumericalError(_) => ErrorKind::ProcessingFailure,
            Self::ArtifactError(_) => ErrorKind::Artifact,
        }
    }

    /// True when the user can fix the problem by changing the input
    pub fn is_user_correctable(&self) -> bool {
        !matches!(
            self.kind(),
            ErrorKind::ProcessingFailure | ErrorKind::Artifact
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            ScreeningError::NoSpiralDetected.kind(),
            ErrorKind::NoSpiralDetected
        );
        assert_eq!(
            ScreeningError::DecodingError("bad header".into()).kind(),
            ErrorKind::ProcessingFailure
        );
        assert_eq!(
            ScreeningError::NumericalError("nan".into()).kind(),
            ErrorKind::ProcessingFailure
        );
        assert_eq!(
            ScreeningError::ArtifactError("missing".into()).kind(),
            ErrorKind::Artifact
        );
    }

    #[test]
    fn test_message_prefixes() {
        assert_eq!(
            ScreeningError::InvalidInput("n = 0".into()).to_string(),
            "Invalid input: n = 0"
        );
        assert_eq!(
            ScreeningError::DecodingError("eof".into()).to_string(),
            "Decoding error: eof"
        );
        assert_eq!(
            ScreeningError::NumericalError("nan".into()).to_string(),
            "Numerical error: nan"
        );
    }

    #[test]
    fn test_user_correctable() {
        let short = ScreeningError::InsufficientAudioDuration {
            duration_s: 1.2,
            required_s: 2.0,
        };
        assert!(short.is_user_correctable());
        assert!(short.to_string().contains("1.2s"));
        assert!(!ScreeningError::ProcessingError("boom".into()).is_user_correctable());
    }
}
