//! Feature extraction modules
//!
//! Every input modality produces the same 22-value [`FeatureVector`]:
//! - Structured acoustic measurements (identity mapping)
//! - Voice recordings (pitch tracking, perturbation, noise ratios, cepstral proxies)
//! - Spiral drawings (contour geometry collapsed to a tremor score)
//!
//! Shared spectral building blocks live in [`spectral`].

pub mod biomarker;
pub mod spectral;
pub mod spiral;
pub mod structured;
pub mod vector;
pub mod voice;

pub use biomarker::{Biomarker, FeatureRange, FEATURE_COUNT};
pub use vector::{FeatureLayout, FeatureVector};

use crate::error::ScreeningError;

/// Output of a [`FeatureExtractor`]: the canonical vector plus a
/// modality-specific report
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction<R> {
    /// Clipped canonical feature vector
    pub features: FeatureVector,
    /// Modality-specific diagnostics
    pub report: R,
}

/// Capability shared by all modalities: produce a [`FeatureVector`]
pub trait FeatureExtractor {
    /// Input accepted by this extractor
    type Input: ?Sized;

    /// Diagnostics returned alongside the vector
    type Report;

    /// Derive the canonical feature vector from `input`
    ///
    /// # Errors
    ///
    /// Returns a [`ScreeningError`] when the input does not satisfy the
    /// extractor's preconditions or processing fails.
    fn extract(&self, input: &Self::Input) -> Result<Extraction<Self::Report>, ScreeningError>;
}
