//! Biomarker estimation from hand-drawn spirals
//!
//! # Algorithm
//!
//! 1. Resize the grayscale drawing to a fixed square resolution (Catmull-Rom)
//! 2. Inverted Otsu binarization (ink = foreground)
//! 3. Largest outer contour -> area, perimeter, convex hull, radial deviation
//! 4. Tremor score from radial deviation and convexity
//! 5. Affine projection of the tremor score onto all 22 biomarkers
//!
//! # Example
//!
//! ```no_run
//! use neurovox::config::SpiralConfig;
//! use neurovox::features::spiral::ImageFeatureExtractor;
//! use neurovox::features::FeatureExtractor;
//!
//! let drawing = neurovox::io::decode_image_file("spiral.png")?;
//! let extraction = ImageFeatureExtractor::new(SpiralConfig::default()).extract(&drawing)?;
//! println!("tremor: {:.3}", extraction.report.tremor_score);
//! # Ok::<(), neurovox::ScreeningError>(())
//! ```

pub mod binarize;
pub mod geometry;
pub mod metrics;

pub use metrics::SpiralMetrics;

use super::{Extraction, FeatureExtractor};
use crate::config::SpiralConfig;
use crate::error::ScreeningError;
use geometry::ContourShape;
use image::imageops::{self, FilterType};
use image::GrayImage;

/// Spiral drawing feature extractor
#[derive(Debug, Clone, Default)]
pub struct ImageFeatureExtractor {
    config: SpiralConfig,
}

impl ImageFeatureExtractor {
    /// Create an extractor with the given settings
    pub fn new(config: SpiralConfig) -> Self {
        Self { config }
    }

    /// Measure the spiral without projecting onto biomarkers
    ///
    /// # Errors
    ///
    /// Returns `NoSpiralDetected` when no ink region is found, or
    /// `InvalidInput` for an empty image or zero resolution.
    pub fn measure(&self, image: &GrayImage) -> Result<SpiralMetrics, ScreeningError> {
        let side = self.config.resolution;
        if side == 0 || image.width() == 0 || image.height() == 0 {
            return Err(ScreeningError::InvalidInput(format!(
                "Cannot analyse {}x{} image at resolution {}",
                image.width(),
                image.height(),
                side
            )));
        }

        let gray = imageops::resize(image, side, side, FilterType::CatmullRom);
        let (mask, _) = binarize::binarize_inverted(&gray);
        let contour =
            geometry::largest_external_contour(&mask).ok_or(ScreeningError::NoSpiralDetected)?;

        let shape = ContourShape::measure(&contour);
        let convexity = shape.convexity();
        let metrics = SpiralMetrics {
            circularity: shape.circularity(),
            solidity: shape.solidity(),
            convexity,
            spiral_deviation: shape.radial_deviation,
            roughness: metrics::stroke_roughness(&gray, &mask),
            tremor_score: metrics::tremor_score(shape.radial_deviation, convexity),
        };

        log::debug!(
            "Spiral: {} contour points, deviation={:.4}, convexity={:.4}, tremor={:.4}",
            contour.len(),
            metrics.spiral_deviation,
            metrics.convexity,
            metrics.tremor_score
        );
        Ok(metrics)
    }
}

impl FeatureExtractor for ImageFeatureExtractor {
    type Input = GrayImage;
    type Report = SpiralMetrics;

    fn extract(&self, image: &GrayImage) -> Result<Extraction<SpiralMetrics>, ScreeningError> {
        let metrics = self.measure(image)?;
        Ok(Extraction {
            features: metrics::project_tremor(metrics.tremor_score),
            report: metrics,
        })
    }
}
