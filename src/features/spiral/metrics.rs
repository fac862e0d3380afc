//! Spiral shape metrics and their projection onto vocal biomarkers
//!
//! The drawing collapses to one tremor score in `[0, 1]`. Each biomarker is
//! then an affine function of that score, clipped to its range. The table
//! is a fixed calibration, not a physiological model.

use crate::features::biomarker::Biomarker;
use crate::features::vector::{round_to, FeatureVector};
use image::GrayImage;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use serde::Serialize;

use super::binarize::INK;

/// Diagnostic measurements of the traced spiral
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpiralMetrics {
    /// `4 pi area / perimeter^2`
    pub circularity: f64,
    /// Area over convex hull area
    pub solidity: f64,
    /// Hull perimeter over perimeter
    pub convexity: f64,
    /// Coefficient of variation of contour radii
    pub spiral_deviation: f64,
    /// Mean Sobel gradient magnitude over ink pixels
    pub roughness: f64,
    /// Combined tremor score in `[0, 1]`
    pub tremor_score: f64,
}

impl SpiralMetrics {
    /// Copy with every metric rounded to `decimals` places
    pub fn rounded(&self, decimals: u32) -> Self {
        Self {
            circularity: round_to(self.circularity, decimals),
            solidity: round_to(self.solidity, decimals),
            convexity: round_to(self.convexity, decimals),
            spiral_deviation: round_to(self.spiral_deviation, decimals),
            roughness: round_to(self.roughness, decimals),
            tremor_score: round_to(self.tremor_score, decimals),
        }
    }
}

/// `clip(0.8 * deviation + 0.2 * (1 - convexity), 0, 1)`
pub fn tremor_score(spiral_deviation: f64, convexity: f64) -> f64 {
    (0.8 * spiral_deviation + 0.2 * (1.0 - convexity)).clamp(0.0, 1.0)
}

/// Mean gradient magnitude over pixels marked as ink in `mask`
///
/// Returns 0.0 when the mask has no ink.
pub fn stroke_roughness(gray: &GrayImage, mask: &GrayImage) -> f64 {
    let gx = horizontal_sobel(gray);
    let gy = vertical_sobel(gray);

    let (sum, count) = mask
        .enumerate_pixels()
        .filter(|(_, _, p)| p[0] == INK)
        .fold((0.0f64, 0usize), |(sum, count), (x, y, _)| {
            let dx = gx.get_pixel(x, y)[0] as f64;
            let dy = gy.get_pixel(x, y)[0] as f64;
            (sum + (dx * dx + dy * dy).sqrt(), count + 1)
        });

    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Calibration `(intercept, slope)` mapping tremor to `biomarker`
pub fn calibration(biomarker: Biomarker) -> (f64, f64) {
    match biomarker {
        Biomarker::Fo => (200.0, -80.0),
        Biomarker::Fhi => (220.0, -60.0),
        Biomarker::Flo => (160.0, -100.0),
        Biomarker::JitterPercent => (0.002, 0.06),
        Biomarker::JitterAbs => (0.00001, 0.0006),
        Biomarker::Rap => (0.001, 0.04),
        Biomarker::Ppq => (0.001, 0.04),
        Biomarker::Ddp => (0.003, 0.12),
        Biomarker::Shimmer => (0.01, 0.15),
        Biomarker::ShimmerDb => (0.1, 1.5),
        Biomarker::Apq3 => (0.005, 0.07),
        Biomarker::Apq5 => (0.006, 0.09),
        Biomarker::Apq => (0.008, 0.10),
        Biomarker::Dda => (0.015, 0.21),
        Biomarker::Nhr => (0.005, 0.30),
        Biomarker::Hnr => (28.0, -25.0),
        Biomarker::Rpde => (0.25, 0.55),
        Biomarker::Dfa => (0.6, 0.35),
        Biomarker::Spread1 => (-7.0, 5.0),
        Biomarker::Spread2 => (0.05, 0.4),
        Biomarker::D2 => (1.5, 2.0),
        Biomarker::Ppe => (0.05, 0.55),
    }
}

/// Project a tremor score onto all 22 biomarkers
pub fn project_tremor(tremor: f64) -> FeatureVector {
    FeatureVector::from_fn(|b| {
        let (intercept, slope) = calibration(b);
        intercept + slope * tremor
    })
    .clipped()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_tremor_score() {
        assert_eq!(tremor_score(0.0, 1.0), 0.0);
        assert!((tremor_score(0.5, 0.5) - 0.5).abs() < 1e-12);
        assert_eq!(tremor_score(2.0, 0.0), 1.0);
        assert_eq!(tremor_score(0.0, 1.5), 0.0);
    }

    #[test]
    fn test_projection_endpoints() {
        let calm = project_tremor(0.0);
        assert_eq!(calm[Biomarker::Fo], 200.0);
        assert_eq!(calm[Biomarker::Hnr], 28.0);
        assert_eq!(calm[Biomarker::Spread1], -7.0);

        let shaky = project_tremor(1.0);
        assert_eq!(shaky[Biomarker::Fo], 120.0);
        assert_eq!(shaky[Biomarker::Hnr], 3.0);
        // 0.6 + 0.35 = 0.95, inside [0.5, 1]
        assert!((shaky[Biomarker::Dfa] - 0.95).abs() < 1e-12);
        assert!((shaky[Biomarker::Ppe] - 0.6).abs() < 1e-12);
        assert!(shaky.first_out_of_range().is_none());
    }

    #[test]
    fn test_projection_is_monotone_in_tremor() {
        let a = project_tremor(0.2);
        let b = project_tremor(0.7);
        for biomarker in Biomarker::ALL {
            let (_, slope) = calibration(biomarker);
            if slope > 0.0 {
                assert!(b[biomarker] >= a[biomarker], "{}", biomarker);
            } else {
                assert!(b[biomarker] <= a[biomarker], "{}", biomarker);
            }
        }
    }

    #[test]
    fn test_roughness_flat_image_is_zero() {
        let gray = GrayImage::from_pixel(8, 8, Luma([100]));
        let mask = GrayImage::from_pixel(8, 8, Luma([INK]));
        assert_eq!(stroke_roughness(&gray, &mask), 0.0);
        assert_eq!(stroke_roughness(&gray, &GrayImage::new(8, 8)), 0.0);
    }

    #[test]
    fn test_rounded_metrics() {
        let m = SpiralMetrics {
            circularity: 0.123456,
            solidity: 0.5,
            convexity: 0.99999,
            spiral_deviation: 0.33333,
            roughness: 12.345678,
            tremor_score: 0.4,
        };
        let r = m.rounded(4);
        assert_eq!(r.circularity, 0.1235);
        assert_eq!(r.convexity, 1.0);
        assert_eq!(r.roughness, 12.3457);
    }
}
