//! Ink/background separation for spiral drawings

use image::{GrayImage, Luma};
use imageproc::contrast::otsu_level;

/// Foreground value in binary masks
pub const INK: u8 = 255;

/// Inverted Otsu binarization: dark strokes on a light page become [`INK`]
///
/// # Returns
///
/// Tuple of (binary mask, Otsu level). Pixels at or below the level are ink.
pub fn binarize_inverted(image: &GrayImage) -> (GrayImage, u8) {
    let level = otsu_level(image);
    let mask = GrayImage::from_fn(image.width(), image.height(), |x, y| {
        if image.get_pixel(x, y)[0] <= level {
            Luma([INK])
        } else {
            Luma([0])
        }
    });
    log::debug!("Otsu level {} on {}x{} image", level, image.width(), image.height());
    (mask, level)
}

/// Number of ink pixels in a mask
pub fn ink_count(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p[0] == INK).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_strokes_become_ink() {
        let mut image = GrayImage::from_pixel(20, 20, Luma([250]));
        for x in 5..15 {
            image.put_pixel(x, 10, Luma([10]));
        }
        let (mask, level) = binarize_inverted(&image);
        assert!(level >= 10 && level < 250);
        assert_eq!(ink_count(&mask), 10);
        assert_eq!(mask.get_pixel(7, 10)[0], INK);
        assert_eq!(mask.get_pixel(7, 11)[0], 0);
    }

    #[test]
    fn test_blank_page_has_no_ink() {
        let image = GrayImage::from_pixel(16, 16, Luma([255]));
        let (mask, _) = binarize_inverted(&image);
        assert_eq!(ink_count(&mask), 0);
    }
}
