//! Image decoding for spiral drawings

use super::format::ImageFormat;
use crate::error::ScreeningError;
use image::{GrayImage, Luma, Rgb, RgbImage};
use std::path::Path;

/// Rec.601 luma in 16-bit fixed point, rounded
fn rec601_luma(Rgb([r, g, b]): Rgb<u8>) -> u8 {
    let weighted = r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471;
    ((weighted + 0x8000) >> 16) as u8
}

/// Collapse colour to gray with ITU-R BT.601 weights (0.299, 0.587, 0.114)
///
/// Alpha is discarded rather than composited.
fn to_gray_rec601(rgb: &RgbImage) -> GrayImage {
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        Luma([rec601_luma(*rgb.get_pixel(x, y))])
    })
}

/// Decode an in-memory image to 8-bit grayscale
///
/// Colour images are reduced with BT.601 luma weights.
///
/// The container is sniffed from the content first; the extension-derived
/// `format` is used when sniffing fails.
///
/// # Errors
///
/// Returns `DecodingError` if the bytes are not a readable image
pub fn decode_image_bytes(bytes: &[u8], format: ImageFormat) -> Result<GrayImage, ScreeningError> {
    let decoded = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(_) => image::load_from_memory_with_format(bytes, format.codec())
            .map_err(|e| ScreeningError::DecodingError(format!("Unreadable image: {}", e)))?,
    };
    log::debug!(
        "Decoded {}x{} image ({:?})",
        decoded.width(),
        decoded.height(),
        format
    );
    Ok(to_gray_rec601(&decoded.to_rgb8()))
}

/// Decode an image file from disk
///
/// # Errors
///
/// Returns `UnsupportedFormat` for an unrecognized extension, `DecodingError`
/// if the file cannot be read or decoded
pub fn decode_image_file(path: impl AsRef<Path>) -> Result<GrayImage, ScreeningError> {
    let path = path.as_ref();
    let format = ImageFormat::from_filename(&path.to_string_lossy())?;
    let bytes = std::fs::read(path).map_err(|e| {
        ScreeningError::DecodingError(format!("Cannot read {}: {}", path.display(), e))
    })?;
    decode_image_bytes(&bytes, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_png_round_trip_to_gray() {
        let rgb = RgbImage::from_pixel(12, 7, Rgb([255, 255, 255]));
        let mut bytes = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(rgb)
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();

        let gray = decode_image_bytes(bytes.get_ref(), ImageFormat::Png).unwrap();
        assert_eq!(gray.dimensions(), (12, 7));
        assert_eq!(gray.get_pixel(3, 3)[0], 255);
    }

    #[test]
    fn test_coloured_ink_uses_rec601_weights() {
        let mut rgb = RgbImage::from_pixel(3, 1, Rgb([255, 0, 0]));
        rgb.put_pixel(1, 0, Rgb([0, 255, 0]));
        rgb.put_pixel(2, 0, Rgb([0, 0, 255]));
        let mut bytes = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(rgb)
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();

        let gray = decode_image_bytes(bytes.get_ref(), ImageFormat::Png).unwrap();
        let values: Vec<u8> = gray.pixels().map(|p| p[0]).collect();
        assert_eq!(values, vec![76, 150, 29]);

        // Gray input passes through unchanged
        assert_eq!(rec601_luma(Rgb([128, 128, 128])), 128);
        assert_eq!(rec601_luma(Rgb([0, 0, 0])), 0);
    }

    #[test]
    fn test_garbage_is_decoding_error() {
        let err = decode_image_bytes(b"not an image", ImageFormat::Png).unwrap_err();
        assert!(matches!(err, ScreeningError::DecodingError(_)));
    }
}
