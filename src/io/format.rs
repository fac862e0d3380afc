//! Accepted upload formats, recognized by file extension (case-insensitive)

use crate::error::ScreeningError;
use std::path::Path;

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Audio containers accepted for voice recordings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioFormat {
    /// RIFF WAVE
    Wav,
    /// MPEG-1/2 Layer III
    Mp3,
    /// Ogg (Vorbis)
    Ogg,
    /// Free Lossless Audio Codec
    Flac,
}

impl AudioFormat {
    /// Human readable list used in error messages
    pub const EXPECTED: &'static str = "WAV, MP3, OGG or FLAC";

    /// Recognize a filename's extension
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFormat` for anything other than
    /// `.wav`, `.mp3`, `.ogg` or `.flac`
    pub fn from_filename(filename: &str) -> Result<Self, ScreeningError> {
        match extension_of(filename).as_deref() {
            Some("wav") => Ok(Self::Wav),
            Some("mp3") => Ok(Self::Mp3),
            Some("ogg") => Ok(Self::Ogg),
            Some("flac") => Ok(Self::Flac),
            _ => Err(ScreeningError::UnsupportedFormat {
                filename: filename.to_string(),
                expected: Self::EXPECTED,
            }),
        }
    }

    /// Canonical extension, used as a demuxer hint
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Ogg => "ogg",
            Self::Flac => "flac",
        }
    }
}

/// Image formats accepted for spiral drawings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageFormat {
    /// Portable Network Graphics
    Png,
    /// JPEG (`.jpg` or `.jpeg`)
    Jpeg,
    /// Windows bitmap
    Bmp,
    /// Tagged Image File Format
    Tiff,
}

impl ImageFormat {
    /// Human readable list used in error messages
    pub const EXPECTED: &'static str = "PNG, JPG, BMP or TIFF";

    /// Recognize a filename's extension
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedFormat` for anything other than
    /// `.png`, `.jpg`, `.jpeg`, `.bmp` or `.tiff`
    pub fn from_filename(filename: &str) -> Result<Self, ScreeningError> {
        match extension_of(filename).as_deref() {
            Some("png") => Ok(Self::Png),
            Some("jpg") | Some("jpeg") => Ok(Self::Jpeg),
            Some("bmp") => Ok(Self::Bmp),
            Some("tiff") => Ok(Self::Tiff),
            _ => Err(ScreeningError::UnsupportedFormat {
                filename: filename.to_string(),
                expected: Self::EXPECTED,
            }),
        }
    }

    /// Matching `image` crate format
    pub fn codec(&self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Bmp => image::ImageFormat::Bmp,
            Self::Tiff => image::ImageFormat::Tiff,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_audio_extensions() {
        assert_eq!(AudioFormat::from_filename("ahh.wav").unwrap(), AudioFormat::Wav);
        assert_eq!(AudioFormat::from_filename("AHH.FLAC").unwrap(), AudioFormat::Flac);
        assert_eq!(AudioFormat::from_filename("a.b.mp3").unwrap(), AudioFormat::Mp3);
        let err = AudioFormat::from_filename("voice.m4a").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert!(AudioFormat::from_filename("wav").is_err());
    }

    #[test]
    fn test_image_extensions() {
        assert_eq!(ImageFormat::from_filename("s.JPG").unwrap(), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_filename("s.jpeg").unwrap(), ImageFormat::Jpeg);
        assert_eq!(ImageFormat::from_filename("s.tiff").unwrap(), ImageFormat::Tiff);
        assert!(ImageFormat::from_filename("s.gif").is_err());
        assert!(ImageFormat::from_filename("s.tif").is_err());
    }
}
