//! Input decoding
//!
//! - [`format`]: accepted extensions per modality
//! - [`decoder`]: in-memory audio decoding with Symphonia
//! - [`image`]: image decoding to grayscale

pub mod decoder;
pub mod format;
pub mod image;

pub use decoder::{decode_audio_bytes, decode_audio_file};
pub use format::{AudioFormat, ImageFormat};
pub use self::image::{decode_image_bytes, decode_image_file};
