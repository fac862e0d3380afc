//! Spectral building blocks shared by the voice pipeline
//!
//! - [`stft`]: centered STFT and overlap-add inverse
//! - [`hpss`]: median-filter harmonic/percussive separation
//! - [`mel`]: Slaney mel filterbank, dB conversion, MFCC, spectral flux

pub mod hpss;
pub mod mel;
pub mod stft;

pub use hpss::{separate, HpssComponents};
pub use stft::{istft, stft, Spectrogram};
