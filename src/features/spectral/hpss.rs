//! Harmonic-percussive source separation (HPSS)
//!
//! Separates a spectrogram into a harmonic part (stable along time) and a
//! percussive part (stable along frequency).
//!
//! # Algorithm
//!
//! 1. Median filter the magnitude spectrogram along time -> harmonic estimate
//! 2. Median filter the magnitude spectrogram along frequency -> percussive estimate
//! 3. Build Wiener-style soft masks with power 2
//! 4. Apply the masks to the complex spectrogram and invert each component
//!
//! Filters use mirror ("reflect") boundary handling: `d c b a | a b c d | d c b a`.
//!
//! # Reference
//!
//! Fitzgerald, D. (2010). Harmonic/Percussive Separation using Median Filtering.
//! *Proceedings of the 13th International Conference on Digital Audio Effects (DAFx-10)*.

use super::stft::{istft, magnitude, Spectrogram};
use crate::error::ScreeningError;
use rayon::prelude::*;
use rustfft::num_complex::Complex;

/// Added to component energies so their ratio is always defined
pub const ENERGY_FLOOR: f64 = 1e-10;

/// Soft mask power
const MASK_POWER: i32 = 2;

/// Mirror an out-of-range index back into `0..len`
fn reflect_index(i: isize, len: usize) -> usize {
    let n = len as isize;
    let period = 2 * n;
    let m = i.rem_euclid(period);
    if m >= n {
        (period - m - 1) as usize
    } else {
        m as usize
    }
}

/// Sliding median with reflect padding
///
/// # Arguments
///
/// * `series` - Values to filter
/// * `kernel` - Window length (odd)
///
/// # Returns
///
/// Filtered values, same length as `series`
pub fn median_filter(series: &[f32], kernel: usize) -> Vec<f32> {
    if series.is_empty() || kernel <= 1 {
        return series.to_vec();
    }

    let half = (kernel / 2) as isize;
    let mut window = Vec::with_capacity(kernel);
    (0..series.len() as isize)
        .map(|i| {
            window.clear();
            for j in (i - half)..=(i + half) {
                window.push(series[reflect_index(j, series.len())]);
            }
            let mid = window.len() / 2;
            let (_, median, _) = window.select_nth_unstable_by(mid, |a, b| a.total_cmp(b));
            *median
        })
        .collect()
}

/// Decompose a magnitude spectrogram into harmonic and percussive estimates
///
/// # Arguments
///
/// * `magnitude_spec` - Magnitude spectrogram, frame-major
/// * `kernel` - Median filter length (odd)
///
/// # Returns
///
/// Tuple of (harmonic, percussive) magnitude spectrograms, frame-major
///
/// # Errors
///
/// Returns `InvalidInput` for an even or zero kernel or ragged frames
pub fn hpss_decompose(
    magnitude_spec: &[Vec<f32>],
    kernel: usize,
) -> Result<(Vec<Vec<f32>>, Vec<Vec<f32>>), ScreeningError> {
    if kernel == 0 || kernel % 2 == 0 {
        return Err(ScreeningError::InvalidInput(format!(
            "HPSS kernel must be odd, got {}",
            kernel
        )));
    }

    let n_frames = magnitude_spec.len();
    if n_frames == 0 {
        return Ok((Vec::new(), Vec::new()));
    }
    let n_bins = magnitude_spec[0].len();
    if magnitude_spec.iter().any(|f| f.len() != n_bins) {
        return Err(ScreeningError::InvalidInput(
            "Spectrogram frames have inconsistent bin counts".to_string(),
        ));
    }

    log::debug!(
        "Decomposing spectrogram with HPSS: {} frames x {} bins, kernel {}",
        n_frames,
        n_bins,
        kernel
    );

    // Harmonic: filter each bin along time
    let by_bin: Vec<Vec<f32>> = (0..n_bins)
        .into_par_iter()
        .map(|k| {
            let series: Vec<f32> = magnitude_spec.iter().map(|f| f[k]).collect();
            median_filter(&series, kernel)
        })
        .collect();
    let harmonic: Vec<Vec<f32>> = (0..n_frames)
        .map(|t| by_bin.iter().map(|bin| bin[t]).collect())
        .collect();

    // Percussive: filter each frame along frequency
    let percussive: Vec<Vec<f32>> = magnitude_spec
        .par_iter()
        .map(|frame| median_filter(frame, kernel))
        .collect();

    Ok((harmonic, percussive))
}

/// Soft mask `x^p / (x^p + r^p)`, computed relative to `max(x, r)`
fn softmask(x: f32, reference: f32) -> f32 {
    let z = x.max(reference);
    if z < f32::MIN_POSITIVE {
        return 0.0;
    }
    let mx = (x / z).powi(MASK_POWER);
    let mr = (reference / z).powi(MASK_POWER);
    mx / (mx + mr)
}

/// Time-domain harmonic and percussive components of a signal
#[derive(Debug, Clone)]
pub struct HpssComponents {
    /// Harmonic component
    pub harmonic: Vec<f32>,
    /// Percussive component
    pub percussive: Vec<f32>,
}

impl HpssComponents {
    /// Mean squared amplitude of the harmonic part plus [`ENERGY_FLOOR`]
    pub fn harmonic_energy(&self) -> f64 {
        mean_energy(&self.harmonic)
    }

    /// Mean squared amplitude of the percussive part plus [`ENERGY_FLOOR`]
    pub fn percussive_energy(&self) -> f64 {
        mean_energy(&self.percussive)
    }
}

fn mean_energy(signal: &[f32]) -> f64 {
    if signal.is_empty() {
        return ENERGY_FLOOR;
    }
    let sum: f64 = signal.iter().map(|&x| (x as f64) * (x as f64)).sum();
    sum / signal.len() as f64 + ENERGY_FLOOR
}

/// Separate a signal given its centered STFT
///
/// # Arguments
///
/// * `spectrogram` - Complex STFT of the signal
/// * `frame_size` - FFT size of `spectrogram`
/// * `hop_size` - Hop size of `spectrogram`
/// * `length` - Length of the original signal in samples
/// * `kernel` - Median filter length (odd)
///
/// # Errors
///
/// Propagates errors from [`hpss_decompose`] and [`istft`]
pub fn separate(
    spectrogram: &Spectrogram,
    frame_size: usize,
    hop_size: usize,
    length: usize,
    kernel: usize,
) -> Result<HpssComponents, ScreeningError> {
    let mag = magnitude(spectrogram);
    let (harm_mag, perc_mag) = hpss_decompose(&mag, kernel)?;

    let mut harm_spec: Spectrogram = Vec::with_capacity(spectrogram.len());
    let mut perc_spec: Spectrogram = Vec::with_capacity(spectrogram.len());
    for (t, frame) in spectrogram.iter().enumerate() {
        let mut h_frame = Vec::with_capacity(frame.len());
        let mut p_frame = Vec::with_capacity(frame.len());
        for (k, &c) in frame.iter().enumerate() {
            let h = harm_mag[t][k];
            let p = perc_mag[t][k];
            h_frame.push(c * Complex::new(softmask(h, p), 0.0));
            p_frame.push(c * Complex::new(softmask(p, h), 0.0));
        }
        harm_spec.push(h_frame);
        perc_spec.push(p_frame);
    }

    let harmonic = istft(&harm_spec, frame_size, hop_size, length)?;
    let percussive = istft(&perc_spec, frame_size, hop_size, length)?;

    Ok(HpssComponents {
        harmonic,
        percussive,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::spectral::stft::stft;

    #[test]
    fn test_reflect_index() {
        assert_eq!(reflect_index(-1, 4), 0);
        assert_eq!(reflect_index(-2, 4), 1);
        assert_eq!(reflect_index(4, 4), 3);
        assert_eq!(reflect_index(5, 4), 2);
        assert_eq!(reflect_index(2, 4), 2);
        // Windows wider than the signal keep bouncing
        assert_eq!(reflect_index(9, 4), 1);
        assert_eq!(reflect_index(-9, 2), 0);
    }

    #[test]
    fn test_median_filter_removes_spike() {
        let series = vec![1.0, 1.0, 1.0, 50.0, 1.0, 1.0, 1.0];
        let filtered = median_filter(&series, 3);
        assert_eq!(filtered, vec![1.0; 7]);
    }

    #[test]
    fn test_softmask_partitions_unity() {
        let h = softmask(3.0, 1.0);
        let p = softmask(1.0, 3.0);
        assert!((h + p - 1.0).abs() < 1e-6);
        assert!((h - 0.9).abs() < 1e-6);
        assert_eq!(softmask(0.0, 0.0), 0.0);
    }

    #[test]
    fn test_decompose_rejects_even_kernel() {
        let spec = vec![vec![1.0f32; 8]; 8];
        assert!(hpss_decompose(&spec, 4).is_err());
    }

    #[test]
    fn test_steady_tone_is_harmonic() {
        let sr = 8000.0;
        let samples: Vec<f32> = (0..8000)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / sr).sin() * 0.5)
            .collect();
        let spec = stft(&samples, 512, 128).unwrap();
        let parts = separate(&spec, 512, 128, samples.len(), 17).unwrap();
        assert_eq!(parts.harmonic.len(), samples.len());
        assert!(parts.harmonic_energy() > 10.0 * parts.percussive_energy());
    }

    #[test]
    fn test_click_train_is_percussive() {
        let mut samples = vec![0.0f32; 8000];
        for i in (0..8000).step_by(2000) {
            samples[i] = 1.0;
        }
        let spec = stft(&samples, 512, 128).unwrap();
        let parts = separate(&spec, 512, 128, samples.len(), 17).unwrap();
        assert!(parts.percussive_energy() > parts.harmonic_energy());
    }
}
