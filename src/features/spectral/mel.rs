//! Mel filterbank, log-power conversion and cepstral coefficients
//!
//! The filterbank follows the Slaney auditory toolbox convention: linear mel
//! scale below 1 kHz, logarithmic above, and area normalization so each
//! triangle has unit integral.
//!
//! # Algorithm
//!
//! 1. Place `n_mels + 2` points evenly on the mel scale between 0 and `fmax`
//! 2. Build triangular filters between consecutive points over the FFT bin frequencies
//! 3. Project the power spectrogram onto the filters
//! 4. MFCC: convert to dB (clipped to `top_db` below the peak), then orthonormal DCT-II
//!
//! # Reference
//!
//! Slaney, M. (1998). Auditory Toolbox, Version 2. *Interval Research Corporation Technical Report #1998-010*.

use crate::error::ScreeningError;

/// Power floor before taking logarithms
const AMIN: f32 = 1e-10;

const F_SP: f64 = 200.0 / 3.0;
const MIN_LOG_HZ: f64 = 1000.0;

fn log_step() -> f64 {
    6.4f64.ln() / 27.0
}

/// Convert Hz to Slaney mels
pub fn hz_to_mel(hz: f64) -> f64 {
    if hz >= MIN_LOG_HZ {
        MIN_LOG_HZ / F_SP + (hz / MIN_LOG_HZ).ln() / log_step()
    } else {
        hz / F_SP
    }
}

/// Convert Slaney mels to Hz
pub fn mel_to_hz(mel: f64) -> f64 {
    let min_log_mel = MIN_LOG_HZ / F_SP;
    if mel >= min_log_mel {
        MIN_LOG_HZ * (log_step() * (mel - min_log_mel)).exp()
    } else {
        mel * F_SP
    }
}

/// Triangular mel filterbank
///
/// # Arguments
///
/// * `sample_rate` - Sample rate in Hz
/// * `n_fft` - FFT size
/// * `n_mels` - Number of bands
///
/// # Returns
///
/// `n_mels` filters of `n_fft / 2 + 1` weights each, covering 0 to Nyquist
///
/// # Errors
///
/// Returns `InvalidInput` for a zero sample rate, FFT size or band count
pub fn mel_filterbank(
    sample_rate: u32,
    n_fft: usize,
    n_mels: usize,
) -> Result<Vec<Vec<f32>>, ScreeningError> {
    if sample_rate == 0 || n_fft == 0 || n_mels == 0 {
        return Err(ScreeningError::InvalidInput(format!(
            "Invalid mel parameters: sample_rate={}, n_fft={}, n_mels={}",
            sample_rate, n_fft, n_mels
        )));
    }

    let n_bins = n_fft / 2 + 1;
    let fmax = sample_rate as f64 / 2.0;
    let fft_freqs: Vec<f64> = (0..n_bins)
        .map(|k| k as f64 * sample_rate as f64 / n_fft as f64)
        .collect();

    let max_mel = hz_to_mel(fmax);
    let mel_points: Vec<f64> = (0..n_mels + 2)
        .map(|i| mel_to_hz(max_mel * i as f64 / (n_mels + 1) as f64))
        .collect();

    let filters = (0..n_mels)
        .map(|m| {
            let (lo, center, hi) = (mel_points[m], mel_points[m + 1], mel_points[m + 2]);
            let enorm = 2.0 / (hi - lo);
            fft_freqs
                .iter()
                .map(|&f| {
                    let lower = (f - lo) / (center - lo);
                    let upper = (hi - f) / (hi - center);
                    (lower.min(upper).max(0.0) * enorm) as f32
                })
                .collect()
        })
        .collect();

    Ok(filters)
}

/// Project a power spectrogram onto mel bands
///
/// # Arguments
///
/// * `power_spec` - Power spectrogram, frame-major
/// * `filterbank` - Filters from [`mel_filterbank`]
///
/// # Returns
///
/// Mel power spectrogram, frame-major (`frames x n_mels`)
pub fn mel_spectrogram(power_spec: &[Vec<f32>], filterbank: &[Vec<f32>]) -> Vec<Vec<f32>> {
    power_spec
        .iter()
        .map(|frame| {
            filterbank
                .iter()
                .map(|filter| filter.iter().zip(frame.iter()).map(|(w, p)| w * p).sum())
                .collect()
        })
        .collect()
}

/// Convert power to decibels relative to 1.0, in place
///
/// Values are floored at [`AMIN`] before the logarithm, then every value more
/// than `top_db` below the global maximum is raised to that limit.
pub fn power_to_db(spec: &mut [Vec<f32>], top_db: f32) {
    let mut peak = f32::NEG_INFINITY;
    for frame in spec.iter_mut() {
        for v in frame.iter_mut() {
            *v = 10.0 * v.max(AMIN).log10();
            peak = peak.max(*v);
        }
    }

    let floor = peak - top_db;
    for frame in spec.iter_mut() {
        for v in frame.iter_mut() {
            *v = v.max(floor);
        }
    }
}

/// Orthonormal DCT-II of `input`, first `n_out` coefficients
pub fn dct_ortho(input: &[f32], n_out: usize) -> Vec<f32> {
    let n = input.len();
    if n == 0 {
        return vec![0.0; n_out];
    }
    let n_f = n as f64;
    (0..n_out)
        .map(|k| {
            let sum: f64 = input
                .iter()
                .enumerate()
                .map(|(i, &x)| {
                    x as f64
                        * (std::f64::consts::PI * k as f64 * (2.0 * i as f64 + 1.0) / (2.0 * n_f))
                            .cos()
                })
                .sum();
            let scale = if k == 0 {
                (1.0 / n_f).sqrt()
            } else {
                (2.0 / n_f).sqrt()
            };
            (sum * scale) as f32
        })
        .collect()
}

/// Mel-frequency cepstral coefficients from a mel power spectrogram
///
/// # Arguments
///
/// * `mel_power` - Mel power spectrogram, frame-major
/// * `n_mfcc` - Coefficients per frame
/// * `top_db` - Dynamic range kept by the dB conversion
///
/// # Returns
///
/// Coefficients, coefficient-major: `result[c][t]` is coefficient `c` of frame `t`
pub fn mfcc(mel_power: &[Vec<f32>], n_mfcc: usize, top_db: f32) -> Vec<Vec<f32>> {
    let mut log_mel = mel_power.to_vec();
    power_to_db(&mut log_mel, top_db);

    let per_frame: Vec<Vec<f32>> = log_mel.iter().map(|f| dct_ortho(f, n_mfcc)).collect();

    (0..n_mfcc)
        .map(|c| per_frame.iter().map(|f| f[c]).collect())
        .collect()
}

/// Mean absolute frame-to-frame change of a mel spectrogram
///
/// Averages `|S[t+1][m] - S[t][m]|` over every band and consecutive frame
/// pair. Returns 0.0 for fewer than two frames.
pub fn mean_spectral_flux(mel_power: &[Vec<f32>]) -> f64 {
    let mut sum = 0.0f64;
    let mut count = 0usize;
    for pair in mel_power.windows(2) {
        for (a, b) in pair[0].iter().zip(pair[1].iter()) {
            sum += (b - a).abs() as f64;
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
