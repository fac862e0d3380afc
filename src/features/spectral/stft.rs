//! Short-time Fourier transform and its overlap-add inverse
//!
//! Frames are centered: the signal is zero-padded by `frame_size / 2` on both
//! sides, so frame `t` is centered on sample `t * hop_size`. Windows are
//! periodic Hann. The inverse normalizes by the summed squared window, which
//! makes `istft(stft(x)) == x` up to floating point error.

use crate::error::ScreeningError;
use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

/// Windowed sums below this are treated as zero during overlap-add
const WINDOW_SUM_FLOOR: f32 = 1e-10;

/// One-sided spectrogram, frame-major: `frames[t][k]` for `k` in `0..=frame_size / 2`
pub type Spectrogram = Vec<Vec<Complex<f32>>>;

/// Periodic Hann window of length `n`
pub fn hann_window(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| {
            let t = 2.0 * std::f32::consts::PI * i as f32 / n as f32;
            0.5 - 0.5 * t.cos()
        })
        .collect()
}

/// Number of centered frames for a signal of `len` samples
pub fn frame_count(len: usize, hop_size: usize) -> usize {
    1 + len / hop_size
}

fn validate(frame_size: usize, hop_size: usize) -> Result<(), ScreeningError> {
    if frame_size < 2 || frame_size % 2 != 0 {
        return Err(ScreeningError::InvalidInput(format!(
            "Frame size must be even and >= 2, got {}",
            frame_size
        )));
    }
    if hop_size == 0 {
        return Err(ScreeningError::InvalidInput(
            "Hop size must be > 0".to_string(),
        ));
    }
    Ok(())
}

/// Compute a centered STFT
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `frame_size` - FFT size (even)
/// * `hop_size` - Hop between frames
///
/// # Returns
///
/// One-sided complex spectrogram, `1 + len / hop_size` frames of
/// `frame_size / 2 + 1` bins
///
/// # Errors
///
/// Returns `InvalidInput` for an odd/zero frame size or a zero hop size
pub fn stft(
    samples: &[f32],
    frame_size: usize,
    hop_size: usize,
) -> Result<Spectrogram, ScreeningError> {
    validate(frame_size, hop_size)?;

    let pad = frame_size / 2;
    let mut padded = vec![0.0f32; samples.len() + 2 * pad];
    padded[pad..pad + samples.len()].copy_from_slice(samples);

    let n_frames = frame_count(samples.len(), hop_size);
    let n_bins = frame_size / 2 + 1;
    let window = hann_window(frame_size);

    log::debug!(
        "STFT: {} samples, frame={}, hop={}, {} frames",
        samples.len(),
        frame_size,
        hop_size,
        n_frames
    );

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(frame_size);

    let mut frames = Vec::with_capacity(n_frames);
    let mut buffer = vec![Complex::new(0.0f32, 0.0); frame_size];
    for t in 0..n_frames {
        let start = t * hop_size;
        for (i, slot) in buffer.iter_mut().enumerate() {
            *slot = Complex::new(padded[start + i] * window[i], 0.0);
        }
        fft.process(&mut buffer);
        frames.push(buffer[..n_bins].to_vec());
    }

    Ok(frames)
}

/// Invert a centered STFT by windowed overlap-add
///
/// # Arguments
///
/// * `frames` - One-sided spectrogram from [`stft`]
/// * `frame_size` - FFT size used for the forward transform
/// * `hop_size` - Hop used for the forward transform
/// * `length` - Output length in samples (zero-padded or truncated)
///
/// # Errors
///
/// Returns `InvalidInput` if the frame shape does not match `frame_size`
pub fn istft(
    frames: &[Vec<Complex<f32>>],
    frame_size: usize,
    hop_size: usize,
    length: usize,
) -> Result<Vec<f32>, ScreeningError> {
    validate(frame_size, hop_size)?;

    let n_bins = frame_size / 2 + 1;
    if let Some(bad) = frames.iter().find(|f| f.len() != n_bins) {
        return Err(ScreeningError::InvalidInput(format!(
            "Spectrogram frame has {} bins, expected {}",
            bad.len(),
            n_bins
        )));
    }

    if frames.is_empty() {
        return Ok(vec![0.0; length]);
    }

    let window = hann_window(frame_size);
    let total = frame_size + hop_size * (frames.len() - 1);
    let mut output = vec![0.0f32; total];
    let mut window_sum = vec![0.0f32; total];

    let mut planner = FftPlanner::new();
    let ifft = planner.plan_fft_inverse(frame_size);
    let mut buffer = vec![Complex::new(0.0f32, 0.0); frame_size];
    let scale = 1.0 / frame_size as f32;

    for (t, frame) in frames.iter().enumerate() {
        // Rebuild the full Hermitian spectrum
        buffer[..n_bins].copy_from_slice(frame);
        for k in 1..frame_size / 2 {
            buffer[frame_size - k] = frame[k].conj();
        }
        ifft.process(&mut buffer);

        let start = t * hop_size;
        for i in 0..frame_size {
            output[start + i] += buffer[i].re * scale * window[i];
            window_sum[start + i] += window[i] * window[i];
        }
    }

    for (y, &w) in output.iter_mut().zip(window_sum.iter()) {
        if w > WINDOW_SUM_FLOOR {
            *y /= w;
        }
    }

    let offset = frame_size / 2;
    let mut signal: Vec<f32> = output.into_iter().skip(offset).take(length).collect();
    signal.resize(length, 0.0);
    Ok(signal)
}

/// Magnitude of every bin
pub fn magnitude(frames: &[Vec<Complex<f32>>]) -> Vec<Vec<f32>> {
    frames
        .iter()
        .map(|f| f.iter().map(|c| c.norm()).collect())
        .collect()
}

/// Squared magnitude of every bin
pub fn power(frames: &[Vec<Complex<f32>>]) -> Vec<Vec<f32>> {
    frames
        .iter()
        .map(|f| f.iter().map(|c| c.norm_sqr()).collect())
        .collect()
}
