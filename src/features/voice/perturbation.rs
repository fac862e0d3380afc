//! Cycle-to-cycle perturbation: jitter (period) and shimmer (amplitude)
//!
//! Jitter is measured on the voiced pitch track, shimmer on frame RMS
//! energies. The derived sub-measures (RAP, PPQ, APQ3, ...) are fixed
//! fractions of the base measure, matching how the classifier was calibrated.

/// Fraction of relative jitter reported as RAP
pub const RAP_RATIO: f64 = 0.45;
/// Fraction of relative jitter reported as PPQ
pub const PPQ_RATIO: f64 = 0.52;
/// Fraction of shimmer reported as APQ3
pub const APQ3_RATIO: f64 = 0.50;
/// Fraction of shimmer reported as APQ5
pub const APQ5_RATIO: f64 = 0.63;
/// Fraction of shimmer reported as APQ
pub const APQ_RATIO: f64 = 0.82;

const FALLBACK_JITTER: f64 = 0.005;
const FALLBACK_JITTER_ABS: f64 = 0.00005;
const FALLBACK_SHIMMER: f64 = 0.025;

/// Percentile with linear interpolation between order statistics
///
/// # Arguments
///
/// * `values` - Samples (need not be sorted)
/// * `q` - Percentile in `[0, 100]`
///
/// # Returns
///
/// The interpolated percentile, or `None` for empty input
pub fn percentile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let pos = (q.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Arithmetic mean, `None` for empty input
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn mean_abs_diff(values: &[f64]) -> f64 {
    let diffs: Vec<f64> = values.windows(2).map(|w| (w[1] - w[0]).abs()).collect();
    mean(&diffs).unwrap_or(0.0)
}

/// Period perturbation measures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jitter {
    /// Mean absolute period difference over mean period
    pub relative: f64,
    /// Mean absolute period difference in seconds
    pub absolute: f64,
    /// Relative average perturbation
    pub rap: f64,
    /// Five-point period perturbation quotient
    pub ppq: f64,
    /// Difference of differences of periods
    pub ddp: f64,
}

impl Jitter {
    /// Measure jitter from voiced fundamental frequencies
    ///
    /// With fewer than two frequencies the calibrated fallbacks are used.
    pub fn from_frequencies(f0: &[f64]) -> Self {
        let periods: Vec<f64> = f0.iter().map(|&f| 1.0 / f).collect();

        let (relative, absolute) = match mean(&periods) {
            Some(mean_period) if periods.len() > 1 => {
                let absolute = mean_abs_diff(&periods);
                (absolute / mean_period, absolute)
            }
            _ => (FALLBACK_JITTER, FALLBACK_JITTER_ABS),
        };

        let rap = relative * RAP_RATIO;
        Self {
            relative,
            absolute,
            rap,
            ppq: relative * PPQ_RATIO,
            ddp: rap * 3.0,
        }
    }
}

/// Root-mean-square energy per centered frame
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `frame_length` - Frame length in samples
/// * `hop_length` - Hop between frames
///
/// # Returns
///
/// `1 + len / hop_length` RMS values; frames extend past the signal with zeros
pub fn frame_rms(samples: &[f32], frame_length: usize, hop_length: usize) -> Vec<f64> {
    if frame_length == 0 || hop_length == 0 {
        return Vec::new();
    }

    let pad = frame_length / 2;
    let n_frames = 1 + samples.len() / hop_length;

    (0..n_frames)
        .map(|t| {
            // Frame covers padded[t*hop .. t*hop + frame_length]
            let start = (t * hop_length) as isize - pad as isize;
            let energy: f64 = (0..frame_length as isize)
                .map(|i| start + i)
                .filter(|&i| i >= 0 && (i as usize) < samples.len())
                .map(|i| {
                    let x = samples[i as usize] as f64;
                    x * x
                })
                .sum();
            (energy / frame_length as f64).sqrt()
        })
        .collect()
}

/// Amplitude perturbation measures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shimmer {
    /// Mean absolute RMS difference over mean RMS
    pub local: f64,
    /// `20 * log10(1 + local)`
    pub db: f64,
    /// Three-point amplitude perturbation quotient
    pub apq3: f64,
    /// Five-point amplitude perturbation quotient
    pub apq5: f64,
    /// Eleven-point amplitude perturbation quotient
    pub apq: f64,
    /// Difference of differences of amplitudes
    pub dda: f64,
}

impl Shimmer {
    /// Measure shimmer from frame RMS values
    ///
    /// Frames at or below `silence` are dropped first. With fewer than two
    /// frames left the calibrated fallback is used.
    pub fn from_rms(rms: &[f64], silence: f64) -> Self {
        let active: Vec<f64> = rms.iter().copied().filter(|&r| r > silence).collect();

        let local = match mean(&active) {
            Some(m) if active.len() > 1 => mean_abs_diff(&active) / m,
            _ => FALLBACK_SHIMMER,
        };

        let apq3 = local * APQ3_RATIO;
        Self {
            local,
            db: 20.0 * (1.0 + local).log10(),
            apq3,
            apq5: local * APQ5_RATIO,
            apq: local * APQ_RATIO,
            dda: apq3 * 3.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        let values = [4.0, 1.0, 3.0, 2.0, 5.0];
        assert_eq!(percentile(&values, 0.0), Some(1.0));
        assert_eq!(percentile(&values, 50.0), Some(3.0));
        assert_eq!(percentile(&values, 100.0), Some(5.0));
        // pos = 0.97 * 4 = 3.88
        assert!((percentile(&values, 97.0).unwrap() - 4.88).abs() < 1e-12);
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn test_constant_pitch_has_no_jitter() {
        let jitter = Jitter::from_frequencies(&[200.0; 20]);
        assert_eq!(jitter.relative, 0.0);
        assert_eq!(jitter.absolute, 0.0);
        assert_eq!(jitter.ddp, 0.0);
    }

    #[test]
    fn test_alternating_pitch_jitter() {
        let jitter = Jitter::from_frequencies(&[100.0, 125.0, 100.0, 125.0]);
        // periods 0.01, 0.008 -> |diff| = 0.002, mean period 0.009
        assert!((jitter.absolute - 0.002).abs() < 1e-12);
        assert!((jitter.relative - 0.002 / 0.009).abs() < 1e-12);
        assert!((jitter.rap - jitter.relative * 0.45).abs() < 1e-15);
        assert!((jitter.ddp - jitter.rap * 3.0).abs() < 1e-15);
    }

    #[test]
    fn test_jitter_fallback() {
        let jitter = Jitter::from_frequencies(&[150.0]);
        assert_eq!(jitter.relative, 0.005);
        assert_eq!(jitter.absolute, 0.00005);
    }

    #[test]
    fn test_frame_rms_of_constant() {
        let samples = vec![0.5f32; 4096];
        let rms = frame_rms(&samples, 1024, 256);
        assert_eq!(rms.len(), 1 + 4096 / 256);
        // Interior frames are fully inside the signal
        assert!((rms[8] - 0.5).abs() < 1e-6);
        // First frame is half padding
        assert!((rms[0] - (0.125f64).sqrt()).abs() < 1e-6);
    }

    #[test]
    fn test_shimmer_drops_silent_frames() {
        let rms = [0.0, 1.0, 0.5, 1.0, 0.5, 0.0];
        let shimmer = Shimmer::from_rms(&rms, 1e-6);
        // |diffs| = 0.5 each, mean rms 0.75
        assert!((shimmer.local - 0.5 / 0.75).abs() < 1e-12);
        assert!((shimmer.db - 20.0 * (1.0 + shimmer.local).log10()).abs() < 1e-12);
        assert!((shimmer.dda - shimmer.apq3 * 3.0).abs() < 1e-15);
    }

    #[test]
    fn test_shimmer_fallback_on_silence() {
        let shimmer = Shimmer::from_rms(&[0.0; 10], 1e-6);
        assert_eq!(shimmer.local, 0.025);
    }
}
