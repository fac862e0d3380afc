//! Probabilistic YIN (pYIN) fundamental frequency tracking
//!
//! Estimates one pitch per frame plus a voiced/unvoiced decision, using a
//! hidden Markov model over quantized pitch bins.
//!
//! # Algorithm
//!
//! 1. Frame the signal (centered, zero padded)
//! 2. Per frame, compute the cumulative mean normalized difference function (CMNDF)
//!    over lags `[sr / fmax, sr / fmin]`
//! 3. Find troughs; weight each by a Boltzmann prior over its rank and a Beta
//!    prior over YIN thresholds
//! 4. Map trough periods (refined by parabolic interpolation) to 0.1-semitone bins
//! 5. Viterbi decode over `2 * n_bins` states (voiced bins, then unvoiced copies)
//!    with a triangular local pitch transition and a voiced/unvoiced switch
//!
//! # Reference
//!
//! Mauch, M., & Dixon, S. (2014). pYIN: A Fundamental Frequency Estimator Using
//! Probabilistic Threshold Distributions. *Proceedings of ICASSP 2014*.

use crate::config::{PyinConfig, VoiceConfig};
use crate::error::ScreeningError;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use statrs::distribution::{Beta, ContinuousCDF};
use std::sync::Arc;

/// Autocorrelation and energy values below this are treated as zero
const SMALL: f64 = 1e-6;

/// Smallest positive single-precision value; keeps divisions and logs finite
const TINY: f64 = f32::MIN_POSITIVE as f64;

/// Per-frame pitch estimates
#[derive(Debug, Clone, PartialEq)]
pub struct PitchTrack {
    /// Fundamental frequency in Hz for voiced frames, `None` for unvoiced
    pub f0: Vec<Option<f64>>,

    /// Probability that each frame is voiced (0.0-1.0)
    pub voiced_prob: Vec<f64>,
}

impl PitchTrack {
    /// Number of analysed frames
    pub fn len(&self) -> usize {
        self.f0.len()
    }

    /// True when no frames were analysed
    pub fn is_empty(&self) -> bool {
        self.f0.is_empty()
    }

    /// Frequencies of voiced frames, in frame order
    pub fn voiced_frequencies(&self) -> Vec<f64> {
        self.f0.iter().filter_map(|f| *f).collect()
    }

    /// Number of voiced frames
    pub fn voiced_count(&self) -> usize {
        self.f0.iter().filter(|f| f.is_some()).count()
    }
}

/// Evenly spaced YIN thresholds on `[0, 1]` and the Beta mass between them
///
/// # Returns
///
/// Tuple of (`n + 1` thresholds, `n` probabilities)
///
/// # Errors
///
/// Returns `InvalidInput` for zero thresholds or shape parameters that do not
/// define a Beta distribution
pub fn threshold_distribution(
    n: usize,
    a: f64,
    b: f64,
) -> Result<(Vec<f64>, Vec<f64>), ScreeningError> {
    if n == 0 {
        return Err(ScreeningError::InvalidInput(
            "Need at least one YIN threshold".to_string(),
        ));
    }
    let prior = Beta::new(a, b).map_err(|e| {
        ScreeningError::InvalidInput(format!("Invalid Beta({}, {}) threshold prior: {}", a, b, e))
    })?;
    let thresholds: Vec<f64> = (0..=n).map(|i| i as f64 / n as f64).collect();
    let cdf: Vec<f64> = thresholds.iter().map(|&t| prior.cdf(t)).collect();
    let probs = cdf.windows(2).map(|w| w[1] - w[0]).collect();
    Ok((thresholds, probs))
}

/// Cumulative mean normalized difference for lags `min_period..=max_period`
///
/// The autocorrelation term `sum_{i=1}^{W} x[i] x[i+tau]` is computed by FFT
/// cross-correlation.
fn cumulative_mean_normalized_difference(
    frame: &[f64],
    win_length: usize,
    min_period: usize,
    max_period: usize,
    fft: &dyn Fft<f64>,
    ifft: &dyn Fft<f64>,
) -> Vec<f64> {
    let n = frame.len();

    let mut spectrum: Vec<Complex<f64>> = frame.iter().map(|&x| Complex::new(x, 0.0)).collect();
    let mut reversed = vec![Complex::new(0.0, 0.0); n];
    for (j, slot) in reversed.iter_mut().take(win_length).enumerate() {
        *slot = Complex::new(frame[win_length - j], 0.0);
    }
    fft.process(&mut spectrum);
    fft.process(&mut reversed);
    for (x, y) in spectrum.iter_mut().zip(reversed.iter()) {
        *x *= *y;
    }
    ifft.process(&mut spectrum);

    let scale = 1.0 / n as f64;
    let acf = |tau: usize| {
        let v = spectrum[win_length + tau].re * scale;
        if v.abs() < SMALL {
            0.0
        } else {
            v
        }
    };

    let mut prefix = Vec::with_capacity(n);
    let mut running = 0.0;
    for &x in frame {
        running += x * x;
        prefix.push(running);
    }
    let energy = |tau: usize| {
        let e = prefix[win_length + tau] - prefix[tau];
        if e.abs() < SMALL {
            0.0
        } else {
            e
        }
    };

    let e0 = energy(0);
    let diff: Vec<f64> = (0..=max_period)
        .map(|tau| e0 + energy(tau) - 2.0 * acf(tau))
        .collect();

    let mut cmnd = Vec::with_capacity(max_period + 1 - min_period);
    let mut cumulative = 0.0;
    for (tau, &d) in diff.iter().enumerate().skip(1) {
        cumulative += d;
        if tau >= min_period {
            let mean = cumulative / tau as f64;
            cmnd.push(d / (mean + TINY));
        }
    }
    cmnd
}

/// Sub-sample offset of each local extremum by parabolic interpolation
///
/// Edges and points where the parabola is too flat get 0.
pub fn parabolic_shifts(x: &[f64]) -> Vec<f64> {
    let mut shifts = vec![0.0; x.len()];
    for i in 1..x.len().saturating_sub(1) {
        let a = x[i + 1] + x[i - 1] - 2.0 * x[i];
        let b = (x[i + 1] - x[i - 1]) / 2.0;
        if b.abs() < a.abs() {
            shifts[i] = -b / a;
        }
    }
    shifts
}

fn is_trough(x: &[f64], i: usize) -> bool {
    let last = x.len() - 1;
    if i == 0 {
        x[0] < x[1]
    } else if i == last {
        x[i] < x[i - 1]
    } else {
        x[i] < x[i - 1] && x[i] <= x[i + 1]
    }
}

/// Probability mass assigned to each lag of one CMNDF frame
fn trough_probabilities(
    yin: &[f64],
    thresholds: &[f64],
    beta_probs: &[f64],
    boltzmann: f64,
    no_trough_prob: f64,
) -> Vec<f64> {
    let mut probs = vec![0.0; yin.len()];
    if yin.len() < 2 {
        return probs;
    }

    let troughs: Vec<usize> = (0..yin.len()).filter(|&i| is_trough(yin, i)).collect();
    let Some(&global_min) = troughs
        .iter()
        .min_by(|&&a, &&b| yin[a].total_cmp(&yin[b]).then(a.cmp(&b)))
    else {
        return probs;
    };

    let decay = (-boltzmann).exp();
    for (k, &threshold) in thresholds[1..].iter().enumerate() {
        let below: Vec<usize> = troughs
            .iter()
            .copied()
            .filter(|&i| yin[i] < threshold)
            .collect();
        if below.is_empty() {
            continue;
        }
        let norm = (1.0 - decay) / (1.0 - decay.powi(below.len() as i32));
        for (rank, &i) in below.iter().enumerate() {
            probs[i] += norm * decay.powi(rank as i32) * beta_probs[k];
        }
    }

    let not_below = thresholds[1..]
        .iter()
        .filter(|&&t| yin[global_min] >= t)
        .count();
    let missed: f64 = beta_probs[..not_below].iter().sum();
    probs[global_min] += no_trough_prob * missed;

    probs
}

/// Log transition weights for the voiced/unvoiced pitch HMM
///
/// States `0..n_bins` are voiced pitch bins; `n_bins..2 * n_bins` are their
/// unvoiced copies. Pitch moves within a triangular window of `half_width`
/// bins; any other transition gets `ln(TINY)`.
struct TransitionModel {
    n_bins: usize,
    half_width: usize,
    /// `ln(p_stay * T[i][j])`, indexed `[i * (2h + 1) + (j - i + h)]`
    log_stay: Vec<f64>,
    /// `ln(p_switch * T[i][j])`, same layout
    log_switch: Vec<f64>,
}

impl TransitionModel {
    fn new(n_bins: usize, width: usize, switch_prob: f64) -> Self {
        let half_width = width / 2;
        let span = 2 * half_width + 1;
        let denom = (width as f64 + 1.0) / 2.0;
        let triangle = |d: usize| 1.0 - d as f64 / denom;

        let mut log_stay = vec![TINY.ln(); n_bins * span];
        let mut log_switch = vec![TINY.ln(); n_bins * span];
        for i in 0..n_bins {
            let lo = i.saturating_sub(half_width);
            let hi = (i + half_width).min(n_bins - 1);
            let row_sum: f64 = (lo..=hi).map(|j| triangle(i.abs_diff(j))).sum();
            for j in lo..=hi {
                let t = triangle(i.abs_diff(j)) / row_sum;
                let slot = i * span + (j + half_width - i);
                log_stay[slot] = ((1.0 - switch_prob) * t + TINY).ln();
                log_switch[slot] = (switch_prob * t + TINY).ln();
            }
        }

        Self {
            n_bins,
            half_width,
            log_stay,
            log_switch,
        }
    }

    fn n_states(&self) -> usize {
        2 * self.n_bins
    }

    /// Most likely state sequence
    fn viterbi(&self, observations: &[Vec<f64>], p_init: &[f64]) -> Vec<usize> {
        let n_states = self.n_states();
        let span = 2 * self.half_width + 1;
        let far = TINY.ln();
        let log = |p: f64| (p + TINY).ln();

        let Some(first) = observations.first() else {
            return Vec::new();
        };
        let mut value: Vec<f64> = (0..n_states).map(|s| log(first[s]) + log(p_init[s])).collect();
        let mut backpointers: Vec<Vec<u32>> = Vec::with_capacity(observations.len());
        backpointers.push(vec![0; n_states]);

        for obs in &observations[1..] {
            let (best_idx, best_val) = argmax(&value);
            let mut next = vec![0.0; n_states];
            let mut ptr = vec![0u32; n_states];

            for j in 0..n_states {
                let (bj, half_j) = (j % self.n_bins, j / self.n_bins);
                let mut best = best_val + far;
                let mut arg = best_idx;
                let lo = bj.saturating_sub(self.half_width);
                let hi = (bj + self.half_width).min(self.n_bins - 1);
                for half_i in 0..2 {
                    let table = if half_i == half_j {
                        &self.log_stay
                    } else {
                        &self.log_switch
                    };
                    for bi in lo..=hi {
                        let i = half_i * self.n_bins + bi;
                        let cand = value[i] + table[bi * span + (bj + self.half_width - bi)];
                        if cand > best {
                            best = cand;
                            arg = i;
                        }
                    }
                }
                next[j] = best + log(obs[j]);
                ptr[j] = arg as u32;
            }

            value = next;
            backpointers.push(ptr);
        }

        let mut states = vec![0usize; observations.len()];
        let (mut state, _) = argmax(&value);
        for t in (0..observations.len()).rev() {
            states[t] = state;
            state = backpointers[t][state] as usize;
        }
        states
    }
}

fn argmax(values: &[f64]) -> (usize, f64) {
    let mut best = (0, f64::NEG_INFINITY);
    for (i, &v) in values.iter().enumerate() {
        if v > best.1 {
            best = (i, v);
        }
    }
    best
}

/// pYIN pitch tracker
#[derive(Debug, Clone)]
pub struct PitchTracker {
    /// pYIN parameters
    pub pyin: PyinConfig,

    /// Lowest pitch in Hz
    pub fmin: f64,

    /// Highest pitch in Hz
    pub fmax: f64,

    /// Frame length in samples
    pub frame_length: usize,

    /// Hop length in samples
    pub hop_length: usize,
}

impl PitchTracker {
    /// Create a tracker from voice analysis settings
    pub fn new(config: &VoiceConfig) -> Self {
        Self {
            pyin: config.pyin.clone(),
            fmin: config.fmin,
            fmax: config.fmax,
            frame_length: config.frame_size,
            hop_length: config.hop_size,
        }
    }

    /// Track pitch over a mono signal
    ///
    /// # Arguments
    ///
    /// * `samples` - Mono audio samples
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Returns
    ///
    /// One estimate per centered frame (`1 + len / hop_length` frames)
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the pitch range, frame geometry or threshold
    /// prior is unusable at this sample rate
    pub fn track(&self, samples: &[f32], sample_rate: u32) -> Result<PitchTrack, ScreeningError> {
        if sample_rate == 0 || self.hop_length == 0 {
            return Err(ScreeningError::InvalidInput(format!(
                "Invalid pYIN parameters: sample_rate={}, hop={}",
                sample_rate, self.hop_length
            )));
        }
        let (a, b) = self.pyin.beta_parameters;
        let (thresholds, beta_probs) = threshold_distribution(self.pyin.n_thresholds, a, b)?;
        if !(self.fmin > 0.0 && self.fmin < self.fmax) {
            return Err(ScreeningError::InvalidInput(format!(
                "Invalid pitch range: fmin={}, fmax={}",
                self.fmin, self.fmax
            )));
        }

        let sr = sample_rate as f64;
        let frame_length = self.frame_length;
        let win_length = frame_length / 2;
        let min_period = ((sr / self.fmax).floor() as usize).max(1);
        let max_period = ((sr / self.fmin).ceil() as usize)
            .min(frame_length.saturating_sub(win_length + 1));
        if max_period < min_period + 2 {
            return Err(ScreeningError::InvalidInput(format!(
                "Frame length {} too short for fmin {} Hz at {} Hz",
                frame_length, self.fmin, sample_rate
            )));
        }

        let bins_per_semitone = (1.0 / self.pyin.resolution).ceil();
        let n_bins = (12.0 * bins_per_semitone * (self.fmax / self.fmin).log2()).floor() as usize + 1;

        log::debug!(
            "pYIN: {} samples @ {} Hz, periods {}..={}, {} pitch bins",
            samples.len(),
            sample_rate,
            min_period,
            max_period,
            n_bins
        );

        let pad = frame_length / 2;
        let mut padded = vec![0.0f64; samples.len() + 2 * pad];
        for (dst, &src) in padded[pad..].iter_mut().zip(samples) {
            *dst = src as f64;
        }
        if padded.len() < frame_length {
            return Err(ScreeningError::InvalidInput(format!(
                "Signal of {} samples is shorter than one frame",
                samples.len()
            )));
        }
        let n_frames = 1 + (padded.len() - frame_length) / self.hop_length;

        let mut planner = FftPlanner::<f64>::new();
        let fft: Arc<dyn Fft<f64>> = planner.plan_fft_forward(frame_length);
        let ifft: Arc<dyn Fft<f64>> = planner.plan_fft_inverse(frame_length);

        let mut observations = Vec::with_capacity(n_frames);
        let mut voiced_prob = Vec::with_capacity(n_frames);
        for t in 0..n_frames {
            let start = t * self.hop_length;
            let frame = &padded[start..start + frame_length];
            let yin = cumulative_mean_normalized_difference(
                frame,
                win_length,
                min_period,
                max_period,
                fft.as_ref(),
                ifft.as_ref(),
            );
            let shifts = parabolic_shifts(&yin);
            let probs = trough_probabilities(
                &yin,
                &thresholds,
                &beta_probs,
                self.pyin.boltzmann_parameter,
                self.pyin.no_trough_prob,
            );

            let mut obs = vec![0.0; 2 * n_bins];
            for (lag, &p) in probs.iter().enumerate() {
                if p <= 0.0 {
                    continue;
                }
                let period = (min_period + lag) as f64 + shifts[lag];
                let f0 = sr / period;
                let bin = (12.0 * bins_per_semitone * (f0 / self.fmin).log2())
                    .round()
                    .clamp(0.0, (n_bins - 1) as f64) as usize;
                obs[bin] += p;
            }
            let vp = obs[..n_bins].iter().sum::<f64>().clamp(0.0, 1.0);
            let unvoiced = (1.0 - vp) / n_bins as f64;
            for slot in obs[n_bins..].iter_mut() {
                *slot = unvoiced;
            }

            observations.push(obs);
            voiced_prob.push(vp);
        }

        let max_semitones =
            (self.pyin.max_transition_rate * 12.0 * self.hop_length as f64 / sr).round() as usize;
        let width = max_semitones * bins_per_semitone as usize + 1;
        let model = TransitionModel::new(n_bins, width, self.pyin.switch_prob);

        let mut p_init = vec![0.0; 2 * n_bins];
        for slot in p_init[n_bins..].iter_mut() {
            *slot = 1.0 / n_bins as f64;
        }
        let states = model.viterbi(&observations, &p_init);

        let f0 = states
            .iter()
            .map(|&s| {
                (s < n_bins).then(|| self.fmin * 2f64.powf(s as f64 / (12.0 * bins_per_semitone)))
            })
            .collect::<Vec<_>>();

        let track = PitchTrack { f0, voiced_prob };
        log::debug!(
            "pYIN: {} of {} frames voiced",
            track.voiced_count(),
            track.len()
        );
        Ok(track)
    }
}
