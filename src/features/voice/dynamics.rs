//! Proxies for the nonlinear dynamical measures
//!
//! RPDE, DFA, spread1, spread2, D2 and PPE are approximated from cheap
//! statistics the classifier was calibrated against:
//!
//! - RPDE: `1 - |r(1)|`, the lag-1 normalized autocorrelation
//! - DFA: `0.5 + 0.5 * flux`, mean frame-to-frame change of the mel power spectrogram
//! - spread1/spread2/D2/PPE: scaled statistics of MFCC rows 1, 2, 3 and 0
//!
//! Every proxy is clipped to its biomarker range.

/// Denominator floor for the autocorrelation normalization
const AUTOCORR_EPSILON: f64 = 1e-10;

/// Lag-1 autocorrelation normalized by lag-0 energy
pub fn lag1_autocorrelation(samples: &[f32]) -> f64 {
    let r0: f64 = samples.iter().map(|&x| (x as f64) * (x as f64)).sum();
    let r1: f64 = samples
        .windows(2)
        .map(|w| w[0] as f64 * w[1] as f64)
        .sum();
    r1 / (r0 + AUTOCORR_EPSILON)
}

/// Recurrence period density entropy proxy, in `[0.3, 0.9]`
pub fn rpde(samples: &[f32]) -> f64 {
    (1.0 - lag1_autocorrelation(samples).abs()).clamp(0.3, 0.9)
}

/// Detrended fluctuation analysis proxy, in `[0.5, 1.0]`
pub fn dfa(spectral_flux: f64) -> f64 {
    (0.5 + 0.5 * spectral_flux).clamp(0.5, 1.0)
}

fn mean(row: &[f32]) -> f64 {
    if row.is_empty() {
        return 0.0;
    }
    row.iter().map(|&x| x as f64).sum::<f64>() / row.len() as f64
}

/// Population standard deviation
fn std_dev(row: &[f32]) -> f64 {
    if row.is_empty() {
        return 0.0;
    }
    let m = mean(row);
    let var = row.iter().map(|&x| (x as f64 - m).powi(2)).sum::<f64>() / row.len() as f64;
    var.sqrt()
}

/// MFCC-derived proxies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CepstralProxies {
    /// `0.1 * mean(c1)`, in `[-8, -1]`
    pub spread1: f64,
    /// `0.02 * std(c2)`, in `[0, 0.5]`
    pub spread2: f64,
    /// `1.5 + 0.5 * std(c3)`, in `[1, 4]`
    pub d2: f64,
    /// `0.01 * std(c0)`, in `[0, 0.7]`
    pub ppe: f64,
}

impl CepstralProxies {
    /// Compute from coefficient-major MFCCs (at least four rows)
    ///
    /// Missing rows are treated as empty.
    pub fn from_mfcc(mfcc: &[Vec<f32>]) -> Self {
        let row = |i: usize| mfcc.get(i).map(Vec::as_slice).unwrap_or(&[]);
        Self {
            spread1: (0.1 * mean(row(1))).clamp(-8.0, -1.0),
            spread2: (0.02 * std_dev(row(2))).clamp(0.0, 0.5),
            d2: (0.5 * std_dev(row(3)) + 1.5).clamp(1.0, 4.0),
            ppe: (0.01 * std_dev(row(0))).clamp(0.0, 0.7),
        }
    }
}
