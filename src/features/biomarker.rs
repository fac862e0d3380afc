//! The 22 canonical vocal biomarkers
//!
//! Every modality converges on this closed set. Each biomarker carries its
//! canonical dataset name, the field name used by structured input, a
//! documented valid interval and a short description.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of biomarkers in a [`FeatureVector`](super::vector::FeatureVector)
pub const FEATURE_COUNT: usize = 22;

/// Closed interval of valid values for a biomarker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    /// Lower bound (inclusive)
    pub min: f64,
    /// Upper bound (inclusive)
    pub max: f64,
}

impl FeatureRange {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// True when `value` lies in `[min, max]`
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Clip `value` into the interval
    ///
    /// NaN is mapped to the lower bound so that a degenerate estimator can
    /// never leak a non-finite value into the classifier.
    pub fn clip(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.min
        } else {
            value.clamp(self.min, self.max)
        }
    }
}

/// Vocal biomarker identifiers, in canonical dataset order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Biomarker {
    /// Average vocal fundamental frequency (Hz)
    Fo,
    /// Maximum vocal fundamental frequency (Hz)
    Fhi,
    /// Minimum vocal fundamental frequency (Hz)
    Flo,
    /// Relative period perturbation (%)
    JitterPercent,
    /// Absolute period perturbation (s)
    JitterAbs,
    /// Relative average perturbation
    Rap,
    /// Five-point period perturbation quotient
    Ppq,
    /// Average absolute difference of differences of periods
    Ddp,
    /// Local amplitude perturbation
    Shimmer,
    /// Local amplitude perturbation (dB)
    ShimmerDb,
    /// Three-point amplitude perturbation quotient
    Apq3,
    /// Five-point amplitude perturbation quotient
    Apq5,
    /// Eleven-point amplitude perturbation quotient
    Apq,
    /// Average absolute differences of amplitude
    Dda,
    /// Noise-to-harmonics ratio
    Nhr,
    /// Harmonics-to-noise ratio (dB)
    Hnr,
    /// Recurrence period density entropy
    Rpde,
    /// Detrended fluctuation analysis exponent
    Dfa,
    /// Nonlinear fundamental frequency variation (1)
    Spread1,
    /// Nonlinear fundamental frequency variation (2)
    Spread2,
    /// Correlation dimension
    D2,
    /// Pitch period entropy
    Ppe,
}

impl Biomarker {
    /// All biomarkers in canonical order
    pub const ALL: [Biomarker; FEATURE_COUNT] = [
        Biomarker::Fo,
        Biomarker::Fhi,
        Biomarker::Flo,
        Biomarker::JitterPercent,
        Biomarker::JitterAbs,
        Biomarker::Rap,
        Biomarker::Ppq,
        Biomarker::Ddp,
        Biomarker::Shimmer,
        Biomarker::ShimmerDb,
        Biomarker::Apq3,
        Biomarker::Apq5,
        Biomarker::Apq,
        Biomarker::Dda,
        Biomarker::Nhr,
        Biomarker::Hnr,
        Biomarker::Rpde,
        Biomarker::Dfa,
        Biomarker::Spread1,
        Biomarker::Spread2,
        Biomarker::D2,
        Biomarker::Ppe,
    ];

    /// Position in canonical order
    pub fn index(self) -> usize {
        self as usize
    }

    /// Canonical dataset name (e.g. `MDVP:Fo(Hz)`)
    pub fn name(self) -> &'static str {
        match self {
            Biomarker::Fo => "MDVP:Fo(Hz)",
            Biomarker::Fhi => "MDVP:Fhi(Hz)",
            Biomarker::Flo => "MDVP:Flo(Hz)",
            Biomarker::JitterPercent => "MDVP:Jitter(%)",
            Biomarker::JitterAbs => "MDVP:Jitter(Abs)",
            Biomarker::Rap => "MDVP:RAP",
            Biomarker::Ppq => "MDVP:PPQ",
            Biomarker::Ddp => "Jitter:DDP",
            Biomarker::Shimmer => "MDVP:Shimmer",
            Biomarker::ShimmerDb => "MDVP:Shimmer(dB)",
            Biomarker::Apq3 => "Shimmer:APQ3",
            Biomarker::Apq5 => "Shimmer:APQ5",
            Biomarker::Apq => "MDVP:APQ",
            Biomarker::Dda => "Shimmer:DDA",
            Biomarker::Nhr => "NHR",
            Biomarker::Hnr => "HNR",
            Biomarker::Rpde => "RPDE",
            Biomarker::Dfa => "DFA",
            Biomarker::Spread1 => "spread1",
            Biomarker::Spread2 => "spread2",
            Biomarker::D2 => "D2",
            Biomarker::Ppe => "PPE",
        }
    }

    /// Field name used by structured input
    pub fn field_name(self) -> &'static str {
        match self {
            Biomarker::Fo => "mdvp_fo",
            Biomarker::Fhi => "mdvp_fhi",
            Biomarker::Flo => "mdvp_flo",
            Biomarker::JitterPercent => "mdvp_jitter_pct",
            Biomarker::JitterAbs => "mdvp_jitter_abs",
            Biomarker::Rap => "mdvp_rap",
            Biomarker::Ppq => "mdvp_ppq",
            Biomarker::Ddp => "jitter_ddp",
            Biomarker::Shimmer => "mdvp_shimmer",
            Biomarker::ShimmerDb => "mdvp_shimmer_db",
            Biomarker::Apq3 => "shimmer_apq3",
            Biomarker::Apq5 => "shimmer_apq5",
            Biomarker::Apq => "mdvp_apq",
            Biomarker::Dda => "shimmer_dda",
            Biomarker::Nhr => "nhr",
            Biomarker::Hnr => "hnr",
            Biomarker::Rpde => "rpde",
            Biomarker::Dfa => "dfa",
            Biomarker::Spread1 => "spread1",
            Biomarker::Spread2 => "spread2",
            Biomarker::D2 => "d2",
            Biomarker::Ppe => "ppe",
        }
    }

    /// Documented valid interval
    pub fn range(self) -> FeatureRange {
        match self {
            Biomarker::Fo => FeatureRange::new(80.0, 270.0),
            Biomarker::Fhi => FeatureRange::new(100.0, 600.0),
            Biomarker::Flo => FeatureRange::new(60.0, 240.0),
            Biomarker::JitterPercent => FeatureRange::new(0.0, 0.1),
            Biomarker::JitterAbs => FeatureRange::new(0.0, 0.001),
            Biomarker::Rap => FeatureRange::new(0.0, 0.06),
            Biomarker::Ppq => FeatureRange::new(0.0, 0.06),
            Biomarker::Ddp => FeatureRange::new(0.0, 0.18),
            Biomarker::Shimmer => FeatureRange::new(0.0, 0.2),
            Biomarker::ShimmerDb => FeatureRange::new(0.0, 2.0),
            Biomarker::Apq3 => FeatureRange::new(0.0, 0.1),
            Biomarker::Apq5 => FeatureRange::new(0.0, 0.15),
            Biomarker::Apq => FeatureRange::new(0.0, 0.15),
            Biomarker::Dda => FeatureRange::new(0.0, 0.3),
            Biomarker::Nhr => FeatureRange::new(0.0, 0.5),
            Biomarker::Hnr => FeatureRange::new(0.0, 35.0),
            Biomarker::Rpde => FeatureRange::new(0.0, 1.0),
            Biomarker::Dfa => FeatureRange::new(0.5, 1.0),
            Biomarker::Spread1 => FeatureRange::new(-8.0, -1.0),
            Biomarker::Spread2 => FeatureRange::new(0.0, 0.5),
            Biomarker::D2 => FeatureRange::new(1.0, 4.0),
            Biomarker::Ppe => FeatureRange::new(0.0, 0.7),
        }
    }

    /// Built-in description, used when the artifact metadata has none
    pub fn description(self) -> &'static str {
        match self {
            Biomarker::Fo => "Average vocal fundamental frequency",
            Biomarker::Fhi => "Maximum vocal fundamental frequency",
            Biomarker::Flo => "Minimum vocal fundamental frequency",
            Biomarker::JitterPercent => "Variation in fundamental frequency (%)",
            Biomarker::JitterAbs => "Absolute variation in fundamental frequency",
            Biomarker::Rap => "Relative average perturbation",
            Biomarker::Ppq => "5-point period perturbation quotient",
            Biomarker::Ddp => "Average absolute difference of consecutive differences (period)",
            Biomarker::Shimmer => "Variation in amplitude",
            Biomarker::ShimmerDb => "Variation in amplitude (dB)",
            Biomarker::Apq3 => "3-point amplitude perturbation quotient",
            Biomarker::Apq5 => "5-point amplitude perturbation quotient",
            Biomarker::Apq => "11-point amplitude perturbation quotient",
            Biomarker::Dda => "Average absolute differences (amplitude)",
            Biomarker::Nhr => "Noise-to-harmonic ratio",
            Biomarker::Hnr => "Harmonic-to-noise ratio",
            Biomarker::Rpde => "Recurrence period density entropy",
            Biomarker::Dfa => "Detrended fluctuation analysis",
            Biomarker::Spread1 => "Nonlinear measure of fundamental frequency variation",
            Biomarker::Spread2 => "Nonlinear measure of fundamental frequency variation",
            Biomarker::D2 => "Correlation dimension",
            Biomarker::Ppe => "Pitch period entropy",
        }
    }

    /// Look up a biomarker by canonical name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.name() == name)
    }
}

impl fmt::Display for Biomarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order_matches_index() {
        for (i, b) in Biomarker::ALL.iter().enumerate() {
            assert_eq!(b.index(), i, "{} out of order", b);
        }
    }

    #[test]
    fn test_name_roundtrip() {
        for b in Biomarker::ALL {
            assert_eq!(Biomarker::from_name(b.name()), Some(b));
        }
        assert_eq!(Biomarker::from_name("MDVP:Fo"), None);
    }

    #[test]
    fn test_range_clip_is_boundary_inclusive() {
        let r = Biomarker::Dfa.range();
        assert!(r.contains(0.5));
        assert!(r.contains(1.0));
        assert_eq!(r.clip(0.2), 0.5);
        assert_eq!(r.clip(1.7), 1.0);
        assert_eq!(r.clip(f64::NAN), 0.5);
        assert_eq!(Biomarker::Spread1.range().clip(0.0), -1.0);
    }
}
