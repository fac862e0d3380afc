//! Structured acoustic measurements
//!
//! The caller supplies all 22 measurements by name. The adapter validates
//! their ranges and copies them into the canonical vector unchanged.

use super::biomarker::Biomarker;
use super::vector::FeatureVector;
use super::{Extraction, FeatureExtractor};
use crate::error::ScreeningError;
use serde::{Deserialize, Serialize};

/// 22 named vocal measurements, as submitted by a client
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[allow(missing_docs)]
pub struct VocalMeasurements {
    pub mdvp_fo: f64,
    pub mdvp_fhi: f64,
    pub mdvp_flo: f64,
    pub mdvp_jitter_pct: f64,
    pub mdvp_jitter_abs: f64,
    pub mdvp_rap: f64,
    pub mdvp_ppq: f64,
    pub jitter_ddp: f64,
    pub mdvp_shimmer: f64,
    pub mdvp_shimmer_db: f64,
    pub shimmer_apq3: f64,
    pub shimmer_apq5: f64,
    pub mdvp_apq: f64,
    pub shimmer_dda: f64,
    pub nhr: f64,
    pub hnr: f64,
    pub rpde: f64,
    pub dfa: f64,
    pub spread1: f64,
    pub spread2: f64,
    pub d2: f64,
    pub ppe: f64,
}

impl VocalMeasurements {
    /// Value of the field backing `biomarker`
    pub fn get(&self, biomarker: Biomarker) -> f64 {
        match biomarker {
            Biomarker::Fo => self.mdvp_fo,
            Biomarker::Fhi => self.mdvp_fhi,
            Biomarker::Flo => self.mdvp_flo,
            Biomarker::JitterPercent => self.mdvp_jitter_pct,
            Biomarker::JitterAbs => self.mdvp_jitter_abs,
            Biomarker::Rap => self.mdvp_rap,
            Biomarker::Ppq => self.mdvp_ppq,
            Biomarker::Ddp => self.jitter_ddp,
            Biomarker::Shimmer => self.mdvp_shimmer,
            Biomarker::ShimmerDb => self.mdvp_shimmer_db,
            Biomarker::Apq3 => self.shimmer_apq3,
            Biomarker::Apq5 => self.shimmer_apq5,
            Biomarker::Apq => self.mdvp_apq,
            Biomarker::Dda => self.shimmer_dda,
            Biomarker::Nhr => self.nhr,
            Biomarker::Hnr => self.hnr,
            Biomarker::Rpde => self.rpde,
            Biomarker::Dfa => self.dfa,
            Biomarker::Spread1 => self.spread1,
            Biomarker::Spread2 => self.spread2,
            Biomarker::D2 => self.d2,
            Biomarker::Ppe => self.ppe,
        }
    }

    /// Check every field against its documented range
    ///
    /// # Errors
    ///
    /// Returns `ScreeningError::Validation` for the first field (canonical
    /// order) that is out of range or not finite.
    pub fn validate(&self) -> Result<(), ScreeningError> {
        for b in Biomarker::ALL {
            let value = self.get(b);
            let range = b.range();
            if !range.contains(value) {
                return Err(ScreeningError::Validation {
                    feature: b.name(),
                    value,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        Ok(())
    }

    /// Identity copy into the canonical vector
    pub fn to_feature_vector(&self) -> FeatureVector {
        FeatureVector::from_fn(|b| self.get(b))
    }
}

/// Reference measurements shipped with the service
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SampleData {
    /// Recording from a healthy speaker
    pub healthy: VocalMeasurements,
    /// Recording from a speaker with Parkinson's disease
    pub parkinson: VocalMeasurements,
}

/// The two documented reference samples
pub fn sample_data() -> SampleData {
    SampleData {
        healthy: VocalMeasurements {
            mdvp_fo: 197.076,
            mdvp_fhi: 206.896,
            mdvp_flo: 192.055,
            mdvp_jitter_pct: 0.00289,
            mdvp_jitter_abs: 0.00001,
            mdvp_rap: 0.00166,
            mdvp_ppq: 0.00168,
            jitter_ddp: 0.00498,
            mdvp_shimmer: 0.01098,
            mdvp_shimmer_db: 0.097,
            shimmer_apq3: 0.00563,
            shimmer_apq5: 0.0068,
            mdvp_apq: 0.00802,
            shimmer_dda: 0.01689,
            nhr: 0.00339,
            hnr: 26.775,
            rpde: 0.422229,
            dfa: 0.741367,
            spread1: -7.3483,
            spread2: 0.177551,
            d2: 1.743867,
            ppe: 0.085569,
        },
        parkinson: VocalMeasurements {
            mdvp_fo: 119.992,
            mdvp_fhi: 157.302,
            mdvp_flo: 74.997,
            mdvp_jitter_pct: 0.00784,
            mdvp_jitter_abs: 0.00007,
            mdvp_rap: 0.0037,
            mdvp_ppq: 0.00554,
            jitter_ddp: 0.01109,
            mdvp_shimmer: 0.04374,
            mdvp_shimmer_db: 0.426,
            shimmer_apq3: 0.02182,
            shimmer_apq5: 0.0313,
            mdvp_apq: 0.02971,
            shimmer_dda: 0.06545,
            nhr: 0.02211,
            hnr: 21.033,
            rpde: 0.414783,
            dfa: 0.815285,
            spread1: -4.813031,
            spread2: 0.266482,
            d2: 2.301442,
            ppe: 0.284654,
        },
    }
}

/// Identity adapter from [`VocalMeasurements`] to [`FeatureVector`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredFeatureAdapter;

impl FeatureExtractor for StructuredFeatureAdapter {
    type Input = VocalMeasurements;
    type Report = ();

    fn extract(&self, input: &VocalMeasurements) -> Result<Extraction<()>, ScreeningError> {
        input.validate()?;
        Ok(Extraction {
            features: input.to_feature_vector(),
            report: (),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::vector::FeatureLayout;

    #[test]
    fn test_samples_are_valid() {
        let samples = sample_data();
        assert!(samples.healthy.validate().is_ok());
        assert!(samples.parkinson.validate().is_ok());
    }

    #[test]
    fn test_adapter_is_pure_reordering() {
        let input = sample_data().parkinson;
        let out = StructuredFeatureAdapter.extract(&input).unwrap().features;

        for b in Biomarker::ALL {
            assert_eq!(out[b], input.get(b), "{} altered", b);
        }

        let mut names: Vec<&str> = Biomarker::ALL.iter().map(|b| b.name()).collect();
        names.rotate_left(7);
        let layout = FeatureLayout::from_names(&names).unwrap();
        let arranged = layout.arrange(&out);
        for (pos, name) in names.iter().enumerate() {
            let b = Biomarker::from_name(name).unwrap();
            assert_eq!(arranged[pos], input.get(b));
        }
    }

    #[test]
    fn test_validation_reports_first_violation() {
        let mut input = sample_data().healthy;
        input.hnr = 40.0;
        input.ppe = -1.0;
        match input.validate() {
            Err(ScreeningError::Validation { feature, value, min, max }) => {
                assert_eq!(feature, "HNR");
                assert_eq!(value, 40.0);
                assert_eq!((min, max), (0.0, 35.0));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_is_boundary_inclusive() {
        let mut input = sample_data().healthy;
        input.mdvp_fo = 80.0;
        input.dfa = 1.0;
        input.spread1 = -8.0;
        assert!(input.validate().is_ok());
        input.mdvp_fo = f64::NAN;
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_deserializes_from_field_names() {
        let json = serde_json::to_string(&sample_data().healthy).unwrap();
        assert!(json.contains("\"mdvp_jitter_pct\""));
        let back: VocalMeasurements = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample_data().healthy);
    }
}
