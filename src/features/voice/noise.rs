//! Harmonic-to-noise ratios from a harmonic/percussive split
//!
//! The percussive component stands in for aperiodic noise: HNR is the
//! energy ratio in dB and NHR its linear inverse.

use crate::features::spectral::hpss::HpssComponents;

/// Noise ratio measures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseRatios {
    /// Harmonic-to-noise ratio in dB
    pub hnr: f64,
    /// Noise-to-harmonic ratio (linear)
    pub nhr: f64,
}

impl NoiseRatios {
    /// Compute from component energies (both already floored above zero)
    pub fn from_energies(harmonic_energy: f64, percussive_energy: f64) -> Self {
        Self {
            hnr: 10.0 * (harmonic_energy / percussive_energy).log10(),
            nhr: percussive_energy / harmonic_energy,
        }
    }

    /// Compute from separated components
    pub fn from_components(components: &HpssComponents) -> Self {
        let eh = components.harmonic_energy();
        let ep = components.percussive_energy();
        log::debug!("HPSS energies: harmonic={:.3e}, percussive={:.3e}", eh, ep);
        Self::from_energies(eh, ep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratios_are_reciprocal() {
        let ratios = NoiseRatios::from_energies(0.01, 0.0001);
        assert!((ratios.hnr - 20.0).abs() < 1e-9);
        assert!((ratios.nhr - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_silent_components_are_balanced() {
        let components = HpssComponents {
            harmonic: vec![0.0; 100],
            percussive: vec![0.0; 100],
        };
        let ratios = NoiseRatios::from_components(&components);
        assert!(ratios.hnr.abs() < 1e-9);
        assert!((ratios.nhr - 1.0).abs() < 1e-9);
    }
}
