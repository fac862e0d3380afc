//! Biomarker extraction from voice recordings
//!
//! Turns a sustained phonation ("ahh") into the 22-value feature vector.
//!
//! # Algorithm
//!
//! 1. Reject recordings shorter than the minimum duration
//! 2. Track pitch with pYIN; require a minimum number of voiced frames
//! 3. Frequency statistics and jitter from the voiced pitch track
//! 4. Shimmer from frame RMS energies
//! 5. HNR/NHR from a harmonic/percussive split
//! 6. Nonlinear-dynamics proxies from autocorrelation, mel flux and MFCCs
//! 7. Clip every value into its documented range
//!
//! # Example
//!
//! ```no_run
//! use neurovox::config::VoiceConfig;
//! use neurovox::features::voice::{AudioClip, AudioFeatureExtractor};
//! use neurovox::features::FeatureExtractor;
//!
//! let clip = AudioClip::new(vec![0.0f32; 44100 * 3], 44100);
//! let extractor = AudioFeatureExtractor::new(VoiceConfig::default());
//! let extraction = extractor.extract(&clip)?;
//! println!("voiced frames: {}", extraction.report.voiced_frames);
//! # Ok::<(), neurovox::ScreeningError>(())
//! ```

pub mod dynamics;
pub mod noise;
pub mod perturbation;
pub mod pitch;

pub use pitch::{PitchTrack, PitchTracker};

use super::biomarker::Biomarker;
use super::spectral::{hpss, mel, stft};
use super::vector::FeatureVector;
use super::{Extraction, FeatureExtractor};
use crate::config::VoiceConfig;
use crate::error::ScreeningError;
use dynamics::CepstralProxies;
use noise::NoiseRatios;
use perturbation::{frame_rms, mean, percentile, Jitter, Shimmer};

/// Decoded mono recording
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    /// Mono samples in `[-1, 1]`
    pub samples: Vec<f32>,
    /// Sample rate in Hz
    pub sample_rate: u32,
}

impl AudioClip {
    /// Wrap decoded samples
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Length in seconds (0.0 for a zero sample rate)
    pub fn duration_s(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Diagnostics from voice extraction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceReport {
    /// Recording length in seconds
    pub duration_s: f64,
    /// Frames decoded as voiced
    pub voiced_frames: usize,
    /// Frames analysed
    pub total_frames: usize,
}

/// Voice recording feature extractor
#[derive(Debug, Clone, Default)]
pub struct AudioFeatureExtractor {
    config: VoiceConfig,
}

impl AudioFeatureExtractor {
    /// Create an extractor with the given settings
    pub fn new(config: VoiceConfig) -> Self {
        Self { config }
    }

    /// Active settings
    pub fn config(&self) -> &VoiceConfig {
        &self.config
    }
}

impl FeatureExtractor for AudioFeatureExtractor {
    type Input = AudioClip;
    type Report = VoiceReport;

    fn extract(&self, clip: &AudioClip) -> Result<Extraction<VoiceReport>, ScreeningError> {
        let cfg = &self.config;
        if clip.sample_rate == 0 {
            return Err(ScreeningError::InvalidInput(
                "Sample rate must be > 0".to_string(),
            ));
        }

        let duration_s = clip.duration_s();
        if duration_s < cfg.min_duration_s {
            return Err(ScreeningError::InsufficientAudioDuration {
                duration_s,
                required_s: cfg.min_duration_s,
            });
        }

        log::debug!(
            "Extracting voice features: {} samples @ {} Hz ({:.2}s)",
            clip.samples.len(),
            clip.sample_rate,
            duration_s
        );

        let samples = &clip.samples;
        let sr = clip.sample_rate;

        // Pitch
        let track = PitchTracker::new(cfg).track(samples, sr)?;
        let voiced: Vec<f64> = track
            .voiced_frequencies()
            .into_iter()
            .filter(|f| f.is_finite())
            .collect();
        if voiced.len() < cfg.min_voiced_frames {
            return Err(ScreeningError::NoVoicedSignal {
                voiced_frames: voiced.len(),
                required: cfg.min_voiced_frames,
            });
        }

        let fo = mean(&voiced).unwrap_or(0.0);
        let fhi = percentile(&voiced, 97.0).unwrap_or(fo);
        let flo = percentile(&voiced, 3.0).unwrap_or(fo);
        let jitter = Jitter::from_frequencies(&voiced);

        // Amplitude
        let rms = frame_rms(samples, cfg.frame_size, cfg.hop_size);
        let shimmer = Shimmer::from_rms(&rms, cfg.silence_rms as f64);

        // Noise
        let spectrogram = stft::stft(samples, cfg.frame_size, cfg.hop_size)?;
        let components = hpss::separate(
            &spectrogram,
            cfg.frame_size,
            cfg.hop_size,
            samples.len(),
            cfg.hpss_kernel,
        )?;
        let noise = NoiseRatios::from_components(&components);

        // Dynamics
        let filterbank = mel::mel_filterbank(sr, cfg.frame_size, cfg.n_mels)?;
        let mel_power = mel::mel_spectrogram(&stft::power(&spectrogram), &filterbank);
        let flux = mel::mean_spectral_flux(&mel_power);
        let mfcc = mel::mfcc(&mel_power, cfg.n_mfcc, cfg.top_db);
        let cepstral = CepstralProxies::from_mfcc(&mfcc);

        let raw = FeatureVector::from_fn(|b| match b {
            Biomarker::Fo => fo,
            Biomarker::Fhi => fhi,
            Biomarker::Flo => flo,
            Biomarker::JitterPercent => jitter.relative,
            Biomarker::JitterAbs => jitter.absolute,
            Biomarker::Rap => jitter.rap,
            Biomarker::Ppq => jitter.ppq,
            Biomarker::Ddp => jitter.ddp,
            Biomarker::Shimmer => shimmer.local,
            Biomarker::ShimmerDb => shimmer.db,
            Biomarker::Apq3 => shimmer.apq3,
            Biomarker::Apq5 => shimmer.apq5,
            Biomarker::Apq => shimmer.apq,
            Biomarker::Dda => shimmer.dda,
            Biomarker::Nhr => noise.nhr,
            Biomarker::Hnr => noise.hnr,
            Biomarker::Rpde => dynamics::rpde(samples),
            Biomarker::Dfa => dynamics::dfa(flux),
            Biomarker::Spread1 => cepstral.spread1,
            Biomarker::Spread2 => cepstral.spread2,
            Biomarker::D2 => cepstral.d2,
            Biomarker::Ppe => cepstral.ppe,
        });

        if let Some((b, v)) = raw.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ScreeningError::NumericalError(format!(
                "{} evaluated to {}",
                b.name(),
                v
            )));
        }

        let report = VoiceReport {
            duration_s,
            voiced_frames: voiced.len(),
            total_frames: track.len(),
        };
        log::debug!(
            "Voice features: Fo={:.1} Hz, jitter={:.5}, shimmer={:.4}, HNR={:.2} dB ({} of {} frames voiced)",
            fo,
            jitter.relative,
            shimmer.local,
            noise.hnr,
            report.voiced_frames,
            report.total_frames
        );

        Ok(Extraction {
            features: raw.clipped(),
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(freq: f32, sample_rate: u32, seconds: f32) -> Vec<f32> {
        let n = (sample_rate as f32 * seconds) as usize;
        (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin() * 0.4)
            .collect()
    }

    #[test]
    fn test_short_clip_rejected_before_pitch_tracking() {
        let clip = AudioClip::new(vec![0.0; 16000], 16000);
        let err = AudioFeatureExtractor::default().extract(&clip).unwrap_err();
        match err {
            ScreeningError::InsufficientAudioDuration {
                duration_s,
                required_s,
            } => {
                assert!((duration_s - 1.0).abs() < 1e-9);
                assert_eq!(required_s, 2.0);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_silence_has_no_voiced_signal() {
        let clip = AudioClip::new(vec![0.0; 16000 * 3], 16000);
        let err = AudioFeatureExtractor::default().extract(&clip).unwrap_err();
        assert!(matches!(err, ScreeningError::NoVoicedSignal { voiced_frames: 0, .. }));
    }

    #[test]
    fn test_zero_sample_rate() {
        let clip = AudioClip::new(vec![0.0; 100], 0);
        assert!(matches!(
            AudioFeatureExtractor::default().extract(&clip),
            Err(ScreeningError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_sustained_tone_yields_valid_vector() {
        let clip = AudioClip::new(tone(150.0, 16000, 2.5), 16000);
        let extraction = AudioFeatureExtractor::default().extract(&clip).unwrap();

        assert!(extraction.features.first_out_of_range().is_none());
        assert!(extraction.report.voiced_frames >= 10);
        assert_eq!(extraction.report.total_frames, 1 + 40000 / 512);

        let fo = extraction.features[Biomarker::Fo];
        assert!((fo - 150.0).abs() < 10.0, "Fo = {}", fo);
        assert!(extraction.features[Biomarker::Fhi] >= extraction.features[Biomarker::Flo]);
        // A clean tone is dominated by its harmonic part
        assert!(extraction.features[Biomarker::Hnr] > 5.0);
    }
}
