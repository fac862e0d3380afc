//! Scoring a feature vector with the trained model

use super::artifact::ModelArtifact;
use crate::features::FeatureVector;
use serde::Serialize;

/// Class probabilities, summing to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassProbabilities {
    /// P(healthy)
    pub healthy: f64,
    /// P(Parkinson's)
    pub parkinson: f64,
}

impl ClassProbabilities {
    /// Probability of the more likely class
    pub fn max(&self) -> f64 {
        self.healthy.max(self.parkinson)
    }
}

/// Classifier output for one vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InferenceOutcome {
    /// 1 for Parkinson's, 0 for healthy
    pub predicted_class: usize,
    /// Class probabilities
    pub probabilities: ClassProbabilities,
}

/// Borrowed scoring view over a [`ModelArtifact`]
#[derive(Debug, Clone, Copy)]
pub struct InferenceEngine<'a> {
    artifact: &'a ModelArtifact,
}

impl<'a> InferenceEngine<'a> {
    /// Score with `artifact`
    pub fn new(artifact: &'a ModelArtifact) -> Self {
        Self { artifact }
    }

    /// Order, standardize and classify `features`
    ///
    /// The vector itself is never modified; standardization writes a new
    /// buffer.
    pub fn score(&self, features: &FeatureVector) -> InferenceOutcome {
        let row = self.artifact.layout().arrange(features);
        let scaled = self.artifact.scaler().transform(&row);

        let classifier = self.artifact.classifier();
        let [healthy, parkinson] = classifier.predict_proba(&scaled);
        let predicted_class = classifier.predict(&scaled);

        log::debug!(
            "{} scored P(parkinson) = {:.4}, class {}",
            classifier.name(),
            parkinson,
            predicted_class
        );

        InferenceOutcome {
            predicted_class,
            probabilities: ClassProbabilities { healthy, parkinson },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{Biomarker, FEATURE_COUNT};
    use crate::ml::classifier::LogisticModel;
    use crate::ml::metadata::ModelMetadata;
    use crate::ml::scaler::StandardScaler;

    fn artifact_weighting(biomarker: Biomarker, reversed: bool) -> ModelArtifact {
        let mut names: Vec<String> = Biomarker::ALL.iter().map(|b| b.name().to_string()).collect();
        if reversed {
            names.reverse();
        }
        let position = names.iter().position(|n| n == biomarker.name()).unwrap();
        let mut coefficients = vec![0.0; FEATURE_COUNT];
        coefficients[position] = 1.0;

        let mut mean = vec![0.0; FEATURE_COUNT];
        mean[position] = 10.0;
        let mut scale = vec![1.0; FEATURE_COUNT];
        scale[position] = 2.0;

        ModelArtifact::from_parts(
            Box::new(LogisticModel {
                coefficients,
                intercept: 0.0,
            }),
            StandardScaler::new(mean, scale).unwrap(),
            ModelMetadata {
                feature_names: names,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn test_score_uses_layout_and_scaler() {
        for reversed in [false, true] {
            let artifact = artifact_weighting(Biomarker::Hnr, reversed);
            let engine = InferenceEngine::new(&artifact);

            let mut features = FeatureVector::from_fn(|_| 0.0);
            features[Biomarker::Hnr] = 10.0;
            let at_mean = engine.score(&features);
            assert!((at_mean.probabilities.parkinson - 0.5).abs() < 1e-12);
            assert_eq!(at_mean.predicted_class, 0);

            features[Biomarker::Hnr] = 14.0;
            let above = engine.score(&features);
            let expected = 1.0 / (1.0 + (-2.0f64).exp());
            assert!((above.probabilities.parkinson - expected).abs() < 1e-12);
            assert_eq!(above.predicted_class, 1);
            assert!((above.probabilities.healthy + above.probabilities.parkinson - 1.0).abs() < 1e-12);
            assert_eq!(above.probabilities.max(), above.probabilities.parkinson);
            assert_eq!(features[Biomarker::Hnr], 14.0);
        }
    }
}
