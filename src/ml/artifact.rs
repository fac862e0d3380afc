//! The trained model bundle
//!
//! A [`ModelArtifact`] is loaded once at startup from three JSON documents
//! (classifier, scaler, metadata), checked for mutual consistency, and then
//! shared read-only behind an `Arc` for the lifetime of the process.

use super::classifier::{load_classifier_json, Classifier};
use super::metadata::{ModelMetadata, ModelScores};
use super::scaler::StandardScaler;
use crate::config::ArtifactPaths;
use crate::error::ScreeningError;
use crate::features::{Biomarker, FeatureLayout, FEATURE_COUNT};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, OnceLock};

static INSTALLED: OnceLock<Arc<ModelArtifact>> = OnceLock::new();

/// Classifier, scaler and feature metadata, validated together
#[derive(Debug)]
pub struct ModelArtifact {
    classifier: Box<dyn Classifier>,
    scaler: StandardScaler,
    layout: FeatureLayout,
    importance: Vec<(Biomarker, f64)>,
    descriptions: [String; FEATURE_COUNT],
    model_comparison: BTreeMap<String, ModelScores>,
    best_model_by_recall: Option<String>,
}

fn read_artifact(path: &Path) -> Result<String, ScreeningError> {
    std::fs::read_to_string(path).map_err(|e| {
        ScreeningError::ArtifactError(format!("Cannot read {}: {}", path.display(), e))
    })
}

/// Rank the recorded importance weights, heaviest first
///
/// Only biomarkers the metadata gives a weight for are ranked, so the list
/// may be shorter than the feature set. Ties keep document order.
fn rank_importance(metadata: &ModelMetadata) -> Result<Vec<(Biomarker, f64)>, ScreeningError> {
    let mut ranking = Vec::with_capacity(metadata.shap_importance.len());
    for (name, weight) in &metadata.shap_importance {
        let biomarker = Biomarker::from_name(name).ok_or_else(|| {
            ScreeningError::ArtifactError(format!(
                "Importance given for unknown feature '{}'",
                name
            ))
        })?;
        ranking.push((biomarker, *weight));
    }
    ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
    Ok(ranking)
}

impl ModelArtifact {
    /// Load and validate the three artifact files
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError` if a file is missing, malformed, or the three
    /// documents disagree
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ScreeningError> {
        log::debug!("Loading model artifacts from {}", paths.model.display());
        Self::from_json_strs(
            &read_artifact(&paths.model)?,
            &read_artifact(&paths.scaler)?,
            &read_artifact(&paths.metadata)?,
        )
    }

    /// Build from the three JSON documents
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError` as for [`load`](Self::load)
    pub fn from_json_strs(
        model_json: &str,
        scaler_json: &str,
        metadata_json: &str,
    ) -> Result<Self, ScreeningError> {
        let classifier = load_classifier_json(model_json)?;
        let scaler = StandardScaler::from_json_str(scaler_json)?;
        let metadata = ModelMetadata::from_json_str(metadata_json)?;
        Self::from_parts(classifier, scaler, metadata)
    }

    /// Assemble from already parsed components
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError` if the feature list is not a permutation of
    /// the 22 biomarkers, the scaler or classifier width differs, the
    /// scaler's recorded names disagree with the metadata, or an importance
    /// weight names an unknown feature
    pub fn from_parts(
        classifier: Box<dyn Classifier>,
        scaler: StandardScaler,
        metadata: ModelMetadata,
    ) -> Result<Self, ScreeningError> {
        let layout = FeatureLayout::from_names(&metadata.feature_names)?;

        if scaler.len() != FEATURE_COUNT {
            return Err(ScreeningError::ArtifactError(format!(
                "Scaler covers {} features, expected {}",
                scaler.len(),
                FEATURE_COUNT
            )));
        }
        if let Some(names) = &scaler.feature_names {
            if names != &metadata.feature_names {
                return Err(ScreeningError::ArtifactError(
                    "Scaler feature order differs from metadata feature order".to_string(),
                ));
            }
        }
        if let Some(n) = classifier.n_features() {
            if n != FEATURE_COUNT {
                return Err(ScreeningError::ArtifactError(format!(
                    "Classifier expects {} features, expected {}",
                    n, FEATURE_COUNT
                )));
            }
        }

        let importance = rank_importance(&metadata)?;
        let descriptions: [String; FEATURE_COUNT] = std::array::from_fn(|i| {
            let b = Biomarker::ALL[i];
            metadata
                .feature_descriptions
                .get(b.name())
                .cloned()
                .unwrap_or_else(|| b.description().to_string())
        });

        log::debug!(
            "Model artifact ready: {} classifier, top feature {}",
            classifier.name(),
            importance
                .first()
                .map(|(b, _)| b.name())
                .unwrap_or("none")
        );

        Ok(Self {
            classifier,
            scaler,
            layout,
            importance,
            descriptions,
            model_comparison: metadata.model_comparison,
            best_model_by_recall: metadata.best_model_by_recall,
        })
    }

    /// Trained classifier
    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    /// Fitted scaler, in model order
    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    /// Model input order
    pub fn layout(&self) -> &FeatureLayout {
        &self.layout
    }

    /// Biomarkers with a recorded global weight, heaviest first
    pub fn importance(&self) -> &[(Biomarker, f64)] {
        &self.importance
    }

    /// Description of a biomarker
    pub fn description(&self, biomarker: Biomarker) -> &str {
        &self.descriptions[biomarker.index()]
    }

    /// Training comparison of candidate models
    pub fn model_comparison(&self) -> &BTreeMap<String, ModelScores> {
        &self.model_comparison
    }

    /// Candidate with the highest recall, if recorded
    pub fn best_model_by_recall(&self) -> Option<&str> {
        self.best_model_by_recall.as_deref()
    }
}

/// Install `artifact` as the process-wide model
///
/// # Errors
///
/// Returns `ArtifactError` if a model is already installed
pub fn install(artifact: ModelArtifact) -> Result<Arc<ModelArtifact>, ScreeningError> {
    let shared = Arc::new(artifact);
    INSTALLED
        .set(Arc::clone(&shared))
        .map_err(|_| ScreeningError::ArtifactError("A model is already installed".to_string()))?;
    Ok(shared)
}

/// Process-wide model, if one was installed
pub fn installed() -> Option<Arc<ModelArtifact>> {
    INSTALLED.get().cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::classifier::LogisticModel;

    fn names() -> Vec<String> {
        Biomarker::ALL.iter().map(|b| b.name().to_string()).collect()
    }

    fn logistic() -> Box<dyn Classifier> {
        Box::new(LogisticModel {
            coefficients: vec![0.0; FEATURE_COUNT],
            intercept: 0.0,
        })
    }

    fn scaler() -> StandardScaler {
        StandardScaler::new(vec![0.0; FEATURE_COUNT], vec![1.0; FEATURE_COUNT]).unwrap()
    }

    fn metadata() -> ModelMetadata {
        ModelMetadata {
            feature_names: names(),
            ..Default::default()
        }
    }

    #[test]
    fn test_importance_sorted_with_stable_ties() {
        let mut md = metadata();
        md.shap_importance.push(("spread1".into(), 0.8));
        md.shap_importance.push(("PPE".into(), 1.2));
        md.shap_importance.push(("MDVP:Fo(Hz)".into(), 0.8));
        let artifact = ModelArtifact::from_parts(logistic(), scaler(), md).unwrap();

        let ranked: Vec<Biomarker> = artifact.importance().iter().map(|(b, _)| *b).collect();
        assert_eq!(ranked, vec![Biomarker::Ppe, Biomarker::Spread1, Biomarker::Fo]);
        assert!(artifact.importance().windows(2).all(|w| w[0].1 >= w[1].1));
    }

    #[test]
    fn test_unrecorded_features_are_not_ranked() {
        let md = ModelMetadata::from_json_str(&format!(
            r#"{{"feature_names": {}, "shap_importance": {{"PPE": 1.2, "spread1": 0.9}}}}"#,
            serde_json::to_string(&names()).unwrap()
        ))
        .unwrap();
        let artifact = ModelArtifact::from_parts(logistic(), scaler(), md).unwrap();
        assert_eq!(
            artifact.importance(),
            &[(Biomarker::Ppe, 1.2), (Biomarker::Spread1, 0.9)]
        );

        let bare = ModelArtifact::from_parts(logistic(), scaler(), metadata()).unwrap();
        assert!(bare.importance().is_empty());
    }

    #[test]
    fn test_description_fallback() {
        let mut md = metadata();
        md.feature_descriptions
            .insert("PPE".into(), "Pitch period entropy (most predictive)".into());
        let artifact = ModelArtifact::from_parts(logistic(), scaler(), md).unwrap();
        assert_eq!(
            artifact.description(Biomarker::Ppe),
            "Pitch period entropy (most predictive)"
        );
        assert_eq!(artifact.description(Biomarker::D2), "Correlation dimension");
    }

    #[test]
    fn test_inconsistent_parts_rejected() {
        let short = StandardScaler::new(vec![0.0; 3], vec![1.0; 3]).unwrap();
        assert!(ModelArtifact::from_parts(logistic(), short, metadata()).is_err());

        let mut renamed = scaler();
        let mut other = names();
        other.swap(0, 1);
        renamed.feature_names = Some(other);
        assert!(ModelArtifact::from_parts(logistic(), renamed, metadata()).is_err());

        let narrow = Box::new(LogisticModel {
            coefficients: vec![0.0; 5],
            intercept: 0.0,
        });
        assert!(ModelArtifact::from_parts(narrow, scaler(), metadata()).is_err());

        let mut md = metadata();
        md.shap_importance.push(("Bogus".into(), 0.1));
        assert!(ModelArtifact::from_parts(logistic(), scaler(), md).is_err());

        let mut md = metadata();
        md.feature_names.pop();
        assert!(ModelArtifact::from_parts(logistic(), scaler(), md).is_err());
    }

    #[test]
    fn test_missing_files() {
        let err = ModelArtifact::load(&ArtifactPaths::in_dir("/nonexistent/model")).unwrap_err();
        assert!(matches!(err, ScreeningError::ArtifactError(_)));
    }
}
