//! Trained model loading and inference
//!
//! The model is produced offline and shipped as three JSON documents. This
//! module parses them into a [`ModelArtifact`] and scores feature vectors
//! through an [`InferenceEngine`].

pub mod artifact;
pub mod classifier;
pub mod inference;
pub mod metadata;
pub mod scaler;

pub use artifact::ModelArtifact;
pub use classifier::{Classifier, LogisticModel, TreeEnsemble};
pub use inference::{ClassProbabilities, InferenceEngine, InferenceOutcome};
pub use metadata::{ModelMetadata, ModelScores};
pub use scaler::StandardScaler;
