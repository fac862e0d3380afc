//! Per-feature standardization fitted offline
//!
//! `z = (x - mean) / scale`. A zero scale (constant training feature) is
//! treated as 1 so the feature passes through centered.

use crate::error::ScreeningError;
use serde::{Deserialize, Serialize};

/// Fitted standard scaler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Training mean per feature, in model order
    pub mean: Vec<f64>,

    /// Training standard deviation per feature, in model order
    pub scale: Vec<f64>,

    /// Feature names the scaler was fitted on, when recorded
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
}

impl StandardScaler {
    /// Build from mean and scale vectors
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError` if the lengths differ or a value is not finite
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ScreeningError> {
        let scaler = Self {
            mean,
            scale,
            feature_names: None,
        };
        scaler.check()?;
        Ok(scaler)
    }

    /// Parse the JSON artifact `{"mean": [..], "scale": [..]}`
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError` for malformed JSON or inconsistent vectors
    pub fn from_json_str(json: &str) -> Result<Self, ScreeningError> {
        let scaler: Self = serde_json::from_str(json)
            .map_err(|e| ScreeningError::ArtifactError(format!("Invalid scaler: {}", e)))?;
        scaler.check()?;
        Ok(scaler)
    }

    fn check(&self) -> Result<(), ScreeningError> {
        if self.mean.len() != self.scale.len() {
            return Err(ScreeningError::ArtifactError(format!(
                "Scaler has {} means but {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if let Some(names) = &self.feature_names {
            if names.len() != self.mean.len() {
                return Err(ScreeningError::ArtifactError(format!(
                    "Scaler lists {} feature names for {} features",
                    names.len(),
                    self.mean.len()
                )));
            }
        }
        if self
            .mean
            .iter()
            .chain(self.scale.iter())
            .any(|v| !v.is_finite())
        {
            return Err(ScreeningError::ArtifactError(
                "Scaler contains non-finite values".to_string(),
            ));
        }
        Ok(())
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.mean.len()
    }

    /// True for a scaler fitted on zero features
    pub fn is_empty(&self) -> bool {
        self.mean.is_empty()
    }

    /// Standardize one row into a new buffer
    pub fn transform(&self, row: &[f64]) -> Vec<f64> {
        debug_assert_eq!(row.len(), self.len(), "scaler input length");
        row.iter()
            .zip(self.mean.iter().zip(self.scale.iter()))
            .map(|(&x, (&m, &s))| (x - m) / effective_scale(s))
            .collect()
    }
}

fn effective_scale(s: f64) -> f64 {
    if s == 0.0 {
        1.0
    } else {
        s
    }
}
