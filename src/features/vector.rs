//! Canonical feature vector and its name <-> position table

use super::biomarker::{Biomarker, FEATURE_COUNT};
use crate::error::ScreeningError;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::ops::{Index, IndexMut};

/// Round `value` to `decimals` decimal places
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// One value per [`Biomarker`], indexed by the enum
///
/// Serializes as an ordered map from canonical name to value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Build by evaluating `f` for every biomarker
    pub fn from_fn(mut f: impl FnMut(Biomarker) -> f64) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        for b in Biomarker::ALL {
            values[b.index()] = f(b);
        }
        Self { values }
    }

    /// Value for one biomarker
    pub fn get(&self, biomarker: Biomarker) -> f64 {
        self.values[biomarker.index()]
    }

    /// Iterate `(biomarker, value)` in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Biomarker, f64)> + '_ {
        Biomarker::ALL.iter().map(move |&b| (b, self.values[b.index()]))
    }

    /// Copy with every value clipped into its documented range
    pub fn clipped(&self) -> Self {
        Self::from_fn(|b| b.range().clip(self.get(b)))
    }

    /// Copy with every value rounded to `decimals` places
    pub fn rounded(&self, decimals: u32) -> Self {
        Self::from_fn(|b| round_to(self.get(b), decimals))
    }

    /// First biomarker whose value lies outside its range
    pub fn first_out_of_range(&self) -> Option<(Biomarker, f64)> {
        self.iter().find(|&(b, v)| !b.range().contains(v))
    }
}

impl Index<Biomarker> for FeatureVector {
    type Output = f64;

    fn index(&self, biomarker: Biomarker) -> &f64 {
        &self.values[biomarker.index()]
    }
}

impl IndexMut<Biomarker> for FeatureVector {
    fn index_mut(&mut self, biomarker: Biomarker) -> &mut f64 {
        &mut self.values[biomarker.index()]
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT))?;
        for (b, v) in self.iter() {
            map.serialize_entry(b.name(), &v)?;
        }
        map.end()
    }
}

/// Positional order expected by the classifier
///
/// Built from the artifact's ordered feature-name list. Every biomarker
/// appears exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureLayout {
    order: [Biomarker; FEATURE_COUNT],
}

impl FeatureLayout {
    /// Canonical dataset order
    pub fn canonical() -> Self {
        Self {
            order: Biomarker::ALL,
        }
    }

    /// Resolve an ordered list of canonical names
    ///
    /// # Errors
    ///
    /// Returns `ArtifactError` if a name is unknown, repeated, or if the list
    /// does not cover all biomarkers.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, ScreeningError> {
        if names.len() != FEATURE_COUNT {
            return Err(ScreeningError::ArtifactError(format!(
                "Expected {} feature names, got {}",
                FEATURE_COUNT,
                names.len()
            )));
        }

        let mut order = Biomarker::ALL;
        let mut seen = [false; FEATURE_COUNT];
        for (pos, name) in names.iter().enumerate() {
            let name = name.as_ref();
            let b = Biomarker::from_name(name).ok_or_else(|| {
                ScreeningError::ArtifactError(format!("Unknown feature name '{}'", name))
            })?;
            if seen[b.index()] {
                return Err(ScreeningError::ArtifactError(format!(
                    "Duplicate feature name '{}'",
                    name
                )));
            }
            seen[b.index()] = true;
            order[pos] = b;
        }

        Ok(Self { order })
    }

    /// Biomarkers in model order
    pub fn order(&self) -> &[Biomarker; FEATURE_COUNT] {
        &self.order
    }

    /// Canonical names in model order
    pub fn names(&self) -> Vec<&'static str> {
        self.order.iter().map(|b| b.name()).collect()
    }

    /// Positional model input for `features`
    pub fn arrange(&self, features: &FeatureVector) -> Vec<f64> {
        self.order.iter().map(|&b| features[b]).collect()
    }
}
