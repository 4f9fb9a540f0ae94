//! Disease name normalization.
//!
//! Every disease comparison in the matcher goes through [`normalize`] so that
//! " Skin Allergy" and "skin allergy" compare equal.

/// Trim whitespace and lower-case a disease name.
pub fn normalize(disease: &str) -> String {
    disease.trim().to_lowercase()
}

/// A normalized disease query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiseaseQuery {
    normalized: String,
}

impl DiseaseQuery {
    pub fn new(disease: &str) -> Self {
        Self {
            normalized: normalize(disease),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.normalized.is_empty()
    }

    /// Check a candidate disease: exact match or substring containment.
    pub fn matches(&self, candidate: &str) -> bool {
        if self.is_empty() {
            return false;
        }
        let candidate = normalize(candidate);
        candidate == self.normalized || candidate.contains(&self.normalized)
    }
}
