//! Doctor directory models.

use serde::{Deserialize, Serialize};

/// Diseases offered in the booking selector when the directory is unavailable.
pub const DEFAULT_DISEASES: [&str; 11] = [
    "Hypertension",
    "Heart Disease",
    "Arrhythmia",
    "Acne",
    "Eczema",
    "Psoriasis",
    "Skin Allergy",
    "Fever",
    "Cold",
    "Flu",
    "Vaccination",
];

/// A doctor in the clinic directory.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    /// Store-assigned ID (absent for the built-in fallback directory)
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name, referenced by `Appointment::doctor`
    pub name: String,
    /// Specialty (e.g., "Cardiologist")
    pub specialty: String,
    /// Portrait reference
    #[serde(rename = "image", default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    /// Conditions this doctor treats
    #[serde(default)]
    pub diseases: Vec<String>,
}

impl Doctor {
    /// Create a doctor with the given diseases.
    pub fn new(name: &str, specialty: &str, diseases: &[&str]) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            specialty: specialty.to_string(),
            image_ref: None,
            diseases: diseases.iter().map(|d| d.to_string()).collect(),
        }
    }

    /// Check if this doctor treats a disease (case-insensitive exact match).
    pub fn treats(&self, disease: &str) -> bool {
        let wanted = disease.trim().to_lowercase();
        self.diseases
            .iter()
            .any(|d| d.trim().to_lowercase() == wanted)
    }
}

/// The fixed three-doctor directory used for seeding and offline booking.
pub fn default_doctors() -> Vec<Doctor> {
    let mut cardiologist = Doctor::new(
        "Dr. Alice Smith",
        "Cardiologist",
        &["Heart Disease", "Hypertension", "Arrhythmia"],
    );
    cardiologist.image_ref = Some("https://via.placeholder.com/150?text=Cardiologist".into());

    let mut dermatologist = Doctor::new(
        "Dr. John Doe",
        "Dermatologist",
        &["Acne", "Eczema", "Psoriasis", "Skin Allergy"],
    );
    dermatologist.image_ref = Some("https://via.placeholder.com/150?text=Dermatologist".into());

    let mut pediatrician = Doctor::new(
        "Dr. Emily Brown",
        "Pediatrician",
        &["Fever", "Cold", "Flu", "Vaccination"],
    );
    pediatrician.image_ref = Some("https://via.placeholder.com/150?text=Pediatrician".into());

    vec![cardiologist, dermatologist, pediatrician]
}

/// The fixed default disease list, owned.
pub fn default_diseases() -> Vec<String> {
    DEFAULT_DISEASES.iter().map(|d| d.to_string()).collect()
}
