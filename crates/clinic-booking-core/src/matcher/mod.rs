//! Doctor matcher: which doctors may receive an appointment for a disease.
//!
//! Pipeline: selected disease → normalization → eligibility filter → choices
//! (falling back to the whole directory when nothing matches)

mod normalizer;

pub use normalizer::*;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::models::{default_diseases, default_doctors, Doctor};

/// Doctors offered for a selected disease.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DoctorChoices {
    /// Selectable doctors, in directory order
    pub doctors: Vec<Doctor>,
    /// False when nothing matched and the whole directory is shown instead
    pub exact_match: bool,
}

impl DoctorChoices {
    /// Notice shown alongside the list when no doctor matched.
    pub const NO_MATCH_NOTICE: &'static str =
        "No exact match found for the selected disease. Showing all doctors.";

    /// Notice for the caller, present only on the fallback path.
    pub fn notice(&self) -> Option<&'static str> {
        (!self.exact_match).then_some(Self::NO_MATCH_NOTICE)
    }

    /// Check if `name` is one of the offered doctors.
    pub fn contains(&self, name: &str) -> bool {
        self.doctors.iter().any(|d| d.name == name)
    }
}

/// Doctors whose diseases equal or contain the query, in directory order.
///
/// Never mutates `doctors`; an empty query yields no doctors.
pub fn eligible_doctors(doctors: &[Doctor], disease: &str) -> Vec<Doctor> {
    let query = DiseaseQuery::new(disease);
    doctors
        .iter()
        .filter(|doctor| doctor.diseases.iter().any(|d| query.matches(d)))
        .cloned()
        .collect()
}

/// Caller-facing doctor list for a disease.
///
/// When no doctor is eligible the entire directory is returned with
/// `exact_match == false`, so the patient can still pick someone.
pub fn doctor_choices(doctors: &[Doctor], disease: &str) -> DoctorChoices {
    let eligible = eligible_doctors(doctors, disease);
    if eligible.is_empty() {
        DoctorChoices {
            doctors: doctors.to_vec(),
            exact_match: false,
        }
    } else {
        DoctorChoices {
            doctors: eligible,
            exact_match: true,
        }
    }
}

/// Union of every doctor's diseases, sorted and de-duplicated.
pub fn available_diseases(doctors: &[Doctor]) -> Vec<String> {
    doctors
        .iter()
        .flat_map(|d| d.diseases.iter().cloned())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

/// Disease selector options, falling back to the default list when the
/// directory yields none.
pub fn disease_options(doctors: &[Doctor]) -> Vec<String> {
    let diseases = available_diseases(doctors);
    if diseases.is_empty() {
        default_diseases()
    } else {
        diseases
    }
}

/// The directory to book against: `fetched` if non-empty, else the defaults.
pub fn directory_or_default(fetched: Vec<Doctor>) -> Vec<Doctor> {
    if fetched.is_empty() {
        default_doctors()
    } else {
        fetched
    }
}
