//! Booking flow: doctor directory, disease-constrained choices and submission.
//!
//! Wraps an [`AppointmentStore`] with the directory the booking form books
//! against, so a submission can only name a doctor offered for its disease.

use tracing::{info, warn};

use crate::matcher::{self, DoctorChoices};
use crate::models::{default_doctors, Appointment, AppointmentForm, Doctor, RecordKey};
use crate::remote::{RecordStore, RemoteError};
use crate::store::{AppointmentStore, CancelToken, CreateOutcome, StoreError, StoreResult};
use crate::validation::{self, Field, FieldError, FieldErrorKind, ValidationErrors};

/// Message attached to a doctor who is not offered for the chosen disease.
pub const DOCTOR_NOT_OFFERED: &str = "Selected doctor is not available for this disease";

/// Where the current directory came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectorySource {
    /// Fetched from the record store
    Remote,
    /// Built-in defaults (store unreachable or returned no doctors)
    Fallback,
}

/// Booking form state over an appointment store.
pub struct BookingFlow<R: RecordStore> {
    store: AppointmentStore<R>,
    directory: Vec<Doctor>,
    source: DirectorySource,
}

impl<R: RecordStore> BookingFlow<R> {
    /// Start with the default directory until [`load_directory`](Self::load_directory) runs.
    pub fn new(store: AppointmentStore<R>) -> Self {
        Self {
            store,
            directory: default_doctors(),
            source: DirectorySource::Fallback,
        }
    }

    /// Fetch the doctor directory, falling back to the defaults.
    pub fn load_directory(&mut self) -> DirectorySource {
        let fetched = self.store.remote().list_doctors(None);
        self.apply_directory(fetched)
    }

    /// Like [`load_directory`](Self::load_directory), but leaves the current
    /// directory untouched if `token` was cancelled mid-call.
    pub fn load_directory_for(&mut self, token: &CancelToken) -> Option<DirectorySource> {
        let fetched = self.store.remote().list_doctors(None);
        if token.is_cancelled() {
            return None;
        }
        Some(self.apply_directory(fetched))
    }

    pub fn directory(&self) -> &[Doctor] {
        &self.directory
    }

    pub fn directory_source(&self) -> DirectorySource {
        self.source
    }

    /// Disease selector options for the current directory.
    pub fn disease_options(&self) -> Vec<String> {
        matcher::disease_options(&self.directory)
    }

    /// Doctors offered for `disease`.
    pub fn doctor_choices(&self, disease: &str) -> DoctorChoices {
        matcher::doctor_choices(&self.directory, disease)
    }

    /// Validate, check the doctor against the offered choices, then book.
    pub fn submit(&mut self, form: &AppointmentForm) -> StoreResult<CreateOutcome> {
        self.check(form)?;
        self.store.create(form)
    }

    /// Validate, re-check the doctor, then apply an edit.
    pub fn update(&mut self, key: &RecordKey, form: &AppointmentForm) -> StoreResult<Appointment> {
        self.check(form)?;
        self.store.update(key, form)
    }

    pub fn store(&self) -> &AppointmentStore<R> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut AppointmentStore<R> {
        &mut self.store
    }

    pub fn into_store(self) -> AppointmentStore<R> {
        self.store
    }

    fn apply_directory(&mut self, fetched: Result<Vec<Doctor>, RemoteError>) -> DirectorySource {
        let doctors = fetched.unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load doctors");
            Vec::new()
        });

        self.source = if doctors.is_empty() {
            warn!("No doctors available, using default directory");
            DirectorySource::Fallback
        } else {
            info!(count = doctors.len(), "Loaded doctor directory");
            DirectorySource::Remote
        };
        self.directory = matcher::directory_or_default(doctors);
        self.source
    }

    /// All field errors for `form`, including an unoffered doctor.
    fn check(&self, form: &AppointmentForm) -> StoreResult<()> {
        let mut errors = validation::validate(form, validation::today());

        let doctor_missing = errors.iter().any(|e| e.field == Field::Doctor);
        if !doctor_missing && !self.doctor_choices(&form.disease).contains(&form.doctor) {
            errors.push(FieldError::new(
                Field::Doctor,
                FieldErrorKind::InvalidEnum,
                DOCTOR_NOT_OFFERED,
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(ValidationErrors(errors)))
        }
    }
}
