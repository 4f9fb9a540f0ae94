//! Clinic Booking Core Library
//!
//! Appointment booking against a small doctor directory, with a local-first
//! mirror of the appointment collection and an EHR view over it.
//!
//! # Architecture
//!
//! ```text
//! Booking form ──► Validation ──► Doctor Matcher (offered doctors only)
//!                                          │
//!                               Appointment Store Adapter
//!                                          │
//!                     ┌────────────────────┴────────────────────┐
//!                     │                                         │
//!                     ▼                                         ▼
//!            Remote record store                      Local mirror (SQLite)
//!            (authoritative, REST)                  (fallback when unreachable)
//!                     │                                         │
//!                     └────────────────────┬────────────────────┘
//!                                          │
//!                                   EHR Query Engine
//!                              filter / aggregate / CSV
//! ```
//!
//! # Core Principle
//!
//! **No booking is lost.** A submission that passes validation is either
//! stored remotely or kept locally under a temporary ID until it can be synced.
//!
//! # Modules
//!
//! - [`models`]: Domain types (Doctor, AppointmentForm, Appointment, etc.)
//! - [`validation`]: Field rules for booking and edit submissions
//! - [`matcher`]: Disease → eligible doctor matching
//! - [`remote`]: Record store trait, HTTP client and in-memory store
//! - [`db`]: SQLite persistence for the local mirror
//! - [`store`]: Appointment store adapter (remote-first, local fallback)
//! - [`booking`]: Booking flow tying the directory to the store
//! - [`ehr`]: Filtering and aggregate counts
//! - [`export`]: CSV export
//! - [`config`]: Runtime configuration and logging setup

pub mod booking;
pub mod config;
pub mod db;
pub mod ehr;
pub mod export;
pub mod matcher;
pub mod models;
pub mod remote;
pub mod store;
pub mod validation;

// Re-export commonly used types
pub use booking::{BookingFlow, DirectorySource};
pub use config::ClinicConfig;
pub use db::Database;
pub use ehr::{DateBucket, FilterSpec, Selection, Summary};
pub use models::{Appointment, AppointmentForm, Doctor, Gender, NewAppointment, RecordKey};
pub use remote::{HttpRecordStore, InMemoryRecordStore, RecordStore};
pub use store::{AppointmentStore, CreateOutcome, DeleteOutcome, ReconcilePolicy, SyncReport};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use matcher::DoctorChoices;
use models::format_calendar_date;
use store::StoreError;
use validation::FieldError;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ClinicError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Record store unreachable: {0}")]
    Unreachable(String),

    #[error("Rejected by record store: {0}")]
    Rejected(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unexpected failure: {0}")]
    Unexpected(String),
}

impl From<StoreError> for ClinicError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(errors) => ClinicError::Validation(errors.to_string()),
            StoreError::NotFound(message) => ClinicError::NotFound(message),
            StoreError::Unreachable(message) => ClinicError::Unreachable(message),
            StoreError::Rejected(message) => ClinicError::Rejected(message),
            StoreError::Unexpected(message) => ClinicError::Unexpected(message),
            StoreError::Cache(e) => ClinicError::DatabaseError(e.to_string()),
        }
    }
}

impl From<db::DbError> for ClinicError {
    fn from(e: db::DbError) -> Self {
        ClinicError::DatabaseError(e.to_string())
    }
}

impl From<remote::RemoteError> for ClinicError {
    fn from(e: remote::RemoteError) -> Self {
        StoreError::from(e).into()
    }
}

impl From<anyhow::Error> for ClinicError {
    fn from(e: anyhow::Error) -> Self {
        ClinicError::ConfigError(format!("{:#}", e))
    }
}

impl<T> From<std::sync::PoisonError<T>> for ClinicError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ClinicError::Unexpected(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open a clinic against the record store at `api_base_url`, caching at `cache_path`.
#[uniffi::export]
pub fn open_clinic(api_base_url: String, cache_path: String) -> Result<Arc<ClinicCore>, ClinicError> {
    let remote = HttpRecordStore::new(&api_base_url, config::DEFAULT_TIMEOUT_SECS)?;
    let db = Database::open(&cache_path)?;
    ClinicCore::build(Box::new(remote), db, ReconcilePolicy::default())
}

/// Open a clinic configured from `CLINIC_*` environment variables.
#[uniffi::export]
pub fn open_clinic_from_env() -> Result<Arc<ClinicCore>, ClinicError> {
    config::init_logging();
    let config = ClinicConfig::from_env()?;
    let remote = HttpRecordStore::new(&config.api_base_url, config.request_timeout_secs)?;
    let db = Database::open(&config.cache_path)?;
    ClinicCore::build(Box::new(remote), db, config.reconcile)
}

/// Open a clinic backed by an in-memory record store and cache (for testing).
#[uniffi::export]
pub fn open_clinic_in_memory() -> Result<Arc<ClinicCore>, ClinicError> {
    let db = Database::open_in_memory()?;
    ClinicCore::build(
        Box::new(InMemoryRecordStore::new()),
        db,
        ReconcilePolicy::default(),
    )
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe booking flow wrapper for FFI.
#[derive(uniffi::Object)]
pub struct ClinicCore {
    flow: Mutex<BookingFlow<Box<dyn RecordStore>>>,
}

impl ClinicCore {
    /// Wrap an arbitrary record store (used by the factories and by tests).
    pub fn build(
        remote: Box<dyn RecordStore>,
        db: Database,
        policy: ReconcilePolicy,
    ) -> Result<Arc<Self>, ClinicError> {
        let store = AppointmentStore::open(remote, db)?.with_policy(policy);
        Ok(Arc::new(Self {
            flow: Mutex::new(BookingFlow::new(store)),
        }))
    }

    /// Rows the EHR view works on: the mirror, narrowed by `filter` if given.
    fn rows(
        flow: &BookingFlow<Box<dyn RecordStore>>,
        filter: Option<FfiFilter>,
    ) -> Result<Vec<Appointment>, ClinicError> {
        let rows = flow.store().cached();
        match filter {
            Some(filter) => {
                let spec = FilterSpec::try_from(filter)?;
                Ok(ehr::apply(rows, &spec, validation::today()))
            }
            None => Ok(rows.to_vec()),
        }
    }
}

#[uniffi::export]
impl ClinicCore {
    // =========================================================================
    // Doctor Directory
    // =========================================================================

    /// Fetch the doctor directory, falling back to the built-in defaults.
    pub fn load_directory(&self) -> Result<FfiDirectorySource, ClinicError> {
        let mut flow = self.flow.lock()?;
        Ok(flow.load_directory().into())
    }

    /// Current doctor directory.
    pub fn directory(&self) -> Result<Vec<FfiDoctor>, ClinicError> {
        let flow = self.flow.lock()?;
        Ok(flow.directory().iter().cloned().map(|d| d.into()).collect())
    }

    /// Disease selector options.
    pub fn disease_options(&self) -> Result<Vec<String>, ClinicError> {
        let flow = self.flow.lock()?;
        Ok(flow.disease_options())
    }

    /// Doctors offered for a disease.
    pub fn doctor_choices(&self, disease: String) -> Result<FfiDoctorChoices, ClinicError> {
        let flow = self.flow.lock()?;
        Ok(flow.doctor_choices(&disease).into())
    }

    // =========================================================================
    // Appointment Operations
    // =========================================================================

    /// Field errors for a form, without submitting it.
    pub fn validate(&self, form: FfiAppointmentForm) -> Vec<FfiFieldError> {
        validation::validate(&form.into(), validation::today())
            .into_iter()
            .map(|e| e.into())
            .collect()
    }

    /// Book an appointment.
    pub fn book(&self, form: FfiAppointmentForm) -> Result<FfiBookingResult, ClinicError> {
        let mut flow = self.flow.lock()?;
        let outcome = flow.submit(&form.into())?;
        Ok(outcome.into())
    }

    /// Refresh from the record store; serves the mirror when unreachable.
    pub fn list_appointments(&self) -> Result<Vec<FfiAppointment>, ClinicError> {
        let mut flow = self.flow.lock()?;
        let items = flow.store_mut().list()?;
        Ok(items.into_iter().map(|a| a.into()).collect())
    }

    /// Current mirror without a remote round-trip.
    pub fn cached_appointments(&self) -> Result<Vec<FfiAppointment>, ClinicError> {
        let flow = self.flow.lock()?;
        Ok(flow.store().cached().iter().cloned().map(|a| a.into()).collect())
    }

    /// Edit an appointment.
    pub fn update_appointment(
        &self,
        key: FfiRecordKey,
        form: FfiAppointmentForm,
    ) -> Result<FfiAppointment, ClinicError> {
        let mut flow = self.flow.lock()?;
        let updated = flow.update(&key.into(), &form.into())?;
        Ok(updated.into())
    }

    /// Delete an appointment.
    pub fn delete_appointment(&self, key: FfiRecordKey) -> Result<FfiDeleteOutcome, ClinicError> {
        let mut flow = self.flow.lock()?;
        let outcome = flow.store_mut().delete(&key.into())?;
        Ok(outcome.into())
    }

    /// Push local-only appointments to the record store.
    pub fn sync_pending(&self) -> Result<FfiSyncReport, ClinicError> {
        let mut flow = self.flow.lock()?;
        Ok(flow.store_mut().sync_pending()?.into())
    }

    /// Check if any appointment has not reached the record store.
    pub fn has_unsynced_changes(&self) -> Result<bool, ClinicError> {
        let flow = self.flow.lock()?;
        Ok(flow.store().has_unsynced_changes())
    }

    // =========================================================================
    // EHR Operations
    // =========================================================================

    /// Appointments passing the filter, in collection order.
    pub fn query(&self, filter: FfiFilter) -> Result<Vec<FfiAppointment>, ClinicError> {
        let flow = self.flow.lock()?;
        let rows = Self::rows(&flow, Some(filter))?;
        Ok(rows.into_iter().map(|a| a.into()).collect())
    }

    /// Aggregate counts over the whole collection, or over the filtered subset.
    pub fn summary(&self, filter: Option<FfiFilter>) -> Result<FfiSummary, ClinicError> {
        let flow = self.flow.lock()?;
        let rows = Self::rows(&flow, filter)?;
        Ok(ehr::summary(&rows, validation::today()).into())
    }

    /// CSV export of the whole collection, or of the filtered subset.
    pub fn export_csv(&self, filter: Option<FfiFilter>) -> Result<Vec<u8>, ClinicError> {
        let flow = self.flow.lock()?;
        let rows = Self::rows(&flow, filter)?;
        Ok(export::export_csv(&rows))
    }
}

// =========================================================================
// FFI Types
// =========================================================================

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDoctor {
    pub id: Option<String>,
    pub name: String,
    pub specialty: String,
    pub image_ref: Option<String>,
    pub diseases: Vec<String>,
}

impl From<Doctor> for FfiDoctor {
    fn from(doctor: Doctor) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name,
            specialty: doctor.specialty,
            image_ref: doctor.image_ref,
            diseases: doctor.diseases,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDoctorChoices {
    pub doctors: Vec<FfiDoctor>,
    pub exact_match: bool,
    pub notice: Option<String>,
}

impl From<DoctorChoices> for FfiDoctorChoices {
    fn from(choices: DoctorChoices) -> Self {
        let notice = choices.notice().map(String::from);
        Self {
            doctors: choices.doctors.into_iter().map(|d| d.into()).collect(),
            exact_match: choices.exact_match,
            notice,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiDirectorySource {
    Remote,
    Fallback,
}

impl From<DirectorySource> for FfiDirectorySource {
    fn from(source: DirectorySource) -> Self {
        match source {
            DirectorySource::Remote => FfiDirectorySource::Remote,
            DirectorySource::Fallback => FfiDirectorySource::Fallback,
        }
    }
}

/// Booking form as typed by the user.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiAppointmentForm {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub disease: String,
    pub doctor: String,
    pub appointment_date: String,
    pub notes: String,
}

impl From<FfiAppointmentForm> for AppointmentForm {
    fn from(form: FfiAppointmentForm) -> Self {
        Self {
            name: form.name,
            age: form.age,
            gender: form.gender,
            disease: form.disease,
            doctor: form.doctor,
            appointment_date: form.appointment_date,
            notes: form.notes,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFieldError {
    pub field: String,
    pub kind: String,
    pub message: String,
}

impl From<FieldError> for FfiFieldError {
    fn from(error: FieldError) -> Self {
        Self {
            field: error.field.as_str().to_string(),
            kind: format!("{:?}", error.kind),
            message: error.message,
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointment {
    pub id: Option<String>,
    pub temp_id: Option<String>,
    pub name: String,
    pub age: f64,
    pub gender: String,
    pub disease: String,
    pub doctor: String,
    /// ISO-8601 UTC midnight of the appointment day
    pub appointment_date: String,
    pub notes: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<Appointment> for FfiAppointment {
    fn from(appointment: Appointment) -> Self {
        Self {
            id: appointment.id,
            temp_id: appointment.temp_id,
            name: appointment.name,
            age: appointment.age,
            gender: appointment.gender.as_str().to_string(),
            disease: appointment.disease,
            doctor: appointment.doctor,
            appointment_date: format_calendar_date(appointment.appointment_date),
            notes: appointment.notes,
            created_at: appointment.created_at,
            updated_at: appointment.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum FfiRecordKey {
    Remote { id: String },
    Local { temp_id: String },
}

impl From<FfiRecordKey> for RecordKey {
    fn from(key: FfiRecordKey) -> Self {
        match key {
            FfiRecordKey::Remote { id } => RecordKey::Remote(id),
            FfiRecordKey::Local { temp_id } => RecordKey::Local(temp_id),
        }
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBookingResult {
    pub appointment: FfiAppointment,
    pub saved_locally: bool,
    pub message: String,
}

impl From<CreateOutcome> for FfiBookingResult {
    fn from(outcome: CreateOutcome) -> Self {
        let saved_locally = outcome.is_local();
        let message = outcome.message().to_string();
        let appointment = match outcome {
            CreateOutcome::Saved(a) | CreateOutcome::SavedLocally(a) => a,
        };
        Self {
            appointment: appointment.into(),
            saved_locally,
            message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiDeleteOutcome {
    Deleted,
    DeletedLocally,
}

impl From<DeleteOutcome> for FfiDeleteOutcome {
    fn from(outcome: DeleteOutcome) -> Self {
        match outcome {
            DeleteOutcome::Deleted => FfiDeleteOutcome::Deleted,
            DeleteOutcome::DeletedLocally => FfiDeleteOutcome::DeletedLocally,
        }
    }
}

#[derive(Debug, Clone, Copy, uniffi::Record)]
pub struct FfiSyncReport {
    pub synced: u32,
    pub rejected: u32,
    pub pending: u32,
}

impl From<SyncReport> for FfiSyncReport {
    fn from(report: SyncReport) -> Self {
        Self {
            synced: report.synced as u32,
            rejected: report.rejected as u32,
            pending: report.pending as u32,
        }
    }
}

/// EHR filter. `"All"` disables a criterion.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiFilter {
    pub search_text: String,
    pub disease_filter: String,
    pub doctor_filter: String,
    /// `"All"`, `"Today"`, `"Upcoming"` or `"Past"`
    pub date_bucket: String,
}

impl TryFrom<FfiFilter> for FilterSpec {
    type Error = ClinicError;

    fn try_from(filter: FfiFilter) -> Result<Self, Self::Error> {
        let date_bucket = match filter.date_bucket.as_str() {
            ehr::ALL | "" => None,
            other => Some(DateBucket::parse(other).ok_or_else(|| {
                ClinicError::InvalidInput(format!("Invalid date bucket: {}", other))
            })?),
        };
        Ok(FilterSpec {
            search_text: filter.search_text,
            disease_filter: Selection::from(filter.disease_filter),
            doctor_filter: Selection::from(filter.doctor_filter),
            date_bucket,
        })
    }
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCount {
    pub key: String,
    pub count: u32,
}

#[derive(Debug, Clone, Copy, uniffi::Record)]
pub struct FfiBucketCounts {
    pub today: u32,
    pub upcoming: u32,
    pub past: u32,
}

#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSummary {
    pub total: u32,
    pub upcoming: u32,
    pub by_disease: Vec<FfiCount>,
    pub by_doctor: Vec<FfiCount>,
    pub by_bucket: FfiBucketCounts,
}

fn ffi_counts(tally: &ehr::Tally) -> Vec<FfiCount> {
    tally
        .entries()
        .iter()
        .map(|(key, count)| FfiCount {
            key: key.clone(),
            count: *count as u32,
        })
        .collect()
}

impl From<Summary> for FfiSummary {
    fn from(summary: Summary) -> Self {
        Self {
            total: summary.total as u32,
            upcoming: summary.upcoming as u32,
            by_disease: ffi_counts(&summary.by_disease),
            by_doctor: ffi_counts(&summary.by_doctor),
            by_bucket: FfiBucketCounts {
                today: summary.by_bucket.today as u32,
                upcoming: summary.by_bucket.upcoming as u32,
                past: summary.by_bucket.past as u32,
            },
        }
    }
}
