//! Remote record store: the authoritative home of doctors and appointments.
//!
//! REST surface:
//! - `GET /doctors?disease=<name>`
//! - `POST /appointments`, `GET /appointments`
//! - `PUT /appointments/:id`, `DELETE /appointments/:id`

mod http;
mod memory;

pub use http::*;
pub use memory::*;

use std::sync::Arc;

use thiserror::Error;

use crate::models::{Appointment, Doctor, NewAppointment};

/// Message the store returns for an unknown appointment ID.
pub const NOT_FOUND_MESSAGE: &str = "Appointment not found";

/// Remote record store errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RemoteError {
    #[error("Record store unreachable: {0}")]
    Unreachable(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Rejected by record store: {0}")]
    Rejected(String),

    #[error("Record store error ({status}): {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response from record store: {0}")]
    InvalidResponse(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl RemoteError {
    /// Check if the call never reached the store (network failure, timeout).
    pub fn is_unreachable(&self) -> bool {
        matches!(self, RemoteError::Unreachable(_))
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Operations the appointment store needs from the remote side.
pub trait RecordStore: Send + Sync {
    /// Doctors treating `disease` (case-insensitive exact), or all doctors.
    fn list_doctors(&self, disease: Option<&str>) -> RemoteResult<Vec<Doctor>>;

    /// Full appointment collection, ordered by appointment date ascending.
    fn list_appointments(&self) -> RemoteResult<Vec<Appointment>>;

    /// Insert an appointment; returns the record with its store-assigned ID.
    fn create_appointment(&self, payload: &NewAppointment) -> RemoteResult<Appointment>;

    /// Replace the payload of an existing appointment.
    fn update_appointment(&self, id: &str, payload: &NewAppointment) -> RemoteResult<Appointment>;

    /// Delete an appointment by ID.
    fn delete_appointment(&self, id: &str) -> RemoteResult<()>;
}

impl<T: RecordStore + ?Sized> RecordStore for Box<T> {
    fn list_doctors(&self, disease: Option<&str>) -> RemoteResult<Vec<Doctor>> {
        (**self).list_doctors(disease)
    }

    fn list_appointments(&self) -> RemoteResult<Vec<Appointment>> {
        (**self).list_appointments()
    }

    fn create_appointment(&self, payload: &NewAppointment) -> RemoteResult<Appointment> {
        (**self).create_appointment(payload)
    }

    fn update_appointment(&self, id: &str, payload: &NewAppointment) -> RemoteResult<Appointment> {
        (**self).update_appointment(id, payload)
    }

    fn delete_appointment(&self, id: &str) -> RemoteResult<()> {
        (**self).delete_appointment(id)
    }
}

impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    fn list_doctors(&self, disease: Option<&str>) -> RemoteResult<Vec<Doctor>> {
        (**self).list_doctors(disease)
    }

    fn list_appointments(&self) -> RemoteResult<Vec<Appointment>> {
        (**self).list_appointments()
    }

    fn create_appointment(&self, payload: &NewAppointment) -> RemoteResult<Appointment> {
        (**self).create_appointment(payload)
    }

    fn update_appointment(&self, id: &str, payload: &NewAppointment) -> RemoteResult<Appointment> {
        (**self).update_appointment(id, payload)
    }

    fn delete_appointment(&self, id: &str) -> RemoteResult<()> {
        (**self).delete_appointment(id)
    }
}
