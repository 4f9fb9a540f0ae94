//! In-process record store with the same semantics as the clinic server.
//!
//! Used for offline demos and tests; can be switched unreachable to exercise
//! the local fallback paths.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use super::{RecordStore, RemoteError, RemoteResult, NOT_FOUND_MESSAGE};
use crate::models::{default_doctors, Appointment, AppointmentForm, Doctor, NewAppointment};
use crate::validation::{self, ValidationErrors};

struct MemoryState {
    doctors: Vec<Doctor>,
    appointments: Vec<Appointment>,
    reachable: bool,
}

/// Record store held in memory.
pub struct InMemoryRecordStore {
    state: Mutex<MemoryState>,
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRecordStore {
    /// Create a store seeded with the default doctor directory.
    pub fn new() -> Self {
        let store = Self::empty();
        if let Ok(mut state) = store.state.lock() {
            seed_doctors(&mut state);
        }
        store
    }

    /// Create a store with no doctors and no appointments.
    pub fn empty() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                doctors: Vec::new(),
                appointments: Vec::new(),
                reachable: true,
            }),
        }
    }

    /// Seed the default directory if no doctors exist yet.
    pub fn seed_doctors_if_empty(&self) -> RemoteResult<bool> {
        let mut state = self.lock()?;
        if !state.doctors.is_empty() {
            return Ok(false);
        }
        seed_doctors(&mut state);
        Ok(true)
    }

    /// Simulate network loss (`false`) or recovery (`true`).
    pub fn set_reachable(&self, reachable: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.reachable = reachable;
        }
    }

    /// Insert a record as-is, bypassing validation (fixtures, imports).
    pub fn insert_raw(&self, mut appointment: Appointment) -> RemoteResult<Appointment> {
        let mut state = self.lock()?;
        if appointment.id.is_none() {
            appointment.id = Some(new_object_id());
        }
        appointment.temp_id = None;
        state.appointments.push(appointment.clone());
        Ok(appointment)
    }

    /// Snapshot of stored appointments in insertion order.
    pub fn appointments(&self) -> Vec<Appointment> {
        self.state
            .lock()
            .map(|s| s.appointments.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> RemoteResult<MutexGuard<'_, MemoryState>> {
        self.state.lock().map_err(|_| RemoteError::Status {
            status: 500,
            message: "In-memory store lock poisoned".into(),
        })
    }

    /// Lock the state, failing as a network error would when unreachable.
    fn connect(&self) -> RemoteResult<MutexGuard<'_, MemoryState>> {
        let state = self.lock()?;
        if !state.reachable {
            return Err(RemoteError::Unreachable("in-memory store offline".into()));
        }
        Ok(state)
    }
}

impl RecordStore for InMemoryRecordStore {
    fn list_doctors(&self, disease: Option<&str>) -> RemoteResult<Vec<Doctor>> {
        let state = self.connect()?;
        Ok(match disease {
            Some(disease) => state
                .doctors
                .iter()
                .filter(|d| d.treats(disease))
                .cloned()
                .collect(),
            None => state.doctors.clone(),
        })
    }

    fn list_appointments(&self) -> RemoteResult<Vec<Appointment>> {
        let state = self.connect()?;
        let mut items = state.appointments.clone();
        items.sort_by_key(|a| a.appointment_date);
        Ok(items)
    }

    fn create_appointment(&self, payload: &NewAppointment) -> RemoteResult<Appointment> {
        let mut state = self.connect()?;
        revalidate(payload)?;

        let now = Utc::now().to_rfc3339();
        let mut created = Appointment::from_payload(payload.clone());
        created.id = Some(new_object_id());
        created.created_at = Some(now.clone());
        created.updated_at = Some(now);

        state.appointments.push(created.clone());
        Ok(created)
    }

    fn update_appointment(&self, id: &str, payload: &NewAppointment) -> RemoteResult<Appointment> {
        let mut state = self.connect()?;
        revalidate(payload)?;

        let existing = state
            .appointments
            .iter_mut()
            .find(|a| a.id.as_deref() == Some(id))
            .ok_or_else(|| RemoteError::NotFound(NOT_FOUND_MESSAGE.into()))?;
        existing.patch(payload.clone());
        Ok(existing.clone())
    }

    fn delete_appointment(&self, id: &str) -> RemoteResult<()> {
        let mut state = self.connect()?;
        let before = state.appointments.len();
        state.appointments.retain(|a| a.id.as_deref() != Some(id));
        if state.appointments.len() == before {
            return Err(RemoteError::NotFound(NOT_FOUND_MESSAGE.into()));
        }
        Ok(())
    }
}

fn seed_doctors(state: &mut MemoryState) {
    state.doctors = default_doctors()
        .into_iter()
        .map(|mut d| {
            d.id = Some(new_object_id());
            d
        })
        .collect();
}

/// The server re-runs validation on every write.
fn revalidate(payload: &NewAppointment) -> RemoteResult<()> {
    let errors = validation::validate(&AppointmentForm::from(payload), validation::today());
    if errors.is_empty() {
        Ok(())
    } else {
        Err(RemoteError::Rejected(ValidationErrors(errors).to_string()))
    }
}

fn new_object_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
