//! Appointment store adapter.
//!
//! Single owner of the appointment collection. Every write goes to the remote
//! record store first; when the store cannot be reached the adapter falls back
//! to the durable local mirror so no booking is lost.
//!
//! | Operation | Remote unreachable                  | Remote says 404 |
//! |-----------|-------------------------------------|-----------------|
//! | create    | saved locally with a temporary ID   | n/a             |
//! | list      | cached mirror returned              | n/a             |
//! | update    | `StoreError::Unreachable` (warning) | `NotFound`      |
//! | delete    | removed locally anyway              | `NotFound`      |

mod reconcile;

pub use reconcile::*;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::db::{Database, DbError};
use crate::models::{Appointment, AppointmentForm, RecordKey};
use crate::remote::{RecordStore, RemoteError};
use crate::validation::{self, ValidationErrors};

/// Store adapter errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Appointment not found: {0}")]
    NotFound(String),

    #[error("Record store unreachable: {0}")]
    Unreachable(String),

    #[error("Rejected by record store: {0}")]
    Rejected(String),

    #[error("Unexpected failure: {0}")]
    Unexpected(String),

    #[error("Local cache error: {0}")]
    Cache(#[from] DbError),
}

impl StoreError {
    /// Degraded-connectivity conditions the caller shows as a warning.
    pub fn is_warning(&self) -> bool {
        matches!(self, StoreError::Unreachable(_))
    }
}

impl From<RemoteError> for StoreError {
    fn from(e: RemoteError) -> Self {
        match e {
            RemoteError::Unreachable(reason) => StoreError::Unreachable(reason),
            RemoteError::NotFound(message) => StoreError::NotFound(message),
            RemoteError::Rejected(message) => StoreError::Rejected(message),
            other => StoreError::Unexpected(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Result of a booking submission.
#[derive(Debug, Clone, PartialEq)]
pub enum CreateOutcome {
    /// Stored remotely; carries the store-assigned record
    Saved(Appointment),
    /// Store unreachable; kept in the local mirror under a temporary ID
    SavedLocally(Appointment),
}

impl CreateOutcome {
    pub fn appointment(&self) -> &Appointment {
        match self {
            CreateOutcome::Saved(a) | CreateOutcome::SavedLocally(a) => a,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, CreateOutcome::SavedLocally(_))
    }

    /// Status line for the booking form.
    pub fn message(&self) -> &'static str {
        match self {
            CreateOutcome::Saved(_) => "Appointment saved successfully.",
            CreateOutcome::SavedLocally(_) => "Backend not reachable. Saved locally.",
        }
    }
}

/// Result of a delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Store unreachable; removed from the local mirror only
    DeletedLocally,
}

/// Result of pushing local-only records to the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Records that received a store-assigned ID
    pub synced: usize,
    /// Records the store refused (e.g. their date has passed)
    pub rejected: usize,
    /// Local-only records remaining after the pass
    pub pending: usize,
}

/// Caller interest in an in-flight request.
///
/// Cancel it when the caller goes away; results that arrive afterwards are
/// discarded instead of applied.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Appointment store with remote-first writes and a durable local mirror.
pub struct AppointmentStore<R: RecordStore> {
    remote: R,
    db: Database,
    cache: Vec<Appointment>,
    policy: ReconcilePolicy,
}

impl<R: RecordStore> AppointmentStore<R> {
    /// Open the store, restoring the last persisted mirror before any remote call.
    pub fn open(remote: R, db: Database) -> StoreResult<Self> {
        let cache = db.load_appointments()?;
        debug!(count = cache.len(), "Restored appointment cache");
        Ok(Self {
            remote,
            db,
            cache,
            policy: ReconcilePolicy::default(),
        })
    }

    /// Use a different reconcile policy for `list`.
    pub fn with_policy(mut self, policy: ReconcilePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.policy
    }

    /// The remote record store.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Current mirror, in collection order, without a remote round-trip.
    pub fn cached(&self) -> &[Appointment] {
        &self.cache
    }

    /// Validate and book an appointment.
    pub fn create(&mut self, form: &AppointmentForm) -> StoreResult<CreateOutcome> {
        let payload = validation::parse(form, validation::today())?;

        let outcome = match self.remote.create_appointment(&payload) {
            Ok(created) => {
                info!(id = ?created.id, doctor = %created.doctor, "Appointment saved");
                CreateOutcome::Saved(created)
            }
            Err(e) => {
                warn!(error = %e, "Record store unavailable, saving appointment locally");
                CreateOutcome::SavedLocally(Appointment::local(payload))
            }
        };

        let mut next = self.cache.clone();
        next.push(outcome.appointment().clone());
        self.commit(next)?;
        Ok(outcome)
    }

    /// Fetch the authoritative collection, falling back to the mirror.
    pub fn list(&mut self) -> StoreResult<Vec<Appointment>> {
        let fetched = self.remote.list_appointments();
        self.apply_fetch(fetched)
    }

    /// Like [`list`](Self::list), but discards the fetched result if `token`
    /// was cancelled while the call was in flight.
    pub fn list_for(&mut self, token: &CancelToken) -> StoreResult<Option<Vec<Appointment>>> {
        let fetched = self.remote.list_appointments();
        if token.is_cancelled() {
            debug!("Discarding appointment list for cancelled caller");
            return Ok(None);
        }
        self.apply_fetch(fetched).map(Some)
    }

    /// Validate and apply an edit.
    pub fn update(&mut self, key: &RecordKey, form: &AppointmentForm) -> StoreResult<Appointment> {
        let payload = validation::parse(form, validation::today())?;
        let index = self.cache.iter().position(|a| a.matches(key));

        let updated = match key {
            RecordKey::Local(_) => {
                let i = index.ok_or_else(|| StoreError::NotFound(key.to_string()))?;
                let mut record = self.cache[i].clone();
                record.patch(payload);
                record
            }
            RecordKey::Remote(id) => {
                let updated = self.remote.update_appointment(id, &payload).map_err(|e| match e {
                    RemoteError::NotFound(_) => StoreError::NotFound(id.clone()),
                    other => {
                        warn!(id = %id, error = %other, "Appointment update failed");
                        StoreError::from(other)
                    }
                })?;
                info!(id = %id, "Appointment updated");
                updated
            }
        };

        let mut next = self.cache.clone();
        match index {
            Some(i) => next[i] = updated.clone(),
            None => next.push(updated.clone()),
        }
        self.commit(next)?;
        Ok(updated)
    }

    /// Delete a record remotely (when it has a store ID) and from the mirror.
    pub fn delete(&mut self, key: &RecordKey) -> StoreResult<DeleteOutcome> {
        let cached = self.cache.iter().any(|a| a.matches(key));

        let outcome = match key {
            RecordKey::Remote(id) => match self.remote.delete_appointment(id) {
                Ok(()) => DeleteOutcome::Deleted,
                Err(e) if e.is_unreachable() => {
                    warn!(id = %id, error = %e, "Record store unavailable, deleting locally");
                    DeleteOutcome::DeletedLocally
                }
                Err(RemoteError::NotFound(_)) if cached => DeleteOutcome::Deleted,
                Err(RemoteError::NotFound(_)) => return Err(StoreError::NotFound(id.clone())),
                Err(e) => return Err(e.into()),
            },
            RecordKey::Local(_) if cached => DeleteOutcome::Deleted,
            RecordKey::Local(_) => return Err(StoreError::NotFound(key.to_string())),
        };

        let mut next = self.cache.clone();
        next.retain(|a| !a.matches(key));
        self.commit(next)?;
        Ok(outcome)
    }

    /// Push every local-only record to the store.
    ///
    /// Stops at the first unreachable response; records the store refuses stay
    /// local and are counted as rejected.
    pub fn sync_pending(&mut self) -> StoreResult<SyncReport> {
        let mut report = SyncReport::default();
        let mut next = self.cache.clone();

        for slot in next.iter_mut().filter(|a| a.is_local_only()) {
            match self.remote.create_appointment(&slot.payload()) {
                Ok(created) => {
                    info!(temp_id = ?slot.temp_id, id = ?created.id, "Synced local appointment");
                    *slot = created;
                    report.synced += 1;
                }
                Err(e) if e.is_unreachable() => {
                    warn!(error = %e, "Record store unavailable, sync postponed");
                    break;
                }
                Err(e) => {
                    warn!(temp_id = ?slot.temp_id, error = %e, "Record store refused local appointment");
                    report.rejected += 1;
                }
            }
        }

        report.pending = next.iter().filter(|a| a.is_local_only()).count();
        if report.synced > 0 {
            self.commit(next)?;
        }
        Ok(report)
    }

    /// Check if any record has not reached the store yet.
    pub fn has_unsynced_changes(&self) -> bool {
        self.cache.iter().any(|a| a.is_local_only())
    }

    fn apply_fetch(
        &mut self,
        fetched: Result<Vec<Appointment>, RemoteError>,
    ) -> StoreResult<Vec<Appointment>> {
        match fetched {
            Ok(items) => {
                info!(count = items.len(), "Fetched appointments");
                let next = reconcile(&self.cache, items, self.policy);
                self.commit(next)?;
                Ok(self.cache.clone())
            }
            Err(e) => {
                warn!(error = %e, "Record store unavailable, serving cached appointments");
                let mut items = self.cache.clone();
                sort_by_date(&mut items);
                Ok(items)
            }
        }
    }

    /// Persist `next`, then make it the mirror. Nothing changes if persisting fails.
    fn commit(&mut self, next: Vec<Appointment>) -> StoreResult<()> {
        self.db.save_appointments(&next)?;
        debug!(count = next.len(), "Persisted appointment cache");
        self.cache = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::InMemoryRecordStore;
    use chrono::Duration;

    fn form(days_ahead: i64) -> AppointmentForm {
        AppointmentForm {
            name: "Jane".into(),
            age: "34".into(),
            gender: "Female".into(),
            disease: "Acne".into(),
            doctor: "Dr. John Doe".into(),
            appointment_date: (validation::today() + Duration::days(days_ahead))
                .format("%Y-%m-%d")
                .to_string(),
            notes: String::new(),
        }
    }

    fn setup() -> (Arc<InMemoryRecordStore>, AppointmentStore<Arc<InMemoryRecordStore>>) {
        let remote = Arc::new(InMemoryRecordStore::new());
        let store = AppointmentStore::open(remote.clone(), Database::open_in_memory().unwrap())
            .unwrap();
        (remote, store)
    }

    #[test]
    fn test_create_saved_remotely() {
        let (remote, mut store) = setup();
        let outcome = store.create(&form(1)).unwrap();
        assert!(!outcome.is_local());
        assert!(outcome.appointment().id.is_some());
        assert_eq!(store.cached().len(), 1);
        assert_eq!(remote.appointments().len(), 1);
    }

    #[test]
    fn test_create_invalid_never_reaches_remote() {
        let (remote, mut store) = setup();
        let err = store.create(&form(-1)).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(remote.appointments().is_empty());
        assert!(store.cached().is_empty());
    }

    #[test]
    fn test_create_offline_saves_locally() {
        let (remote, mut store) = setup();
        remote.set_reachable(false);

        let outcome = store.create(&form(1)).unwrap();
        assert!(outcome.is_local());
        assert_eq!(outcome.message(), "Backend not reachable. Saved locally.");
        assert!(outcome.appointment().temp_id.is_some());
        assert!(store.has_unsynced_changes());
    }

    #[test]
    fn test_list_offline_serves_cache() {
        let (remote, mut store) = setup();
        store.create(&form(3)).unwrap();
        store.create(&form(1)).unwrap();
        remote.set_reachable(false);

        let items = store.list().unwrap();
        assert_eq!(items.len(), 2);
        assert!(items[0].appointment_date < items[1].appointment_date);
    }

    #[test]
    fn test_list_cancelled_discards_result() {
        let (remote, mut store) = setup();
        remote.create_appointment(&validation::parse(&form(1), validation::today()).unwrap())
            .unwrap();

        let token = CancelToken::new();
        token.cancel();
        assert_eq!(store.list_for(&token).unwrap(), None);
        assert!(store.cached().is_empty());

        let live = CancelToken::new();
        assert_eq!(store.list_for(&live).unwrap().map(|v| v.len()), Some(1));
    }

    #[test]
    fn test_update_local_only_in_place() {
        let (remote, mut store) = setup();
        remote.set_reachable(false);
        let created = store.create(&form(1)).unwrap();
        let key = created.appointment().key().unwrap();

        let mut edit = form(2);
        edit.notes = "bring records".into();
        let updated = store.update(&key, &edit).unwrap();
        assert_eq!(updated.temp_id, created.appointment().temp_id);
        assert_eq!(store.cached()[0].notes, Some("bring records".into()));
    }

    #[test]
    fn test_update_revalidates() {
        let (_remote, mut store) = setup();
        let created = store.create(&form(1)).unwrap();
        let key = created.appointment().key().unwrap();
        let err = store.update(&key, &form(-3)).unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.cached()[0], *created.appointment());
    }

    #[test]
    fn test_update_unknown_remote_id() {
        let (_remote, mut store) = setup();
        store.create(&form(1)).unwrap();
        let before = store.cached().to_vec();

        let err = store
            .update(&RecordKey::Remote("missing".into()), &form(2))
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert_eq!(store.cached(), before.as_slice());
    }

    #[test]
    fn test_update_unreachable_is_warning() {
        let (remote, mut store) = setup();
        let created = store.create(&form(1)).unwrap();
        remote.set_reachable(false);

        let err = store
            .update(&created.appointment().key().unwrap(), &form(2))
            .unwrap_err();
        assert!(err.is_warning());
        assert_eq!(store.cached()[0], *created.appointment());
    }

    #[test]
    fn test_delete_offline_still_removes_locally() {
        let (remote, mut store) = setup();
        let created = store.create(&form(1)).unwrap();
        remote.set_reachable(false);

        let outcome = store.delete(&created.appointment().key().unwrap()).unwrap();
        assert_eq!(outcome, DeleteOutcome::DeletedLocally);
        assert!(store.cached().is_empty());
    }

    #[test]
    fn test_delete_unknown() {
        let (_remote, mut store) = setup();
        assert!(matches!(
            store.delete(&RecordKey::Remote("missing".into())),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete(&RecordKey::Local("missing".into())),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_update_unknown_local_key() {
        let (remote, mut store) = setup();
        remote.set_reachable(false);
        store.create(&form(1)).unwrap();
        let before = store.cached().to_vec();

        let result = store.update(&RecordKey::Local("missing".into()), &form(3));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert_eq!(store.cached(), before.as_slice());
        assert!(remote.appointments().is_empty());
    }

    #[test]
    fn test_sync_pending() {
        let (remote, mut store) = setup();
        remote.set_reachable(false);
        store.create(&form(1)).unwrap();
        store.create(&form(2)).unwrap();

        let report = store.sync_pending().unwrap();
        assert_eq!(report, SyncReport { synced: 0, rejected: 0, pending: 2 });

        remote.set_reachable(true);
        let report = store.sync_pending().unwrap();
        assert_eq!(report, SyncReport { synced: 2, rejected: 0, pending: 0 });
        assert!(!store.has_unsynced_changes());
        assert_eq!(remote.appointments().len(), 2);
    }

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            StoreError::from(RemoteError::Status { status: 500, message: "boom".into() }),
            StoreError::Unexpected(_)
        ));
        assert!(StoreError::from(RemoteError::Unreachable("x".into())).is_warning());
    }
}
