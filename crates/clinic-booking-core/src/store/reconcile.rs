//! Reconciling a fetched collection with the local mirror.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::Appointment;

/// What happens to the local mirror when a fresh collection arrives.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum ReconcilePolicy {
    /// Take the fetched collection and keep local-only records on top of it.
    #[default]
    MergeById,
    /// Take the fetched collection verbatim, dropping unsynced local records.
    Replace,
}

impl FromStr for ReconcilePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "merge" | "merge_by_id" => Ok(ReconcilePolicy::MergeById),
            "replace" => Ok(ReconcilePolicy::Replace),
            other => Err(format!(
                "Invalid reconcile policy: '{}'. Must be one of: merge, replace",
                other
            )),
        }
    }
}

/// Build the new mirror from the current one and a fetched collection.
///
/// The result is ordered by appointment date; ties keep fetched records
/// ahead of local-only ones.
pub fn reconcile(
    cache: &[Appointment],
    fetched: Vec<Appointment>,
    policy: ReconcilePolicy,
) -> Vec<Appointment> {
    let mut merged = fetched;
    if policy == ReconcilePolicy::MergeById {
        merged.extend(cache.iter().filter(|a| a.is_local_only()).cloned());
    }
    sort_by_date(&mut merged);
    merged
}

/// Stable sort by appointment date ascending.
pub fn sort_by_date(appointments: &mut [Appointment]) {
    appointments.sort_by_key(|a| a.appointment_date);
}
