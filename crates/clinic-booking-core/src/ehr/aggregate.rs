//! Grouped counts over an appointment collection.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::filter::DateBucket;
use crate::models::Appointment;

/// Key → count mapping that remembers first-seen key order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    entries: Vec<(String, usize)>,
}

impl Tally {
    /// Count `keys` in order of first appearance.
    pub fn count<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        let mut entries: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<&'a str, usize> = HashMap::new();

        for key in keys {
            match index.get(key) {
                Some(&i) => entries[i].1 += 1,
                None => {
                    index.insert(key, entries.len());
                    entries.push((key.to_string(), 1));
                }
            }
        }

        Self { entries }
    }

    /// Count for `key`, zero if never seen.
    pub fn get(&self, key: &str) -> usize {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map_or(0, |(_, n)| *n)
    }

    pub fn entries(&self) -> &[(String, usize)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, n)| n).sum()
    }
}

/// Date histogram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketCounts {
    pub today: usize,
    pub upcoming: usize,
    pub past: usize,
}

impl BucketCounts {
    pub fn get(&self, bucket: DateBucket) -> usize {
        match bucket {
            DateBucket::Today => self.today,
            DateBucket::Upcoming => self.upcoming,
            DateBucket::Past => self.past,
        }
    }

    pub fn total(&self) -> usize {
        self.today + self.upcoming + self.past
    }
}

/// Aggregations shown above the EHR table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Number of appointments
    pub total: usize,
    /// Appointments dated today or later
    pub upcoming: usize,
    pub by_disease: Tally,
    pub by_doctor: Tally,
    pub by_bucket: BucketCounts,
}

pub fn count_by_disease(appointments: &[Appointment]) -> Tally {
    Tally::count(appointments.iter().map(|a| a.disease.as_str()))
}

pub fn count_by_doctor(appointments: &[Appointment]) -> Tally {
    Tally::count(appointments.iter().map(|a| a.doctor.as_str()))
}

/// Partition appointments into today / strictly after / strictly before.
pub fn bucket_counts(appointments: &[Appointment], today: NaiveDate) -> BucketCounts {
    appointments
        .iter()
        .fold(BucketCounts::default(), |mut counts, a| {
            match DateBucket::of(a.appointment_date, today) {
                DateBucket::Today => counts.today += 1,
                DateBucket::Upcoming => counts.upcoming += 1,
                DateBucket::Past => counts.past += 1,
            }
            counts
        })
}

pub fn summary(appointments: &[Appointment], today: NaiveDate) -> Summary {
    let by_bucket = bucket_counts(appointments, today);
    Summary {
        total: appointments.len(),
        upcoming: by_bucket.today + by_bucket.upcoming,
        by_disease: count_by_disease(appointments),
        by_doctor: count_by_doctor(appointments),
        by_bucket,
    }
}
