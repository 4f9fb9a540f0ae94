//! Filter specification for the EHR view.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::Appointment;

/// Sentinel value meaning "no restriction".
pub const ALL: &str = "All";

/// Either no restriction or an exact value to match.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selection {
    #[default]
    All,
    Only(String),
}

impl Selection {
    /// Check if `value` passes this selection (exact, case-sensitive).
    pub fn admits(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        if value == ALL {
            Selection::All
        } else {
            Selection::Only(value.to_string())
        }
    }
}

impl From<String> for Selection {
    fn from(value: String) -> Self {
        Selection::from(value.as_str())
    }
}

impl From<Selection> for String {
    fn from(selection: Selection) -> Self {
        match selection {
            Selection::All => ALL.to_string(),
            Selection::Only(value) => value,
        }
    }
}

/// Calendar position of an appointment relative to today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DateBucket {
    Today,
    Upcoming,
    Past,
}

impl DateBucket {
    /// Partition bucket: `Today` equal, `Upcoming` strictly after, `Past` strictly before.
    pub fn of(date: NaiveDate, today: NaiveDate) -> Self {
        if date == today {
            DateBucket::Today
        } else if date > today {
            DateBucket::Upcoming
        } else {
            DateBucket::Past
        }
    }

    /// Filter rule. Unlike [`of`](Self::of), `Upcoming` includes today.
    pub fn admits(&self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            DateBucket::Today => date == today,
            DateBucket::Upcoming => date >= today,
            DateBucket::Past => date < today,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Today" => Some(DateBucket::Today),
            "Upcoming" => Some(DateBucket::Upcoming),
            "Past" => Some(DateBucket::Past),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DateBucket::Today => "Today",
            DateBucket::Upcoming => "Upcoming",
            DateBucket::Past => "Past",
        }
    }
}

/// EHR query input. Not persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    /// Case-insensitive substring over name, disease and doctor; empty passes
    pub search_text: String,
    pub disease_filter: Selection,
    pub doctor_filter: Selection,
    /// `None` means "All"
    #[serde(with = "bucket_or_all")]
    pub date_bucket: Option<DateBucket>,
}

impl FilterSpec {
    pub fn search(mut self, text: &str) -> Self {
        self.search_text = text.to_string();
        self
    }

    pub fn disease(mut self, disease: &str) -> Self {
        self.disease_filter = Selection::from(disease);
        self
    }

    pub fn doctor(mut self, doctor: &str) -> Self {
        self.doctor_filter = Selection::from(doctor);
        self
    }

    pub fn bucket(mut self, bucket: DateBucket) -> Self {
        self.date_bucket = Some(bucket);
        self
    }

    /// Check if an appointment passes every criterion.
    pub fn admits(&self, appointment: &Appointment, today: NaiveDate) -> bool {
        self.matches_search(appointment)
            && self.disease_filter.admits(&appointment.disease)
            && self.doctor_filter.admits(&appointment.doctor)
            && self
                .date_bucket
                .map_or(true, |b| b.admits(appointment.appointment_date, today))
    }

    fn matches_search(&self, appointment: &Appointment) -> bool {
        let needle = self.search_text.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&appointment.name, &appointment.disease, &appointment.doctor]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// `"All"` on the wire, `None` in memory.
mod bucket_or_all {
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::{DateBucket, ALL};

    pub fn serialize<S: Serializer>(bucket: &Option<DateBucket>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(bucket.map_or(ALL, |b| b.as_str()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateBucket>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref() {
            None | Some(ALL) => Ok(None),
            Some(value) => DateBucket::parse(value)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid date bucket: {}", value))),
        }
    }
}

/// Appointments passing `filter`, in input order.
pub fn apply(appointments: &[Appointment], filter: &FilterSpec, today: NaiveDate) -> Vec<Appointment> {
    appointments
        .iter()
        .filter(|a| filter.admits(a, today))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 6, d).unwrap()
    }

    #[test]
    fn test_bucket_of_partitions() {
        let today = day(10);
        assert_eq!(DateBucket::of(day(10), today), DateBucket::Today);
        assert_eq!(DateBucket::of(day(11), today), DateBucket::Upcoming);
        assert_eq!(DateBucket::of(day(9), today), DateBucket::Past);
    }

    #[test]
    fn test_upcoming_filter_includes_today() {
        let today = day(10);
        assert!(DateBucket::Upcoming.admits(day(10), today));
        assert!(DateBucket::Upcoming.admits(day(20), today));
        assert!(!DateBucket::Upcoming.admits(day(9), today));
        assert!(!DateBucket::Past.admits(day(10), today));
    }

    #[test]
    fn test_selection_all_sentinel() {
        assert_eq!(Selection::from("All"), Selection::All);
        assert_eq!(Selection::from("Flu"), Selection::Only("Flu".into()));
        assert!(Selection::All.admits("anything"));
        assert!(!Selection::from("Flu").admits("flu"));
    }

    #[test]
    fn test_filter_spec_wire_format() {
        let spec: FilterSpec = serde_json::from_str(
            r#"{"searchText":"jane","diseaseFilter":"All","doctorFilter":"Dr. John Doe","dateBucket":"Upcoming"}"#,
        )
        .unwrap();
        assert_eq!(spec.disease_filter, Selection::All);
        assert_eq!(spec.doctor_filter, Selection::Only("Dr. John Doe".into()));
        assert_eq!(spec.date_bucket, Some(DateBucket::Upcoming));

        let all: FilterSpec = serde_json::from_str(r#"{"dateBucket":"All"}"#).unwrap();
        assert_eq!(all.date_bucket, None);
        assert_eq!(serde_json::to_value(&all).unwrap()["dateBucket"], "All");

        let empty: FilterSpec = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, FilterSpec::default());
        assert!(serde_json::from_str::<FilterSpec>(r#"{"dateBucket":"Later"}"#).is_err());
    }
}
