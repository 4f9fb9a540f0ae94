//! EHR query engine.
//!
//! Pure functions over an appointment collection: filtering, grouped counts
//! and the date histogram. Callers pass "today" so results are reproducible.

mod aggregate;
mod filter;

pub use aggregate::*;
pub use filter::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Appointment, Gender, NewAppointment};
    use chrono::{Duration, NaiveDate};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 6, 10).unwrap()
    }

    fn record(name: &str, disease: &str, doctor: &str, offset: i64) -> Appointment {
        Appointment::from_payload(NewAppointment {
            name: name.into(),
            age: 40.0,
            gender: Gender::Other,
            disease: disease.into(),
            doctor: doctor.into(),
            appointment_date: today() + Duration::days(offset),
            notes: None,
        })
    }

    fn fixture() -> Vec<Appointment> {
        vec![
            record("Ann", "Flu", "Dr. Emily Brown", 2),
            record("Ben", "Flu", "Dr. Emily Brown", -3),
            record("Cal", "Acne", "Dr. John Doe", 0),
            record("Dee", "Flu", "Dr. Emily Brown", 0),
            record("Eve", "Hypertension", "Dr. Alice Smith", 7),
        ]
    }

    fn names(items: &[Appointment]) -> Vec<&str> {
        items.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn test_default_filter_passes_everything() {
        let items = fixture();
        assert_eq!(apply(&items, &FilterSpec::default(), today()), items);
    }

    #[test]
    fn test_search_is_case_insensitive_over_three_fields() {
        let items = fixture();
        let by_name = apply(&items, &FilterSpec::default().search("eVe"), today());
        assert_eq!(names(&by_name), vec!["Eve"]);

        let by_doctor = apply(&items, &FilterSpec::default().search("john"), today());
        assert_eq!(names(&by_doctor), vec!["Cal"]);

        let by_disease = apply(&items, &FilterSpec::default().search("tens"), today());
        assert_eq!(names(&by_disease), vec!["Eve"]);
    }

    #[test]
    fn test_disease_and_bucket() {
        let items = fixture();
        let filter = FilterSpec::default().disease("Flu").bucket(DateBucket::Upcoming);
        assert_eq!(names(&apply(&items, &filter, today())), vec!["Ann", "Dee"]);
    }

    #[test]
    fn test_doctor_and_past() {
        let items = fixture();
        let filter = FilterSpec::default()
            .doctor("Dr. Emily Brown")
            .bucket(DateBucket::Past);
        assert_eq!(names(&apply(&items, &filter, today())), vec!["Ben"]);
    }

    #[test]
    fn test_summary() {
        let summary = summary(&fixture(), today());
        assert_eq!(summary.total, 5);
        assert_eq!(summary.upcoming, 4);
        assert_eq!(summary.by_disease.get("Flu"), 3);
        assert_eq!(summary.by_doctor.entries()[0], ("Dr. Emily Brown".to_string(), 3));
        assert_eq!(
            summary.by_bucket,
            BucketCounts { today: 2, upcoming: 2, past: 1 }
        );
    }
}
