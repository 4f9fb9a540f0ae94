//! Golden tests for the EHR query engine.
//!
//! A fixed five-record fixture with a pinned "today" and known expected output.

use chrono::NaiveDate;
use clinic_booking_core::ehr::{self, BucketCounts, DateBucket, FilterSpec};
use clinic_booking_core::export::export_csv;
use clinic_booking_core::models::{Appointment, Gender, NewAppointment};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 1, 15).unwrap()
}

fn record(
    name: &str,
    age: f64,
    gender: Gender,
    disease: &str,
    doctor: &str,
    date: (i32, u32, u32),
    notes: Option<&str>,
) -> Appointment {
    let mut appointment = Appointment::from_payload(NewAppointment {
        name: name.to_string(),
        age,
        gender,
        disease: disease.to_string(),
        doctor: doctor.to_string(),
        appointment_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
        notes: notes.map(String::from),
    });
    appointment.id = Some(format!("id-{}", name.to_lowercase()));
    appointment
}

fn fixture() -> Vec<Appointment> {
    vec![
        record("Alice", 30.0, Gender::Female, "Flu", "Dr. Emily Brown", (2030, 1, 20), None),
        record("Bob", 8.0, Gender::Male, "Flu", "Dr. Emily Brown", (2030, 1, 2), Some("cough")),
        record("Carol", 52.0, Gender::Female, "Hypertension", "Dr. Alice Smith", (2030, 1, 15), None),
        record("Dan", 19.0, Gender::Male, "Acne", "Dr. John Doe", (2030, 2, 1), Some("prefers \"mornings\"")),
        record("Erin", 5.0, Gender::Other, "Flu", "Dr. Emily Brown", (2030, 1, 15), None),
    ]
}

fn names(items: &[Appointment]) -> Vec<&str> {
    items.iter().map(|a| a.name.as_str()).collect()
}

struct GoldenCase {
    id: &'static str,
    filter: FilterSpec,
    expected: Vec<&'static str>,
}

fn get_golden_cases() -> Vec<GoldenCase> {
    vec![
        GoldenCase {
            id: "all",
            filter: FilterSpec::default(),
            expected: vec!["Alice", "Bob", "Carol", "Dan", "Erin"],
        },
        GoldenCase {
            id: "flu-upcoming",
            filter: FilterSpec::default().disease("Flu").bucket(DateBucket::Upcoming),
            expected: vec!["Alice", "Erin"],
        },
        GoldenCase {
            id: "today",
            filter: FilterSpec::default().bucket(DateBucket::Today),
            expected: vec!["Carol", "Erin"],
        },
        GoldenCase {
            id: "past",
            filter: FilterSpec::default().bucket(DateBucket::Past),
            expected: vec!["Bob"],
        },
        GoldenCase {
            id: "search-doctor-name",
            filter: FilterSpec::default().search("EMILY"),
            expected: vec!["Alice", "Bob", "Erin"],
        },
        GoldenCase {
            id: "search-disease-substring",
            filter: FilterSpec::default().search("tension"),
            expected: vec!["Carol"],
        },
        GoldenCase {
            id: "doctor-exact",
            filter: FilterSpec::default().doctor("Dr. John Doe"),
            expected: vec!["Dan"],
        },
        GoldenCase {
            id: "disease-is-case-sensitive",
            filter: FilterSpec::default().disease("flu"),
            expected: vec![],
        },
        GoldenCase {
            id: "all-sentinel",
            filter: FilterSpec::default().disease("All").doctor("All"),
            expected: vec!["Alice", "Bob", "Carol", "Dan", "Erin"],
        },
    ]
}

#[test]
fn test_golden_filters() {
    let items = fixture();
    for case in get_golden_cases() {
        let filtered = ehr::apply(&items, &case.filter, today());
        assert_eq!(names(&filtered), case.expected, "case {}", case.id);
    }
}

#[test]
fn test_aggregates_ignore_filter() {
    let items = fixture();
    let filter = FilterSpec::default().disease("Flu").bucket(DateBucket::Upcoming);
    let filtered = ehr::apply(&items, &filter, today());
    assert_eq!(filtered.len(), 2);

    let by_disease = ehr::count_by_disease(&items);
    assert_eq!(by_disease.total(), 5);
    assert_eq!(
        by_disease.entries(),
        &[
            ("Flu".to_string(), 3),
            ("Hypertension".to_string(), 1),
            ("Acne".to_string(), 1)
        ]
    );

    let by_doctor = ehr::count_by_doctor(&items);
    assert_eq!(by_doctor.get("Dr. Emily Brown"), 3);
    assert_eq!(by_doctor.entries()[1].0, "Dr. Alice Smith");
}

#[test]
fn test_bucket_histogram() {
    let counts = ehr::bucket_counts(&fixture(), today());
    assert_eq!(counts, BucketCounts { today: 2, upcoming: 2, past: 1 });

    let summary = ehr::summary(&fixture(), today());
    assert_eq!(summary.total, 5);
    assert_eq!(summary.upcoming, 4);
}

#[test]
fn test_golden_csv() {
    let items = fixture();
    let filter = FilterSpec::default().doctor("Dr. John Doe");
    let csv = export_csv(&ehr::apply(&items, &filter, today()));

    let expected = concat!(
        "\"name\",\"age\",\"gender\",\"disease\",\"doctor\",\"appointmentDate\",\"notes\"\n",
        "\"Dan\",\"19\",\"Male\",\"Acne\",\"Dr. John Doe\",\"2030-02-01T00:00:00.000Z\",\"prefers \"\"mornings\"\"\"\n",
    );
    assert_eq!(String::from_utf8(csv).unwrap(), expected);
}

#[test]
fn test_csv_is_byte_for_byte_reproducible() {
    let items = fixture();
    assert_eq!(export_csv(&items), export_csv(&items.clone()));
}
