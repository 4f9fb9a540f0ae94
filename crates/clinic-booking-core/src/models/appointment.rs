//! Appointment models: raw booking form, validated payload, stored record.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Patient gender as accepted by the record store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Parse the exact wire spelling ("Male", "Female", "Other").
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Male" => Some(Gender::Male),
            "Female" => Some(Gender::Female),
            "Other" => Some(Gender::Other),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How update/delete address a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    /// Store-assigned ID
    Remote(String),
    /// Temporary ID of a record that never reached the store
    Local(String),
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Remote(id) => write!(f, "{}", id),
            RecordKey::Local(temp_id) => write!(f, "local:{}", temp_id),
        }
    }
}

/// Raw booking submission, exactly as typed into the form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AppointmentForm {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub disease: String,
    pub doctor: String,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp
    pub appointment_date: String,
    pub notes: String,
}

impl From<&NewAppointment> for AppointmentForm {
    fn from(payload: &NewAppointment) -> Self {
        Self {
            name: payload.name.clone(),
            age: payload.age.to_string(),
            gender: payload.gender.as_str().to_string(),
            disease: payload.disease.clone(),
            doctor: payload.doctor.clone(),
            appointment_date: payload.appointment_date.format("%Y-%m-%d").to_string(),
            notes: payload.notes.clone().unwrap_or_default(),
        }
    }
}

impl From<&Appointment> for AppointmentForm {
    fn from(appointment: &Appointment) -> Self {
        Self::from(&appointment.payload())
    }
}

/// A validated appointment payload, ready to send to the record store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewAppointment {
    pub name: String,
    /// Years; fractional values are kept as sent
    pub age: f64,
    pub gender: Gender,
    pub disease: String,
    pub doctor: String,
    #[serde(with = "iso_date")]
    pub appointment_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A stored appointment record, remote or local-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    /// Store-assigned ID - null until the record reaches the store
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Temporary ID for records saved while the store was unreachable
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_id: Option<String>,
    pub name: String,
    pub age: f64,
    pub gender: Gender,
    pub disease: String,
    pub doctor: String,
    #[serde(with = "iso_date")]
    pub appointment_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Appointment {
    /// Synthesize a local-only record carrying a fresh temporary ID.
    pub fn local(payload: NewAppointment) -> Self {
        let now = Utc::now().to_rfc3339();
        let mut appointment = Self::from_payload(payload);
        appointment.temp_id = Some(uuid::Uuid::new_v4().to_string());
        appointment.created_at = Some(now.clone());
        appointment.updated_at = Some(now);
        appointment
    }

    /// Build a record from a payload with no identity assigned yet.
    pub fn from_payload(payload: NewAppointment) -> Self {
        Self {
            id: None,
            temp_id: None,
            name: payload.name,
            age: payload.age,
            gender: payload.gender,
            disease: payload.disease,
            doctor: payload.doctor,
            appointment_date: payload.appointment_date,
            notes: payload.notes,
            created_at: None,
            updated_at: None,
        }
    }

    /// Key used to address this record, if it has any identity.
    pub fn key(&self) -> Option<RecordKey> {
        match (&self.id, &self.temp_id) {
            (Some(id), _) => Some(RecordKey::Remote(id.clone())),
            (None, Some(temp_id)) => Some(RecordKey::Local(temp_id.clone())),
            (None, None) => None,
        }
    }

    /// Check whether `key` addresses this record (by store ID or temporary ID).
    pub fn matches(&self, key: &RecordKey) -> bool {
        match key {
            RecordKey::Remote(id) => self.id.as_deref() == Some(id.as_str()),
            RecordKey::Local(temp_id) => {
                self.id.is_none() && self.temp_id.as_deref() == Some(temp_id.as_str())
            }
        }
    }

    /// Check if this record has never reached the store.
    pub fn is_local_only(&self) -> bool {
        self.id.is_none()
    }

    /// The payload fields of this record.
    pub fn payload(&self) -> NewAppointment {
        NewAppointment {
            name: self.name.clone(),
            age: self.age,
            gender: self.gender,
            disease: self.disease.clone(),
            doctor: self.doctor.clone(),
            appointment_date: self.appointment_date,
            notes: self.notes.clone(),
        }
    }

    /// Overwrite the payload fields in place, keeping identity.
    pub fn patch(&mut self, payload: NewAppointment) {
        self.name = payload.name;
        self.age = payload.age;
        self.gender = payload.gender;
        self.disease = payload.disease;
        self.doctor = payload.doctor;
        self.appointment_date = payload.appointment_date;
        self.notes = payload.notes;
        self.touch();
    }

    /// Touch the updated_at timestamp.
    pub fn touch(&mut self) {
        self.updated_at = Some(Utc::now().to_rfc3339());
    }
}

/// Parse a calendar date from `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// Timestamps denote the calendar date of their UTC date part, which is what a
/// browser date input serializes to.
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|ts| ts.with_timezone(&Utc).date_naive())
}

/// Format a calendar date as an ISO-8601 UTC midnight timestamp.
pub fn format_calendar_date(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}

/// Serde adapter for calendar dates carried as ISO-8601 UTC timestamps.
pub mod iso_date {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_calendar_date(*date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_calendar_date(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid appointment date: {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> NewAppointment {
        NewAppointment {
            name: "Jane".into(),
            age: 34.0,
            gender: Gender::Female,
            disease: "Acne".into(),
            doctor: "Dr. John Doe".into(),
            appointment_date: NaiveDate::from_ymd_opt(2030, 5, 1).unwrap(),
            notes: None,
        }
    }

    #[test]
    fn test_local_record_has_temp_id() {
        let appointment = Appointment::local(payload());
        assert!(appointment.is_local_only());
        assert_eq!(appointment.temp_id.as_ref().unwrap().len(), 36); // UUID format
        assert!(matches!(appointment.key(), Some(RecordKey::Local(_))));
    }

    #[test]
    fn test_matches_by_key() {
        let mut appointment = Appointment::local(payload());
        let temp_id = appointment.temp_id.clone().unwrap();
        assert!(appointment.matches(&RecordKey::Local(temp_id.clone())));
        assert!(!appointment.matches(&RecordKey::Remote(temp_id.clone())));

        appointment.id = Some("abc".into());
        assert!(appointment.matches(&RecordKey::Remote("abc".into())));
        assert!(!appointment.matches(&RecordKey::Local(temp_id)));
    }

    #[test]
    fn test_wire_format() {
        let json = r#"{
            "_id": "65f0",
            "name": "Jane",
            "age": 34,
            "gender": "Female",
            "disease": "Acne",
            "doctor": "Dr. John Doe",
            "appointmentDate": "2030-05-01T00:00:00.000Z",
            "notes": "",
            "createdAt": "2030-04-01T09:00:00.000Z",
            "updatedAt": "2030-04-01T09:00:00.000Z",
            "__v": 0
        }"#;
        let appointment: Appointment = serde_json::from_str(json).unwrap();
        assert_eq!(appointment.id, Some("65f0".into()));
        assert_eq!(appointment.gender, Gender::Female);
        assert_eq!(
            appointment.appointment_date,
            NaiveDate::from_ymd_opt(2030, 5, 1).unwrap()
        );

        let out = serde_json::to_value(&appointment).unwrap();
        assert_eq!(out["appointmentDate"], "2030-05-01T00:00:00.000Z");
        assert_eq!(out["_id"], "65f0");
        assert!(out.get("tempId").is_none());
    }

    #[test]
    fn test_fractional_age_decodes() {
        let json = r#"[
            {"_id":"a1","name":"Ann","age":33.5,"gender":"Female","disease":"Flu","doctor":"Dr. Emily Brown","appointmentDate":"2030-05-01T00:00:00.000Z"},
            {"_id":"b2","name":"Ben","age":40,"gender":"Male","disease":"Acne","doctor":"Dr. John Doe","appointmentDate":"2030-05-02T00:00:00.000Z"}
        ]"#;
        let appointments: Vec<Appointment> = serde_json::from_str(json).unwrap();
        assert_eq!(appointments.len(), 2);
        assert_eq!(appointments[0].age, 33.5);
        assert_eq!(appointments[1].age, 40.0);
        assert_eq!(AppointmentForm::from(&appointments[0]).age, "33.5");
    }

    #[test]
    fn test_parse_calendar_date() {
        let expected = NaiveDate::from_ymd_opt(2030, 5, 1).unwrap();
        assert_eq!(parse_calendar_date("2030-05-01"), Some(expected));
        assert_eq!(parse_calendar_date("2030-05-01T00:00:00.000Z"), Some(expected));
        assert_eq!(parse_calendar_date("2030-05-01T22:30:00-03:00"), Some(expected.succ_opt().unwrap()));
        assert_eq!(parse_calendar_date("not a date"), None);
        assert_eq!(parse_calendar_date("2030-02-30"), None);
    }

    #[test]
    fn test_form_from_appointment() {
        let appointment = Appointment::local(payload());
        let form = AppointmentForm::from(&appointment);
        assert_eq!(form.age, "34");
        assert_eq!(form.gender, "Female");
        assert_eq!(form.appointment_date, "2030-05-01");
        assert_eq!(form.notes, "");
    }

    #[test]
    fn test_patch_keeps_identity() {
        let mut appointment = Appointment::local(payload());
        let temp_id = appointment.temp_id.clone();
        let mut changed = payload();
        changed.disease = "Eczema".into();
        appointment.patch(changed);
        assert_eq!(appointment.disease, "Eczema");
        assert_eq!(appointment.temp_id, temp_id);
    }
}
