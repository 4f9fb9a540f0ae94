//! Appointment payload validation.
//!
//! Every rule is evaluated on every call so the caller sees all violated
//! fields at once. Validation is pure: the form is never modified.

use std::fmt;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{parse_calendar_date, AppointmentForm, Gender, NewAppointment};

/// Oldest accepted patient age.
pub const MAX_AGE: f64 = 120.0;

/// Form fields subject to validation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Age,
    Gender,
    Disease,
    Doctor,
    AppointmentDate,
}

impl Field {
    /// Required fields, in form order.
    pub const REQUIRED: [Field; 6] = [
        Field::Name,
        Field::Age,
        Field::Gender,
        Field::Disease,
        Field::Doctor,
        Field::AppointmentDate,
    ];

    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Age => "age",
            Field::Gender => "gender",
            Field::Disease => "disease",
            Field::Doctor => "doctor",
            Field::AppointmentDate => "appointmentDate",
        }
    }

    fn value<'a>(&self, form: &'a AppointmentForm) -> &'a str {
        match self {
            Field::Name => &form.name,
            Field::Age => &form.age,
            Field::Gender => &form.gender,
            Field::Disease => &form.disease,
            Field::Doctor => &form.doctor,
            Field::AppointmentDate => &form.appointment_date,
        }
    }
}

/// Kind of rule a field violated.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FieldErrorKind {
    Required,
    InvalidRange,
    InvalidEnum,
    InvalidDate,
}

/// A single field-level violation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldError {
    pub field: Field,
    pub kind: FieldErrorKind,
    pub message: String,
}

impl FieldError {
    pub fn new(field: Field, kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            field,
            kind,
            message: message.into(),
        }
    }

    fn required(field: Field) -> Self {
        Self::new(
            field,
            FieldErrorKind::Required,
            format!("{} is required", field.as_str()),
        )
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Non-empty set of field errors that rejected a write.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationErrors(pub Vec<FieldError>);

impl ValidationErrors {
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Check whether `field` has any violation.
    pub fn has(&self, field: Field) -> bool {
        self.0.iter().any(|e| e.field == field)
    }

    /// Kind of the violation reported for `field`, if any.
    pub fn kind_of(&self, field: Field) -> Option<FieldErrorKind> {
        self.0.iter().find(|e| e.field == field).map(|e| e.kind)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&joined.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Today's date in the caller's local time zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Check a form against field and business rules.
///
/// An empty result means the payload may be written.
pub fn validate(form: &AppointmentForm, today: NaiveDate) -> Vec<FieldError> {
    let mut errors: Vec<FieldError> = Field::REQUIRED
        .iter()
        .filter(|field| field.value(form).trim().is_empty())
        .map(|field| FieldError::required(*field))
        .collect();

    let missing = |field: Field| form_missing(form, field);

    if !missing(Field::Age) && parse_age(&form.age).is_none() {
        errors.push(FieldError::new(
            Field::Age,
            FieldErrorKind::InvalidRange,
            format!("Age must be a number between 0 and {}", MAX_AGE),
        ));
    }

    if !missing(Field::Gender) && Gender::parse(&form.gender).is_none() {
        errors.push(FieldError::new(
            Field::Gender,
            FieldErrorKind::InvalidEnum,
            "Invalid gender",
        ));
    }

    if !missing(Field::AppointmentDate) {
        match parse_calendar_date(&form.appointment_date) {
            None => errors.push(FieldError::new(
                Field::AppointmentDate,
                FieldErrorKind::InvalidDate,
                "Appointment date is not a valid date",
            )),
            Some(date) if date < today => errors.push(FieldError::new(
                Field::AppointmentDate,
                FieldErrorKind::InvalidDate,
                "Appointment date cannot be in the past",
            )),
            Some(_) => {}
        }
    }

    errors
}

/// Validate a form and convert it into a typed payload.
pub fn parse(form: &AppointmentForm, today: NaiveDate) -> Result<NewAppointment, ValidationErrors> {
    let errors = validate(form, today);
    if !errors.is_empty() {
        return Err(ValidationErrors(errors));
    }

    // All three parse cleanly once validation passed.
    let (Some(age), Some(gender), Some(appointment_date)) = (
        parse_age(&form.age),
        Gender::parse(&form.gender),
        parse_calendar_date(&form.appointment_date),
    ) else {
        return Err(ValidationErrors(validate(form, today)));
    };

    let notes = form.notes.trim();
    Ok(NewAppointment {
        name: form.name.trim().to_string(),
        age,
        gender,
        disease: form.disease.clone(),
        doctor: form.doctor.clone(),
        appointment_date,
        notes: (!notes.is_empty()).then(|| notes.to_string()),
    })
}

fn form_missing(form: &AppointmentForm, field: Field) -> bool {
    field.value(form).trim().is_empty()
}

/// Parse an age as a finite number within `0..=MAX_AGE`.
fn parse_age(raw: &str) -> Option<f64> {
    let age: f64 = raw.trim().parse().ok()?;
    (age.is_finite() && (0.0..=MAX_AGE).contains(&age)).then_some(age)
}
