//! CSV export of appointment rows.

use crate::models::{format_calendar_date, Appointment};

/// Fixed column order.
pub const CSV_COLUMNS: [&str; 7] = [
    "name",
    "age",
    "gender",
    "disease",
    "doctor",
    "appointmentDate",
    "notes",
];

/// Serialize rows with every field quoted and `\n` line endings.
///
/// Output depends only on the input rows.
pub fn export_csv(rows: &[Appointment]) -> Vec<u8> {
    let mut csv = String::new();

    push_row(&mut csv, CSV_COLUMNS.iter().copied());

    for row in rows {
        let age = row.age.to_string();
        let date = format_calendar_date(row.appointment_date);
        push_row(
            &mut csv,
            [
                row.name.as_str(),
                age.as_str(),
                row.gender.as_str(),
                row.disease.as_str(),
                row.doctor.as_str(),
                date.as_str(),
                row.notes.as_deref().unwrap_or(""),
            ],
        );
    }

    csv.into_bytes()
}

fn push_row<'a>(csv: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    let line = fields
        .into_iter()
        .map(quote)
        .collect::<Vec<_>>()
        .join(",");
    csv.push_str(&line);
    csv.push('\n');
}

/// Quote a field, doubling embedded quotes.
pub fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
