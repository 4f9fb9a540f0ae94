//! Local state operations: the persisted appointment mirror.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbResult, APPOINTMENTS_KEY};
use crate::models::Appointment;

impl Database {
    /// Get a local state value.
    pub fn get_local_state(&self, key: &str) -> DbResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM local_state WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Set a local state value, replacing any previous one.
    pub fn set_local_state(&self, key: &str, value: &str) -> DbResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO local_state (key, value, updated_at) VALUES (?, ?, datetime('now'))",
            params![key, value],
        )?;
        Ok(())
    }

    /// Load the persisted appointment array (empty if never written).
    pub fn load_appointments(&self) -> DbResult<Vec<Appointment>> {
        match self.get_local_state(APPOINTMENTS_KEY)? {
            Some(json) if !json.trim().is_empty() => Ok(serde_json::from_str(&json)?),
            _ => Ok(Vec::new()),
        }
    }

    /// Overwrite the persisted appointment array.
    pub fn save_appointments(&self, appointments: &[Appointment]) -> DbResult<()> {
        let json = serde_json::to_string(appointments)?;
        self.set_local_state(APPOINTMENTS_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Gender, NewAppointment};
    use chrono::NaiveDate;

    fn setup_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn make_appointment(name: &str) -> Appointment {
        Appointment::local(NewAppointment {
            name: name.into(),
            age: 40.0,
            gender: Gender::Male,
            disease: "Flu".into(),
            doctor: "Dr. Emily Brown".into(),
            appointment_date: NaiveDate::from_ymd_opt(2030, 1, 2).unwrap(),
            notes: Some("He said \"urgent\"".into()),
        })
    }

    #[test]
    fn test_empty_by_default() {
        let db = setup_db();
        assert!(db.load_appointments().unwrap().is_empty());
        assert_eq!(db.get_local_state("appointments").unwrap(), Some("[]".into()));
    }

    #[test]
    fn test_save_and_load() {
        let db = setup_db();
        let appointments = vec![make_appointment("Ann"), make_appointment("Bob")];
        db.save_appointments(&appointments).unwrap();

        let loaded = db.load_appointments().unwrap();
        assert_eq!(loaded, appointments);
    }

    #[test]
    fn test_save_overwrites() {
        let db = setup_db();
        db.save_appointments(&[make_appointment("Ann"), make_appointment("Bob")])
            .unwrap();
        db.save_appointments(&[make_appointment("Cid")]).unwrap();

        let loaded = db.load_appointments().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].name, "Cid");
    }

    #[test]
    fn test_unknown_key() {
        let db = setup_db();
        assert_eq!(db.get_local_state("nope").unwrap(), None);
    }
}
