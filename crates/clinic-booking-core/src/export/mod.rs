//! Export formats for the EHR view.
//!
//! - CSV: one quoted row per appointment, for spreadsheets and downstream import

mod csv;

pub use csv::*;
