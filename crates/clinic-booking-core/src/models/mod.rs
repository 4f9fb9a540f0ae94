//! Domain models for the clinic booking system.

mod appointment;
mod doctor;

pub use appointment::*;
pub use doctor::*;
