//! Domain definitions.

pub mod reservation;
pub mod vehicle;

pub use self::{reservation::Reservation, vehicle::Vehicle};
