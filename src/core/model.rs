//! Defines application business models.

pub mod file;
pub mod quota;
pub mod user;
