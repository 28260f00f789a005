//! Domain layer types and invariants.

pub mod topics;
pub mod users;
