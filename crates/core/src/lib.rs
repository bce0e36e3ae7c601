//! Domain logic for the captain peer-review service.
//!
//! This crate has no I/O. The DB and API layers depend on it for shared
//! types, validation, scoring, reviewer identity derivation and the
//! suggestion consensus policy.

pub mod error;
pub mod rating;
pub mod reviewer;
pub mod roster;
pub mod suggestion;
pub mod types;
