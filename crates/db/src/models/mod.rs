//! Database row structs.
//!
//! Rows convert into the domain types from `gathering_core`; the create and
//! update DTOs are the validated core types themselves.

pub mod registration;
