//! Domain logic for the gathering registration service.
//!
//! Everything in this crate is pure: no database, no network. The store
//! adapter (`gathering-db`), the spreadsheet exporter (`gathering-sheets`)
//! and the HTTP layer (`gathering-api`) build on these types.

pub mod dashboard;
pub mod edit;
pub mod error;
pub mod export;
pub mod form;
pub mod notice;
pub mod registration;
pub mod stats;
pub mod types;
