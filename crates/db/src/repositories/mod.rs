//! Repositories: one zero-sized struct per table with async CRUD methods
//! taking the pool explicitly.

mod registration_repo;

pub use registration_repo::RegistrationRepo;
