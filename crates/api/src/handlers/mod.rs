pub mod admin;
pub mod registrations;
