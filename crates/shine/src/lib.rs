pub mod access;
pub mod blog;
pub mod clock;
pub mod config;
pub mod envelope;
pub mod error;
pub mod leads;
pub(crate) mod listing;
pub mod repository;
pub mod telemetry;
pub mod validation;
