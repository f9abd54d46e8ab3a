//! Domain layer - business-level error types shared by services and API.

pub mod errors;

pub use errors::DomainError;
