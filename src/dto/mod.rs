/// Board and space views.
pub mod board;
/// Health check payload.
pub mod health;
/// Signup payload.
pub mod signup;
/// Custom validators for request payloads.
pub mod validation;
