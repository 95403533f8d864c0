//! Library crate for the Photo Bingo server, exposing modules for the binary and integration tests.

/// Server configuration from file and environment.
pub mod config;
/// Storage backends.
pub mod dao;
/// Request and response payloads.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// HTTP routes.
pub mod routes;
/// Business logic behind the routes.
pub mod services;
/// In-memory game state.
pub mod state;
