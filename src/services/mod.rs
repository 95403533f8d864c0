/// Session cookies and player authentication.
pub mod auth_service;
/// Signup and board operations.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Startup loading of the saved game state.
pub mod loader;
/// Debounced background saving with backup rotation.
pub mod persistence;
/// Storage of uploaded photos.
pub mod upload_service;
