use axum::Router;
use tower_http::services::ServeDir;

use crate::state::SharedState;

/// Board and space routes.
pub mod board;
/// Health check route.
pub mod health;
/// Signup route.
pub mod signup;

/// Compose all route trees under the configured base path, serving uploaded
/// photos next to them.
pub fn router(state: SharedState) -> Router<()> {
    let config = state.config();
    let base_path = config.base_path.clone();
    let image_route = format!("/{}", config.image_dir.trim_matches('/'));
    let images = ServeDir::new(&config.image_dir);

    let api_router = health::router()
        .merge(signup::router())
        .merge(board::router(config.max_upload_bytes))
        .nest_service(&image_route, images)
        .with_state(state);

    if base_path.is_empty() {
        api_router
    } else {
        Router::new().nest(&base_path, api_router)
    }
}
