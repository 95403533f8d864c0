use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::IntoResponse,
    routing::post,
};

use crate::{
    dto::signup::SignupRequest,
    error::AppError,
    services::{auth_service, game_service},
    state::SharedState,
};

/// Routes creating players.
pub fn router() -> Router<SharedState> {
    Router::new().route("/signup", post(signup))
}

/// Create a player, hand out its session cookie and return the new board.
pub async fn signup(
    State(state): State<SharedState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    let signup = game_service::signup(&state, payload).await?;
    let cookie = auth_service::session_cookie(&signup.session, &state.config().base_path);
    let headers = [(SET_COOKIE, cookie)];
    Ok((StatusCode::CREATED, headers, Json(signup.board)))
}
