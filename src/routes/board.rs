use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State, multipart::MultipartError},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};

use crate::{
    dto::board::{BoardView, SpaceActionQuery, SpaceView},
    error::AppError,
    services::{auth_service, game_service},
    state::SharedState,
};

/// Multipart field carrying the photo.
const IMAGE_FIELD: &str = "image_file";

/// Routes reading and changing the caller's own board.
pub fn router(max_upload_bytes: usize) -> Router<SharedState> {
    Router::new()
        .route("/", get(get_board))
        .route("/spaces/{x}/{y}", get(get_space).post(update_space))
        .route(
            "/spaces/{x}/{y}/image",
            post(upload_image).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
}

/// The caller's board and score.
pub async fn get_board(
    State(state): State<SharedState>,
    headers: HeaderMap,
) -> Result<Json<BoardView>, AppError> {
    let user = auth_service::authenticate(&state, &headers).await?;
    let board = game_service::board(&state, &user).await?;
    Ok(Json(board))
}

/// One space of the caller's board.
pub async fn get_space(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path((x, y)): Path<(usize, usize)>,
) -> Result<Json<SpaceView>, AppError> {
    let user = auth_service::authenticate(&state, &headers).await?;
    let position = game_service::position(x, y)?;
    let space = game_service::space(&state, &user, position).await?;
    Ok(Json(space))
}

/// Complete or decomplete a space: `?action=complete|decomplete`.
pub async fn update_space(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path((x, y)): Path<(usize, usize)>,
    Query(query): Query<SpaceActionQuery>,
) -> Result<Json<SpaceView>, AppError> {
    let user = auth_service::authenticate(&state, &headers).await?;
    let position = game_service::position(x, y)?;
    let space = game_service::apply_action(&state, &user, position, query.action).await?;
    Ok(Json(space))
}

/// Upload a JPEG photo for a space, completing it.
pub async fn upload_image(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Path((x, y)): Path<(usize, usize)>,
    mut multipart: Multipart,
) -> Result<Json<SpaceView>, AppError> {
    let user = auth_service::authenticate(&state, &headers).await?;
    let position = game_service::position(x, y)?;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_owned);
        let contents = field.bytes().await.map_err(multipart_error)?;
        let space = game_service::upload_image(
            &state,
            &user,
            position,
            content_type.as_deref(),
            contents.to_vec(),
        )
        .await?;
        return Ok(Json(space));
    }

    Err(AppError::BadRequest(format!(
        "missing `{IMAGE_FIELD}` field in upload"
    )))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(err.body_text())
    } else {
        AppError::BadRequest(err.body_text())
    }
}
