//! Storage of uploaded photos.

use std::path::Path;

use base64::{Engine, engine::general_purpose::URL_SAFE};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::ServiceError,
    state::{SharedState, board::Position},
};

/// Only content type accepted for uploads.
pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

/// Check that an upload is a non-empty JPEG.
pub fn check_upload(content_type: Option<&str>, contents: &[u8]) -> Result<(), ServiceError> {
    if content_type != Some(JPEG_CONTENT_TYPE) {
        return Err(ServiceError::InvalidInput(format!(
            "expected an upload of type {JPEG_CONTENT_TYPE}, got {}",
            content_type.unwrap_or("none")
        )));
    }
    if contents.is_empty() {
        return Err(ServiceError::InvalidInput("uploaded file is empty".into()));
    }
    Ok(())
}

/// Image path, relative to the working directory, for a new photo of
/// `position` by `user`.
///
/// The player name is base64 encoded so any name yields a safe file name;
/// the random suffix keeps earlier photos of the same space around.
pub fn image_path(image_dir: &str, user: &str, position: Position) -> String {
    format!(
        "{}/{}.{}.{}.{}.jpg",
        image_dir.trim_end_matches('/'),
        URL_SAFE.encode(user),
        position.x(),
        position.y(),
        Uuid::new_v4().simple()
    )
}

/// Write a checked upload and return its image path.
pub async fn store_image(
    state: &SharedState,
    user: &str,
    position: Position,
    content_type: Option<&str>,
    contents: Vec<u8>,
) -> Result<String, ServiceError> {
    check_upload(content_type, &contents)?;

    let path = image_path(&state.config().image_dir, user, position);
    let size = contents.len();
    state.storage().write(Path::new(&path), contents).await?;
    info!(%user, %position, %path, size, "stored uploaded image");
    Ok(path)
}

/// Remove an image that ended up unreferenced. Failures are only logged.
pub async fn discard_image(state: &SharedState, path: &str) {
    if let Err(err) = state.storage().remove(Path::new(path)).await {
        warn!(%path, error = %err, "failed to remove orphaned image");
    }
}
