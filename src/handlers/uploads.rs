use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, Result},
    models::claims::Claims,
    services::uploads as upload_service,
    state::AppState,
};

/// The multipart field carrying the image.
const FILE_FIELD: &str = "file";

/// The response payload for an upload.
#[derive(Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// Stores the `file` part of a multipart body and returns its public URL.
#[axum::debug_handler]
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let image_url = upload_service::store_image(&state, field).await?;
        tracing::info!("✅ Upload by {} stored at {}", claims.id, image_url);

        return Ok(Json(UploadResponse { image_url }));
    }

    Err(AppError::Validation("No file uploaded".to_string()))
}
