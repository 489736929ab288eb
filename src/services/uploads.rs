use std::path::Path;

use axum::extract::multipart::Field;
use chrono::Utc;
use tokio::io::{AsyncWriteExt, BufWriter};

use crate::{
    error::{AppError, Result},
    state::AppState,
};

/// The URL prefix uploaded files are served under.
pub const UPLOADS_URL_PREFIX: &str = "/uploads";

/// Reduces a client-supplied file name to a safe final path component.
///
/// Directory parts are dropped, anything outside letters, digits, `.`, `-`
/// and `_` becomes `_`, and leading dots are stripped so the result can never
/// be hidden or climb out of the upload directory.
pub fn sanitize_file_name(original: &str) -> String {
    let base = original.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Streams an uploaded image to the upload directory.
///
/// The stored name is the upload time in milliseconds plus the sanitised
/// original name. Two identically named uploads in the same millisecond
/// collide; the later one wins.
///
/// # Returns
///
/// A `Result` containing the public URL path of the stored file.
pub async fn store_image(state: &AppState, mut field: Field<'_>) -> Result<String> {
    let _permit = state.upload_limiter.acquire().await?;

    let original = field.file_name().unwrap_or("image").to_string();
    let stored_name = format!(
        "{}-{}",
        Utc::now().timestamp_millis(),
        sanitize_file_name(&original)
    );

    let first = field
        .chunk()
        .await?
        .ok_or_else(|| AppError::Validation("Uploaded file is empty".to_string()))?;

    if !infer::is_image(&first) {
        return Err(AppError::Validation(
            "Only image files can be uploaded".to_string(),
        ));
    }

    let upload_dir = state.config.upload_dir.as_path();
    tokio::fs::create_dir_all(upload_dir).await?;
    let path = upload_dir.join(&stored_name);

    if let Err(e) = write_stream(&path, first, &mut field).await {
        let _ = tokio::fs::remove_file(&path).await;
        return Err(e);
    }

    tracing::info!("📷 Stored upload {} as {}", original, stored_name);
    Ok(format!("{}/{}", UPLOADS_URL_PREFIX, stored_name))
}

async fn write_stream(path: &Path, first: axum::body::Bytes, field: &mut Field<'_>) -> Result<()> {
    let file = tokio::fs::File::create(path).await?;
    let mut writer = BufWriter::new(file);

    writer.write_all(&first).await?;
    while let Some(chunk) = field.chunk().await? {
        writer.write_all(&chunk).await?;
    }
    writer.flush().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_plain_names() {
        assert_eq!(sanitize_file_name("beach.png"), "beach.png");
        assert_eq!(sanitize_file_name("my_photo-1.JPG"), "my_photo-1.JPG");
    }

    #[test]
    fn strips_directories_and_traversal() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\ann\\pic.jpg"), "pic.jpg");
        assert_eq!(sanitize_file_name(".."), "image");
        assert_eq!(sanitize_file_name(".hidden.png"), "hidden.png");
    }

    #[test]
    fn replaces_unsafe_characters() {
        assert_eq!(sanitize_file_name("sea view?.png"), "sea_view_.png");
        assert_eq!(sanitize_file_name("море.jpg"), "море.jpg");
        assert_eq!(sanitize_file_name(""), "image");
    }
}
