use reqwest::multipart::{Form, Part};
use reqwest::Method;
use std::path::Path;

use super::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::models::UploadedImage;

/// Image types the upload endpoint accepts.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Guess and check the content type of an image file name.
pub fn image_mime(file_name: &str) -> ClientResult<&'static str> {
    let guessed = mime_guess::from_path(file_name).first_raw();
    match guessed {
        Some(mime) if ALLOWED_IMAGE_TYPES.contains(&mime) => Ok(mime),
        _ => Err(ClientError::Validation(format!(
            "Unsupported image type: {}",
            file_name
        ))),
    }
}

impl ApiClient {
    /// Upload an image file and return its hosted URL.
    pub async fn upload_image(&self, path: &Path) -> ClientResult<UploadedImage> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ClientError::Validation("Image path has no file name".into()))?
            .to_string();
        image_mime(&file_name)?;
        let bytes = tokio::fs::read(path).await?;
        self.upload_image_bytes(&file_name, bytes).await
    }

    pub async fn upload_image_bytes(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> ClientResult<UploadedImage> {
        let mime = image_mime(file_name)?;
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)?;
        let form = Form::new().part("file", part);
        let builder = self.request(Method::POST, "/uploads/image")?.multipart(form);
        let uploaded: UploadedImage = self.send_json(builder).await?;
        tracing::info!("Uploaded {} to {}", file_name, uploaded.url);
        Ok(uploaded)
    }
}
