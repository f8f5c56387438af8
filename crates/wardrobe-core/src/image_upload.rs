//! Image upload checks for new clothing items.
//!
//! Uploads are identified by magic bytes, never by the claimed filename or
//! content type. Only `image/*` formats that `infer` recognizes are
//! accepted, and the stored object gets a fresh random name.

use uuid::Uuid;

use crate::error::{Error, Result};
use crate::uuid_utils::new_v7;

/// An upload that passed [`validate_image`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedImage {
    /// Detected MIME type, e.g. `image/png`.
    pub mime_type: String,
    /// File extension matching the detected type, without the dot.
    pub extension: String,
}

/// Validate raw upload bytes and detect their image type.
pub fn validate_image(data: &[u8], max_size_bytes: u64) -> Result<CheckedImage> {
    if data.is_empty() {
        return Err(Error::Validation("Please choose an image to upload".to_string()));
    }
    if data.len() as u64 > max_size_bytes {
        return Err(Error::Validation(format!(
            "Image exceeds maximum size of {} bytes",
            max_size_bytes
        )));
    }

    match infer::get(data) {
        Some(kind) if kind.matcher_type() == infer::MatcherType::Image => Ok(CheckedImage {
            mime_type: kind.mime_type().to_string(),
            extension: kind.extension().to_string(),
        }),
        Some(kind) => Err(Error::Validation(format!(
            "Please upload an image file (got {})",
            kind.mime_type()
        ))),
        None => Err(Error::Validation(
            "Please upload an image file (unrecognized format)".to_string(),
        )),
    }
}

/// Object path for a new upload: `{user_id}/{uuid}.{ext}`.
pub fn image_storage_path(user_id: Uuid, extension: &str) -> String {
    format!(
        "{}/{}.{}",
        user_id,
        new_v7(),
        extension.trim_start_matches('.').to_lowercase()
    )
}
