//! Image hosting.
//!
//! Listing photos are uploaded to an external image host before the listing itself
//! is created. The host returns a public URL and an asset id; the id is kept so the
//! upload can be deleted again if the listing never gets created.

mod cloudinary;

pub use cloudinary::*;

use std::path::Path;

use async_trait::async_trait;
use chrono::Utc;

use crate::errors::AppError;

/// Folder all listing images are uploaded into.
pub const UPLOAD_FOLDER: &str = "food-donations";

/// Largest accepted image.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Length of the random part of generated public ids.
const RANDOM_SUFFIX_LEN: usize = 13;

/// An image selected for upload.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let content_type = content_type_for(&file_name).to_string();
        Self {
            file_name,
            content_type,
            bytes,
        }
    }

    /// Read an image from disk; the content type is guessed from the extension.
    pub async fn from_path(path: &Path) -> Result<Self, AppError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self::new(file_name, bytes))
    }

    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Guess a content type from a file name.
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "heic" => "image/heic",
        _ => "application/octet-stream",
    }
}

/// A hosted image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedAsset {
    pub secure_url: String,
    pub public_id: String,
}

/// External image host.
#[async_trait]
pub trait AssetHost: Send + Sync {
    async fn upload(&self, image: &ImageUpload) -> Result<UploadedAsset, AppError>;

    async fn delete(&self, asset: &UploadedAsset) -> Result<(), AppError>;
}

/// Public id for a new upload: `food-<millis>-<random>`.
pub fn generate_public_id() -> String {
    let random: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(RANDOM_SUFFIX_LEN)
        .collect();
    format!("food-{}-{}", Utc::now().timestamp_millis(), random)
}

/// Recover the public id from a hosted URL.
///
/// `https://res.cloudinary.com/<cloud>/image/upload/v123/food-donations/food-1-abc.jpg`
/// yields `food-donations/food-1-abc`.
pub fn extract_public_id(url: &str) -> Option<String> {
    let parts: Vec<&str> = url.split('/').collect();
    let upload = parts.iter().position(|p| *p == "upload")?;
    let rest = parts.get(upload + 2..)?;
    if rest.is_empty() {
        return None;
    }
    let path = rest.join("/");
    let public_id = match path.rfind('.') {
        Some(dot) if !path[dot..].contains('/') => path[..dot].to_string(),
        _ => path,
    };
    Some(public_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_public_id() {
        assert_eq!(
            extract_public_id(
                "https://res.cloudinary.com/demo/image/upload/v1712/food-donations/food-1712-abc123.jpg"
            )
            .as_deref(),
            Some("food-donations/food-1712-abc123")
        );
        assert_eq!(
            extract_public_id("https://res.cloudinary.com/demo/image/upload/v1/plain").as_deref(),
            Some("plain")
        );
        assert!(extract_public_id("https://example.com/images/a.png").is_none());
        assert!(extract_public_id("https://res.cloudinary.com/demo/image/upload/v1").is_none());
    }

    #[test]
    fn test_generated_public_id_shape() {
        let id = generate_public_id();
        let parts: Vec<&str> = id.splitn(3, '-').collect();
        assert_eq!(parts[0], "food");
        assert!(parts[1].parse::<i64>().is_ok());
        assert_eq!(parts[2].len(), RANDOM_SUFFIX_LEN);
        assert_ne!(generate_public_id(), id);
    }

    #[test]
    fn test_content_type_guess() {
        assert_eq!(content_type_for("photo.JPG"), "image/jpeg");
        assert_eq!(content_type_for("scan.webp"), "image/webp");
        assert_eq!(content_type_for("notes.txt"), "application/octet-stream");
        assert!(ImageUpload::new("a.png", vec![1, 2, 3]).is_image());
        assert!(!ImageUpload::new("a.pdf", vec![1]).is_image());
    }
}
