//! Cloudinary image host.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::{extract_public_id, generate_public_id, AssetHost, ImageUpload, UploadedAsset, UPLOAD_FOLDER};
use crate::config::CloudinaryConfig;
use crate::errors::AppError;

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    #[serde(default)]
    public_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    #[serde(default)]
    result: Option<String>,
}

/// Unsigned-preset uploads with signed deletes.
pub struct CloudinaryHost {
    http: reqwest::Client,
    config: CloudinaryConfig,
    api_base: String,
}

impl CloudinaryHost {
    pub fn new(http: reqwest::Client, config: CloudinaryConfig) -> Self {
        Self {
            http,
            config,
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    /// Point the host at a different API root.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, action: &str) -> String {
        format!("{}/{}/image/{}", self.api_base, self.config.cloud_name, action)
    }
}

/// Signature over the destroy parameters, SHA-256 hex.
pub fn sign_destroy(public_id: &str, timestamp: i64, api_secret: &str) -> String {
    let to_sign = format!("public_id={}&timestamp={}{}", public_id, timestamp, api_secret);
    hex::encode(Sha256::digest(to_sign.as_bytes()))
}

#[async_trait]
impl AssetHost for CloudinaryHost {
    async fn upload(&self, image: &ImageUpload) -> Result<UploadedAsset, AppError> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(|e| AppError::AssetHost(format!("Invalid image type: {}", e)))?;

        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.config.upload_preset.clone())
            .text("public_id", generate_public_id())
            .text("folder", UPLOAD_FOLDER);

        let response = self
            .http
            .post(self.url("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::AssetHost(format!("Failed to upload image: {}", e)))?;

        if !response.status().is_success() {
            tracing::error!("Image upload rejected with {}", response.status());
            return Err(AppError::AssetHost(
                "Failed to upload image. Please try again.".to_string(),
            ));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::AssetHost(format!("Unexpected upload response: {}", e)))?;

        let public_id = body
            .public_id
            .or_else(|| extract_public_id(&body.secure_url))
            .ok_or_else(|| AppError::AssetHost("Upload response has no asset id".to_string()))?;

        tracing::info!("Uploaded image {}", public_id);
        Ok(UploadedAsset {
            secure_url: body.secure_url,
            public_id,
        })
    }

    async fn delete(&self, asset: &UploadedAsset) -> Result<(), AppError> {
        let (Some(api_key), Some(api_secret)) = (&self.config.api_key, &self.config.api_secret)
        else {
            return Err(AppError::Config(
                "Image host credentials missing for image deletion".to_string(),
            ));
        };

        let timestamp = Utc::now().timestamp();
        let signature = sign_destroy(&asset.public_id, timestamp, api_secret);
        let timestamp = timestamp.to_string();

        let response = self
            .http
            .post(self.url("destroy"))
            .form(&[
                ("public_id", asset.public_id.as_str()),
                ("timestamp", timestamp.as_str()),
                ("api_key", api_key.as_str()),
                ("signature", signature.as_str()),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await
            .map_err(|e| AppError::AssetHost(format!("Failed to delete image: {}", e)))?;

        let status = response.status();
        let body: DestroyResponse = response.json().await.unwrap_or(DestroyResponse { result: None });

        match body.result.as_deref() {
            Some("ok") if status.is_success() => {
                tracing::info!("Deleted image {}", asset.public_id);
                Ok(())
            }
            other => Err(AppError::AssetHost(format!(
                "Image {} not deleted ({}, {})",
                asset.public_id,
                status,
                other.unwrap_or("no result")
            ))),
        }
    }
}
