//! Object-storage adapter for participant, partner and quote images.
//!
//! Images are pushed to a Cloudinary-compatible host which applies the
//! transformation of the chosen [`TransformProfile`] at upload time. The rest
//! of the crate only sees the [`MediaStore`] trait.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::{
    config::StorageConfig,
    error::{Error, Result},
    models::media::{ImageUpload, StoredImage, TransformProfile},
};

/// Image storage seen by the services.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Uploads one image, normalized with the given profile.
    async fn upload(&self, image: &ImageUpload, profile: TransformProfile) -> Result<StoredImage>;

    /// Deletes an asset. `Ok(false)` means the provider did not know it.
    async fn delete(&self, storage_id: &str) -> Result<bool>;
}

pub type SharedMediaStore = Arc<dyn MediaStore>;

/// Deletes an asset without failing the caller.
///
/// Used when the owning record is deleted or replaced, and to clean up an
/// upload whose record could not be inserted.
pub async fn release_image(store: &dyn MediaStore, storage_id: &str) {
    match store.delete(storage_id).await {
        Ok(true) => {
            tracing::debug!(storage_id = %storage_id, "Released stored image");
        }
        Ok(false) => {
            tracing::warn!(storage_id = %storage_id, "Stored image was already missing");
        }
        Err(e) => {
            tracing::warn!(storage_id = %storage_id, error = %e, "Failed to release stored image");
        }
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
    format: Option<String>,
    bytes: Option<u64>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// [`MediaStore`] backed by the Cloudinary upload API.
pub struct CloudinaryStore {
    client: reqwest::Client,
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: SecretString,
}

impl CloudinaryStore {
    pub fn new(config: &StorageConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to build storage client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            cloud_name: config.cloud_name.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        })
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{}/{}/image/{}", self.base_url, self.cloud_name, action)
    }

    /// Form carrying the signed parameters plus the credentials.
    fn signed_form(&self, params: &[(&str, String)]) -> Form {
        let timestamp = Utc::now().timestamp().to_string();
        let mut signed: Vec<(&str, String)> = params.to_vec();
        signed.push(("timestamp", timestamp));

        let signature = sign_params(&signed, self.api_secret.expose_secret());

        let mut form = Form::new()
            .text("api_key", self.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (key, value) in signed {
            form = form.text(key.to_string(), value);
        }
        form
    }
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    async fn upload(&self, image: &ImageUpload, profile: TransformProfile) -> Result<StoredImage> {
        let form = self.signed_form(&[
            ("folder", profile.folder.to_string()),
            ("transformation", profile.transformation()),
        ]);

        let file = Part::bytes(image.bytes.to_vec())
            .file_name(image.file_name.clone().unwrap_or_else(|| "upload".to_string()))
            .mime_str(&image.content_type)
            .map_err(|e| Error::Upload(format!("Invalid content type: {}", e)))?;
        let form = form.part("file", file);

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Upload(format!("Storage request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upload(format!(
                "Storage provider returned {}: {}",
                status, body
            )));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| Error::Upload(format!("Invalid storage response: {}", e)))?;

        tracing::info!(
            storage_id = %uploaded.public_id,
            folder = profile.folder,
            "Image uploaded"
        );

        Ok(StoredImage {
            url: uploaded.secure_url,
            storage_id: uploaded.public_id,
            format: uploaded.format,
            bytes: uploaded.bytes,
            width: uploaded.width,
            height: uploaded.height,
        })
    }

    async fn delete(&self, storage_id: &str) -> Result<bool> {
        let form = self.signed_form(&[("public_id", storage_id.to_string())]);

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Upload(format!("Storage request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upload(format!(
                "Storage provider returned {} on delete",
                status
            )));
        }

        let destroyed: DestroyResponse = response
            .json()
            .await
            .map_err(|e| Error::Upload(format!("Invalid storage response: {}", e)))?;

        Ok(destroyed.result == "ok")
    }
}

/// Hex SHA-256 of `k1=v1&k2=v2...` (keys sorted) followed by the secret.
pub fn sign_params(params: &[(&str, String)], secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}
