//! Cloudinary adapter.
//!
//! Uploads use an unsigned preset so no secret is needed to add images.
//! Deletion is a signed `destroy` call and needs the API key and secret.

use async_trait::async_trait;
use esther_core::upload::{ImageFile, ImageFolder};
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::instrument;

use super::{ImageStore, ImageStoreError, StoredImage};
use crate::config::CloudinaryConfig;

/// Cloudinary upload API base URL.
const BASE_URL: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Image store backed by a Cloudinary cloud.
#[derive(Clone)]
pub struct CloudinaryStore {
    client: reqwest::Client,
    cloud_name: String,
    upload_preset: String,
    api_key: Option<String>,
    api_secret: Option<SecretString>,
}

impl CloudinaryStore {
    #[must_use]
    pub fn new(config: &CloudinaryConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            cloud_name: config.cloud_name.clone(),
            upload_preset: config.upload_preset.clone(),
            api_key: config.api_key.clone(),
            api_secret: config.api_secret.clone(),
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!("{BASE_URL}/{}/image/{action}", self.cloud_name)
    }

    async fn read_body(response: reqwest::Response) -> Result<String, ImageStoreError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "Image store returned non-success status"
            );
            return Err(ImageStoreError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl ImageStore for CloudinaryStore {
    #[instrument(skip(self, file), fields(file_name = %file.file_name, size = file.size(), folder = %folder))]
    async fn upload(
        &self,
        file: &ImageFile,
        folder: ImageFolder,
    ) -> Result<StoredImage, ImageStoreError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.mime_type)?;

        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone())
            .text("folder", folder.as_str());

        let response = self
            .client
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;
        let body = Self::read_body(response).await?;

        let uploaded: UploadResponse =
            serde_json::from_str(&body).map_err(|e| ImageStoreError::Parse(e.to_string()))?;

        tracing::info!(public_id = %uploaded.public_id, "Image uploaded");
        Ok(StoredImage {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
        })
    }

    #[instrument(skip(self))]
    async fn delete(&self, public_id: &str) -> Result<(), ImageStoreError> {
        let (Some(api_key), Some(api_secret)) = (&self.api_key, &self.api_secret) else {
            return Err(ImageStoreError::MissingCredentials);
        };

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign(
            &[("public_id", public_id), ("timestamp", &timestamp)],
            api_secret.expose_secret(),
        );

        let params = [
            ("public_id", public_id),
            ("timestamp", timestamp.as_str()),
            ("api_key", api_key.as_str()),
            ("signature", signature.as_str()),
            ("signature_algorithm", "sha256"),
        ];

        let response = self
            .client
            .post(self.endpoint("destroy"))
            .form(&params)
            .send()
            .await?;
        let body = Self::read_body(response).await?;

        let destroyed: DestroyResponse =
            serde_json::from_str(&body).map_err(|e| ImageStoreError::Parse(e.to_string()))?;

        match destroyed.result.as_str() {
            "ok" => {
                tracing::info!("Image deleted");
                Ok(())
            }
            "not found" => {
                tracing::info!("Image already gone");
                Ok(())
            }
            other => Err(ImageStoreError::Rejected(other.to_string())),
        }
    }
}

/// Request signature: sorted `key=value` pairs joined by `&`, followed by the
/// secret, hashed with SHA-256 and hex encoded.
fn sign(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by_key(|(key, _)| *key);

    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    format!("{:x}", Sha256::digest(format!("{to_sign}{secret}").as_bytes()))
}
