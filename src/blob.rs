//! Blob-store upload client.
//!
//! Speaks the Vercel Blob wire shape: an authenticated `PUT` of the raw
//! body to `{base}/{name}` answered with a JSON object carrying the
//! public `url`. Uploads are buffered fully in memory; nothing here
//! streams.

use bytes::Bytes;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;

pub struct BlobStore {
    client: Client,
    base_url: String,
    token: String,
}

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Authentication failed")]
    AuthFailed,
    #[error("Blob store error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Blob store response had no url")]
    MissingUrl,
}

impl BlobStore {
    pub fn new(base_url: String, token: String) -> Result<Self, BlobError> {
        let base_url = base_url.trim_end_matches('/').to_string();

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Upload a publicly readable object and return its URL.
    pub async fn put(
        &self,
        name: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<String, BlobError> {
        let url = format!("{}/{}", self.base_url, name);

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.token)
            .header("x-content-type", content_type)
            .header("x-api-version", "7")
            .body(data)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(BlobError::AuthFailed);
            }
            status if !status.is_success() => {
                return Err(BlobError::Api {
                    status: status.as_u16(),
                    message: response.text().await.unwrap_or_default(),
                });
            }
            _ => {}
        }

        let body: Value = response.json().await?;
        let url = body["url"].as_str().ok_or(BlobError::MissingUrl)?;

        log::info!("blob upload {} -> {}", name, url);
        Ok(url.to_string())
    }
}

/// Generated object name matching the original upload convention:
/// `{prefix}_{millis}_{original file name}`.
pub fn object_name(prefix: &str, file_name: &str) -> String {
    format!("{}_{}_{}", prefix, Utc::now().timestamp_millis(), file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_name_keeps_prefix_and_file_name() {
        let name = object_name("bookmark", "image.jpg");
        assert!(name.starts_with("bookmark_"));
        assert!(name.ends_with("_image.jpg"));
        // prefix, millis, original name
        assert_eq!(name.splitn(3, '_').count(), 3);
    }
}
