//! Multipart form decoding shared by the upload endpoints. Text fields
//! and files are read fully into memory before any upstream call.

use std::collections::HashMap;

use axum::extract::multipart::Multipart;

use crate::error::ApiError;
use crate::viewer::models::UploadedFile;

#[derive(Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    /// Non-empty text field value.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Required text field, with the endpoint's own 400 message.
    pub fn require(&self, name: &str, error: &str) -> Result<String, ApiError> {
        self.field(name)
            .map(|s| s.to_string())
            .ok_or_else(|| ApiError::BadRequest(error.to_string()))
    }

    /// Take ownership of an uploaded file.
    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }
}

/// Drain a multipart stream into a [`FormData`].
pub async fn read_form(mut multipart: Multipart) -> Result<FormData, ApiError> {
    let mut form = FormData::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Form parse error: {}", e)))?
    {
        let Some(name) = field.name().map(|n| n.to_string()) else {
            continue;
        };

        if let Some(file_name) = field.file_name().map(|n| n.to_string()) {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Form parse error: {}", e)))?;
            form.files.insert(
                name,
                UploadedFile {
                    file_name,
                    content_type,
                    data,
                },
            );
        } else {
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Form parse error: {}", e)))?;
            form.fields.insert(name, text);
        }
    }

    Ok(form)
}
