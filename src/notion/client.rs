//! Thin client for the Notion REST API.
//!
//! Covers exactly the calls the service needs: database queries (with
//! sorts, filters and cursor pagination), page creation, page retrieval
//! and page patches (property updates and `archived: true` soft deletes).
//! Responses are kept as `serde_json::Value`; the `props` module reads
//! the typed properties out of them.

use reqwest::{Client, StatusCode};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Versioned API header required on every request.
const NOTION_VERSION: &str = "2022-06-28";

/// Notion REST client
pub struct NotionClient {
    client: Client,
    base_url: String,
    token: String,
}

#[derive(Error, Debug)]
pub enum NotionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Authentication failed")]
    AuthFailed,
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Notion API error: {status} - {message}")]
    Api { status: u16, message: String },
}

impl NotionClient {
    /// Create a new client against the given API base URL.
    pub fn new(base_url: String, token: String) -> Result<Self, NotionError> {
        let base_url = base_url.trim_end_matches('/').to_string();

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and decode the JSON body, mapping Notion's error
    /// envelope onto [`NotionError`].
    async fn send(&self, request: reqwest::RequestBuilder, what: &str) -> Result<Value, NotionError> {
        let response = request
            .bearer_auth(&self.token)
            .header("Notion-Version", NOTION_VERSION)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(NotionError::AuthFailed);
            }
            StatusCode::NOT_FOUND => {
                return Err(NotionError::NotFound(what.to_string()));
            }
            status if !status.is_success() => {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<Value>(&body)
                    .ok()
                    .and_then(|v| v["message"].as_str().map(|s| s.to_string()))
                    .unwrap_or(body);
                return Err(NotionError::Api {
                    status: status.as_u16(),
                    message,
                });
            }
            _ => {}
        }

        Ok(response.json().await?)
    }

    /// Query a database, following cursors until every page is collected.
    ///
    /// `sorts` and `filter` take the raw JSON shapes the Notion API
    /// expects, e.g. `[{"property": "sub", "direction": "ascending"}]`.
    pub async fn query_database(
        &self,
        database_id: &str,
        sorts: Option<Value>,
        filter: Option<Value>,
    ) -> Result<Vec<Value>, NotionError> {
        let url = self.url(&format!("databases/{}/query", database_id));
        let mut results = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = Map::new();
            body.insert("page_size".to_string(), json!(100));
            if let Some(sorts) = &sorts {
                body.insert("sorts".to_string(), sorts.clone());
            }
            if let Some(filter) = &filter {
                body.insert("filter".to_string(), filter.clone());
            }
            if let Some(cursor) = &cursor {
                body.insert("start_cursor".to_string(), json!(cursor));
            }

            let page = self
                .send(
                    self.client.post(&url).json(&Value::Object(body)),
                    database_id,
                )
                .await?;

            if let Some(items) = page["results"].as_array() {
                results.extend(items.iter().cloned());
            }

            if page["has_more"].as_bool().unwrap_or(false) {
                cursor = page["next_cursor"].as_str().map(|s| s.to_string());
                if cursor.is_none() {
                    break;
                }
            } else {
                break;
            }
        }

        log::debug!(
            "query_database {}: {} pages",
            database_id,
            results.len()
        );
        Ok(results)
    }

    /// Retrieve a single page object.
    pub async fn retrieve_page(&self, page_id: &str) -> Result<Value, NotionError> {
        let url = self.url(&format!("pages/{}", page_id));
        self.send(self.client.get(&url), page_id).await
    }

    /// Create a page in a database with the given properties object.
    pub async fn create_page(
        &self,
        database_id: &str,
        properties: Value,
    ) -> Result<Value, NotionError> {
        let url = self.url("pages");
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": properties,
        });
        self.send(self.client.post(&url).json(&body), database_id)
            .await
    }

    /// Patch the properties of an existing page.
    pub async fn update_page(
        &self,
        page_id: &str,
        properties: Value,
    ) -> Result<Value, NotionError> {
        let url = self.url(&format!("pages/{}", page_id));
        let body = json!({ "properties": properties });
        self.send(self.client.patch(&url).json(&body), page_id).await
    }

    /// Soft-delete a page by setting `archived: true`.
    pub async fn archive_page(&self, page_id: &str) -> Result<(), NotionError> {
        let url = self.url(&format!("pages/{}", page_id));
        let body = json!({ "archived": true });
        self.send(self.client.patch(&url).json(&body), page_id)
            .await?;
        Ok(())
    }
}
