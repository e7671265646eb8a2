//! Embedded HTTP server exposing the viewer and profile APIs.
//!
//! Thin glue only: every handler parses its input, calls one or two
//! domain functions and returns the JSON envelope the original
//! endpoints produced. Shared state is a pair of HTTP clients and the
//! configuration; there is no other mutable state.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, Method};
use axum::routing::{delete, get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

use crate::blob::BlobStore;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::format::MessageFormatter;
use crate::notion::NotionClient;

pub mod forms;
mod profile;
mod viewer;

/// Uploads are buffered fully in memory; cap request bodies at the
/// original form limit.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Server state shared across requests.
pub struct AppState {
    pub notion: NotionClient,
    pub blob: BlobStore,
    /// Plain client for downloading attachment bodies.
    pub http: reqwest::Client,
    pub config: AppConfig,
    pub formatter: MessageFormatter,
}

impl AppState {
    pub fn new(config: AppConfig) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let notion = NotionClient::new(config.notion.base_url.clone(), config.notion.token.clone())?;
        let blob = BlobStore::new(config.blob.base_url.clone(), config.blob.token.clone())?;
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()?;

        Ok(Self {
            notion,
            blob,
            http,
            config,
            formatter: MessageFormatter::new(),
        })
    }
}

/// Build the full API router.
pub fn router(state: Arc<AppState>) -> Router {
    // The profile API is consumed cross-origin by the static microsite.
    let profile_cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        // Chat log viewer
        .route("/api/posts", get(viewer::list_posts))
        .route("/api/create", post(viewer::create_post))
        .route("/api/delete", delete(viewer::delete_post))
        .route("/api/content", get(viewer::content))
        .route("/api/deleteMessage", post(viewer::delete_message))
        .route("/api/files", get(viewer::list_files))
        .route("/api/proxy", get(viewer::proxy))
        .route("/api/updateTitle", post(viewer::update_title))
        .route("/api/toggleFavorite", post(viewer::toggle_favorite))
        // Folders
        .route("/api/folders", get(viewer::list_folders))
        .route("/api/addFolder", post(viewer::add_folder))
        .route("/api/deleteFolder", delete(viewer::delete_folder))
        // Bookmarks
        .route("/api/bookmarks", get(viewer::list_bookmarks))
        .route("/api/bookmark", post(viewer::add_bookmark))
        // Gallery
        .route("/api/gallery", get(viewer::list_gallery))
        .route("/api/addGallery", post(viewer::add_gallery))
        .route("/api/zipEntries", get(viewer::zip_entries))
        .route("/api/zipEntry", get(viewer::zip_entry))
        // Themes
        .route("/api/themes", get(viewer::list_themes))
        .route("/api/addTheme", post(viewer::add_theme))
        // Profile microsite
        .route("/api/profile", get(profile::profile).layer(profile_cors))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Not found".to_string())
}

/// Run the server until interrupted.
pub async fn serve(config: AppConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config)?);
    let app = router(state);

    let listener = TcpListener::bind(&bind_addr).await?;
    log::info!("listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    log::info!("shutting down");
}
