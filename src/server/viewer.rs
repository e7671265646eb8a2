//! Handlers for the chat log viewer endpoints.

use std::sync::Arc;

use axum::extract::{Multipart, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::server::{forms, AppState};
use crate::viewer::models::{
    CreatedBookmark, CreatedGalleryItem, CreatedPost, CreatedTheme, DeletedMessage, PostList,
};
use crate::viewer::{bookmarks, content, folders, gallery, posts, themes};

#[derive(Deserialize)]
pub(super) struct PageIdQuery {
    #[serde(rename = "pageId")]
    page_id: Option<String>,
}

#[derive(Deserialize)]
pub(super) struct SubQuery {
    sub: Option<String>,
}

fn require(value: Option<String>, error: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest(error.to_string()))
}

pub(super) async fn list_posts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PostList>, ApiError> {
    posts::list_posts(&state.notion, &state.config.databases.posts)
        .await
        .map(Json)
        .map_err(|e| e.with_label("Failed to fetch posts"))
}

#[derive(Deserialize)]
pub(super) struct CreateBody {
    sub: Option<String>,
    title: Option<String>,
}

pub(super) async fn create_post(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateBody>,
) -> Result<Json<CreatedPost>, ApiError> {
    let (Some(sub), Some(title)) = (
        body.sub.filter(|s| !s.is_empty()),
        body.title.filter(|t| !t.is_empty()),
    ) else {
        return Err(ApiError::BadRequest("sub, title are required".to_string()));
    };

    posts::create_post(&state.notion, &state.config.databases.posts, &sub, &title)
        .await
        .map(Json)
        .map_err(|e| e.with_label("Failed to create post"))
}

pub(super) async fn delete_post(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageIdQuery>,
) -> Result<Json<Value>, ApiError> {
    let page_id = require(query.page_id, "pageId is required")?;
    posts::archive(&state.notion, &page_id)
        .await
        .map_err(|e| e.with_label("Failed to delete post"))?;
    Ok(Json(json!({ "success": true })))
}

pub(super) async fn content(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageIdQuery>,
) -> Result<Json<Value>, ApiError> {
    let page_id = require(query.page_id, "pageId is required")?;
    let messages = content::fetch_content(&state.notion, &state.http, &state.formatter, &page_id)
        .await
        .map_err(|e| e.with_label("Failed to fetch content"))?;
    Ok(Json(json!({ "messages": messages })))
}

#[derive(Deserialize)]
pub(super) struct DeleteMessageBody {
    #[serde(rename = "pageId")]
    page_id: Option<String>,
    #[serde(rename = "messageIndex")]
    message_index: Option<i64>,
}

pub(super) async fn delete_message(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DeleteMessageBody>,
) -> Result<Json<DeletedMessage>, ApiError> {
    let (Some(page_id), Some(index)) = (body.page_id.filter(|p| !p.is_empty()), body.message_index)
    else {
        return Err(ApiError::BadRequest(
            "pageId and messageIndex are required".to_string(),
        ));
    };
    if index < 0 {
        return Err(ApiError::BadRequest("Invalid message index".to_string()));
    }

    content::delete_message(
        &state.notion,
        &state.http,
        &state.blob,
        &page_id,
        index as usize,
    )
    .await
    .map(Json)
    .map_err(|e| e.with_label("Failed to delete message"))
}

pub(super) async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let files = posts::list_files(&state.notion, &state.config.databases.posts)
        .await
        .map_err(|e| e.with_label("Failed to fetch files"))?;
    Ok(Json(json!({ "files": files })))
}

#[derive(Deserialize)]
pub(super) struct ProxyQuery {
    #[serde(rename = "pageId")]
    page_id: Option<String>,
    #[serde(rename = "fileName")]
    file_name: Option<String>,
}

pub(super) async fn proxy(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProxyQuery>,
) -> Result<Response, ApiError> {
    let page_id = require(query.page_id, "pageId is required")?;
    // File names arrive percent-encoded a second time from the viewer.
    let file_name = query
        .file_name
        .map(|f| match urlencoding::decode(&f) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => f,
        })
        .filter(|f| !f.is_empty());

    let body = content::proxy_file(&state.notion, &state.http, &page_id, file_name.as_deref())
        .await
        .map_err(|e| e.with_label("Failed to fetch file content"))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response())
}

#[derive(Deserialize)]
pub(super) struct UpdateTitleBody {
    #[serde(rename = "pageId")]
    page_id: Option<String>,
    title: Option<String>,
}

pub(super) async fn update_title(
    State(state): State<Arc<AppState>>,
    Json(body): Json<UpdateTitleBody>,
) -> Result<Json<Value>, ApiError> {
    let (Some(page_id), Some(title)) = (
        body.page_id.filter(|p| !p.is_empty()),
        body.title.filter(|t| !t.is_empty()),
    ) else {
        return Err(ApiError::BadRequest(
            "pageId and title are required".to_string(),
        ));
    };

    posts::update_title(&state.notion, &page_id, &title)
        .await
        .map_err(|e| e.with_label("Failed to update title"))?;
    Ok(Json(json!({ "success": true })))
}

#[derive(Deserialize)]
pub(super) struct ToggleFavoriteBody {
    #[serde(rename = "pageId")]
    page_id: Option<String>,
    favorite: Option<bool>,
}

pub(super) async fn toggle_favorite(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ToggleFavoriteBody>,
) -> Result<Json<Value>, ApiError> {
    let page_id = require(body.page_id, "pageId is required")?;
    let favorite = body.favorite.unwrap_or(false);

    posts::set_favorite(&state.notion, &page_id, favorite)
        .await
        .map_err(|e| e.with_label("Failed to toggle favorite"))?;
    Ok(Json(json!({ "success": true, "favorite": favorite })))
}

pub(super) async fn list_folders(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let folders = folders::list_folders(
        &state.notion,
        &state.config.databases.folders,
        &state.config.databases.posts,
    )
    .await
    .map_err(|e| e.with_label("Failed to fetch folders"))?;
    Ok(Json(json!({ "folders": folders })))
}

pub(super) async fn add_folder(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let form = forms::read_form(multipart).await?;
    let name = form.require("name", "Name is required")?;
    let color = form.field("color").unwrap_or("#8B0000").to_string();

    folders::add_folder(&state.notion, &state.config.databases.folders, &name, &color)
        .await
        .map_err(|e| e.with_label("Failed to add folder"))?;
    Ok(Json(json!({ "success": true })))
}

pub(super) async fn delete_folder(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageIdQuery>,
) -> Result<Json<Value>, ApiError> {
    let page_id = require(query.page_id, "pageId is required")?;
    posts::archive(&state.notion, &page_id)
        .await
        .map_err(|e| e.with_label("Failed to delete folder"))?;
    Ok(Json(json!({ "success": true })))
}

pub(super) async fn list_bookmarks(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let bookmarks = bookmarks::list_bookmarks(
        &state.notion,
        &state.formatter,
        &state.config.databases.bookmarks,
    )
    .await
    .map_err(|e| e.with_label("Failed to fetch bookmarks"))?;
    Ok(Json(json!({ "bookmarks": bookmarks })))
}

pub(super) async fn add_bookmark(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<CreatedBookmark>, ApiError> {
    let mut form = forms::read_form(multipart).await?;
    let text = form.require("text", "text is required")?;

    let input = bookmarks::NewBookmark {
        text,
        source_title: form.field("sourceTitle").unwrap_or_default().to_string(),
        sub: form.field("sub").unwrap_or_default().to_string(),
        image: form.take_file("image"),
        existing_image_url: form.field("imageUrl").map(|s| s.to_string()),
    };

    bookmarks::add_bookmark(
        &state.notion,
        &state.blob,
        &state.config.databases.bookmarks,
        input,
    )
    .await
    .map(Json)
    .map_err(|e| e.with_label("Failed to save bookmark"))
}

pub(super) async fn list_gallery(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SubQuery>,
) -> Result<Json<Value>, ApiError> {
    let gallery = gallery::list_gallery(
        &state.notion,
        &state.config.databases.gallery,
        query.sub.as_deref().filter(|s| !s.is_empty()),
    )
    .await
    .map_err(|e| e.with_label("Failed to fetch gallery"))?;
    Ok(Json(json!({ "gallery": gallery })))
}

pub(super) async fn add_gallery(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<CreatedGalleryItem>, ApiError> {
    let mut form = forms::read_form(multipart).await?;
    let sub = form.field("sub").map(|s| s.to_string());
    let image = form.take_file("image");
    let (Some(sub), Some(image)) = (sub, image) else {
        return Err(ApiError::BadRequest(
            "Sub and image are required".to_string(),
        ));
    };

    let input = gallery::NewGalleryItem {
        name: form.field("name").unwrap_or_default().to_string(),
        sub,
        tags: form.field("tags").map(|s| s.to_string()),
        image,
    };

    gallery::add_gallery_item(
        &state.notion,
        &state.blob,
        &state.config.databases.gallery,
        input,
    )
    .await
    .map(Json)
    .map_err(|e| e.with_label("Failed to add gallery item"))
}

#[derive(Deserialize)]
pub(super) struct ZipQuery {
    url: Option<String>,
    name: Option<String>,
}

/// Fetch a zip gallery attachment and cap its size before extraction.
async fn fetch_archive(state: &AppState, url: &str) -> Result<bytes::Bytes, ApiError> {
    let data = content::download_bytes(&state.http, url).await?;
    if data.len() as u64 > gallery::MAX_ZIP_BYTES {
        return Err(ApiError::BadRequest("Archive too large".to_string()));
    }
    Ok(data)
}

pub(super) async fn zip_entries(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ZipQuery>,
) -> Result<Json<Value>, ApiError> {
    let url = require(query.url, "url is required")?;
    let data = fetch_archive(&state, &url).await?;
    let entries = gallery::list_zip_entries(&data)?;
    Ok(Json(json!({ "entries": entries })))
}

pub(super) async fn zip_entry(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ZipQuery>,
) -> Result<Response, ApiError> {
    let url = require(query.url, "url is required")?;
    let name = require(query.name, "name is required")?;

    let data = fetch_archive(&state, &url).await?;
    let (bytes, content_type) = gallery::read_zip_entry(&data, &name)?;

    Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
}

pub(super) async fn list_themes(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SubQuery>,
) -> Result<Json<Value>, ApiError> {
    let themes = themes::list_themes(
        &state.notion,
        &state.config.databases.themes,
        query.sub.as_deref().filter(|s| !s.is_empty()),
    )
    .await
    .map_err(|e| e.with_label("Failed to fetch themes"))?;
    Ok(Json(json!({ "themes": themes })))
}

pub(super) async fn add_theme(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<CreatedTheme>, ApiError> {
    let mut form = forms::read_form(multipart).await?;
    let (Some(name), Some(sub)) = (
        form.field("name").map(|s| s.to_string()),
        form.field("sub").map(|s| s.to_string()),
    ) else {
        return Err(ApiError::BadRequest("Name and sub are required".to_string()));
    };

    let input = themes::NewTheme {
        name,
        sub,
        css: form.take_file("cssFile"),
    };

    themes::add_theme(
        &state.notion,
        &state.blob,
        &state.config.databases.themes,
        input,
    )
    .await
    .map(Json)
    .map_err(|e| e.with_label("Failed to add theme"))
}
