//! Wire models for the viewer endpoints. Field names serialize exactly
//! as the original API emitted them.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::Serialize;

/// A chat log post (a Notion page with an attached transcript file).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub name: String,
    pub sub: String,
    pub title: String,
    pub created_at: String,
}

/// Post listing: flat plus grouped by folder.
#[derive(Debug, Serialize)]
pub struct PostList {
    pub posts: Vec<Post>,
    pub grouped: BTreeMap<String, Vec<Post>>,
}

/// Response to creating a post.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedPost {
    pub success: bool,
    pub page_id: String,
    pub notion_url: String,
    pub message: String,
}

/// One transcript attachment found while scanning the posts database.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
    pub page_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A folder: metadata page merged with the number of posts in it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub name: String,
    pub image_url: Option<String>,
    pub color: String,
    pub youtube_url: Option<String>,
    pub menu_images: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub text: String,
    /// `text` rendered with the caption formatter.
    pub html: String,
    pub source_title: String,
    pub image_url: Option<String>,
    pub created_at: String,
}

/// Response to creating a bookmark.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBookmark {
    pub success: bool,
    pub page_id: String,
    pub image_url: Option<String>,
}

/// One gallery entry. A Notion page fans out into one entry per
/// attached file.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub id: String,
    pub name: String,
    pub sub: String,
    pub favorite: bool,
    pub file_url: Option<String>,
    pub file_name: String,
    pub is_zip: bool,
}

/// Response to creating a gallery item.
#[derive(Debug, Serialize)]
pub struct CreatedGalleryItem {
    pub success: bool,
    pub item: GalleryItemSummary,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItemSummary {
    pub id: String,
    pub name: String,
    pub sub: String,
    pub image_url: String,
    pub favorite: bool,
}

/// An image entry inside a `.zip` gallery attachment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZipEntryInfo {
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub id: String,
    pub name: String,
    pub sub: String,
    pub css_url: Option<String>,
}

/// Response to creating a theme.
#[derive(Debug, Serialize)]
pub struct CreatedTheme {
    pub success: bool,
    pub theme: Theme,
}

/// One transcript message, with the raw body and the rendered HTML.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub name: String,
    pub is_user: bool,
    pub content: String,
    pub html: String,
}

/// Response to deleting a message from a transcript.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedMessage {
    pub success: bool,
    pub message: String,
    pub new_file_url: String,
}

/// A file received through a multipart form, buffered in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}
