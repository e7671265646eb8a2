//! Chat log viewer domain: posts with attached JSONL transcripts,
//! folders, bookmarks, a gallery and CSS themes, all stored as pages in
//! a handful of Notion databases.

pub mod bookmarks;
pub mod content;
pub mod folders;
pub mod gallery;
pub mod models;
pub mod posts;
pub mod themes;

// Property names as they exist in the workspace. The title column and a
// few others carry Korean names; they are data, not identifiers.
pub const PROP_NAME: &str = "이름";
pub const PROP_SUB: &str = "sub";
pub const PROP_TITLE: &str = "title";
pub const PROP_JSON_FILE: &str = "jsonFile";
pub const PROP_FAVORITE: &str = "즐겨찾기";
pub const PROP_MEDIA: &str = "파일과 미디어";
pub const PROP_TAGS: &str = "태그";
pub const PROP_COLOR: &str = "color";
pub const PROP_YOUTUBE_URL: &str = "youtubeUrl";
pub const PROP_MENU_IMAGE: &str = "menuImage";
pub const PROP_TEXT: &str = "text";
pub const PROP_SOURCE_TITLE: &str = "sourceTitle";
pub const PROP_IMAGE: &str = "image";

/// Folder name for posts without one.
pub const DEFAULT_FOLDER: &str = "미분류";
/// Title shown for posts without one.
pub const UNTITLED: &str = "제목 없음";
/// Folder color when the metadata page does not specify one.
pub const DEFAULT_FOLDER_COLOR: &str = "#1a1a2e";

/// First non-empty string, or the fallback.
pub(crate) fn non_empty(value: String, fallback: &str) -> String {
    if value.is_empty() {
        fallback.to_string()
    } else {
        value
    }
}
