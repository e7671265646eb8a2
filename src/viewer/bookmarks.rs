//! Bookmarks: text snippets clipped from transcripts, optionally with a
//! background image uploaded to blob storage.

use serde_json::{json, Map, Value};

use crate::blob::{self, BlobStore};
use crate::error::ApiError;
use crate::format::MessageFormatter;
use crate::notion::{props, NotionClient};
use crate::viewer::models::{Bookmark, CreatedBookmark, UploadedFile};
use crate::viewer::{PROP_IMAGE, PROP_NAME, PROP_SOURCE_TITLE, PROP_SUB, PROP_TEXT};

/// Input for creating a bookmark.
pub struct NewBookmark {
    pub text: String,
    pub source_title: String,
    pub sub: String,
    /// Image uploaded with the form, if any.
    pub image: Option<UploadedFile>,
    /// Existing image URL (picked from the gallery) used when no file
    /// was uploaded.
    pub existing_image_url: Option<String>,
}

/// List bookmarks, newest first.
pub async fn list_bookmarks(
    notion: &NotionClient,
    formatter: &MessageFormatter,
    bookmarks_db: &str,
) -> Result<Vec<Bookmark>, ApiError> {
    let sorts = json!([{ "timestamp": "created_time", "direction": "descending" }]);
    let pages = notion.query_database(bookmarks_db, Some(sorts), None).await?;

    Ok(pages
        .iter()
        .map(|page| {
            let prop_map = props::properties(page);
            let text = props::rich_text(prop_map, PROP_TEXT);
            Bookmark {
                id: props::page_id(page),
                html: formatter.format_caption(&text),
                text,
                source_title: props::rich_text(prop_map, PROP_SOURCE_TITLE),
                image_url: props::first_file_url(prop_map, PROP_IMAGE),
                created_at: props::created_time(page),
            }
        })
        .collect())
}

/// Create a bookmark, uploading the image first when one was attached.
pub async fn add_bookmark(
    notion: &NotionClient,
    blob_store: &BlobStore,
    bookmarks_db: &str,
    input: NewBookmark,
) -> Result<CreatedBookmark, ApiError> {
    let image_url = match input.image {
        Some(image) => {
            let file_name = if image.file_name.is_empty() {
                "image.jpg".to_string()
            } else {
                image.file_name
            };
            let object = blob::object_name("bookmark", &file_name);
            let content_type = if image.content_type.is_empty() {
                "image/jpeg".to_string()
            } else {
                image.content_type
            };
            Some(blob_store.put(&object, image.data, &content_type).await?)
        }
        None => input.existing_image_url.filter(|url| !url.is_empty()),
    };

    let mut properties = Map::new();
    properties.insert(
        PROP_NAME.to_string(),
        props::title_prop(&bookmark_title(&input.text)),
    );
    properties.insert(PROP_TEXT.to_string(), props::rich_text_prop(&input.text));
    properties.insert(
        PROP_SOURCE_TITLE.to_string(),
        props::rich_text_prop(&input.source_title),
    );
    properties.insert(PROP_SUB.to_string(), props::rich_text_prop(&input.sub));
    if let Some(url) = &image_url {
        properties.insert(
            PROP_IMAGE.to_string(),
            props::external_file_prop("bookmark_image", url),
        );
    }

    let page = notion
        .create_page(bookmarks_db, Value::Object(properties))
        .await?;

    Ok(CreatedBookmark {
        success: true,
        page_id: props::page_id(&page),
        image_url,
    })
}

/// Page title for a bookmark: the clipped text, truncated to 50
/// characters with an ellipsis.
pub fn bookmark_title(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(50).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bookmark_title_short_text_unchanged() {
        assert_eq!(bookmark_title("short clip"), "short clip");
    }

    #[test]
    fn test_bookmark_title_truncates_long_text() {
        let text = "a".repeat(80);
        let title = bookmark_title(&text);
        assert_eq!(title.chars().count(), 53);
        assert!(title.ends_with("..."));
    }

    #[test]
    fn test_bookmark_title_exact_boundary() {
        let text = "b".repeat(50);
        assert_eq!(bookmark_title(&text), text);
    }
}
