//! Folder listing and management.
//!
//! Folders live in their own metadata database (image, color, YouTube
//! link, menu images); the post count comes from a second pass over the
//! posts database. Posts referencing a folder with no metadata page
//! still produce a bare folder entry.

use serde_json::{json, Value};

use crate::error::ApiError;
use crate::notion::{props, NotionClient};
use crate::viewer::models::Folder;
use crate::viewer::{
    non_empty, DEFAULT_FOLDER, DEFAULT_FOLDER_COLOR, PROP_COLOR, PROP_JSON_FILE, PROP_MEDIA,
    PROP_MENU_IMAGE, PROP_NAME, PROP_SUB, PROP_YOUTUBE_URL,
};

/// List folders, merging metadata pages with per-folder post counts.
/// Folders that have neither posts nor an image are dropped. Sorted by
/// name.
pub async fn list_folders(
    notion: &NotionClient,
    folders_db: &str,
    posts_db: &str,
) -> Result<Vec<Folder>, ApiError> {
    let folder_pages = notion.query_database(folders_db, None, None).await?;

    let mut folders: std::collections::BTreeMap<String, Folder> =
        std::collections::BTreeMap::new();

    for page in &folder_pages {
        if let Some(folder) = folder_from_page(page) {
            folders.insert(folder.name.clone(), folder);
        }
    }

    let post_pages = notion.query_database(posts_db, None, None).await?;
    for page in &post_pages {
        let prop_map = props::properties(page);
        if props::files(prop_map, PROP_JSON_FILE).is_empty() {
            continue;
        }
        let sub = non_empty(props::rich_text(prop_map, PROP_SUB), DEFAULT_FOLDER);
        folders
            .entry(sub.clone())
            .or_insert_with(|| Folder {
                name: sub,
                image_url: None,
                color: DEFAULT_FOLDER_COLOR.to_string(),
                youtube_url: None,
                menu_images: Vec::new(),
                count: 0,
            })
            .count += 1;
    }

    Ok(folders
        .into_values()
        .filter(|f| f.count > 0 || f.image_url.is_some())
        .collect())
}

/// Build a folder from its metadata page. Pages without a usable name
/// are ignored.
pub fn folder_from_page(page: &Value) -> Option<Folder> {
    let prop_map = props::properties(page);

    let name = props::title(prop_map, PROP_NAME);
    let sub = non_empty(props::rich_text(prop_map, PROP_SUB), &name);
    if sub.is_empty() {
        return None;
    }

    let menu_images = props::files(prop_map, PROP_MENU_IMAGE)
        .into_iter()
        .filter_map(|f| f.url)
        .collect();

    Some(Folder {
        name: sub,
        image_url: props::first_file_url(prop_map, PROP_MEDIA),
        color: non_empty(props::rich_text(prop_map, PROP_COLOR), DEFAULT_FOLDER_COLOR),
        youtube_url: props::url(prop_map, PROP_YOUTUBE_URL),
        menu_images,
        count: 0,
    })
}

/// Create a folder metadata page.
pub async fn add_folder(
    notion: &NotionClient,
    folders_db: &str,
    name: &str,
    color: &str,
) -> Result<(), ApiError> {
    let properties = json!({
        PROP_NAME: props::title_prop(name),
        PROP_SUB: props::rich_text_prop(name),
        PROP_COLOR: props::rich_text_prop(color),
    });
    notion.create_page(folders_db, properties).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_folder_from_page_full() {
        let page = json!({
            "id": "f-1",
            "properties": {
                "이름": { "type": "title", "title": [{ "plain_text": "Dailies" }] },
                "sub": { "type": "rich_text", "rich_text": [{ "plain_text": "dailies" }] },
                "color": { "type": "rich_text", "rich_text": [{ "plain_text": "#112233" }] },
                "youtubeUrl": { "type": "url", "url": "https://youtu.be/x" },
                "파일과 미디어": { "type": "files", "files": [
                    { "name": "cover.png", "file": { "url": "https://img/cover.png" } }
                ] },
                "menuImage": { "type": "files", "files": [
                    { "name": "m1.png", "external": { "url": "https://img/m1.png" } },
                    { "name": "m2.png", "file": { "url": "https://img/m2.png" } }
                ] }
            }
        });

        let folder = folder_from_page(&page).unwrap();
        assert_eq!(folder.name, "dailies");
        assert_eq!(folder.color, "#112233");
        assert_eq!(folder.image_url.as_deref(), Some("https://img/cover.png"));
        assert_eq!(folder.youtube_url.as_deref(), Some("https://youtu.be/x"));
        assert_eq!(
            folder.menu_images,
            vec!["https://img/m1.png", "https://img/m2.png"]
        );
        assert_eq!(folder.count, 0);
    }

    #[test]
    fn test_folder_falls_back_to_title_name_and_default_color() {
        let page = json!({
            "properties": {
                "이름": { "type": "title", "title": [{ "plain_text": "Unsorted" }] }
            }
        });
        let folder = folder_from_page(&page).unwrap();
        assert_eq!(folder.name, "Unsorted");
        assert_eq!(folder.color, DEFAULT_FOLDER_COLOR);
        assert!(folder.image_url.is_none());
    }

    #[test]
    fn test_nameless_folder_page_is_dropped() {
        let page = json!({ "properties": {} });
        assert!(folder_from_page(&page).is_none());
    }
}
