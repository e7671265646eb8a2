//! Post operations against the chat log database.

use std::collections::BTreeMap;

use serde_json::json;

use crate::error::ApiError;
use crate::notion::{props, NotionClient};
use crate::viewer::models::{CreatedPost, FileEntry, Post, PostList};
use crate::viewer::{
    non_empty, DEFAULT_FOLDER, PROP_FAVORITE, PROP_JSON_FILE, PROP_NAME, PROP_SUB, PROP_TITLE,
    UNTITLED,
};

/// List all posts that carry a transcript file, sorted by folder then
/// title, alongside a folder-grouped view of the same list.
pub async fn list_posts(notion: &NotionClient, database_id: &str) -> Result<PostList, ApiError> {
    let sorts = json!([
        { "property": PROP_SUB, "direction": "ascending" },
        { "property": PROP_TITLE, "direction": "ascending" },
    ]);
    let pages = notion.query_database(database_id, Some(sorts), None).await?;

    let mut posts = Vec::new();
    for page in &pages {
        let prop_map = props::properties(page);

        // Pages without an attached file are drafts; skip them.
        if props::files(prop_map, PROP_JSON_FILE).is_empty() {
            continue;
        }

        let name = props::title(prop_map, PROP_NAME);
        let sub = non_empty(props::rich_text(prop_map, PROP_SUB), DEFAULT_FOLDER);
        let title = non_empty(
            props::rich_text(prop_map, PROP_TITLE),
            &non_empty(name.clone(), UNTITLED),
        );

        posts.push(Post {
            id: props::page_id(page),
            name,
            sub,
            title,
            created_at: props::created_time(page),
        });
    }

    let grouped = group_by_folder(&posts);
    Ok(PostList { posts, grouped })
}

/// Group posts by their folder name, preserving the list order inside
/// each group.
pub fn group_by_folder(posts: &[Post]) -> BTreeMap<String, Vec<Post>> {
    let mut grouped: BTreeMap<String, Vec<Post>> = BTreeMap::new();
    for post in posts {
        grouped.entry(post.sub.clone()).or_default().push(post.clone());
    }
    grouped
}

/// Create a post page without a file. The file gets attached in the
/// Notion UI afterwards, which is why the response message says so.
pub async fn create_post(
    notion: &NotionClient,
    database_id: &str,
    sub: &str,
    title: &str,
) -> Result<CreatedPost, ApiError> {
    let properties = json!({
        PROP_NAME: props::title_prop(title),
        PROP_SUB: props::rich_text_prop(sub),
    });
    let page = notion.create_page(database_id, properties).await?;
    let page_id = props::page_id(&page);
    let notion_url = format!("https://notion.so/{}", page_id.replace('-', ""));

    Ok(CreatedPost {
        success: true,
        page_id,
        notion_url,
        message: "등록 완료! 노션에서 jsonFile에 파일을 직접 업로드해주세요.".to_string(),
    })
}

/// Soft-delete any page (posts and folders share this).
pub async fn archive(notion: &NotionClient, page_id: &str) -> Result<(), ApiError> {
    notion.archive_page(page_id).await?;
    Ok(())
}

/// Rename a post.
pub async fn update_title(
    notion: &NotionClient,
    page_id: &str,
    title: &str,
) -> Result<(), ApiError> {
    let properties = json!({ PROP_NAME: props::title_prop(title) });
    notion.update_page(page_id, properties).await?;
    Ok(())
}

/// Set the favorite checkbox on a post.
pub async fn set_favorite(
    notion: &NotionClient,
    page_id: &str,
    favorite: bool,
) -> Result<(), ApiError> {
    let properties = json!({ PROP_FAVORITE: props::checkbox_prop(favorite) });
    notion.update_page(page_id, properties).await?;
    Ok(())
}

/// Enumerate every `.json`/`.jsonl` attachment across the database,
/// scanning all files-type properties of each page.
pub async fn list_files(
    notion: &NotionClient,
    database_id: &str,
) -> Result<Vec<FileEntry>, ApiError> {
    let pages = notion.query_database(database_id, None, None).await?;

    let mut files = Vec::new();
    for page in &pages {
        let page_id = props::page_id(page);
        let prop_map = props::properties(page);
        let Some(prop_obj) = prop_map.as_object() else {
            continue;
        };

        let mut pushed_any = false;
        for prop in prop_obj.values() {
            if !props::is_files_property(prop) {
                continue;
            }
            for entry in prop["files"].as_array().into_iter().flatten() {
                let name = entry["name"].as_str().unwrap_or("unknown").to_string();
                if !is_transcript_name(&name) {
                    continue;
                }
                files.push(FileEntry {
                    id: format!("{}-{}", page_id, name),
                    name,
                    url: props::file_entry_url(entry),
                    page_id: page_id.clone(),
                    title: None,
                });
                pushed_any = true;
            }
        }

        // Attach the page title to the last file found for this page.
        if pushed_any {
            let title = prop_obj
                .values()
                .find(|p| p["type"].as_str() == Some("title"))
                .and_then(|p| p["title"][0]["plain_text"].as_str())
                .map(|s| s.to_string());
            if let (Some(title), Some(last)) = (title, files.last_mut()) {
                last.title = Some(title);
            }
        }
    }

    Ok(files)
}

/// Transcript attachments are plain or newline-delimited JSON.
pub fn is_transcript_name(name: &str) -> bool {
    name.ends_with(".json") || name.ends_with(".jsonl")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: &str, sub: &str, title: &str) -> Post {
        Post {
            id: id.to_string(),
            name: title.to_string(),
            sub: sub.to_string(),
            title: title.to_string(),
            created_at: String::new(),
        }
    }

    #[test]
    fn test_group_by_folder() {
        let posts = vec![
            post("1", "dailies", "a"),
            post("2", DEFAULT_FOLDER, "b"),
            post("3", "dailies", "c"),
        ];

        let grouped = group_by_folder(&posts);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["dailies"].len(), 2);
        assert_eq!(grouped["dailies"][0].id, "1");
        assert_eq!(grouped["dailies"][1].id, "3");
        assert_eq!(grouped[DEFAULT_FOLDER][0].title, "b");

        assert!(group_by_folder(&[]).is_empty());
    }

    #[test]
    fn test_is_transcript_name() {
        assert!(is_transcript_name("chat.jsonl"));
        assert!(is_transcript_name("log.json"));
        assert!(!is_transcript_name("image.png"));
        assert!(!is_transcript_name("jsonl"));
    }
}
