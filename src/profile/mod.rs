//! Read-only queries behind the character profile microsite. Four
//! databases (profiles, diary posts, memory gallery, BGM tracks), each
//! reshaped into plain records; nothing here writes.

pub mod models;

use serde_json::{json, Value};

use crate::config::DatabaseIds;
use crate::error::ApiError;
use crate::notion::{props, NotionClient};

pub use models::{BgmTrack, DiaryPost, MemoryItem, Profile, ProfileBundle};

fn order_ascending() -> Value {
    json!([{ "property": "order", "direction": "ascending" }])
}

/// Character profiles, in display order.
pub async fn profiles(notion: &NotionClient, database_id: &str) -> Result<Vec<Profile>, ApiError> {
    let pages = notion
        .query_database(database_id, Some(order_ascending()), None)
        .await?;
    Ok(pages.iter().map(profile_from_page).collect())
}

pub fn profile_from_page(page: &Value) -> Profile {
    let prop_map = props::properties(page);
    let shape_color = props::rich_text(prop_map, "shapeColor");

    Profile {
        id: props::page_id(page),
        big_img: props::file_or_url(prop_map, "bigImg"),
        top_circle: props::file_or_url(prop_map, "topCircle"),
        small_img: props::file_or_url(prop_map, "smallImg"),
        gothic_title: props::rich_text(prop_map, "gothicTitle"),
        gothic_sub: props::rich_text(prop_map, "gothicSub"),
        pill_text: props::rich_text(prop_map, "pillText"),
        char_desc: props::rich_text(prop_map, "charDesc"),
        char_type: props::rich_text(prop_map, "charType"),
        char_element: props::rich_text(prop_map, "charElement"),
        char_origin: props::rich_text(prop_map, "charOrigin"),
        shape_color: if shape_color.is_empty() {
            "#ffffff".to_string()
        } else {
            shape_color
        },
        is_flipped: props::checkbox(prop_map, "isFlipped"),
    }
}

/// Diary posts, newest first.
pub async fn diary_posts(
    notion: &NotionClient,
    database_id: &str,
) -> Result<Vec<DiaryPost>, ApiError> {
    let sorts = json!([{ "property": "date", "direction": "descending" }]);
    let pages = notion.query_database(database_id, Some(sorts), None).await?;
    Ok(pages.iter().map(diary_post_from_page).collect())
}

pub fn diary_post_from_page(page: &Value) -> DiaryPost {
    let prop_map = props::properties(page);
    DiaryPost {
        id: props::page_id(page),
        title: props::title(prop_map, "title"),
        date: props::date_start(prop_map, "date"),
        image: props::file_or_url(prop_map, "image"),
        preview: props::rich_text(prop_map, "preview"),
        body: props::rich_text(prop_map, "body"),
        tags: props::multi_select(prop_map, "tags"),
        likes: props::number(prop_map, "likes").map(|n| n as i64).unwrap_or(0),
        comments: props::number(prop_map, "comments").map(|n| n as i64).unwrap_or(0),
        profile_id: props::relation_first(prop_map, "profileId"),
    }
}

/// Memory gallery images, in display order.
pub async fn memory(notion: &NotionClient, database_id: &str) -> Result<Vec<MemoryItem>, ApiError> {
    let pages = notion
        .query_database(database_id, Some(order_ascending()), None)
        .await?;
    Ok(pages
        .iter()
        .map(|page| {
            let prop_map = props::properties(page);
            MemoryItem {
                id: props::page_id(page),
                image: props::file_or_url(prop_map, "image"),
                caption: props::rich_text(prop_map, "caption"),
            }
        })
        .collect())
}

/// BGM tracks, in display order. A track URL may come from a file
/// upload, a url property or a plain text column.
pub async fn bgm(notion: &NotionClient, database_id: &str) -> Result<Vec<BgmTrack>, ApiError> {
    let pages = notion
        .query_database(database_id, Some(order_ascending()), None)
        .await?;
    Ok(pages.iter().map(bgm_from_page).collect())
}

pub fn bgm_from_page(page: &Value) -> BgmTrack {
    let prop_map = props::properties(page);
    let url = props::file_or_url(prop_map, "url");
    let url = if url.is_empty() {
        props::rich_text(prop_map, "urlText")
    } else {
        url
    };

    BgmTrack {
        id: props::page_id(page),
        title: props::title(prop_map, "title"),
        artist: props::rich_text(prop_map, "artist"),
        url,
        profile_id: props::relation_first(prop_map, "profileId"),
    }
}

/// Everything at once, for the microsite's initial load.
pub async fn bundle(notion: &NotionClient, dbs: &DatabaseIds) -> Result<ProfileBundle, ApiError> {
    Ok(ProfileBundle {
        profiles: profiles(notion, &dbs.profiles).await?,
        posts: diary_posts(notion, &dbs.profile_posts).await?,
        memory: memory(notion, &dbs.memory).await?,
        bgm: bgm(notion, &dbs.bgm).await?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_from_page_defaults() {
        let page = json!({ "id": "p-1", "properties": {} });
        let profile = profile_from_page(&page);
        assert_eq!(profile.id, "p-1");
        assert_eq!(profile.big_img, "");
        assert_eq!(profile.shape_color, "#ffffff");
        assert!(!profile.is_flipped);
    }

    #[test]
    fn test_profile_shape_color_kept_when_present() {
        let page = json!({
            "id": "p-2",
            "properties": {
                "shapeColor": { "rich_text": [{ "plain_text": "#abcdef" }] },
                "isFlipped": { "checkbox": true }
            }
        });
        let profile = profile_from_page(&page);
        assert_eq!(profile.shape_color, "#abcdef");
        assert!(profile.is_flipped);
    }

    #[test]
    fn test_diary_post_counts_default_to_zero() {
        let page = json!({
            "id": "d-1",
            "properties": {
                "title": { "title": [{ "plain_text": "entry" }] },
                "date": { "date": { "start": "2024-05-01" } },
                "likes": { "number": 4.0 },
                "tags": { "multi_select": [{ "name": "spring" }] },
                "profileId": { "relation": [{ "id": "p-1" }] }
            }
        });
        let post = diary_post_from_page(&page);
        assert_eq!(post.title, "entry");
        assert_eq!(post.date, "2024-05-01");
        assert_eq!(post.likes, 4);
        assert_eq!(post.comments, 0);
        assert_eq!(post.tags, vec!["spring"]);
        assert_eq!(post.profile_id.as_deref(), Some("p-1"));
    }

    #[test]
    fn test_single_type_serializes_bare_and_bundle_keyed() {
        let page = json!({ "id": "p-1", "properties": {} });
        let profiles = vec![profile_from_page(&page)];

        // `?type=profiles` must answer with a bare array.
        let value = serde_json::to_value(&profiles).unwrap();
        assert!(value.is_array());
        assert_eq!(value[0]["id"], "p-1");

        // The default response keys every database.
        let bundle = ProfileBundle {
            profiles,
            posts: Vec::new(),
            memory: Vec::new(),
            bgm: Vec::new(),
        };
        let value = serde_json::to_value(&bundle).unwrap();
        assert!(value["profiles"].is_array());
        assert!(value["posts"].is_array());
        assert!(value["memory"].is_array());
        assert!(value["bgm"].is_array());
    }

    #[test]
    fn test_bgm_url_falls_back_to_text_column() {
        let page = json!({
            "id": "b-1",
            "properties": {
                "title": { "title": [{ "plain_text": "song" }] },
                "urlText": { "rich_text": [{ "plain_text": "https://host/song.mp3" }] }
            }
        });
        let track = bgm_from_page(&page);
        assert_eq!(track.url, "https://host/song.mp3");

        let page = json!({
            "id": "b-2",
            "properties": {
                "url": { "url": "https://direct/song.ogg" }
            }
        });
        assert_eq!(bgm_from_page(&page).url, "https://direct/song.ogg");
    }
}
