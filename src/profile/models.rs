//! Wire models for the character profile microsite.

use serde::Serialize;

/// One character profile card.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub big_img: String,
    pub top_circle: String,
    pub small_img: String,
    pub gothic_title: String,
    pub gothic_sub: String,
    pub pill_text: String,
    pub char_desc: String,
    pub char_type: String,
    pub char_element: String,
    pub char_origin: String,
    pub shape_color: String,
    pub is_flipped: bool,
}

/// A diary post shown on a profile page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryPost {
    pub id: String,
    pub title: String,
    pub date: String,
    pub image: String,
    pub preview: String,
    pub body: String,
    pub tags: Vec<String>,
    pub likes: i64,
    pub comments: i64,
    pub profile_id: Option<String>,
}

/// One memory gallery image.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryItem {
    pub id: String,
    pub image: String,
    pub caption: String,
}

/// One background-music track.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BgmTrack {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub url: String,
    pub profile_id: Option<String>,
}

/// Everything the microsite needs in one response.
#[derive(Debug, Serialize)]
pub struct ProfileBundle {
    pub profiles: Vec<Profile>,
    pub posts: Vec<DiaryPost>,
    pub memory: Vec<MemoryItem>,
    pub bgm: Vec<BgmTrack>,
}
