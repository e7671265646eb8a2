//! CSS themes: one stylesheet per page, applied per folder by the
//! viewer frontend.

use serde_json::{json, Map, Value};

use crate::blob::{self, BlobStore};
use crate::error::ApiError;
use crate::notion::{props, NotionClient};
use crate::viewer::models::{CreatedTheme, Theme, UploadedFile};
use crate::viewer::{PROP_MEDIA, PROP_NAME, PROP_SUB};

/// Input for creating a theme.
pub struct NewTheme {
    pub name: String,
    pub sub: String,
    pub css: Option<UploadedFile>,
}

/// List themes, optionally filtered by folder.
pub async fn list_themes(
    notion: &NotionClient,
    themes_db: &str,
    sub: Option<&str>,
) -> Result<Vec<Theme>, ApiError> {
    let filter = sub.map(|s| json!({ "property": PROP_SUB, "rich_text": { "equals": s } }));
    let pages = notion.query_database(themes_db, None, filter).await?;

    Ok(pages
        .iter()
        .map(|page| {
            let prop_map = props::properties(page);
            Theme {
                id: props::page_id(page),
                name: props::title(prop_map, PROP_NAME),
                sub: props::rich_text(prop_map, PROP_SUB),
                css_url: props::first_file_url(prop_map, PROP_MEDIA),
            }
        })
        .collect())
}

/// Create a theme page, uploading the stylesheet first when one was
/// attached.
pub async fn add_theme(
    notion: &NotionClient,
    blob_store: &BlobStore,
    themes_db: &str,
    input: NewTheme,
) -> Result<CreatedTheme, ApiError> {
    let css_url = match input.css {
        Some(css) => {
            let object = blob::object_name("theme", &css.file_name);
            Some(blob_store.put(&object, css.data, "text/css").await?)
        }
        None => None,
    };

    let mut properties = Map::new();
    properties.insert(PROP_NAME.to_string(), props::title_prop(&input.name));
    properties.insert(PROP_SUB.to_string(), props::rich_text_prop(&input.sub));
    if let Some(url) = &css_url {
        properties.insert(
            PROP_MEDIA.to_string(),
            props::external_file_prop(&format!("{}.css", input.name), url),
        );
    }

    let page = notion
        .create_page(themes_db, Value::Object(properties))
        .await?;

    Ok(CreatedTheme {
        success: true,
        theme: Theme {
            id: props::page_id(&page),
            name: input.name,
            sub: input.sub,
            css_url,
        },
    })
}
