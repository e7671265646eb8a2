//! Gallery: image pages that fan out into one entry per attached file.
//!
//! Google Drive share links are rewritten to their direct-download form
//! and `.zip` attachments are flagged so the client can browse them via
//! the zip endpoints instead of rendering them as images.

use std::io::{Cursor, Read};

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};
use zip::ZipArchive;

use crate::blob::{self, BlobStore};
use crate::error::ApiError;
use crate::notion::{props, NotionClient};
use crate::viewer::models::{
    CreatedGalleryItem, GalleryItem, GalleryItemSummary, UploadedFile, ZipEntryInfo,
};
use crate::viewer::{PROP_FAVORITE, PROP_MEDIA, PROP_NAME, PROP_SUB, PROP_TAGS};

/// Upper bound for archives fetched into memory by the zip endpoints.
pub const MAX_ZIP_BYTES: u64 = 20 * 1024 * 1024;

/// Input for creating a gallery item.
pub struct NewGalleryItem {
    pub name: String,
    pub sub: String,
    /// Comma-separated tag list.
    pub tags: Option<String>,
    pub image: UploadedFile,
}

/// List gallery entries, optionally filtered by folder.
pub async fn list_gallery(
    notion: &NotionClient,
    gallery_db: &str,
    sub: Option<&str>,
) -> Result<Vec<GalleryItem>, ApiError> {
    let filter = sub.map(|s| json!({ "property": PROP_SUB, "rich_text": { "equals": s } }));
    let pages = notion.query_database(gallery_db, None, filter).await?;

    let mut gallery = Vec::new();
    for page in &pages {
        let page_id = props::page_id(page);
        let prop_map = props::properties(page);
        let name = props::title(prop_map, PROP_NAME);
        let sub_value = props::rich_text(prop_map, PROP_SUB);
        let favorite = props::checkbox(prop_map, PROP_FAVORITE);

        for (index, file) in props::files(prop_map, PROP_MEDIA).into_iter().enumerate() {
            let file_url = file.url.map(|url| rewrite_drive_url(&url));
            let is_zip = file.name.to_lowercase().ends_with(".zip");
            let display_name = if name.is_empty() {
                file.name.clone()
            } else {
                name.clone()
            };

            gallery.push(GalleryItem {
                id: format!("{}_{}", page_id, index),
                name: display_name,
                sub: sub_value.clone(),
                favorite,
                file_url,
                file_name: file.name,
                is_zip,
            });
        }
    }

    Ok(gallery)
}

static DRIVE_FILE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/d/([^/]+)").unwrap());

/// Rewrite Google Drive share links to the direct-download endpoint.
pub fn rewrite_drive_url(url: &str) -> String {
    if !url.contains("drive.google.com/file/d/") {
        return url.to_string();
    }
    match DRIVE_FILE_ID.captures(url).and_then(|caps| caps.get(1)) {
        Some(id) => format!(
            "https://drive.google.com/uc?export=download&id={}",
            id.as_str()
        ),
        None => url.to_string(),
    }
}

/// Upload the image to blob storage and create the gallery page.
pub async fn add_gallery_item(
    notion: &NotionClient,
    blob_store: &BlobStore,
    gallery_db: &str,
    input: NewGalleryItem,
) -> Result<CreatedGalleryItem, ApiError> {
    let object = blob::object_name("gallery", &input.image.file_name);
    let image_url = blob_store
        .put(&object, input.image.data, &input.image.content_type)
        .await?;

    let mut properties = Map::new();
    properties.insert(PROP_NAME.to_string(), props::title_prop(&input.name));
    properties.insert(PROP_SUB.to_string(), props::rich_text_prop(&input.sub));
    properties.insert(PROP_FAVORITE.to_string(), props::checkbox_prop(false));
    properties.insert(
        PROP_MEDIA.to_string(),
        props::external_file_prop(&input.image.file_name, &image_url),
    );
    if let Some(tags) = &input.tags {
        let names: Vec<String> = tags
            .split(',')
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if !names.is_empty() {
            properties.insert(PROP_TAGS.to_string(), props::multi_select_prop(&names));
        }
    }

    let page = notion
        .create_page(gallery_db, Value::Object(properties))
        .await?;

    Ok(CreatedGalleryItem {
        success: true,
        item: GalleryItemSummary {
            id: props::page_id(&page),
            name: input.name,
            sub: input.sub,
            image_url,
            favorite: false,
        },
    })
}

/// Image types servable out of a zip attachment.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("avif", "image/avif"),
];

/// Content type for an image entry name, if it is one.
pub fn image_content_type(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    let ext = lower.rsplit('.').next()?;
    IMAGE_TYPES
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, mime)| *mime)
}

/// List the image entries of an in-memory zip archive.
pub fn list_zip_entries(data: &[u8]) -> Result<Vec<ZipEntryInfo>, ApiError> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;

    let mut entries = Vec::new();
    for index in 0..archive.len() {
        let entry = archive.by_index(index)?;
        if entry.is_file() && image_content_type(entry.name()).is_some() {
            entries.push(ZipEntryInfo {
                name: entry.name().to_string(),
                size: entry.size(),
            });
        }
    }

    Ok(entries)
}

/// Extract one image entry from an in-memory zip archive.
pub fn read_zip_entry(data: &[u8], name: &str) -> Result<(Vec<u8>, &'static str), ApiError> {
    read_zip_entry_limited(data, name, MAX_ZIP_BYTES)
}

/// The declared uncompressed size and the actual inflated length are
/// both attacker-controlled; check the header first, then read through
/// a hard limit so a lying header cannot blow past it either.
fn read_zip_entry_limited(
    data: &[u8],
    name: &str,
    limit: u64,
) -> Result<(Vec<u8>, &'static str), ApiError> {
    let content_type = image_content_type(name)
        .ok_or_else(|| ApiError::BadRequest("Not an image entry".to_string()))?;

    let mut archive = ZipArchive::new(Cursor::new(data))?;
    let mut entry = archive
        .by_name(name)
        .map_err(|_| ApiError::NotFound("Entry not found in archive".to_string()))?;

    if entry.size() > limit {
        return Err(ApiError::BadRequest("Entry too large".to_string()));
    }

    let mut buf = Vec::new();
    entry
        .by_ref()
        .take(limit + 1)
        .read_to_end(&mut buf)
        .map_err(|e| ApiError::BadRequest(format!("Invalid zip archive: {}", e)))?;
    if buf.len() as u64 > limit {
        return Err(ApiError::BadRequest("Entry too large".to_string()));
    }

    Ok((buf, content_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn sample_zip() -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        writer.start_file("cards/one.png", options).unwrap();
        std::io::Write::write_all(&mut writer, b"png-bytes").unwrap();

        writer.start_file("readme.txt", options).unwrap();
        std::io::Write::write_all(&mut writer, b"ignore me").unwrap();

        writer.start_file("two.JPG", options).unwrap();
        std::io::Write::write_all(&mut writer, b"jpg-bytes").unwrap();

        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_rewrite_drive_url() {
        assert_eq!(
            rewrite_drive_url("https://drive.google.com/file/d/abc123/view?usp=sharing"),
            "https://drive.google.com/uc?export=download&id=abc123"
        );
        assert_eq!(
            rewrite_drive_url("https://example.com/image.png"),
            "https://example.com/image.png"
        );
    }

    #[test]
    fn test_image_content_type() {
        assert_eq!(image_content_type("a.png"), Some("image/png"));
        assert_eq!(image_content_type("B.JPEG"), Some("image/jpeg"));
        assert_eq!(image_content_type("notes.txt"), None);
        assert_eq!(image_content_type("noext"), None);
    }

    #[test]
    fn test_list_zip_entries_filters_images() {
        let data = sample_zip();
        let entries = list_zip_entries(&data).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "cards/one.png");
        assert_eq!(entries[0].size, 9);
        assert_eq!(entries[1].name, "two.JPG");
    }

    #[test]
    fn test_read_zip_entry() {
        let data = sample_zip();
        let (bytes, content_type) = read_zip_entry(&data, "cards/one.png").unwrap();
        assert_eq!(bytes, b"png-bytes");
        assert_eq!(content_type, "image/png");

        assert!(read_zip_entry(&data, "missing.png").is_err());
        assert!(read_zip_entry(&data, "readme.txt").is_err());
    }

    #[test]
    fn test_garbage_archive_rejected() {
        assert!(list_zip_entries(b"definitely not a zip").is_err());
    }

    #[test]
    fn test_oversized_entry_rejected() {
        let data = sample_zip();
        // "cards/one.png" holds 9 bytes; a 4-byte limit must refuse it.
        assert!(read_zip_entry_limited(&data, "cards/one.png", 4).is_err());
        assert!(read_zip_entry_limited(&data, "cards/one.png", 9).is_ok());
    }
}
