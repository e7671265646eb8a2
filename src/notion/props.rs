//! Readers and builders for Notion page properties.
//!
//! Pages arrive as raw `serde_json::Value` objects. The readers here
//! tolerate every absent level (unknown property, empty rich text array,
//! missing URL) and fall back to empty values, because that is the
//! contract the workspace data actually follows.

use serde_json::{json, Value};

/// A single entry of a `files` property.
#[derive(Debug, Clone, PartialEq)]
pub struct FileRef {
    pub name: String,
    pub url: Option<String>,
}

/// Borrow the properties object of a page, or an empty placeholder.
pub fn properties(page: &Value) -> &Value {
    &page["properties"]
}

/// Page ID, empty string if absent.
pub fn page_id(page: &Value) -> String {
    page["id"].as_str().unwrap_or_default().to_string()
}

/// Page creation timestamp (ISO 8601 string), empty if absent.
pub fn created_time(page: &Value) -> String {
    page["created_time"].as_str().unwrap_or_default().to_string()
}

/// Plain text of the first item in a `title` property.
pub fn title(props: &Value, name: &str) -> String {
    props[name]["title"][0]["plain_text"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

/// Plain text of the first item in a `rich_text` property.
pub fn rich_text(props: &Value, name: &str) -> String {
    props[name]["rich_text"][0]["plain_text"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

/// Value of a `checkbox` property, false if absent.
pub fn checkbox(props: &Value, name: &str) -> bool {
    props[name]["checkbox"].as_bool().unwrap_or(false)
}

/// Value of a `url` property.
pub fn url(props: &Value, name: &str) -> Option<String> {
    props[name]["url"].as_str().map(|s| s.to_string())
}

/// Value of a `number` property.
pub fn number(props: &Value, name: &str) -> Option<f64> {
    props[name]["number"].as_f64()
}

/// Start date of a `date` property, empty if absent.
pub fn date_start(props: &Value, name: &str) -> String {
    props[name]["date"]["start"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

/// Names of every option in a `multi_select` property.
pub fn multi_select(props: &Value, name: &str) -> Vec<String> {
    props[name]["multi_select"]
        .as_array()
        .map(|options| {
            options
                .iter()
                .filter_map(|o| o["name"].as_str().map(|s| s.to_string()))
                .collect()
        })
        .unwrap_or_default()
}

/// ID of the first related page in a `relation` property.
pub fn relation_first(props: &Value, name: &str) -> Option<String> {
    props[name]["relation"][0]["id"].as_str().map(|s| s.to_string())
}

/// Resolve the download URL of one file entry. Hosted files carry
/// `file.url`, externally linked ones `external.url`.
pub fn file_entry_url(file: &Value) -> Option<String> {
    file["file"]["url"]
        .as_str()
        .or_else(|| file["external"]["url"].as_str())
        .map(|s| s.to_string())
}

/// All entries of a `files` property.
pub fn files(props: &Value, name: &str) -> Vec<FileRef> {
    props[name]["files"]
        .as_array()
        .map(|entries| {
            entries
                .iter()
                .map(|f| FileRef {
                    name: f["name"].as_str().unwrap_or_default().to_string(),
                    url: file_entry_url(f),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// URL of the first file in a `files` property.
pub fn first_file_url(props: &Value, name: &str) -> Option<String> {
    files(props, name).into_iter().find_map(|f| f.url)
}

/// Profile-style lookup that accepts both `files` and `url` property
/// shapes, returning an empty string when neither is present.
pub fn file_or_url(props: &Value, name: &str) -> String {
    first_file_url(props, name)
        .or_else(|| url(props, name))
        .unwrap_or_default()
}

/// Whether the property is of `files` type (used when scanning every
/// property of a page for attachments).
pub fn is_files_property(prop: &Value) -> bool {
    prop["type"].as_str() == Some("files")
}

// Builders for `pages.create` / `pages.update` payloads.

pub fn title_prop(text: &str) -> Value {
    json!({ "title": [{ "text": { "content": text } }] })
}

pub fn rich_text_prop(text: &str) -> Value {
    json!({ "rich_text": [{ "text": { "content": text } }] })
}

pub fn checkbox_prop(checked: bool) -> Value {
    json!({ "checkbox": checked })
}

pub fn external_file_prop(name: &str, url: &str) -> Value {
    json!({
        "files": [{
            "name": name,
            "type": "external",
            "external": { "url": url },
        }]
    })
}

pub fn multi_select_prop(names: &[String]) -> Value {
    let options: Vec<Value> = names.iter().map(|n| json!({ "name": n })).collect();
    json!({ "multi_select": options })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_page() -> Value {
        json!({
            "id": "page-1",
            "created_time": "2024-03-01T12:00:00.000Z",
            "properties": {
                "이름": { "type": "title", "title": [{ "plain_text": "First Log" }] },
                "sub": { "type": "rich_text", "rich_text": [{ "plain_text": "dailies" }] },
                "즐겨찾기": { "type": "checkbox", "checkbox": true },
                "likes": { "type": "number", "number": 3.0 },
                "date": { "type": "date", "date": { "start": "2024-02-29" } },
                "태그": { "type": "multi_select", "multi_select": [
                    { "name": "red" }, { "name": "blue" }
                ] },
                "profileId": { "type": "relation", "relation": [{ "id": "prof-1" }] },
                "jsonFile": { "type": "files", "files": [
                    { "name": "chat.jsonl", "file": { "url": "https://files/chat.jsonl" } },
                    { "name": "extra.json", "external": { "url": "https://ext/extra.json" } }
                ] },
                "link": { "type": "url", "url": "https://example.com" }
            }
        })
    }

    #[test]
    fn test_basic_readers() {
        let page = sample_page();
        let props = properties(&page);

        assert_eq!(page_id(&page), "page-1");
        assert_eq!(created_time(&page), "2024-03-01T12:00:00.000Z");
        assert_eq!(title(props, "이름"), "First Log");
        assert_eq!(rich_text(props, "sub"), "dailies");
        assert!(checkbox(props, "즐겨찾기"));
        assert_eq!(number(props, "likes"), Some(3.0));
        assert_eq!(date_start(props, "date"), "2024-02-29");
        assert_eq!(multi_select(props, "태그"), vec!["red", "blue"]);
        assert_eq!(relation_first(props, "profileId"), Some("prof-1".to_string()));
        assert_eq!(url(props, "link"), Some("https://example.com".to_string()));
    }

    #[test]
    fn test_absent_properties_default_to_empty() {
        let page = json!({ "properties": {} });
        let props = properties(&page);

        assert_eq!(title(props, "이름"), "");
        assert_eq!(rich_text(props, "sub"), "");
        assert!(!checkbox(props, "즐겨찾기"));
        assert_eq!(number(props, "likes"), None);
        assert!(multi_select(props, "태그").is_empty());
        assert!(files(props, "jsonFile").is_empty());
        assert_eq!(file_or_url(props, "image"), "");
    }

    #[test]
    fn test_files_resolve_hosted_and_external_urls() {
        let page = sample_page();
        let props = properties(&page);

        let entries = files(props, "jsonFile");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "chat.jsonl");
        assert_eq!(entries[0].url.as_deref(), Some("https://files/chat.jsonl"));
        assert_eq!(entries[1].url.as_deref(), Some("https://ext/extra.json"));
        assert_eq!(
            first_file_url(props, "jsonFile").as_deref(),
            Some("https://files/chat.jsonl")
        );
    }

    #[test]
    fn test_file_or_url_prefers_files() {
        let props = json!({
            "image": { "type": "files", "files": [
                { "name": "a.png", "external": { "url": "https://img/a.png" } }
            ] },
            "bgm": { "type": "url", "url": "https://song" }
        });
        assert_eq!(file_or_url(&props, "image"), "https://img/a.png");
        assert_eq!(file_or_url(&props, "bgm"), "https://song");
    }

    #[test]
    fn test_builders_shape() {
        assert_eq!(
            title_prop("hello"),
            json!({ "title": [{ "text": { "content": "hello" } }] })
        );
        assert_eq!(
            external_file_prop("a.css", "https://blob/a.css"),
            json!({ "files": [{
                "name": "a.css",
                "type": "external",
                "external": { "url": "https://blob/a.css" },
            }] })
        );
        assert_eq!(
            multi_select_prop(&["x".to_string(), "y".to_string()]),
            json!({ "multi_select": [{ "name": "x" }, { "name": "y" }] })
        );
    }
}
