//! Transcript content handling: resolving a post's attachment URL
//! (Notion file URLs expire after an hour, so every read re-resolves),
//! downloading it, parsing JSONL and splicing messages out.

use bytes::Bytes;
use serde_json::{json, Value};

use crate::blob::{self, BlobStore};
use crate::error::ApiError;
use crate::format::MessageFormatter;
use crate::notion::{props, NotionClient};
use crate::viewer::models::{ChatMessage, DeletedMessage};
use crate::viewer::posts::is_transcript_name;
use crate::viewer::PROP_JSON_FILE;

/// Keys checked, in order, for a message body.
const CONTENT_KEYS: [&str; 4] = ["mes", "content", "message", "text"];

/// Browser-ish user agent; some file hosts reject the default one.
const DOWNLOAD_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// A resolved file attachment.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

/// The first file of the transcript property.
pub fn primary_attachment(page: &Value) -> Option<Attachment> {
    let prop_map = props::properties(page);
    props::files(prop_map, PROP_JSON_FILE)
        .into_iter()
        .next()
        .and_then(|f| {
            let name = if f.name.is_empty() {
                "chat.jsonl".to_string()
            } else {
                f.name
            };
            f.url.map(|url| Attachment { name, url })
        })
}

/// Scan every files-type property for an attachment. With a file name,
/// match it exactly; without one, take the first transcript file.
pub fn find_attachment(page: &Value, file_name: Option<&str>) -> Option<Attachment> {
    let prop_map = props::properties(page);
    let prop_obj = prop_map.as_object()?;

    for prop in prop_obj.values() {
        if !props::is_files_property(prop) {
            continue;
        }
        for entry in prop["files"].as_array().into_iter().flatten() {
            let name = entry["name"].as_str().unwrap_or_default();
            let Some(url) = props::file_entry_url(entry) else {
                continue;
            };
            let matched = match file_name {
                Some(wanted) => name == wanted,
                None => is_transcript_name(name),
            };
            if matched {
                return Some(Attachment {
                    name: name.to_string(),
                    url,
                });
            }
        }
    }

    None
}

/// Download a file body as bytes, failing with 502 on upstream refusal.
pub async fn download_bytes(http: &reqwest::Client, url: &str) -> Result<Bytes, ApiError> {
    let response = http
        .get(url)
        .header(reqwest::header::USER_AGENT, DOWNLOAD_USER_AGENT)
        .send()
        .await
        .map_err(|e| ApiError::bad_gateway("Failed to fetch file", e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::bad_gateway(
            "Failed to fetch file",
            format!("upstream returned {}", status.as_u16()),
        ));
    }

    response
        .bytes()
        .await
        .map_err(|e| ApiError::bad_gateway("Failed to fetch file", e))
}

/// Download a file body as text.
pub async fn download_text(http: &reqwest::Client, url: &str) -> Result<String, ApiError> {
    let bytes = download_bytes(http, url).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Parse a transcript: one JSON object per line, falling back to a
/// whole-document parse (array or single object) when any line fails.
pub fn parse_messages(text: &str) -> Result<Vec<Value>, ApiError> {
    let trimmed = text.trim();

    let mut messages = Vec::new();
    let mut jsonl_ok = true;
    for line in trimmed.split('\n') {
        match serde_json::from_str::<Value>(line) {
            Ok(value) => messages.push(value),
            Err(_) => {
                jsonl_ok = false;
                break;
            }
        }
    }
    if jsonl_ok {
        return Ok(messages);
    }

    let value: Value = serde_json::from_str(trimmed).map_err(|e| ApiError::Upstream {
        error: "Invalid file content".to_string(),
        message: e.to_string(),
    })?;
    Ok(match value {
        Value::Array(items) => items,
        other => vec![other],
    })
}

/// Shape one raw message for display. Messages without a body are
/// dropped, mirroring how the viewer skipped them.
pub fn message_view(raw: &Value, formatter: &MessageFormatter) -> Option<ChatMessage> {
    let content = CONTENT_KEYS
        .iter()
        .find_map(|key| raw[*key].as_str())
        .unwrap_or_default();
    if content.is_empty() {
        return None;
    }

    let is_user = raw["is_user"].as_bool().unwrap_or(false);
    let name = match raw["name"].as_str() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            if is_user {
                "User".to_string()
            } else {
                "AI".to_string()
            }
        }
    };

    Some(ChatMessage {
        name,
        is_user,
        content: content.to_string(),
        html: formatter.format(content),
    })
}

/// Fetch and render the full message list of a post.
pub async fn fetch_content(
    notion: &NotionClient,
    http: &reqwest::Client,
    formatter: &MessageFormatter,
    page_id: &str,
) -> Result<Vec<ChatMessage>, ApiError> {
    let page = notion.retrieve_page(page_id).await?;
    let attachment =
        primary_attachment(&page).ok_or_else(|| ApiError::NotFound("No file found".to_string()))?;

    let text = download_text(http, &attachment.url).await?;
    let raw = parse_messages(&text)?;

    Ok(raw
        .iter()
        .filter_map(|m| message_view(m, formatter))
        .collect())
}

/// Stream a post's attachment back verbatim, optionally selecting a
/// named file among the page's attachments.
pub async fn proxy_file(
    notion: &NotionClient,
    http: &reqwest::Client,
    page_id: &str,
    file_name: Option<&str>,
) -> Result<String, ApiError> {
    let page = notion.retrieve_page(page_id).await?;
    let attachment = find_attachment(&page, file_name)
        .ok_or_else(|| ApiError::NotFound("File not found".to_string()))?;

    log::debug!("proxying {} for page {}", attachment.name, page_id);
    download_text(http, &attachment.url).await
}

/// Remove one message from a post's transcript: download, splice,
/// re-serialize as JSONL, upload the new file to blob storage and point
/// the page's file property at it.
pub async fn delete_message(
    notion: &NotionClient,
    http: &reqwest::Client,
    blob_store: &BlobStore,
    page_id: &str,
    message_index: usize,
) -> Result<DeletedMessage, ApiError> {
    let page = notion.retrieve_page(page_id).await?;
    let attachment =
        primary_attachment(&page).ok_or_else(|| ApiError::NotFound("No file found".to_string()))?;

    let text = download_text(http, &attachment.url).await?;
    let mut messages = parse_messages(&text)?;

    if message_index >= messages.len() {
        return Err(ApiError::BadRequest("Invalid message index".to_string()));
    }
    messages.remove(message_index);

    let new_content = serialize_jsonl(&messages)?;
    let object = blob::object_name("updated", &attachment.name);
    let new_url = blob_store
        .put(&object, Bytes::from(new_content), "application/json")
        .await?;

    let properties = json!({
        PROP_JSON_FILE: props::external_file_prop(&attachment.name, &new_url),
    });
    notion.update_page(page_id, properties).await?;

    Ok(DeletedMessage {
        success: true,
        message: "메시지가 삭제되었습니다.".to_string(),
        new_file_url: new_url,
    })
}

/// Serialize messages back to newline-delimited JSON.
pub fn serialize_jsonl(messages: &[Value]) -> Result<String, ApiError> {
    let lines: Result<Vec<String>, _> = messages.iter().map(serde_json::to_string).collect();
    lines
        .map(|lines| lines.join("\n"))
        .map_err(|e| ApiError::Upstream {
            error: "Failed to serialize messages".to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_jsonl() {
        let text = "{\"mes\":\"one\"}\n{\"mes\":\"two\"}\n";
        let messages = parse_messages(text).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1]["mes"], "two");
    }

    #[test]
    fn test_parse_json_array_fallback() {
        let text = "[\n  {\"content\": \"a\"},\n  {\"content\": \"b\"}\n]";
        let messages = parse_messages(text).unwrap();
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_parse_single_object_fallback() {
        let text = "{\n  \"text\": \"only\"\n}";
        let messages = parse_messages(text).unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["text"], "only");
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_messages("not json at all").is_err());
    }

    #[test]
    fn test_message_view_content_fallback_chain() {
        let formatter = MessageFormatter::new();

        let msg = message_view(&json!({ "mes": "hi", "name": "Rin" }), &formatter).unwrap();
        assert_eq!(msg.content, "hi");
        assert_eq!(msg.name, "Rin");
        assert!(!msg.is_user);
        assert_eq!(msg.html, "<p>hi</p>");

        let msg = message_view(&json!({ "message": "fallback" }), &formatter).unwrap();
        assert_eq!(msg.content, "fallback");
        assert_eq!(msg.name, "AI");

        let msg = message_view(&json!({ "text": "t", "is_user": true }), &formatter).unwrap();
        assert_eq!(msg.name, "User");
        assert!(msg.is_user);

        // No body at all: dropped.
        assert!(message_view(&json!({ "name": "ghost" }), &formatter).is_none());
    }

    #[test]
    fn test_serialize_jsonl_round() {
        let messages = vec![json!({"mes": "a"}), json!({"mes": "b"})];
        let text = serialize_jsonl(&messages).unwrap();
        assert_eq!(text, "{\"mes\":\"a\"}\n{\"mes\":\"b\"}");
        assert_eq!(parse_messages(&text).unwrap(), messages);
    }

    #[test]
    fn test_primary_attachment() {
        let page = json!({
            "properties": {
                "jsonFile": { "type": "files", "files": [
                    { "name": "log.jsonl", "file": { "url": "https://f/log.jsonl" } }
                ] }
            }
        });
        let att = primary_attachment(&page).unwrap();
        assert_eq!(att.name, "log.jsonl");
        assert_eq!(att.url, "https://f/log.jsonl");

        assert!(primary_attachment(&json!({ "properties": {} })).is_none());
    }

    #[test]
    fn test_find_attachment_by_name_and_default() {
        let page = json!({
            "properties": {
                "cover": { "type": "files", "files": [
                    { "name": "cover.png", "file": { "url": "https://f/cover.png" } }
                ] },
                "jsonFile": { "type": "files", "files": [
                    { "name": "a.jsonl", "file": { "url": "https://f/a.jsonl" } },
                    { "name": "b.json", "external": { "url": "https://f/b.json" } }
                ] }
            }
        });

        let att = find_attachment(&page, Some("b.json")).unwrap();
        assert_eq!(att.url, "https://f/b.json");

        // Without a name, the first transcript wins; the png is skipped.
        let att = find_attachment(&page, None).unwrap();
        assert!(att.name.ends_with(".jsonl") || att.name.ends_with(".json"));

        assert!(find_attachment(&page, Some("missing.json")).is_none());
    }
}
