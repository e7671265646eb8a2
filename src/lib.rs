//! Shiori is a small personal server that fronts two Notion workspaces:
//! a chat log viewer (posts with attached JSONL transcripts, folders,
//! bookmarks, a gallery and CSS themes) and a read-only character profile
//! microsite. Every endpoint is thin glue: parse the request, call the
//! Notion REST API or the blob store, reshape the JSON, return it.

pub mod blob;
pub mod config;
pub mod error;
pub mod format;
pub mod notion;
pub mod profile;
pub mod server;
pub mod viewer;
