//! Minimal Notion REST API access: a thin client plus helpers for
//! reading and building typed page properties.

pub mod client;
pub mod props;

pub use client::{NotionClient, NotionError};
