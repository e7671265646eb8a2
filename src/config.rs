//! Service configuration.
//!
//! Settings come from an optional TOML file plus environment variables.
//! Every secret and database ID can be supplied through the environment
//! alone, matching how the original deployments were configured.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

/// Top-level service configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Address the API server binds to
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default)]
    pub notion: NotionConfig,
    #[serde(default)]
    pub blob: BlobConfig,
    #[serde(default)]
    pub databases: DatabaseIds,
}

/// Notion API access settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotionConfig {
    /// Integration token (env: NOTION_TOKEN)
    #[serde(default)]
    pub token: String,
    /// API base URL, overridable for tests
    #[serde(default = "default_notion_base")]
    pub base_url: String,
}

/// Blob-store access settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobConfig {
    /// Upload endpoint base URL
    #[serde(default = "default_blob_base")]
    pub base_url: String,
    /// Read-write token (env: BLOB_READ_WRITE_TOKEN)
    #[serde(default)]
    pub token: String,
}

/// IDs of the Notion databases backing each feature
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseIds {
    /// Chat log posts (env: NOTION_DATABASE_ID)
    #[serde(default)]
    pub posts: String,
    /// Folder metadata (env: NOTION_FOLDERS_DB_ID)
    #[serde(default)]
    pub folders: String,
    /// Bookmarks (env: NOTION_BOOKMARK_DB_ID)
    #[serde(default)]
    pub bookmarks: String,
    /// Gallery images (env: NOTION_GALLERY_DB_ID)
    #[serde(default)]
    pub gallery: String,
    /// CSS themes (env: NOTION_THEMES_DB_ID)
    #[serde(default)]
    pub themes: String,
    /// Character profiles (env: NOTION_PROFILES_DB)
    #[serde(default)]
    pub profiles: String,
    /// Profile diary posts (env: NOTION_POSTS_DB)
    #[serde(default)]
    pub profile_posts: String,
    /// Memory gallery (env: NOTION_MEMORY_DB)
    #[serde(default)]
    pub memory: String,
    /// BGM tracks (env: NOTION_BGM_DB)
    #[serde(default)]
    pub bgm: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8787".to_string()
}

fn default_notion_base() -> String {
    "https://api.notion.com/v1".to_string()
}

fn default_blob_base() -> String {
    "https://blob.vercel-storage.com".to_string()
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            base_url: default_notion_base(),
        }
    }
}

impl Default for BlobConfig {
    fn default() -> Self {
        Self {
            base_url: default_blob_base(),
            token: String::new(),
        }
    }
}

impl AppConfig {
    /// Load configuration from an optional TOML file, then fill any blank
    /// fields from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                toml::from_str(&text)?
            }
            None => AppConfig {
                bind_addr: default_bind_addr(),
                ..Default::default()
            },
        };
        config.apply_env();
        Ok(config)
    }

    /// Fill unset fields from environment variables.
    fn apply_env(&mut self) {
        fill_from_env(&mut self.bind_addr, "SHIORI_BIND");
        fill_from_env(&mut self.notion.token, "NOTION_TOKEN");
        fill_from_env(&mut self.blob.token, "BLOB_READ_WRITE_TOKEN");
        fill_from_env(&mut self.databases.posts, "NOTION_DATABASE_ID");
        fill_from_env(&mut self.databases.folders, "NOTION_FOLDERS_DB_ID");
        fill_from_env(&mut self.databases.bookmarks, "NOTION_BOOKMARK_DB_ID");
        fill_from_env(&mut self.databases.gallery, "NOTION_GALLERY_DB_ID");
        fill_from_env(&mut self.databases.themes, "NOTION_THEMES_DB_ID");
        fill_from_env(&mut self.databases.profiles, "NOTION_PROFILES_DB");
        fill_from_env(&mut self.databases.profile_posts, "NOTION_POSTS_DB");
        fill_from_env(&mut self.databases.memory, "NOTION_MEMORY_DB");
        fill_from_env(&mut self.databases.bgm, "NOTION_BGM_DB");
    }

    /// Reject configurations that cannot serve anything useful.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.notion.token.is_empty() {
            return Err(ConfigError::Missing("notion.token / NOTION_TOKEN"));
        }
        if self.databases.posts.is_empty() {
            return Err(ConfigError::Missing("databases.posts / NOTION_DATABASE_ID"));
        }
        Ok(())
    }
}

fn fill_from_env(slot: &mut String, var: &str) {
    if slot.is_empty() {
        if let Ok(value) = std::env::var(var) {
            if !value.is_empty() {
                *slot = value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8787");
        assert_eq!(config.notion.base_url, "https://api.notion.com/v1");
        assert_eq!(config.blob.base_url, "https://blob.vercel-storage.com");
    }

    #[test]
    fn test_load_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
bind_addr = "0.0.0.0:9000"

[notion]
token = "secret"

[databases]
posts = "db-posts"
profiles = "db-profiles"
"#
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.notion.token, "secret");
        assert_eq!(config.databases.posts, "db-posts");
        assert_eq!(config.databases.profiles, "db-profiles");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_token() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Missing(_))));
    }
}
