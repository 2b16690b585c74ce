//! Configuration module for forumbridge.

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use tracing::warn;
use url::Url;

use crate::content::{ContentType, TypeMap};
use crate::host::OptionStore;
use crate::{BridgeError, Result};

/// Option name of the guest participation toggle.
pub const OPTION_ALLOW_ANONYMOUS: &str = "allow_anonymous";
/// Option name of the root section ID.
pub const OPTION_ROOT_SECTION_ID: &str = "root_section_id";
/// Option name of the root section's parent ID.
pub const OPTION_ROOT_SECTION_PARENT_ID: &str = "root_section_parent_id";

/// Read a boolean option. Unset, unparseable or unreadable values are `false`.
pub fn option_flag(store: &dyn OptionStore, name: &str) -> bool {
    match store.option(name) {
        Ok(Some(value)) => matches!(
            value.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Ok(None) => false,
        Err(e) => {
            warn!("Failed to read option {}: {}", name, e);
            false
        }
    }
}

/// Forum adapter configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ForumConfig {
    /// Public base URL of the site.
    #[serde(default = "default_site_url")]
    pub site_url: String,
    /// First path segment owned by the forums.
    #[serde(default = "default_forum_root")]
    pub forum_root: String,
    /// Route prefix of the batch-execution namespace.
    #[serde(default = "default_batch_namespace")]
    pub batch_namespace: String,
    /// Whether anonymous users may post topics and replies.
    #[serde(default)]
    pub allow_anonymous: bool,
    /// ID of the root section.
    #[serde(default)]
    pub root_section_id: Option<i64>,
    /// Parent ID of the root section.
    #[serde(default)]
    pub root_section_parent_id: Option<i64>,
    /// Path to a fixture file with records and user roles.
    #[serde(default)]
    pub fixtures: Option<String>,
    /// Native type tags.
    #[serde(default)]
    pub types: TypeMap,
}

fn default_site_url() -> String {
    "http://localhost".to_string()
}

fn default_forum_root() -> String {
    "forums".to_string()
}

fn default_batch_namespace() -> String {
    "/batch/v1".to_string()
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            site_url: default_site_url(),
            forum_root: default_forum_root(),
            batch_namespace: default_batch_namespace(),
            allow_anonymous: false,
            root_section_id: None,
            root_section_parent_id: None,
            fixtures: None,
            types: TypeMap::default(),
        }
    }
}

impl OptionStore for ForumConfig {
    fn option(&self, name: &str) -> Result<Option<String>> {
        let value = match name {
            OPTION_ALLOW_ANONYMOUS => Some(self.allow_anonymous.to_string()),
            OPTION_ROOT_SECTION_ID => self.root_section_id.map(|id| id.to_string()),
            OPTION_ROOT_SECTION_PARENT_ID => self.root_section_parent_id.map(|id| id.to_string()),
            _ => None,
        };
        Ok(value)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file. Empty disables file output.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/forumbridge.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub forum: ForumConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(BridgeError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| BridgeError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FORUMBRIDGE_ALLOW_ANONYMOUS`: `1|true|0|false`
    pub fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("FORUMBRIDGE_ALLOW_ANONYMOUS") {
            match value.trim().to_lowercase().as_str() {
                "1" | "true" => self.forum.allow_anonymous = true,
                "0" | "false" => self.forum.allow_anonymous = false,
                other => warn!("Ignoring FORUMBRIDGE_ALLOW_ANONYMOUS={}", other),
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - `site_url` is not an absolute URL
    /// - a native type tag is empty or shared by two content types
    /// - `batch_namespace` does not start with `/`
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.forum.site_url)
            .map_err(|e| BridgeError::Config(format!("invalid site_url: {e}")))?;

        let mut seen = HashSet::new();
        for content_type in ContentType::ALL {
            let tag = self.forum.types.native(content_type);
            if tag.is_empty() {
                return Err(BridgeError::Config(format!(
                    "empty type tag for {content_type}"
                )));
            }
            if !seen.insert(tag) {
                return Err(BridgeError::Config(format!("duplicate type tag: {tag}")));
            }
        }

        if !self.forum.batch_namespace.starts_with('/') {
            return Err(BridgeError::Config(
                "batch_namespace must start with '/'".to_string(),
            ));
        }
        Ok(())
    }
}
