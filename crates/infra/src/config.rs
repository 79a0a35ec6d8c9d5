//! Configuration loading and representation.

use mime::Mime;
use thiserror::Error;

pub const MAX_ATTACHMENT_BYTES_VAR: &str = "SHOPFRONT_MAX_ATTACHMENT_BYTES";
pub const ALLOWED_CONTENT_TYPES_VAR: &str = "SHOPFRONT_ALLOWED_CONTENT_TYPES";
pub const ATTACHMENT_BASE_URL_VAR: &str = "SHOPFRONT_ATTACHMENT_BASE_URL";

const DEFAULT_MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_CONTENT_TYPES: &[&str] = &["image/png", "image/jpeg", "image/gif", "image/webp"];
const DEFAULT_BASE_URL: &str = "/attachments";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} entry '{value}' is not a MIME type")]
    InvalidContentType { var: &'static str, value: String },
}

/// Limits and addressing for the attachment storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Largest accepted blob, in bytes.
    pub max_attachment_bytes: u64,
    /// Accepted MIME types; a `type/*` entry accepts every subtype. Empty
    /// accepts everything.
    pub allowed_content_types: Vec<Mime>,
    /// Prefix for attachment URLs.
    pub base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            max_attachment_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
            allowed_content_types: DEFAULT_CONTENT_TYPES
                .iter()
                .filter_map(|raw| raw.parse().ok())
                .collect(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl StorageConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`; unset variables keep their
    /// defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(MAX_ATTACHMENT_BYTES_VAR) {
            config.max_attachment_bytes = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidNumber {
                    var: MAX_ATTACHMENT_BYTES_VAR,
                    value: raw.clone(),
                })?;
        }

        if let Some(raw) = lookup(ALLOWED_CONTENT_TYPES_VAR) {
            config.allowed_content_types = raw
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(|entry| {
                    entry.parse::<Mime>().map_err(|_| ConfigError::InvalidContentType {
                        var: ALLOWED_CONTENT_TYPES_VAR,
                        value: entry.to_string(),
                    })
                })
                .collect::<Result<_, _>>()?;
            if config.allowed_content_types.is_empty() {
                tracing::warn!("{ALLOWED_CONTENT_TYPES_VAR} is empty; every content type is accepted");
            }
        }

        if let Some(raw) = lookup(ATTACHMENT_BASE_URL_VAR) {
            config.base_url = raw.trim().trim_end_matches('/').to_string();
        }

        Ok(config)
    }

    /// Whether uploads declared as `content_type` are accepted. Parameters
    /// such as `charset` are ignored.
    pub fn allows_content_type(&self, content_type: &Mime) -> bool {
        if self.allowed_content_types.is_empty() {
            return true;
        }
        self.allowed_content_types.iter().any(|allowed| {
            if allowed.subtype() == mime::STAR {
                allowed.type_() == content_type.type_()
            } else {
                allowed.essence_str() == content_type.essence_str()
            }
        })
    }
}
