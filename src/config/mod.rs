//! Pipeline construction settings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Nested inclusions beyond this depth render an error marker instead.
pub const DEFAULT_MAX_INCLUDE_DEPTH: u32 = 10;

/// Settings fixed at pipeline construction.
///
/// Base URLs are stored without a trailing slash so link builders can append
/// path segments directly. An empty `pub_base_url` falls back to `base_url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSettings {
    pub base_url: String,
    #[serde(default)]
    pub pub_base_url: String,
    #[serde(default = "default_max_include_depth")]
    pub max_include_depth: u32,
    /// Site-wide key/value configuration surfaced to macros.
    #[serde(default)]
    pub site_settings: HashMap<String, String>,
}

fn default_max_include_depth() -> u32 {
    DEFAULT_MAX_INCLUDE_DEPTH
}

impl PipelineSettings {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_url(&base_url.into()),
            pub_base_url: String::new(),
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            site_settings: HashMap::new(),
        }
    }

    pub fn with_pub_base_url(mut self, pub_base_url: impl Into<String>) -> Self {
        self.pub_base_url = normalize_url(&pub_base_url.into());
        self
    }

    pub fn with_max_include_depth(mut self, depth: u32) -> Self {
        self.max_include_depth = depth;
        self
    }

    pub fn with_site_settings(mut self, site_settings: HashMap<String, String>) -> Self {
        self.site_settings = site_settings;
        self
    }

    /// Base for `/pub` asset links: `pub_base_url`, else `base_url`.
    pub fn pub_url_base(&self) -> &str {
        if self.pub_base_url.is_empty() {
            &self.base_url
        } else {
            &self.pub_base_url
        }
    }
}

fn normalize_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
