//! Plugin lifecycle hooks and their dispatcher.
//!
//! Hosts hand the pipeline a list of already-instantiated plugins; discovery
//! and loading happen outside this crate. Hooks run in registration order.
//! `pre_render`/`post_render` chain text through the plugins, the `after_*`
//! hooks are fire-and-forget notifications. A failing hook is logged and
//! skipped; it never aborts the render or the remaining plugins.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::application::repos::RepoError;
use crate::domain::users::UserRecord;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("plugin hook failed: {message}")]
    Hook { message: String },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl PluginError {
    pub fn hook(message: impl Into<String>) -> Self {
        Self::Hook {
            message: message.into(),
        }
    }
}

/// Attachment metadata passed to `after_upload`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentInfo {
    pub file_name: String,
    pub content_type: String,
    pub size: u64,
}

/// Hook surface a plugin may implement; every hook defaults to a no-op.
///
/// The chaining hooks return the (possibly rewritten) text; returning the
/// input unchanged is the identity behavior the defaults provide.
#[async_trait]
pub trait WikiPlugin: Send + Sync {
    /// Stable name used in log lines.
    fn name(&self) -> &str {
        "unnamed"
    }

    /// Runs on raw topic markup before macro expansion.
    async fn pre_render(&self, content: &str) -> Result<String, PluginError> {
        Ok(content.to_string())
    }

    /// Runs on rendered HTML before external-link hardening.
    async fn post_render(&self, html: &str) -> Result<String, PluginError> {
        Ok(html.to_string())
    }

    async fn after_save(
        &self,
        _web: &str,
        _topic: &str,
        _version: u32,
        _user: Option<&UserRecord>,
    ) -> Result<(), PluginError> {
        Ok(())
    }

    async fn after_create(
        &self,
        _web: &str,
        _topic: &str,
        _version: u32,
        _user: Option<&UserRecord>,
    ) -> Result<(), PluginError> {
        Ok(())
    }

    async fn after_delete(
        &self,
        _web: &str,
        _topic: &str,
        _user: Option<&UserRecord>,
    ) -> Result<(), PluginError> {
        Ok(())
    }

    async fn after_upload(
        &self,
        _web: &str,
        _topic: &str,
        _attachment: &AttachmentInfo,
    ) -> Result<(), PluginError> {
        Ok(())
    }
}

/// Ordered, fault-isolated dispatcher over a fixed plugin list.
///
/// Cheap to clone; the list is shared and read-only after construction.
#[derive(Clone, Default)]
pub struct PluginHost {
    plugins: Arc<Vec<Arc<dyn WikiPlugin>>>,
}

impl PluginHost {
    pub fn new(plugins: Vec<Arc<dyn WikiPlugin>>) -> Self {
        Self {
            plugins: Arc::new(plugins),
        }
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Chains raw markup through every plugin's `pre_render`.
    pub async fn pre_render(&self, content: String) -> String {
        let mut current = content;
        for plugin in self.plugins.iter() {
            match plugin.pre_render(&current).await {
                Ok(next) => current = next,
                Err(err) => {
                    warn!(plugin = plugin.name(), hook = "pre_render", error = %err, "plugin hook failed");
                }
            }
        }
        current
    }

    /// Chains rendered HTML through every plugin's `post_render`.
    pub async fn post_render(&self, html: String) -> String {
        let mut current = html;
        for plugin in self.plugins.iter() {
            match plugin.post_render(&current).await {
                Ok(next) => current = next,
                Err(err) => {
                    warn!(plugin = plugin.name(), hook = "post_render", error = %err, "plugin hook failed");
                }
            }
        }
        current
    }

    pub async fn after_save(&self, web: &str, topic: &str, version: u32, user: Option<&UserRecord>) {
        for plugin in self.plugins.iter() {
            if let Err(err) = plugin.after_save(web, topic, version, user).await {
                warn!(plugin = plugin.name(), hook = "after_save", error = %err, "plugin hook failed");
            }
        }
    }

    pub async fn after_create(
        &self,
        web: &str,
        topic: &str,
        version: u32,
        user: Option<&UserRecord>,
    ) {
        for plugin in self.plugins.iter() {
            if let Err(err) = plugin.after_create(web, topic, version, user).await {
                warn!(plugin = plugin.name(), hook = "after_create", error = %err, "plugin hook failed");
            }
        }
    }

    pub async fn after_delete(&self, web: &str, topic: &str, user: Option<&UserRecord>) {
        for plugin in self.plugins.iter() {
            if let Err(err) = plugin.after_delete(web, topic, user).await {
                warn!(plugin = plugin.name(), hook = "after_delete", error = %err, "plugin hook failed");
            }
        }
    }

    pub async fn after_upload(&self, web: &str, topic: &str, attachment: &AttachmentInfo) {
        for plugin in self.plugins.iter() {
            if let Err(err) = plugin.after_upload(web, topic, attachment).await {
                warn!(plugin = plugin.name(), hook = "after_upload", error = %err, "plugin hook failed");
            }
        }
    }
}
