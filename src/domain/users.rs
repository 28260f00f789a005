//! User identity as seen by the rendering core.
//!
//! The core never authenticates anyone; it receives an already-resolved
//! [`UserRecord`] (or nothing, for anonymous viewers) and hands it to macros
//! that report identity, group membership, and per-user info.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static WIKI_NAME_SPLIT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[_.\-]+").expect("wiki name split pattern"));

/// An authenticated user, as supplied by the host application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    /// CamelCase wiki name. Derived from the username when absent.
    pub wiki_name: Option<String>,
    pub email: String,
    pub groups: Vec<String>,
}

impl UserRecord {
    /// Build a record with a freshly derived wiki name and no groups.
    pub fn new(
        username: impl Into<String>,
        display_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        let username = username.into();
        let wiki_name = Some(derive_wiki_name(&username));
        Self {
            id: Uuid::new_v4(),
            username,
            display_name: display_name.into(),
            wiki_name,
            email: email.into(),
            groups: Vec::new(),
        }
    }

    pub fn with_groups(mut self, groups: Vec<String>) -> Self {
        self.groups = groups;
        self
    }

    /// The wiki name, falling back to the login name when none is stored.
    pub fn wiki_name_or_username(&self) -> &str {
        match self.wiki_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.username,
        }
    }

    /// The display name, falling back to the login name when empty.
    pub fn display_or_username(&self) -> &str {
        if self.display_name.is_empty() {
            &self.username
        } else {
            &self.display_name
        }
    }
}

/// Convert a login name to a CamelCase wiki name: `john_doe` → `JohnDoe`.
///
/// Splits on runs of `_`, `.`, and `-`, then capitalizes each part.
pub fn derive_wiki_name(username: &str) -> String {
    WIKI_NAME_SPLIT_RE
        .split(username)
        .filter(|part| !part.is_empty())
        .map(capitalize)
        .collect()
}

fn capitalize(part: &str) -> String {
    let mut chars = part.chars();
    match chars.next() {
        Some(first) => {
            let mut out: String = first.to_uppercase().collect();
            out.push_str(&chars.as_str().to_lowercase());
            out
        }
        None => String::new(),
    }
}
