//! Repository traits describing the collaborators the pipeline consumes.
//!
//! The rendering core performs no persistence of its own. Macros and the
//! WikiWord linker reach topics and users through these contracts; hosts plug
//! in whatever storage they use. Every method is a read.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::domain::users::UserRecord;

#[derive(Debug, Clone, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

/// Read access to stored topics.
#[async_trait]
pub trait TopicsRepo: Send + Sync {
    async fn topic_exists(&self, web: &str, topic: &str) -> Result<bool, RepoError>;

    /// Raw stored markup of a topic, `None` when the topic is absent.
    async fn topic_content(&self, web: &str, topic: &str) -> Result<Option<String>, RepoError>;
}

/// Read access to user records.
#[async_trait]
pub trait UsersRepo: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError>;
}

/// A single topic search match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicHit {
    pub web: String,
    pub topic: String,
    pub snippet: Option<String>,
}

/// Full-text topic search, consumed by the search macro.
#[async_trait]
pub trait SearchService: Send + Sync {
    async fn search_topics(
        &self,
        term: &str,
        web: Option<&str>,
        limit: usize,
    ) -> Result<Vec<TopicHit>, RepoError>;
}
