use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::users::UserRecord;

/// Rendering request passed into the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRequest {
    /// Web the topic lives in.
    pub web: String,
    /// Topic being rendered.
    pub topic: String,
    /// Raw stored markup.
    pub content: String,
    /// Storage id of the topic, when the caller knows it.
    #[serde(default)]
    pub topic_id: Option<Uuid>,
    /// Authenticated viewer; absent for anonymous renders.
    #[serde(default)]
    pub current_user: Option<UserRecord>,
}

impl RenderRequest {
    pub fn new(web: impl Into<String>, topic: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            web: web.into(),
            topic: topic.into(),
            content: content.into(),
            topic_id: None,
            current_user: None,
        }
    }

    pub fn with_topic_id(mut self, topic_id: Uuid) -> Self {
        self.topic_id = Some(topic_id);
        self
    }

    pub fn with_user(mut self, user: UserRecord) -> Self {
        self.current_user = Some(user);
        self
    }
}

/// Deterministic rendering result returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOutput {
    /// Final HTML for the topic view.
    pub html: String,
    /// False when the raw source mentions viewer-dependent macros; callers
    /// use this to decide whether the HTML may be reused across viewers.
    pub cacheable: bool,
}
