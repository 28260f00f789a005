//! Per-render state passed to every macro handler.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::application::render::{RenderPipeline, RenderRequest};
use crate::application::repos::{SearchService, TopicsRepo, UsersRepo};
use crate::config::DEFAULT_MAX_INCLUDE_DEPTH;
use crate::domain::users::UserRecord;

/// Carries render-time identity and collaborators into every macro call.
///
/// One context exists per top-level render; a topic inclusion creates a child
/// context one include level deeper. Contexts are never shared across
/// concurrent renders.
#[derive(Clone)]
pub struct RenderContext {
    /// Current web name (e.g. `Main`).
    pub web: String,
    /// Current topic name (e.g. `WebHome`).
    pub topic: String,
    /// Storage id of the current topic, when known.
    pub topic_id: Option<Uuid>,
    /// Root URL of the wiki, no trailing slash.
    pub base_url: String,
    /// Base for `/pub` asset links; empty means fall back to `base_url`.
    pub pub_base_url: String,
    /// Authenticated viewer, absent for anonymous renders.
    pub current_user: Option<UserRecord>,
    pub topics: Option<Arc<dyn TopicsRepo>>,
    pub users: Option<Arc<dyn UsersRepo>>,
    pub search: Option<Arc<dyn SearchService>>,
    /// Site-wide key/value configuration.
    pub settings: HashMap<String, String>,
    include_depth: u32,
    max_include_depth: u32,
    pipeline: Option<RenderPipeline>,
}

impl RenderContext {
    /// A bare context without collaborators, mainly for handler tests.
    pub fn new(
        web: impl Into<String>,
        topic: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            web: web.into(),
            topic: topic.into(),
            topic_id: None,
            base_url: base_url.into(),
            pub_base_url: String::new(),
            current_user: None,
            topics: None,
            users: None,
            search: None,
            settings: HashMap::new(),
            include_depth: 0,
            max_include_depth: DEFAULT_MAX_INCLUDE_DEPTH,
            pipeline: None,
        }
    }

    pub(crate) fn at_depth(mut self, depth: u32, max_depth: u32) -> Self {
        self.include_depth = depth;
        self.max_include_depth = max_depth;
        self
    }

    pub(crate) fn with_pipeline(mut self, pipeline: RenderPipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    pub fn with_user(mut self, user: UserRecord) -> Self {
        self.current_user = Some(user);
        self
    }

    pub fn with_topics(mut self, topics: Arc<dyn TopicsRepo>) -> Self {
        self.topics = Some(topics);
        self
    }

    pub fn with_users(mut self, users: Arc<dyn UsersRepo>) -> Self {
        self.users = Some(users);
        self
    }

    pub fn with_search(mut self, search: Arc<dyn SearchService>) -> Self {
        self.search = Some(search);
        self
    }

    /// How many inclusion levels deep this render runs. Zero at top level.
    pub fn include_depth(&self) -> u32 {
        self.include_depth
    }

    pub fn max_include_depth(&self) -> u32 {
        self.max_include_depth
    }

    /// View URL of a topic: `{base_url}/view/{web}/{topic}`.
    pub fn topic_url(&self, web: &str, topic: &str) -> String {
        format!("{}/view/{}/{}", self.base_url, web, topic)
    }

    /// Base for `/pub` asset links: `pub_base_url`, else `base_url`.
    pub fn pub_url_base(&self) -> &str {
        if self.pub_base_url.is_empty() {
            &self.base_url
        } else {
            &self.pub_base_url
        }
    }

    /// Viewer's display name, else login name, else `Guest`.
    pub fn user_display(&self) -> &str {
        match &self.current_user {
            Some(user) => user.display_or_username(),
            None => "Guest",
        }
    }

    /// Viewer's group names, empty for anonymous.
    pub fn user_groups(&self) -> &[String] {
        match &self.current_user {
            Some(user) => &user.groups,
            None => &[],
        }
    }

    /// Render another topic's content through the owning pipeline, one
    /// include level deeper. The child render keeps the current viewer and
    /// topic id. Returns `None` when no pipeline is attached.
    pub async fn render_included(&self, web: &str, topic: &str, content: String) -> Option<String> {
        let pipeline = self.pipeline.as_ref()?;
        let mut request = RenderRequest::new(web, topic, content);
        request.topic_id = self.topic_id;
        request.current_user = self.current_user.clone();
        Some(pipeline.render_at_depth(request, self.include_depth + 1).await)
    }
}
