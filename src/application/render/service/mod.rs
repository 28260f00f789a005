mod harden;
mod markdown;
mod markup;
mod wikiword;

use std::sync::Arc;

use comrak::options::Options;
use tracing::warn;

use crate::application::macros::{
    MacroExpander, MacroRegistry, RenderContext, builtin_registry, has_user_macros,
};
use crate::application::plugins::PluginHost;
use crate::application::render::types::{RenderOutput, RenderRequest};
use crate::application::repos::{SearchService, TopicsRepo, UsersRepo};
use crate::config::PipelineSettings;

use harden::harden_external_links;
use markdown::{default_options, markdown_to_html};
use markup::{expand_bracket_links, tml_to_markdown};
use wikiword::WikiWordLinker;

/// The central rendering service.
///
/// Runs the staged pipeline: pre-render hooks, macro expansion, bracket
/// links, TML normalization, Markdown, WikiWord linking, post-render hooks,
/// then external-link hardening. Cheap to clone; collaborators are shared
/// and read-only, each render call owns its own context.
#[derive(Clone)]
pub struct RenderPipeline {
    inner: Arc<PipelineInner>,
}

struct PipelineInner {
    settings: PipelineSettings,
    topics: Option<Arc<dyn TopicsRepo>>,
    users: Option<Arc<dyn UsersRepo>>,
    search: Option<Arc<dyn SearchService>>,
    plugins: PluginHost,
    expander: MacroExpander,
    options: Options<'static>,
}

impl RenderPipeline {
    pub fn builder(base_url: impl Into<String>) -> RenderPipelineBuilder {
        RenderPipelineBuilder::new(base_url)
    }

    /// Renders a topic through the full pipeline.
    ///
    /// Never fails: malformed markup degrades to literal or partially
    /// expanded text, and every collaborator fault is recovered per stage.
    /// The cacheable flag reflects the raw source, not the expanded output.
    pub async fn render(&self, request: RenderRequest) -> RenderOutput {
        let cacheable = !has_user_macros(&request.content);
        let html = self.render_at_depth(request, 0).await;
        RenderOutput { html, cacheable }
    }

    pub(crate) async fn render_at_depth(&self, request: RenderRequest, depth: u32) -> String {
        if request.content.is_empty() {
            return String::new();
        }
        // Backstop only; the include macro stops at the limit with a marker.
        if depth > self.inner.settings.max_include_depth {
            warn!(depth, web = %request.web, topic = %request.topic, "include depth exceeded");
            return String::new();
        }

        let ctx = self.context_for(&request, depth);

        let text = self.inner.plugins.pre_render(request.content).await;
        let text = self.inner.expander.expand(&text, &ctx).await;
        let text = expand_bracket_links(&text, &self.inner.settings.base_url, &ctx.web);
        let text = tml_to_markdown(&text);
        let html = markdown_to_html(&text, &self.inner.options);

        let linker = WikiWordLinker::new(
            self.inner.settings.base_url.as_str(),
            ctx.web.as_str(),
            self.inner.topics.clone(),
        );
        let html = linker.process_html(&html).await;

        let html = self.inner.plugins.post_render(html).await;
        harden_external_links(&html)
    }

    fn context_for(&self, request: &RenderRequest, depth: u32) -> RenderContext {
        let inner = &self.inner;
        let mut ctx = RenderContext::new(
            request.web.as_str(),
            request.topic.as_str(),
            inner.settings.base_url.as_str(),
        )
        .at_depth(depth, inner.settings.max_include_depth)
        .with_pipeline(self.clone());

        ctx.topic_id = request.topic_id;
        ctx.pub_base_url = inner.settings.pub_base_url.clone();
        ctx.current_user = request.current_user.clone();
        ctx.settings = inner.settings.site_settings.clone();
        ctx.topics = inner.topics.clone();
        ctx.users = inner.users.clone();
        ctx.search = inner.search.clone();
        ctx
    }
}

/// Assembles a [`RenderPipeline`] from construction settings and optional
/// collaborators. The macro registry defaults to the shared built-in one.
pub struct RenderPipelineBuilder {
    settings: PipelineSettings,
    registry: Option<Arc<MacroRegistry>>,
    topics: Option<Arc<dyn TopicsRepo>>,
    users: Option<Arc<dyn UsersRepo>>,
    search: Option<Arc<dyn SearchService>>,
    plugins: PluginHost,
}

impl RenderPipelineBuilder {
    fn new(base_url: impl Into<String>) -> Self {
        Self {
            settings: PipelineSettings::new(base_url),
            registry: None,
            topics: None,
            users: None,
            search: None,
            plugins: PluginHost::default(),
        }
    }

    /// Replaces the whole settings block at once.
    pub fn with_settings(mut self, settings: PipelineSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_pub_base_url(mut self, pub_base_url: impl Into<String>) -> Self {
        self.settings = self.settings.with_pub_base_url(pub_base_url);
        self
    }

    pub fn with_max_include_depth(mut self, depth: u32) -> Self {
        self.settings = self.settings.with_max_include_depth(depth);
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

    pub fn with_plugins(mut self, plugins: PluginHost) -> Self {
        self.plugins = plugins;
        self
    }

    /// Overrides the macro registry, mainly for tests that stub built-ins.
    pub fn with_registry(mut self, registry: Arc<MacroRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn build(self) -> RenderPipeline {
        let registry = self.registry.unwrap_or_else(builtin_registry);
        RenderPipeline {
            inner: Arc::new(PipelineInner {
                settings: self.settings,
                topics: self.topics,
                users: self.users,
                search: self.search,
                plugins: self.plugins,
                expander: MacroExpander::new(registry),
                options: default_options(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RenderPipeline;
    use crate::application::render::types::RenderRequest;

    fn pipeline() -> RenderPipeline {
        RenderPipeline::builder("https://x").build()
    }

    #[tokio::test]
    async fn empty_content_short_circuits() {
        let output = pipeline().render(RenderRequest::new("Main", "WebHome", "")).await;
        assert_eq!(output.html, "");
        assert!(output.cacheable);
    }

    #[tokio::test]
    async fn stages_compose_in_order() {
        let output = pipeline()
            .render(RenderRequest::new(
                "Main",
                "WebHome",
                "---++ About %WEB%\n*bold* text",
            ))
            .await;
        assert!(output.html.contains("<h2>About Main</h2>"), "got: {}", output.html);
        assert!(output.html.contains("<strong>bold</strong>"), "got: {}", output.html);
    }

    #[tokio::test]
    async fn cacheable_follows_the_raw_source() {
        let output = pipeline()
            .render(RenderRequest::new("Main", "WebHome", "Hello %USERNAME%"))
            .await;
        assert!(!output.cacheable);

        let output = pipeline()
            .render(RenderRequest::new("Main", "WebHome", "Hello %WEB%"))
            .await;
        assert!(output.cacheable);
    }
}
