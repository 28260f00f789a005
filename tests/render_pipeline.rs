//! End-to-end tests over the public rendering API.
//!
//! Each test drives the full stage sequence with in-memory backends and
//! asserts on the final HTML, so stage ordering, fault recovery, and the
//! cacheable flag are covered the way a host application sees them.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;
use wikimill::{
    PluginError, PluginHost, RenderPipeline, RenderRequest, RepoError, SearchService, TopicHit,
    TopicsRepo, UserRecord, UsersRepo, WikiPlugin,
};

fn init_tracing() {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

struct MemoryTopics(HashMap<(String, String), String>);

impl MemoryTopics {
    fn with(entries: &[(&str, &str, &str)]) -> Arc<Self> {
        Arc::new(Self(
            entries
                .iter()
                .map(|(web, topic, content)| {
                    ((web.to_string(), topic.to_string()), content.to_string())
                })
                .collect(),
        ))
    }
}

#[async_trait]
impl TopicsRepo for MemoryTopics {
    async fn topic_exists(&self, web: &str, topic: &str) -> Result<bool, RepoError> {
        Ok(self
            .0
            .contains_key(&(web.to_string(), topic.to_string())))
    }

    async fn topic_content(&self, web: &str, topic: &str) -> Result<Option<String>, RepoError> {
        Ok(self.0.get(&(web.to_string(), topic.to_string())).cloned())
    }
}

struct BrokenTopics;

#[async_trait]
impl TopicsRepo for BrokenTopics {
    async fn topic_exists(&self, _web: &str, _topic: &str) -> Result<bool, RepoError> {
        Err(RepoError::Timeout)
    }

    async fn topic_content(&self, _web: &str, _topic: &str) -> Result<Option<String>, RepoError> {
        Err(RepoError::Timeout)
    }
}

struct MemoryUsers(Vec<UserRecord>);

#[async_trait]
impl UsersRepo for MemoryUsers {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError> {
        Ok(self.0.iter().find(|user| user.username == username).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, RepoError> {
        Ok(self.0.iter().find(|user| user.id == id).cloned())
    }
}

struct FixedSearch(Vec<TopicHit>);

#[async_trait]
impl SearchService for FixedSearch {
    async fn search_topics(
        &self,
        _term: &str,
        web: Option<&str>,
        limit: usize,
    ) -> Result<Vec<TopicHit>, RepoError> {
        Ok(self
            .0
            .iter()
            .filter(|hit| web.is_none_or(|w| hit.web == w))
            .take(limit)
            .cloned()
            .collect())
    }
}

struct StampPlugin;

#[async_trait]
impl WikiPlugin for StampPlugin {
    fn name(&self) -> &str {
        "stamp"
    }

    async fn pre_render(&self, content: &str) -> Result<String, PluginError> {
        Ok(format!("{content}\n\nFiled under %WEB% archive."))
    }

    async fn post_render(&self, html: &str) -> Result<String, PluginError> {
        Ok(format!("{html}<!-- stamped -->"))
    }
}

struct FailingPlugin;

#[async_trait]
impl WikiPlugin for FailingPlugin {
    fn name(&self) -> &str {
        "failing"
    }

    async fn pre_render(&self, _content: &str) -> Result<String, PluginError> {
        Err(PluginError::hook("pre boom"))
    }

    async fn post_render(&self, _html: &str) -> Result<String, PluginError> {
        Err(PluginError::hook("post boom"))
    }
}

fn pipeline() -> RenderPipeline {
    RenderPipeline::builder("https://wiki.example.com").build()
}

async fn render(pipeline: &RenderPipeline, content: &str) -> String {
    pipeline
        .render(RenderRequest::new("Main", "WebHome", content))
        .await
        .html
}

#[tokio::test]
async fn plain_markdown_renders_unchanged() {
    let html = render(&pipeline(), "Just **bold** text.").await;
    assert!(html.contains("<strong>bold</strong>"), "got: {html}");
}

#[tokio::test]
async fn macros_and_shorthand_compose_in_one_pass() {
    let html = render(&pipeline(), "*bold* and %WEB%.%TOPIC%").await;
    assert!(html.contains("<strong>bold</strong>"), "got: {html}");
    assert!(html.contains("Main.WebHome"), "got: {html}");
}

#[tokio::test]
async fn empty_content_renders_empty() {
    let output = pipeline().render(RenderRequest::new("Main", "WebHome", "")).await;
    assert_eq!(output.html, "");
    assert!(output.cacheable);
}

#[tokio::test]
async fn site_macros_expand_to_identity_and_urls() {
    let html = render(
        &pipeline(),
        r#"Open %SCRIPTURL{"edit"}% or %PUBURL% from %WEB%."#,
    )
    .await;
    assert!(html.contains("https://wiki.example.com/edit"), "got: {html}");
    assert!(html.contains("https://wiki.example.com/pub"), "got: {html}");
    assert!(html.contains("from Main."), "got: {html}");
}

#[tokio::test]
async fn color_macros_survive_the_markdown_pass() {
    let html = render(&pipeline(), "%RED%alert%ENDCOLOR% normal").await;
    assert!(
        html.contains(r#"<span style="color:#cc0000">alert</span>"#),
        "got: {html}"
    );
}

#[tokio::test]
async fn unknown_macros_stay_literal() {
    let html = render(&pipeline(), "Keep %NOTAMACRO% as-is.").await;
    assert!(html.contains("%NOTAMACRO%"), "got: {html}");
}

#[tokio::test]
async fn tml_shorthand_becomes_markdown_structure() {
    let html = render(
        &pipeline(),
        "---+ Big Title\n---+++ Deep Dive\nsome *bold* and _italic_ words",
    )
    .await;
    assert!(html.contains("<h1>Big Title</h1>"), "got: {html}");
    assert!(html.contains("<h3>Deep Dive</h3>"), "got: {html}");
    assert!(html.contains("<strong>bold</strong>"), "got: {html}");
    assert!(html.contains("<em>italic</em>"), "got: {html}");
}

#[tokio::test]
async fn bracket_links_resolve_topics_and_external_urls() {
    let html = render(
        &pipeline(),
        "See [[WebHome][home]], [[Docs.SetupGuide]], and [[https://example.org][ext]].",
    )
    .await;
    assert!(
        html.contains(r#"href="https://wiki.example.com/view/Main/WebHome""#),
        "got: {html}"
    );
    assert!(html.contains(">home</a>"), "got: {html}");
    assert!(html.contains(">Docs.SetupGuide</a>"), "got: {html}");
    assert!(
        html.contains(r#"<a href="https://example.org" target="_blank""#),
        "got: {html}"
    );
}

#[tokio::test]
async fn conditional_output_joins_later_stages() {
    let topics = MemoryTopics::with(&[("Main", "WebHome", "home")]);
    let pipeline = RenderPipeline::builder("https://wiki.example.com")
        .with_topics(topics)
        .build();

    let html = render(
        &pipeline,
        r#"%IF{"istopic 'WebHome'" then="**exists**" else="missing"}%"#,
    )
    .await;
    assert!(html.contains("<strong>exists</strong>"), "got: {html}");

    let html = render(
        &pipeline,
        r#"%IF{"istopic 'Nope'" then="**exists**" else="missing"}%"#,
    )
    .await;
    assert!(html.contains("<p>missing</p>"), "got: {html}");
}

#[tokio::test]
async fn wikiwords_link_and_flag_missing_topics() {
    let topics = MemoryTopics::with(&[("Main", "WebHome", "home")]);
    let pipeline = RenderPipeline::builder("https://wiki.example.com")
        .with_topics(topics)
        .build();

    let html = render(&pipeline, "See WebHome and MissingPage now.").await;
    assert!(html.contains(r#"class="wiki-link""#), "got: {html}");
    assert!(
        html.contains(r#"class="wiki-link wiki-link-missing""#),
        "got: {html}"
    );
    assert!(html.contains("/view/Main/MissingPage"), "got: {html}");
}

#[tokio::test]
async fn rendering_twice_adds_no_duplicate_wiki_links() {
    let topics = MemoryTopics::with(&[("Main", "WebHome", "home")]);
    let pipeline = RenderPipeline::builder("https://wiki.example.com")
        .with_topics(topics)
        .build();

    let first = render(&pipeline, "Go to WebHome.").await;
    let second = render(&pipeline, &first).await;
    assert_eq!(
        first.matches("wiki-link").count(),
        second.matches("wiki-link").count(),
        "second pass grew links: {second}"
    );
}

#[tokio::test]
async fn included_topic_renders_through_the_pipeline() {
    let topics = MemoryTopics::with(&[("Main", "Sidebar", "*menu*")]);
    let pipeline = RenderPipeline::builder("https://wiki.example.com")
        .with_topics(topics)
        .build();

    let html = render(&pipeline, "Intro.\n\n%INCLUDE{\"Sidebar\"}%\n\nOutro.").await;
    assert!(html.contains("<strong>menu</strong>"), "got: {html}");
    assert!(html.contains("Intro."), "got: {html}");
    assert!(html.contains("Outro."), "got: {html}");
}

#[tokio::test]
async fn missing_include_target_leaves_a_marker() {
    let topics = MemoryTopics::with(&[("Main", "WebHome", "home")]);
    let pipeline = RenderPipeline::builder("https://wiki.example.com")
        .with_topics(topics)
        .build();

    let html = render(&pipeline, "%INCLUDE{\"Nowhere\"}%").await;
    assert!(html.contains("wiki-include-error"), "got: {html}");
    assert!(html.contains("Topic not found: Main.Nowhere"), "got: {html}");
}

#[tokio::test]
async fn self_inclusion_terminates_at_the_depth_limit() {
    init_tracing();
    let topics = MemoryTopics::with(&[("Main", "Loop", "%INCLUDE{\"Loop\"}%")]);
    let pipeline = RenderPipeline::builder("https://wiki.example.com")
        .with_max_include_depth(2)
        .with_topics(topics)
        .build();

    let output = pipeline
        .render(RenderRequest::new("Main", "Loop", "%INCLUDE{\"Loop\"}%"))
        .await;
    assert!(
        output.html.contains("Include depth limit reached: Loop"),
        "got: {}",
        output.html
    );
}

#[tokio::test]
async fn search_macro_lists_matching_topics() {
    let search = FixedSearch(vec![TopicHit {
        web: "Docs".to_string(),
        topic: "SetupGuide".to_string(),
        snippet: None,
    }]);
    let pipeline = RenderPipeline::builder("https://wiki.example.com")
        .with_search(Arc::new(search))
        .build();

    let html = render(&pipeline, "%SEARCH{\"setup\" limit=5}%").await;
    assert!(html.contains(r#"<ul class="wiki-search-results">"#), "got: {html}");
    assert!(html.contains("Docs.SetupGuide"), "got: {html}");
}

#[tokio::test]
async fn viewer_macros_report_identity() {
    let user = UserRecord::new("jdoe", "John Doe", "jdoe@example.org")
        .with_groups(vec!["Admins".to_string(), "Authors".to_string()]);
    let users = MemoryUsers(vec![UserRecord::new("mary", "Mary Major", "mary@example.org")]);
    let pipeline = RenderPipeline::builder("https://wiki.example.com")
        .with_users(Arc::new(users))
        .build();

    let output = pipeline
        .render(
            RenderRequest::new(
                "Main",
                "WebHome",
                r#"Welcome %WIKINAME% (%USERNAME%), groups: %GROUPS%. Editor: %USERINFO{"mary" format="$wikiname"}%."#,
            )
            .with_user(user),
        )
        .await;
    assert!(output.html.contains("Welcome Jdoe (jdoe)"), "got: {}", output.html);
    assert!(output.html.contains("groups: Admins, Authors"), "got: {}", output.html);
    assert!(output.html.contains("Editor: Mary"), "got: {}", output.html);
    assert!(!output.cacheable);
}

#[tokio::test]
async fn anonymous_viewer_renders_as_guest() {
    let output = pipeline()
        .render(RenderRequest::new("Main", "WebHome", "Hi %WIKINAME%"))
        .await;
    assert!(output.html.contains("Hi Guest"), "got: {}", output.html);
    assert!(!output.cacheable);
}

#[tokio::test]
async fn cacheable_tracks_viewer_macros_in_the_raw_source() {
    let output = pipeline()
        .render(RenderRequest::new("Main", "WebHome", "Plain %WEB% text"))
        .await;
    assert!(output.cacheable);

    let output = pipeline()
        .render(RenderRequest::new("Main", "WebHome", "%ISMEMBER{\"Admins\"}%"))
        .await;
    assert!(!output.cacheable);
}

#[tokio::test]
async fn external_links_are_hardened() {
    let html = render(
        &pipeline(),
        "[docs](https://example.org/docs) and [local](/view/Main/WebHome)",
    )
    .await;
    assert!(
        html.contains(
            r#"<a href="https://example.org/docs" target="_blank" rel="noopener noreferrer">docs</a>"#
        ),
        "got: {html}"
    );
    assert!(
        html.contains(r#"<a href="/view/Main/WebHome">local</a>"#),
        "got: {html}"
    );
}

#[tokio::test]
async fn plugin_hooks_wrap_the_render() {
    let pipeline = RenderPipeline::builder("https://wiki.example.com")
        .with_plugins(PluginHost::new(vec![Arc::new(StampPlugin)]))
        .build();

    let html = render(&pipeline, "Body text.").await;
    // pre_render output went through macro expansion
    assert!(html.contains("Filed under Main archive."), "got: {html}");
    assert!(html.ends_with("<!-- stamped -->"), "got: {html}");
}

#[tokio::test]
async fn failing_plugin_does_not_break_the_render() {
    init_tracing();
    let pipeline = RenderPipeline::builder("https://wiki.example.com")
        .with_plugins(PluginHost::new(vec![
            Arc::new(FailingPlugin),
            Arc::new(StampPlugin),
        ]))
        .build();

    let html = render(&pipeline, "Still *works*.").await;
    assert!(html.contains("<strong>works</strong>"), "got: {html}");
    assert!(html.ends_with("<!-- stamped -->"), "got: {html}");
}

#[tokio::test]
async fn broken_backends_degrade_without_failing() {
    init_tracing();
    let pipeline = RenderPipeline::builder("https://wiki.example.com")
        .with_topics(Arc::new(BrokenTopics))
        .build();

    let html = render(
        &pipeline,
        r#"WikiTerm and %IF{"istopic 'WebHome'" then="YES" else="NO"}% and %INCLUDE{"Side"}%"#,
    )
    .await;
    // WikiWord linking fails open
    assert!(html.contains(r#"class="wiki-link""#), "got: {html}");
    assert!(!html.contains("wiki-link-missing"), "got: {html}");
    // istopic fails closed
    assert!(html.contains("NO"), "got: {html}");
    assert!(!html.contains("YES"), "got: {html}");
    // inclusion reports the fault inline
    assert!(html.contains("Include failed: Main.Side"), "got: {html}");
}
