use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use html_escape::{encode_double_quoted_attribute, encode_text};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::application::repos::TopicsRepo;
use crate::domain::topics::TopicRef;

/// CamelCase token, optionally qualified as `Web.Topic`. A topic needs at
/// least two capitalized fragments so plain words never match.
static WIKI_WORD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:([A-Z][A-Za-z0-9]*)\.)?((?:[A-Z][a-z0-9]+){2,})\b")
        .expect("wikiword pattern")
});

/// Rewrites bare WikiWord tokens in rendered HTML into topic links.
///
/// Operates on HTML, not raw source: the input is segmented into tags and
/// text, tags pass through opaque (attribute values are never touched), and
/// text inside an anchor is skipped. The anchor rule is what makes a second
/// pass over already-linked output a no-op.
pub(crate) struct WikiWordLinker {
    base_url: String,
    default_web: String,
    topics: Option<Arc<dyn TopicsRepo>>,
}

enum Chunk<'a> {
    Tag(&'a str),
    Text(&'a str),
}

impl WikiWordLinker {
    pub(crate) fn new(
        base_url: impl Into<String>,
        default_web: impl Into<String>,
        topics: Option<Arc<dyn TopicsRepo>>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            default_web: default_web.into(),
            topics,
        }
    }

    /// Single async pass: collect candidates, existence-check them in one
    /// batch, splice in the links. Missing topics still link, with a marker
    /// class for styling.
    pub(crate) async fn process_html(&self, html: &str) -> String {
        let chunks = segment(html);

        let mut candidates: Vec<TopicRef> = Vec::new();
        let mut anchor_depth = 0usize;
        for chunk in &chunks {
            match chunk {
                Chunk::Tag(tag) => adjust_anchor_depth(tag, &mut anchor_depth),
                Chunk::Text(text) if anchor_depth == 0 => {
                    for caps in WIKI_WORD_RE.captures_iter(text) {
                        let target = candidate(&caps, &self.default_web);
                        if !candidates.contains(&target) {
                            candidates.push(target);
                        }
                    }
                }
                Chunk::Text(_) => {}
            }
        }

        let checks = candidates.iter().map(|t| self.topic_exists(&t.web, &t.topic));
        let results = join_all(checks).await;
        let existence: HashMap<TopicRef, bool> =
            candidates.into_iter().zip(results).collect();

        let mut output = String::with_capacity(html.len());
        let mut anchor_depth = 0usize;
        for chunk in &chunks {
            match chunk {
                Chunk::Tag(tag) => {
                    adjust_anchor_depth(tag, &mut anchor_depth);
                    output.push_str(tag);
                }
                Chunk::Text(text) if anchor_depth == 0 => {
                    let linked = WIKI_WORD_RE.replace_all(text, |caps: &regex::Captures| {
                        let target = candidate(caps, &self.default_web);
                        let exists = existence.get(&target).copied().unwrap_or(true);
                        self.link_for(&target, &caps[0], exists)
                    });
                    output.push_str(&linked);
                }
                Chunk::Text(text) => output.push_str(text),
            }
        }
        output
    }

    fn link_for(&self, target: &TopicRef, label: &str, exists: bool) -> String {
        let class = if exists {
            "wiki-link"
        } else {
            "wiki-link wiki-link-missing"
        };
        let href = format!("{}/view/{}/{}", self.base_url, target.web, target.topic);
        format!(
            r#"<a class="{class}" href="{}">{}</a>"#,
            encode_double_quoted_attribute(&href),
            encode_text(label)
        )
    }

    /// Fail-open: without a repo, or when the check errors, the word links
    /// as if the topic existed.
    async fn topic_exists(&self, web: &str, topic: &str) -> bool {
        let Some(topics) = self.topics.as_ref() else {
            return true;
        };
        match topics.topic_exists(web, topic).await {
            Ok(exists) => exists,
            Err(err) => {
                debug!(web, topic, error = %err, "existence check failed, assuming present");
                true
            }
        }
    }
}

fn candidate(caps: &regex::Captures, default_web: &str) -> TopicRef {
    let topic = &caps[2];
    match caps.get(1) {
        Some(web) => TopicRef::new(web.as_str(), topic),
        None => TopicRef::new(default_web, topic),
    }
}

/// Splits HTML into tag and text chunks. An unterminated `<` swallows the
/// rest of the input as one opaque tag chunk.
fn segment(html: &str) -> Vec<Chunk<'_>> {
    let mut chunks = Vec::new();
    let mut rest = html;
    while !rest.is_empty() {
        match rest.find('<') {
            Some(0) => {
                let end = rest.find('>').map(|i| i + 1).unwrap_or(rest.len());
                chunks.push(Chunk::Tag(&rest[..end]));
                rest = &rest[end..];
            }
            Some(start) => {
                chunks.push(Chunk::Text(&rest[..start]));
                rest = &rest[start..];
            }
            None => {
                chunks.push(Chunk::Text(rest));
                rest = "";
            }
        }
    }
    chunks
}

fn adjust_anchor_depth(tag: &str, depth: &mut usize) {
    let lower = tag.to_ascii_lowercase();
    if lower.starts_with("</a") {
        *depth = depth.saturating_sub(1);
    } else if lower.starts_with("<a") {
        // "<abbr>" must not count as an anchor
        let next = lower.as_bytes().get(2).copied();
        if matches!(next, Some(b' ') | Some(b'>') | Some(b'\t') | Some(b'\n') | None) {
            *depth += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::WikiWordLinker;
    use crate::application::repos::{RepoError, TopicsRepo};

    struct Topics(Vec<(&'static str, &'static str)>);

    #[async_trait]
    impl TopicsRepo for Topics {
        async fn topic_exists(&self, web: &str, topic: &str) -> Result<bool, RepoError> {
            Ok(self.0.iter().any(|(w, t)| *w == web && *t == topic))
        }

        async fn topic_content(&self, _web: &str, _topic: &str) -> Result<Option<String>, RepoError> {
            Ok(None)
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

    fn linker(repo: Option<Arc<dyn TopicsRepo>>) -> WikiWordLinker {
        WikiWordLinker::new("https://x", "Main", repo)
    }

    #[tokio::test]
    async fn existing_topics_get_plain_links() {
        let linker = linker(Some(Arc::new(Topics(vec![("Main", "WebHome")]))));
        let html = linker.process_html("<p>see WebHome now</p>").await;
        assert_eq!(
            html,
            r#"<p>see <a class="wiki-link" href="https://x/view/Main/WebHome">WebHome</a> now</p>"#
        );
    }

    #[tokio::test]
    async fn missing_topics_link_with_a_marker_class() {
        let linker = linker(Some(Arc::new(Topics(vec![]))));
        let html = linker.process_html("<p>NoSuchPage</p>").await;
        assert_eq!(
            html,
            r#"<p><a class="wiki-link wiki-link-missing" href="https://x/view/Main/NoSuchPage">NoSuchPage</a></p>"#
        );
    }

    #[tokio::test]
    async fn qualified_words_link_across_webs() {
        let linker = linker(Some(Arc::new(Topics(vec![("Docs", "SetupGuide")]))));
        let html = linker.process_html("<p>read Docs.SetupGuide first</p>").await;
        assert!(
            html.contains(r#"<a class="wiki-link" href="https://x/view/Docs/SetupGuide">Docs.SetupGuide</a>"#),
            "got: {html}"
        );
    }

    #[tokio::test]
    async fn plain_and_all_caps_words_never_match() {
        let linker = linker(None);
        let html = linker.process_html("<p>Webhome HTML hello world</p>").await;
        assert_eq!(html, "<p>Webhome HTML hello world</p>");
    }

    #[tokio::test]
    async fn no_repo_links_everything_fail_open() {
        let linker = linker(None);
        let html = linker.process_html("<p>AnyThing</p>").await;
        assert!(html.contains(r#"class="wiki-link""#), "got: {html}");
        assert!(!html.contains("wiki-link-missing"), "got: {html}");
    }

    #[tokio::test]
    async fn broken_repo_links_everything_fail_open() {
        let linker = linker(Some(Arc::new(BrokenTopics)));
        let html = linker.process_html("<p>AnyThing</p>").await;
        assert!(html.contains(r#"class="wiki-link""#), "got: {html}");
        assert!(!html.contains("wiki-link-missing"), "got: {html}");
    }

    #[tokio::test]
    async fn anchored_text_and_attributes_are_untouched() {
        let linker = linker(None);
        let input =
            r#"<a href="https://e.org/WebHome">WebHome inside</a><img src="WebHome.png">"#;
        assert_eq!(linker.process_html(input).await, input);
    }

    #[tokio::test]
    async fn second_pass_is_a_no_op() {
        let linker = linker(Some(Arc::new(Topics(vec![("Main", "WebHome")]))));
        let once = linker.process_html("<p>WebHome and NoSuchPage</p>").await;
        let twice = linker.process_html(&once).await;
        assert_eq!(once, twice);
    }

    #[tokio::test]
    async fn repeated_words_are_checked_once_and_all_linked() {
        let linker = linker(Some(Arc::new(Topics(vec![("Main", "WebHome")]))));
        let html = linker.process_html("<p>WebHome and WebHome</p>").await;
        assert_eq!(html.matches(r#"class="wiki-link""#).count(), 2);
    }

    #[tokio::test]
    async fn abbr_tags_do_not_open_an_anchor() {
        let linker = linker(None);
        let html = linker
            .process_html("<abbr title=\"x\">y</abbr> WebHome")
            .await;
        assert!(html.contains(r#"class="wiki-link""#), "got: {html}");
    }
}
