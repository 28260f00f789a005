//! `%SEARCH%` topic search listing.

use async_trait::async_trait;
use html_escape::{encode_double_quoted_attribute, encode_text};
use tracing::warn;

use crate::application::macros::context::RenderContext;
use crate::application::macros::params::{DEFAULT_KEY, MacroParams};
use crate::application::macros::registry::{MacroError, MacroHandler, MacroRegistry};

const DEFAULT_LIMIT: usize = 10;

pub(crate) fn register(registry: &mut MacroRegistry) {
    registry.register("SEARCH", std::sync::Arc::new(SearchMacro));
}

struct SearchMacro;

#[async_trait]
impl MacroHandler for SearchMacro {
    async fn expand(&self, params: &MacroParams, ctx: &RenderContext) -> Result<String, MacroError> {
        let Some(search) = ctx.search.as_ref() else {
            return Ok(String::new());
        };
        let term = params.first_or(&[DEFAULT_KEY, "search"], "").trim();
        if term.is_empty() {
            return Ok(String::new());
        }

        let web = params.get("web").filter(|w| !w.is_empty());
        let limit = params
            .get("limit")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_LIMIT);

        let hits = match search.search_topics(term, web, limit).await {
            Ok(hits) => hits,
            Err(err) => {
                warn!(term, error = %err, "topic search failed");
                return Ok(String::new());
            }
        };

        let mut html = String::from(r#"<ul class="wiki-search-results">"#);
        for hit in &hits {
            let name = format!("{}.{}", hit.web, hit.topic);
            html.push_str(&format!(
                r#"<li><a href="{}">{}</a></li>"#,
                encode_double_quoted_attribute(&ctx.topic_url(&hit.web, &hit.topic)),
                encode_text(&name)
            ));
        }
        html.push_str("</ul>");
        Ok(html)
    }
}
