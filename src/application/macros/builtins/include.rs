//! `%INCLUDE%` topic transclusion.
//!
//! Fetches the target topic's stored content and renders it through the full
//! pipeline with a child context. The depth counter on the context bounds the
//! recursion; at the limit the inclusion point is replaced with a visible
//! marker span so a self-including topic terminates instead of hanging.

use async_trait::async_trait;
use html_escape::encode_text;
use tracing::warn;

use crate::application::macros::context::RenderContext;
use crate::application::macros::params::{DEFAULT_KEY, MacroParams};
use crate::application::macros::registry::{MacroError, MacroHandler, MacroRegistry};
use crate::domain::topics::TopicRef;

pub(crate) fn register(registry: &mut MacroRegistry) {
    registry.register("INCLUDE", std::sync::Arc::new(IncludeMacro));
}

struct IncludeMacro;

#[async_trait]
impl MacroHandler for IncludeMacro {
    async fn expand(&self, params: &MacroParams, ctx: &RenderContext) -> Result<String, MacroError> {
        let Some(target) = params.first(&[DEFAULT_KEY, "topic"]) else {
            return Ok(String::new());
        };
        if target.is_empty() {
            return Ok(String::new());
        }

        if ctx.include_depth() >= ctx.max_include_depth() {
            return Ok(include_error(&format!(
                "Include depth limit reached: {target}"
            )));
        }

        let Some(topics) = ctx.topics.as_ref() else {
            return Ok(String::new());
        };

        let target = TopicRef::parse(target, &ctx.web);
        match topics.topic_content(&target.web, &target.topic).await {
            Ok(Some(content)) => {
                let rendered = ctx
                    .render_included(&target.web, &target.topic, content.clone())
                    .await;
                // Without an attached pipeline the raw content passes through.
                Ok(rendered.unwrap_or(content))
            }
            Ok(None) => Ok(include_error(&format!("Topic not found: {target}"))),
            Err(err) => {
                warn!(topic = %target, error = %err, "include fetch failed");
                Ok(include_error(&format!("Include failed: {target}")))
            }
        }
    }
}

fn include_error(message: &str) -> String {
    format!(
        r#"<span class="wiki-include-error">{}</span>"#,
        encode_text(message)
    )
}
