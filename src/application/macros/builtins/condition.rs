//! The conditional macro: `%IF{"condition" then=".." else=".."}%`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::application::macros::context::RenderContext;
use crate::application::macros::params::{DEFAULT_KEY, MacroParams};
use crate::application::macros::registry::{MacroError, MacroHandler, MacroRegistry};
use crate::domain::topics::TopicRef;

pub(crate) fn register(registry: &mut MacroRegistry) {
    registry.register("IF", Arc::new(IfMacro));
}

struct IfMacro;

#[async_trait]
impl MacroHandler for IfMacro {
    async fn expand(&self, params: &MacroParams, ctx: &RenderContext) -> Result<String, MacroError> {
        let condition = params.first_or(&[DEFAULT_KEY, "condition"], "");
        let then_value = params.get("then").unwrap_or("");
        let else_value = params.get("else").unwrap_or("");

        let verdict = evaluate_condition(condition, ctx).await;
        Ok(if verdict { then_value } else { else_value }.to_string())
    }
}

/// Condition grammar:
///
/// * `istopic Web.Topic` — existence check against the topics repo; the web
///   defaults to the current one. No repo or a failed lookup count as false.
/// * `defined VARNAME` — always false; variables are reserved for future use.
/// * `context NAME` — fixed table; only `authenticated` is defined.
/// * anything else — literal string, truthy iff non-empty once surrounding
///   quotes are stripped.
async fn evaluate_condition(condition: &str, ctx: &RenderContext) -> bool {
    let cond = condition.trim();
    if cond.is_empty() {
        return false;
    }

    if let Some(target) = cond.strip_prefix("istopic ") {
        let target = strip_quotes(target.trim());
        let topic_ref = TopicRef::parse(target, &ctx.web);
        return topic_exists_for_condition(ctx, &topic_ref).await;
    }

    if cond.strip_prefix("defined ").is_some() {
        return false;
    }

    if let Some(name) = cond.strip_prefix("context ") {
        return match name.trim() {
            "authenticated" => ctx.current_user.is_some(),
            _ => false,
        };
    }

    !strip_quotes(cond).is_empty()
}

/// Truthiness lookups fail closed: an absent repo or an errored query is
/// treated as "topic does not exist".
async fn topic_exists_for_condition(ctx: &RenderContext, topic_ref: &TopicRef) -> bool {
    let Some(topics) = ctx.topics.as_ref() else {
        return false;
    };
    match topics.topic_exists(&topic_ref.web, &topic_ref.topic).await {
        Ok(exists) => exists,
        Err(err) => {
            debug!(topic = %topic_ref, error = %err, "istopic lookup failed");
            false
        }
    }
}

fn strip_quotes(value: &str) -> &str {
    value.trim_matches(|c| c == '"' || c == '\'')
}
