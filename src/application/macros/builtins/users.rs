//! User identity macros.
//!
//! `%WIKINAME%`, `%WIKIUSERNAME%`, `%USERNAME%`, `%GROUPS%` and `%ISMEMBER%`
//! read the viewer from the context. `%USERINFO%` can additionally look up a
//! named user through the users repo. Output from any of these marks the
//! source as non-cacheable (see the expander's user-macro detector).

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::application::macros::context::RenderContext;
use crate::application::macros::params::{DEFAULT_KEY, MacroParams};
use crate::application::macros::registry::{MacroError, MacroHandler, MacroRegistry};
use crate::application::repos::UsersRepo;
use crate::domain::users::UserRecord;

pub(crate) fn register(registry: &mut MacroRegistry) {
    registry.register_fn("WIKINAME", |_, ctx| match &ctx.current_user {
        Some(user) => user.wiki_name_or_username().to_string(),
        None => "Guest".to_string(),
    });

    registry.register_fn("WIKIUSERNAME", |_, ctx| match &ctx.current_user {
        Some(user) => format!("Main.{}", user.wiki_name_or_username()),
        None => "Main.WikiGuest".to_string(),
    });

    registry.register_fn("USERNAME", |_, ctx| match &ctx.current_user {
        Some(user) => user.username.clone(),
        None => "guest".to_string(),
    });

    registry.register("USERINFO", Arc::new(UserInfoMacro));

    registry.register_fn("GROUPS", |_, ctx| ctx.user_groups().join(", "));

    registry.register_fn("ISMEMBER", |params, ctx| {
        let group = params.first_or(&[DEFAULT_KEY, "group"], "");
        if !group.is_empty() && ctx.user_groups().iter().any(|g| g == group) {
            "1".to_string()
        } else {
            String::new()
        }
    });
}

struct UserInfoMacro;

#[async_trait]
impl MacroHandler for UserInfoMacro {
    async fn expand(&self, params: &MacroParams, ctx: &RenderContext) -> Result<String, MacroError> {
        let target = params.first(&[DEFAULT_KEY, "username"]);
        let format = params.get("format").unwrap_or("$displayname");

        // A named lookup needs both a target and a repo; otherwise the
        // current viewer is reported.
        let fetched;
        let user = match (target, ctx.users.as_ref()) {
            (Some(username), Some(users)) => {
                fetched = fetch_user(users.as_ref(), username).await;
                fetched.as_ref()
            }
            _ => ctx.current_user.as_ref(),
        };

        let Some(user) = user else {
            return Ok("(unknown user)".to_string());
        };
        Ok(format_user(format, user))
    }
}

async fn fetch_user(users: &dyn UsersRepo, username: &str) -> Option<UserRecord> {
    match users.find_by_username(username).await {
        Ok(found) => found,
        Err(err) => {
            debug!(username, error = %err, "user lookup failed");
            None
        }
    }
}

/// Literal substring substitution of the format tokens.
///
/// `$emails` must be replaced before `$email` so the longer token is not
/// clobbered; the iteration order below is load-bearing.
fn format_user(format: &str, user: &UserRecord) -> String {
    let groups = user.groups.join(", ");
    let replacements = [
        ("$username", user.username.as_str()),
        ("$wikiname", user.wiki_name_or_username()),
        ("$emails", user.email.as_str()),
        ("$email", user.email.as_str()),
        ("$displayname", user.display_or_username()),
        ("$groups", groups.as_str()),
    ];

    let mut result = format.to_string();
    for (token, value) in replacements {
        result = result.replace(token, value);
    }
    result
}
