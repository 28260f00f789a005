//! Site identity and URL-building macros.

use html_escape::encode_text;

use crate::application::macros::params::DEFAULT_KEY;
use crate::application::macros::registry::MacroRegistry;

pub(crate) fn register(registry: &mut MacroRegistry) {
    registry.register_fn("WEB", |_, ctx| encode_text(&ctx.web).into_owned());

    registry.register_fn("TOPIC", |_, ctx| encode_text(&ctx.topic).into_owned());

    // alias for the topic a render started from
    registry.register_fn("BASETOPIC", |_, ctx| encode_text(&ctx.topic).into_owned());

    registry.register_fn("TOPICURL", |_, ctx| ctx.topic_url(&ctx.web, &ctx.topic));

    registry.register_fn("SCRIPTURL", |params, ctx| {
        let action = params.first_or(&[DEFAULT_KEY, "script"], "view");
        format!("{}/{}", ctx.base_url, encode_text(action))
    });

    registry.register_fn("PUBURL", |_, ctx| format!("{}/pub", ctx.pub_url_base()));

    registry.register_fn("ATTACHURL", |_, ctx| {
        format!("{}/pub/{}/{}", ctx.pub_url_base(), ctx.web, ctx.topic)
    });

    registry.register_fn("WIKILOGOURL", |_, ctx| {
        if ctx.base_url.is_empty() {
            "/".to_string()
        } else {
            ctx.base_url.clone()
        }
    });
}
