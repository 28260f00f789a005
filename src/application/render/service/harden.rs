use std::collections::BTreeSet;

use lol_html::{RewriteStrSettings, element, rewrite_str};
use tracing::warn;

/// Adds `target="_blank" rel="noopener noreferrer"` to every absolute
/// http(s) anchor, wiki-internal absolute links included. Anchors that
/// already carry a target keep it untouched. A rewriter failure returns the
/// input unchanged.
pub(crate) fn harden_external_links(html: &str) -> String {
    let result = rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: vec![element!("a[href]", |el| {
                let Some(href) = el.get_attribute("href") else {
                    return Ok(());
                };
                if !is_absolute_http_url(&href) || el.get_attribute("target").is_some() {
                    return Ok(());
                }

                el.set_attribute("target", "_blank")?;
                let rel = merge_rel(el.get_attribute("rel"), &["noopener", "noreferrer"]);
                el.set_attribute("rel", &rel)?;
                Ok(())
            })],
            ..RewriteStrSettings::default()
        },
    );

    match result {
        Ok(rewritten) => rewritten,
        Err(err) => {
            warn!(error = %err, "link hardening failed, leaving html untouched");
            html.to_string()
        }
    }
}

fn is_absolute_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn merge_rel(existing: Option<String>, required: &[&str]) -> String {
    let mut tokens: BTreeSet<String> = existing
        .unwrap_or_default()
        .split_whitespace()
        .filter(|token| !token.is_empty())
        .map(|token| token.to_string())
        .collect();
    for &token in required {
        tokens.insert(token.to_string());
    }
    tokens.into_iter().collect::<Vec<_>>().join(" ")
}
