//! Single-pass macro expansion.
//!
//! `%NAME%` and `%NAME{params}%` occurrences are replaced left to right in
//! one scan over the raw source. Handler output is spliced in verbatim and
//! never re-scanned, so a macro that emits `%WEB%` produces that literal
//! text. Unknown names stay untouched, and the scan resumes after the full
//! match, so `%UNKNOWN%WEB%` keeps both halves literal (the closing `%` is
//! consumed by the unknown occurrence).

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::application::macros::context::RenderContext;
use crate::application::macros::params::MacroParams;
use crate::application::macros::registry::MacroRegistry;

/// `%NAME%` or `%NAME{params}%`. Params are matched lazily and `.` stays off
/// newlines, so a macro call never spans lines.
static MACRO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%([A-Z][A-Z0-9_]*)(?:\{(.*?)\})?%").expect("macro pattern"));

/// Raw-source probe for identity-dependent macros, with or without params.
static USER_MACRO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"%(?:WIKIUSERNAME|WIKINAME|USERNAME|USERINFO|GROUPS|ISMEMBER)[{%]")
        .expect("user macro pattern")
});

/// True when the raw source mentions a macro whose output depends on the
/// viewer. Callers use the inverse as the cacheability signal.
pub fn has_user_macros(raw: &str) -> bool {
    USER_MACRO_RE.is_match(raw)
}

/// Expands registered macros against a context.
#[derive(Clone)]
pub struct MacroExpander {
    registry: Arc<MacroRegistry>,
}

impl MacroExpander {
    pub fn new(registry: Arc<MacroRegistry>) -> Self {
        Self { registry }
    }

    /// One expansion pass. A failing handler contributes an empty
    /// replacement and is logged; the pass itself cannot fail.
    pub async fn expand(&self, input: &str, ctx: &RenderContext) -> String {
        let mut output = String::with_capacity(input.len());
        let mut last_end = 0;

        for captures in MACRO_RE.captures_iter(input) {
            let full = captures.get(0).expect("whole match");
            let name = &captures[1];
            let Some(handler) = self.registry.get(name) else {
                continue;
            };

            output.push_str(&input[last_end..full.start()]);
            last_end = full.end();

            let params = match captures.get(2) {
                Some(raw) => MacroParams::parse(raw.as_str()),
                None => MacroParams::default(),
            };
            match handler.expand(&params, ctx).await {
                Ok(replacement) => output.push_str(&replacement),
                Err(err) => {
                    warn!(name, error = %err, "macro evaluation failed");
                }
            }
        }

        output.push_str(&input[last_end..]);
        output
    }
}
