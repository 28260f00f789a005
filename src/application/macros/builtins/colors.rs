//! Color span macros: `%RED%text%ENDCOLOR%` and friends.
//!
//! Each color macro emits an opening `<span>`; `%ENDCOLOR%` emits the close.
//! The pair is NOT matched as a nested structure — unbalanced occurrences
//! produce unbalanced HTML, which is accepted behavior.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::macros::context::RenderContext;
use crate::application::macros::params::MacroParams;
use crate::application::macros::registry::{MacroError, MacroHandler, MacroRegistry};

/// Supported named colors and their CSS values.
pub(crate) const COLORS: [(&str, &str); 17] = [
    ("RED", "#cc0000"),
    ("GREEN", "#006600"),
    ("BLUE", "#0000cc"),
    ("YELLOW", "#cccc00"),
    ("ORANGE", "#cc6600"),
    ("PINK", "#cc0066"),
    ("PURPLE", "#660099"),
    ("TEAL", "#006666"),
    ("NAVY", "#000066"),
    ("GRAY", "#666666"),
    ("SILVER", "#aaaaaa"),
    ("LIME", "#00cc00"),
    ("AQUA", "#00cccc"),
    ("MAROON", "#660000"),
    ("OLIVE", "#666600"),
    ("WHITE", "#ffffff"),
    ("BLACK", "#000000"),
];

struct ColorMacro {
    css: &'static str,
}

#[async_trait]
impl MacroHandler for ColorMacro {
    async fn expand(
        &self,
        _params: &MacroParams,
        _ctx: &RenderContext,
    ) -> Result<String, MacroError> {
        Ok(format!(r#"<span style="color:{}">"#, self.css))
    }
}

pub(crate) fn register(registry: &mut MacroRegistry) {
    for (name, css) in COLORS {
        registry.register(name, Arc::new(ColorMacro { css }));
    }

    registry.register_fn("ENDCOLOR", |_, _| "</span>".to_string());
}
