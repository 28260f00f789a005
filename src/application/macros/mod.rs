//! Macro expansion engine.
//!
//! Topic markup may embed `%NAME%` and `%NAME{params}%` directives. The
//! expander walks the source once, looks each name up in a registry, and
//! splices in the handler's replacement text. Unknown names pass through
//! literally and handler output is never re-expanded.

mod builtins;
mod context;
mod expand;
mod params;
mod registry;

pub use context::RenderContext;
pub use expand::{MacroExpander, has_user_macros};
pub use params::{DEFAULT_KEY, MacroParams};
pub use registry::{
    MacroError, MacroHandler, MacroRegistry, TextMacro, builtin_registry,
};
