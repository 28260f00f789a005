//! Macro name → handler registry.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use thiserror::Error;

use crate::application::macros::builtins;
use crate::application::macros::context::RenderContext;
use crate::application::macros::params::MacroParams;
use crate::application::repos::RepoError;

/// Global registry accessor, built with all built-in macros on first use.
pub fn builtin_registry() -> Arc<MacroRegistry> {
    Arc::clone(&REGISTRY)
}

static REGISTRY: Lazy<Arc<MacroRegistry>> = Lazy::new(|| Arc::new(MacroRegistry::with_builtins()));

/// Error raised while evaluating a macro handler.
#[derive(Debug, Error)]
pub enum MacroError {
    #[error("macro evaluation failed: {message}")]
    Evaluation { message: String },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl MacroError {
    pub fn evaluation(message: impl Into<String>) -> Self {
        Self::Evaluation {
            message: message.into(),
        }
    }
}

/// Contract implemented by macro handlers.
///
/// Handlers produce replacement text for one `%NAME{params}%` occurrence.
/// Errors are recovered by the expander (empty replacement, logged), so a
/// handler never aborts a render.
#[async_trait]
pub trait MacroHandler: Send + Sync {
    async fn expand(&self, params: &MacroParams, ctx: &RenderContext) -> Result<String, MacroError>;
}

/// Adapter for macros that need no I/O, wrapping a plain function.
pub struct TextMacro(pub fn(&MacroParams, &RenderContext) -> String);

#[async_trait]
impl MacroHandler for TextMacro {
    async fn expand(&self, params: &MacroParams, ctx: &RenderContext) -> Result<String, MacroError> {
        Ok((self.0)(params, ctx))
    }
}

/// Case-sensitive mapping from macro names to handlers.
///
/// Names are unique; registering an existing name overwrites the previous
/// handler (last registration wins), which tests use to stub built-ins.
#[derive(Default)]
pub struct MacroRegistry {
    handlers: HashMap<String, Arc<dyn MacroHandler>>,
}

impl MacroRegistry {
    /// An empty registry. Most callers want [`MacroRegistry::with_builtins`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in macro library.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register_all(&mut registry);
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn MacroHandler>) {
        self.handlers.insert(name.into(), handler);
    }

    /// Register a synchronous text macro.
    pub fn register_fn(
        &mut self,
        name: impl Into<String>,
        handler: fn(&MacroParams, &RenderContext) -> String,
    ) {
        self.register(name, Arc::new(TextMacro(handler)));
    }

    /// Absent names are not an error; the expander leaves them unexpanded.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn MacroHandler>> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
