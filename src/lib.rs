//! Wiki topic rendering pipeline.
//!
//! Turns stored topic markup into display HTML in fixed stages: plugin
//! pre-render hooks, `%MACRO%` expansion, `[[bracket]]` links, legacy TML
//! shorthand to Markdown, the Markdown render itself, WikiWord auto-linking,
//! plugin post-render hooks, and external link hardening.
//!
//! Rendering never fails. Malformed markup degrades to literal text and
//! collaborator faults (repositories, plugins, macro handlers) are logged and
//! recovered per stage, so one broken topic cannot take a page down with it.
//!
//! [`RenderPipeline`] is the entry point; storage, user, and search backends
//! plug in behind the [`application::repos`] traits.

pub mod application;
pub mod config;
pub mod domain;

pub use application::macros::{
    MacroError, MacroHandler, MacroParams, MacroRegistry, RenderContext, TextMacro,
    builtin_registry,
};
pub use application::plugins::{AttachmentInfo, PluginError, PluginHost, WikiPlugin};
pub use application::render::{RenderOutput, RenderPipeline, RenderPipelineBuilder, RenderRequest};
pub use application::repos::{RepoError, SearchService, TopicHit, TopicsRepo, UsersRepo};
pub use config::PipelineSettings;
pub use domain::topics::TopicRef;
pub use domain::users::UserRecord;
