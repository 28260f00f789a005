//! Topic rendering pipeline.
//!
//! The pipeline is intentionally kept pure: it accepts topic markup input,
//! produces deterministic HTML output, and recovers from every collaborator
//! fault per stage. State changes (saving rendered output, cache population)
//! happen in the caller.

mod service;
mod types;

pub use service::{RenderPipeline, RenderPipelineBuilder};
pub use types::{RenderOutput, RenderRequest};
