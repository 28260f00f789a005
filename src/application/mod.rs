//! Application services layer.

pub mod macros;
pub mod plugins;
pub mod render;
pub mod repos;
