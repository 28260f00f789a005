//! The built-in macro library.
//!
//! Grouped by concern; each submodule contributes its handlers through a
//! `register` function so [`register_all`] stays a table of contents.

use crate::application::macros::registry::MacroRegistry;

mod colors;
mod condition;
mod include;
mod search;
mod site;
mod users;

pub(crate) fn register_all(registry: &mut MacroRegistry) {
    site::register(registry);
    colors::register(registry);
    condition::register(registry);
    users::register(registry);
    include::register(registry);
    search::register(registry);
}
