// ChiloDisco - core/mod.rs
//
// Core presentation logic layer.
// Dependencies: util, chrono, regex, serde.
// Must NOT depend on: ui, platform, app, or any I/O crate directly.

pub mod age;
pub mod first_seen;
pub mod format;
pub mod labels;
pub mod markup;
pub mod model;
pub mod panel;
pub mod scroll;
pub mod timestamp;
