// bs-logviewer - core/mod.rs
//
// Core business logic layer: parsing, filtering, duplicate collapsing,
// analysis and rendering of the derived views.
// Must NOT depend on: platform, app, or any file-system I/O.

pub mod analysis;
pub mod dedup;
pub mod export;
pub mod filter;
pub mod model;
pub mod parser;
pub mod view;
