// bs-logviewer - platform/mod.rs
//
// Platform abstraction layer: config directories and file intake.
// Dependencies: util, core model types, directories/flate2 crates.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
