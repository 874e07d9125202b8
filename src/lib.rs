// bs-logviewer - lib.rs
//
// Library entry point, exposing all modules for integration testing and
// for front ends other than the bundled command-line viewer.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
