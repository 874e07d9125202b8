// bs-logviewer - app/mod.rs
//
// Application layer: owns the loaded log and keeps derived views in sync.
// Dependencies: core layer, platform config types.
// Must NOT depend on: any output front end.

pub mod state;
