//! stylepreview - a live-reloading preview server for built stylesheets.
//!
//! Given a built stylesheet artifact, this crate serves a single HTML page
//! with the stylesheet injected, reloads the browser when the artifact
//! changes, and prints the reachable addresses on startup.

pub mod config;
pub mod engine;
pub mod net;
pub mod render;
pub mod server;
