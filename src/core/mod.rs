//! Framework-agnostic view rendering: context resolution, engines, and output processing.

pub mod app;
pub mod context;
pub mod engine;
pub mod liquid;
pub mod minify;
pub mod tera;
