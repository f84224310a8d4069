#![allow(clippy::uninlined_format_args)]

pub mod api;
pub mod app;
pub mod comments;
pub mod config;
pub mod credentials;
pub mod decode;
pub mod error;
pub mod markdown;
pub mod models;
pub mod orchestrator;
pub mod render;
pub mod state;
pub mod transport;

#[cfg(test)]
mod testing;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use app::run;
