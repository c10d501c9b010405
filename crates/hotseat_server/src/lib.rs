//! Hotseat server - the shared table over HTTP
//!
//! Exposes one [`hotseat_engine::Table`] to any number of HTTP
//! clients. Players subscribe for a seat or a queue slot, submit
//! moves, and read the table state; an optional file mirror keeps the
//! latest snapshot on disk as JSON for external consumers.
//!
//! # Architecture
//!
//! - **api**: axum routes and error-to-status mapping
//! - **config**: CLI flags merged over a TOML file and the environment
//! - **mirror**: sink that rewrites a JSON file on every change

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod api;
mod config;
mod mirror;

// Crate-level exports - HTTP surface
pub use api::{MirrorRequest, MoveRequest, PlayerRequest, SubscribeResponse, router};

// Crate-level exports - Configuration
pub use config::{Args, ConfigError, FileConfig, ServerConfig};

// Crate-level exports - File mirror
pub use mirror::attach_mirror;
