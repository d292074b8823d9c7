//! # mapgate-core
//!
//! Core types, configuration, and utilities for mapgate.
//!
//! This crate provides shared functionality used across all mapgate crates:
//!
//! - **Configuration**: Loading, validation, and environment overrides
//! - **Types**: Tool definitions and the response envelope returned to callers
//! - **Utilities**: Path resolution, ID generation, and secret handling

pub mod config;
pub mod env;
pub mod error;
pub mod id;
pub mod paths;
pub mod secret;
pub mod types;

// Re-exports for convenience
pub use config::Config;
pub use error::{ConfigError, ToolError};
pub use secret::SecretString;
pub use types::*;
