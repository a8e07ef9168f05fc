//! Configuration module for texpack
//!
//! Provides types and parsing for `texpack.toml`.

pub mod loader;
pub mod schema;

pub use loader::{default_config, load_config, CliOverrides, ConfigError};
pub use schema::*;
