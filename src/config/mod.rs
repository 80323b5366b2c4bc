//! Configuration module
//!
//! Provides types and loading for the optional `composer.toml` file.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
