//! Core domain logic (protocol-agnostic)
//!
//! This module contains everything that is independent of the CLI.
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **logging**: Tracing subscriber setup
//! - **xdg**: XDG directory handling
//! - **segment**: Reference-counted handles and their registry
//! - **storage**: Tantivy segment resources and catalog
//! - **services**: Unified service container

pub mod config;
pub mod error;
pub mod logging;
pub mod segment;
pub mod services;
pub mod storage;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{Result, SegrefError};
pub use services::Services;
