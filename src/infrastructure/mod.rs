//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Adapters: Chat client implementations (console)

pub mod config;
pub mod adapters;
