//! Application layer - Use cases
//!
//! This layer contains:
//! - Services: Bot lifecycle and built-in handlers
//! - Errors: Domain-specific errors
//! - Messaging: Mention parsing and command dispatching

pub mod errors;
pub mod services;
pub mod messaging;
