//! Domain layer - Core types with no infrastructure dependencies
//!
//! This layer contains:
//! - Entities: Core objects (User, Event, CommandRegistry)
//! - Traits: Abstractions for infrastructure (ChatClient, CommandHandler)

pub mod entities;
pub mod traits;
