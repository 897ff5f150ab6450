//! Domain traits - Abstractions for infrastructure implementations

pub mod client;
pub mod handler;

pub use client::ChatClient;
pub use handler::CommandHandler;
