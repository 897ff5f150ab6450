//! Chat client adapters

pub mod console;

pub use console::ConsoleClient;
