//! Domain entities - Core business objects

pub mod user;
pub mod event;
pub mod command;

pub use user::User;
pub use event::Event;
pub use command::CommandRegistry;
