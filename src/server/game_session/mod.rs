pub mod server;
pub mod handlers;
pub mod messages;

pub use server::{GameSession, GameSessionManager};
