//! Server layer root module.
//!
//! - Application state shared by handlers
//! - HTTP routing and error responses
//! - Game session orchestration (session store, one actor per game)
//! - Board update fan-out

pub mod state;
pub mod router;
pub mod game_session;
pub mod http_error;
pub mod fanout;
