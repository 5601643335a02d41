//! Application state shared by the HTTP handlers.

use std::sync::Arc;

use actix::Addr;

use crate::lookup::MediaLookup;
use crate::server::game_session::GameSessionManager;

pub struct AppState {
    /// Session store: one game session actor per guild.
    pub game_session_manager: Addr<GameSessionManager>,
    /// Metadata and watchlist source, called off the actor threads.
    pub lookup: Arc<dyn MediaLookup>,
}

impl AppState {
    pub fn new(game_session_manager: Addr<GameSessionManager>, lookup: Arc<dyn MediaLookup>) -> Self {
        AppState { game_session_manager, lookup }
    }
}
