//! Main entry point for the rail game server.
//!
//! Restores active games from disk, starts the session store, and serves the game
//! operation surface over HTTP.

use std::sync::Arc;

use actix::Actor;
use actix_web::{web, App, HttpServer};
use log::info;

use config::server::{ServerConfig, CATALOG_FILE};
use lookup::{CatalogLookup, MediaLookup};
use server::fanout::LogNotifier;
use server::game_session::server::RestoreGame;
use server::game_session::GameSessionManager;

pub mod config;
mod game;
mod lookup;
mod persistence;
mod server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = ServerConfig::from_env();

    let game_session_manager = GameSessionManager::new(config.data_dir.clone(), Arc::new(LogNotifier)).start();
    let restored = persistence::restore_active(&config.data_dir);
    info!("[Server] Restoring {} active games from {}", restored.len(), config.data_dir.display());
    for stored in restored {
        game_session_manager.do_send(RestoreGame(stored));
    }

    let lookup: Arc<dyn MediaLookup> = Arc::new(CatalogLookup::new(config.data_dir.join(CATALOG_FILE)));
    let state = web::Data::new(server::state::AppState::new(game_session_manager, lookup));

    info!("[Server] Listening on {}", config.bind_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(
                actix_web::middleware::DefaultHeaders::new()
                    .add(("Access-Control-Allow-Origin", "*"))
                    .add(("Access-Control-Allow-Headers", "*")),
            )
            .app_data(state.clone())
            .configure(server::router::config)
    })
    .bind(config.bind_addr.as_str())?
    .run()
    .await
}
