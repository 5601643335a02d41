//! HTTP routing for the game operation surface.

use actix_web::web;

use crate::server::game_session::handlers;

/// Configure the per-guild game routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/guilds/{guild_id}/game")
            .route("", web::post().to(handlers::create_game))
            .route("", web::get().to(handlers::get_game))
            .route("", web::delete().to(handlers::delete_game))
            .route("/valid", web::get().to(handlers::valid_shot))
            .route("/shot", web::post().to(handlers::shoot))
            .route("/undo", web::post().to(handlers::undo))
            .route("/buy", web::post().to(handlers::buy))
            .route("/use", web::post().to(handlers::use_item))
            .route("/score", web::post().to(handlers::score))
            .route("/stats", web::get().to(handlers::stats))
            .route("/shop", web::get().to(handlers::shop)),
    );
}
