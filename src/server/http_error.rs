//! Centralized error responses for the operation surface.
//!
//! Every failure is answered with `{"error":{"code","message","context"}}` so the
//! dispatch layer can report the exact reason to the acting player.

use actix::MailboxError;
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crate::game::error::{BoardGenerationError, GameError, SnapshotError};
use crate::lookup::LookupError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error(transparent)]
    Board(#[from] BoardGenerationError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("no game in guild {0}")]
    NoGame(u64),
    #[error("guild {0} already has an active game")]
    GameRunning(u64),
    #[error("a game named \"{0}\" already exists")]
    NameTaken(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("game session unavailable: {0}")]
    Mailbox(#[from] MailboxError),
    #[error("background task failed: {0}")]
    Blocking(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Game(e) => e.code(),
            ApiError::Board(_) => "BOARD_GENERATION_FAILED",
            ApiError::Lookup(e) => e.code(),
            ApiError::Snapshot(_) => "PERSISTENCE_FAILED",
            ApiError::NoGame(_) => "NO_GAME",
            ApiError::GameRunning(_) => "GAME_RUNNING",
            ApiError::NameTaken(_) => "NAME_TAKEN",
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Mailbox(_) | ApiError::Blocking(_) => "INTERNAL",
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Game(GameError::UnknownPlayer(_)) | ApiError::NoGame(_) => StatusCode::NOT_FOUND,
            ApiError::Game(GameError::GameInactive) | ApiError::GameRunning(_) | ApiError::NameTaken(_) => {
                StatusCode::CONFLICT
            }
            ApiError::Game(_) | ApiError::Board(_) | ApiError::BadRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Lookup(_) => StatusCode::BAD_GATEWAY,
            ApiError::Snapshot(_) | ApiError::Mailbox(_) | ApiError::Blocking(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        http_error_response(self.code(), &self.to_string(), None, self.status_code())
    }
}

/// Returns an HTTP error response with a JSON body.
pub fn http_error_response(code: &str, message: &str, context: Option<&str>, status: StatusCode) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "error": {
            "code": code,
            "message": message,
            "context": context.unwrap_or(""),
        }
    }))
}
