//! Media metadata and watchlist lookup.
//!
//! The engine never talks to the metadata service itself. Callers fetch what a
//! move needs through [`MediaLookup`] before submitting it, so a failed lookup
//! never reaches game state.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::game::types::{ShowId, ShowInfo, UserId, WatchlistSnapshot};

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("show {0} is not in the catalog")]
    UnknownShow(ShowId),
    #[error("no watchlist for user {0}")]
    UnknownUser(UserId),
    #[error("catalog unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog malformed: {0}")]
    Json(#[from] serde_json::Error),
}

impl LookupError {
    pub fn code(&self) -> &'static str {
        match self {
            LookupError::UnknownShow(_) => "UNKNOWN_SHOW",
            LookupError::UnknownUser(_) => "UNKNOWN_USER",
            LookupError::Io(_) | LookupError::Json(_) => "LOOKUP_FAILED",
        }
    }
}

/// Source of show metadata and user watchlists. Calls may block.
pub trait MediaLookup: Send + Sync {
    fn show_info(&self, show_id: ShowId) -> Result<ShowInfo, LookupError>;
    fn watchlist(&self, user_id: UserId) -> Result<WatchlistSnapshot, LookupError>;
}

#[derive(Debug, Default, Deserialize)]
struct Catalog {
    #[serde(default)]
    shows: BTreeMap<ShowId, ShowInfo>,
    #[serde(default)]
    watchlists: BTreeMap<UserId, WatchlistSnapshot>,
}

/// Lookup backed by a JSON catalog file, re-read on every call so watchlist
/// edits made during a game are seen when it is scored.
pub struct CatalogLookup {
    path: PathBuf,
}

impl CatalogLookup {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<Catalog, LookupError> {
        let bytes = fs::read(&self.path)?;
        let catalog = serde_json::from_slice(&bytes)?;
        debug!("[Lookup] Read catalog {}", self.path.display());
        Ok(catalog)
    }
}

impl MediaLookup for CatalogLookup {
    fn show_info(&self, show_id: ShowId) -> Result<ShowInfo, LookupError> {
        self.load()?.shows.remove(&show_id).ok_or(LookupError::UnknownShow(show_id))
    }

    fn watchlist(&self, user_id: UserId) -> Result<WatchlistSnapshot, LookupError> {
        self.load()?.watchlists.remove(&user_id).ok_or(LookupError::UnknownUser(user_id))
    }
}
