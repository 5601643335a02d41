//! Messages accepted by a `GameSession` actor.
//!
//! Each mutating message is validated and committed inside one handler call, so
//! concurrent submissions for the same game are applied one after the other.
//! Mutations answer `ApiError::Snapshot` when the change could not be saved.

use std::collections::BTreeMap;
use std::sync::Arc;

use actix::prelude::*;
use serde::Serialize;

use crate::game::error::{GameError, SnapshotError};
use crate::game::state::{Game, GameStats, ItemUse, PlayerStats, ShotReport};
use crate::game::systems::placement::Placement;
use crate::game::systems::scoring::ScoreBreakdown;
use crate::game::types::{Coord, Item, Shot, ShowId, ShowInfo, UserId, WatchlistSnapshot};
use crate::server::http_error::ApiError;

#[derive(Message)]
#[rtype(result = "Result<ShotReport, ApiError>")]
pub struct Shoot {
    pub user_id: UserId,
    pub shot: Shot,
    /// Metadata fetched by the caller when the show is not cached yet.
    pub show: Option<ShowInfo>,
}

#[derive(Message)]
#[rtype(result = "Result<Shot, ApiError>")]
pub struct Undo {
    pub user_id: UserId,
}

#[derive(Message)]
#[rtype(result = "Result<Item, ApiError>")]
pub struct Buy {
    pub user_id: UserId,
    pub item: String,
    pub show_info: String,
}

#[derive(Message)]
#[rtype(result = "Result<(), ApiError>")]
pub struct UseItem {
    pub user_id: UserId,
    pub action: ItemUse,
}

#[derive(Message)]
#[rtype(result = "Result<Placement, GameError>")]
pub struct CheckShot {
    pub user_id: UserId,
    pub target: Coord,
}

/// Whether the show's metadata is already cached in the game.
#[derive(Message)]
#[rtype(result = "bool")]
pub struct KnowsShow(pub ShowId);

/// Immutable copy of the committed game.
#[derive(Message)]
#[rtype(result = "Arc<Game>")]
pub struct GetSnapshot;

#[derive(Message)]
#[rtype(result = "Result<Vec<ScoreBreakdown>, ApiError>")]
pub struct CalculateScores {
    pub end_watchlists: BTreeMap<UserId, WatchlistSnapshot>,
    pub now: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsReport {
    pub game: GameStats,
    pub players: Vec<PlayerStats>,
}

#[derive(Message)]
#[rtype(result = "StatsReport")]
pub struct GetStats;

/// Delete the game's directory and stop the session.
#[derive(Message)]
#[rtype(result = "Result<(), SnapshotError>")]
pub struct Shutdown;
