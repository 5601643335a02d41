//! Error types for the rail game engine.
//!
//! Validation failures are returned as values so the caller can report them to the
//! acting player without aborting the game.

use thiserror::Error;

use crate::game::types::{Coord, Item, UserId};

/// Why a shot was rejected by the placement rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShotError {
    #[error("player is not part of this game")]
    UnknownPlayer,
    #[error("player has already reached their end station")]
    AlreadyDone,
    #[error("the first rail must be placed on the start tile {start}")]
    MustStartAtStart { start: Coord },
    #[error("tile {0} is outside the board")]
    OutOfBounds(Coord),
    #[error("tile {0} already has two rails")]
    TileFull(Coord),
    #[error("tile {target} is not next to the end of your track at {base}")]
    NotAdjacent { target: Coord, base: Coord },
    #[error("cannot follow {tag}'s rails for more than one tile")]
    RidesAlongRail { tag: String },
    #[error("tile {0} already carries your rail")]
    AlreadyOnTrack(Coord),
    #[error("tile {0} runs alongside your own track")]
    BesideOwnTrack(Coord),
}

impl ShotError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ShotError::UnknownPlayer => "UNKNOWN_PLAYER",
            ShotError::AlreadyDone => "PLAYER_DONE",
            ShotError::MustStartAtStart { .. } => "MUST_START_AT_START",
            ShotError::OutOfBounds(_) => "OUT_OF_BOUNDS",
            ShotError::TileFull(_) => "TILE_FULL",
            ShotError::NotAdjacent { .. } => "NOT_ADJACENT",
            ShotError::RidesAlongRail { .. } => "RIDES_ALONG_RAIL",
            ShotError::AlreadyOnTrack(_) => "ALREADY_ON_TRACK",
            ShotError::BesideOwnTrack(_) => "BESIDE_OWN_TRACK",
        }
    }
}

/// A rejected game operation (shot, undo, purchase, item use).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error(transparent)]
    Shot(#[from] ShotError),
    #[error("the game is over")]
    GameInactive,
    #[error("user {0} is not part of this game")]
    UnknownPlayer(UserId),
    #[error("no show info known for show {0}")]
    UnknownShow(u64),
    #[error("there is no rail to undo")]
    NothingToUndo,
    #[error("the last rail at {0} was used for a purchase and cannot be undone")]
    AnchoredByPurchase(Coord),
    #[error("place a rail before buying items")]
    NoRailsPlaced,
    #[error("items can only be bought on a shop or city tile")]
    NotOnShop,
    #[error("the shop at {0} has already been used")]
    ShopAlreadyUsed(Coord),
    #[error("{0} is out of stock")]
    OutOfStock(Item),
    #[error("unknown item \"{0}\"")]
    UnknownItem(String),
    #[error("you do not own a {0}")]
    ItemNotOwned(Item),
    #[error("{0} cannot be used directly")]
    NotUsable(Item),
    #[error("tile {0} is outside the board")]
    OutOfBounds(Coord),
}

impl GameError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            GameError::Shot(e) => e.code(),
            GameError::GameInactive => "GAME_INACTIVE",
            GameError::UnknownPlayer(_) => "UNKNOWN_PLAYER",
            GameError::UnknownShow(_) => "UNKNOWN_SHOW",
            GameError::NothingToUndo => "NOTHING_TO_UNDO",
            GameError::AnchoredByPurchase(_) => "ANCHORED_BY_PURCHASE",
            GameError::NoRailsPlaced => "NO_RAILS_PLACED",
            GameError::NotOnShop => "NOT_ON_SHOP",
            GameError::ShopAlreadyUsed(_) => "SHOP_ALREADY_USED",
            GameError::OutOfStock(_) => "OUT_OF_STOCK",
            GameError::UnknownItem(_) => "UNKNOWN_ITEM",
            GameError::ItemNotOwned(_) => "ITEM_NOT_OWNED",
            GameError::NotUsable(_) => "ITEM_NOT_USABLE",
            GameError::OutOfBounds(_) => "OUT_OF_BOUNDS",
        }
    }
}

/// Board or game creation failed; fatal only to that creation attempt.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoardGenerationError {
    #[error("interior width and height must be divisible by 4 (got {width}x{height})")]
    NotDivisibleByFour { width: usize, height: usize },
    #[error("interior must be at least 4x4 (got {width}x{height})")]
    TooSmall { width: usize, height: usize },
    #[error("board of {width}x{height} with a river ring of {ring} is too large")]
    TooLarge { width: usize, height: usize, ring: usize },
    #[error("could not place the {what} location for player {tag}; try a larger board")]
    NoRoomForPlayer { tag: String, what: &'static str },
    #[error("player tag \"{0}\" is used twice")]
    DuplicateTag(String),
    #[error("user {0} has more than one seat")]
    DuplicatePlayer(UserId),
    #[error("player tags must not be empty")]
    EmptyTag,
    #[error("a game needs at least one player")]
    NoPlayers,
}

/// A snapshot on disk could not be turned back into a game.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed board key \"{0}\"")]
    BadKey(String),
    #[error("board is not a complete rectangle: {0}")]
    NotRectangular(String),
    #[error("player {tag} references {coord} outside the board")]
    PlayerOutOfBounds { tag: String, coord: String },
}
