/// Scoring configuration constants.
/// 
/// Point values awarded when a finished game is tallied.
pub const SPEED_BONUS: [f64; 2] = [2.0, 1.0]; // First and second finisher.

/// Per-tile resource points.
pub const WHEAT_POINTS: f64 = 1.0;
pub const WOOD_POINTS: f64 = 2.0;
pub const GEM_POINTS: f64 = 2.0;
pub const HOUSE_POINTS: f64 = 1.0;

/// One-time wheat bonus when the player also railed through a city.
pub const CITY_WHEAT_BONUS: f64 = 3.0;

/// Extra points per house when the player also railed through a city.
pub const CITY_HOUSE_BONUS: f64 = 1.0;

/// Bonus for the first gem shot of the whole game.
pub const FIRST_GEM_BONUS: f64 = 3.0;

/// Points per crossing with another player's rail.
pub const INTERSECTION_POINTS: f64 = 1.0;

/// Added to a player's prison penalty per Gun they own.
pub const GUN_PENALTY: f64 = 0.5;

/// Extra points per wood tile for each Axe.
pub const AXE_BONUS: f64 = 0.5;

/// Points per Coin.
pub const COIN_POINTS: f64 = 2.0;

/// Rail efficiency: every `RAIL_STEP` rails under the target earns `RAIL_STEP_POINTS`,
/// every `RAIL_STEP` over it loses as much.
pub const TARGET_RAILS: f64 = 26.0;
pub const RAIL_STEP: f64 = 3.0;
pub const RAIL_STEP_POINTS: f64 = 2.0;

/// Quest rewards.
pub const QUEST_TRAIN_TAG: f64 = 3.0;
pub const QUEST_LEAST_WATCHED_GENRE: f64 = 4.0;
pub const QUEST_SOURCES: f64 = 3.0;
pub const QUEST_NO_ZONE_MATCH: f64 = 3.0;
pub const QUEST_OTHER_PLAYERS_SHOWS: f64 = 2.0;
pub const QUEST_RESOURCE_FREE_RUN: f64 = 3.0;

/// Quest thresholds.
pub const LEAST_WATCHED_GENRE_SHOTS: usize = 2;
pub const DISTINCT_SOURCES: usize = 4;
pub const RESOURCE_FREE_RUN: usize = 6;
pub const OTHER_PLAYERS_SHOWS: usize = 3;
pub const TRAIN_TAG_NAME: &str = "Trains";
pub const TRAIN_TAG_MIN_RANK: u32 = 40;
