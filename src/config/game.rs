/// Game configuration constants.
/// 
/// This module defines board generation parameters (sizes, resource counts,
/// scatter chances, river shape) and per-player gameplay parameters.
pub const DEFAULT_INTERIOR_WIDTH: usize = 16; // Playable columns, excluding the river ring.

/// Playable rows, excluding the river ring.
pub const DEFAULT_INTERIOR_HEIGHT: usize = 16;

/// Thickness of the river border around the playable area.
pub const DEFAULT_RIVER_RING: usize = 1;

/// Largest accepted interior width or height, and river ring thickness.
pub const MAX_INTERIOR_SIDE: usize = 64;
pub const MAX_RIVER_RING: usize = 4;

/// Number of genre zones the interior is split into (4 x 4).
pub const ZONE_COUNT: usize = 16;

/// Chance (out of 1000) that a meandering river crosses the board.
pub const RIVER_CHANCE: u32 = 900;

/// Chance that the river keeps flowing into the next column/row, and the
/// density of its centerline.
pub const RIVER_BASE_CHANCE: f64 = 0.9;

/// Average river width.
pub const RIVER_AVG_WIDTH: f64 = 1.5;

/// River cohesion. Higher density keeps the river closer to its centerline.
pub const RIVER_DENSITY: f64 = 2.2;

/// Count-based resources: (count, minimum spacing from the same resource).
pub const CITY_COUNT: (usize, i32) = (4, 4);
pub const PRISON_COUNT: (usize, i32) = (2, 6);
pub const GEM_COUNT: (usize, i32) = (2, 8);
pub const SHOP_COUNT: (usize, i32) = (4, 8);

/// Consecutive failed placements before the spacing requirement is relaxed by one.
pub const PLACEMENT_ATTEMPTS_BEFORE_RELAX: u32 = 15;

/// Scatter resources: (chance out of 1000 far from the same resource,
/// chance out of 1000 near it, neighbourhood radius).
pub const WHEAT_CHANCE: (u32, u32, i32) = (100, 150, 3);
pub const WOOD_CHANCE: (u32, u32, i32) = (130, 180, 2);
pub const HOUSE_CHANCE: (u32, u32, i32) = (70, 140, 1);

/// Attempts to find a free start or end tile for a player before giving up.
pub const LOCATION_ATTEMPTS: u32 = 40;

/// Base fog-of-war reveal radius around each rail. Telescopes add one each.
pub const RENDER_DISTANCE: i32 = 4;

/// Hours of watching per rail, and with a MagLev.
pub const HOURS_PER_RAIL: u32 = 3;
pub const MAGLEV_HOURS_PER_RAIL: u32 = 2;
