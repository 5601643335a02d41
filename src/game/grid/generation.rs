//! Randomized board generation.
//!
//! A board is built in passes: the river ring, an optional meandering river,
//! count-constrained resources, scattered resources, then the 16 genre zones.
//! Generation is intentionally not reproducible in production (`rand::rng()`);
//! every pass takes the RNG as a parameter so tests can seed it.

use log::{debug, warn};
use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::{Serialize, Deserialize};

use crate::config::game::{
    CITY_COUNT, DEFAULT_INTERIOR_HEIGHT, DEFAULT_INTERIOR_WIDTH, DEFAULT_RIVER_RING, GEM_COUNT,
    HOUSE_CHANCE, LOCATION_ATTEMPTS, MAX_INTERIOR_SIDE, MAX_RIVER_RING, PLACEMENT_ATTEMPTS_BEFORE_RELAX,
    PRISON_COUNT, RIVER_AVG_WIDTH, RIVER_BASE_CHANCE, RIVER_CHANCE, RIVER_DENSITY, SHOP_COUNT, WHEAT_CHANCE,
    WOOD_CHANCE, ZONE_COUNT,
};
use crate::game::error::BoardGenerationError;
use crate::game::grid::board::Board;
use crate::game::types::{Coord, Resource, Terrain, GENRES};

/// Board dimensions for a new game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub interior_width: usize,
    pub interior_height: usize,
    pub river_ring: usize,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            interior_width: DEFAULT_INTERIOR_WIDTH,
            interior_height: DEFAULT_INTERIOR_HEIGHT,
            river_ring: DEFAULT_RIVER_RING,
        }
    }
}

impl BoardConfig {
    /// Full width including the ring, `None` on overflow.
    pub fn total_width(&self) -> Option<usize> {
        self.river_ring.checked_mul(2)?.checked_add(self.interior_width)
    }

    pub fn total_height(&self) -> Option<usize> {
        self.river_ring.checked_mul(2)?.checked_add(self.interior_height)
    }

    fn too_large(&self) -> BoardGenerationError {
        BoardGenerationError::TooLarge {
            width: self.interior_width,
            height: self.interior_height,
            ring: self.river_ring,
        }
    }

    /// First and last interior row.
    pub fn interior_rows(&self) -> (i32, i32) {
        let ring = self.river_ring as i32;
        (ring + 1, ring + self.interior_height as i32)
    }

    /// First and last interior column.
    pub fn interior_cols(&self) -> (i32, i32) {
        let ring = self.river_ring as i32;
        (ring + 1, ring + self.interior_width as i32)
    }

    pub fn check(&self) -> Result<(), BoardGenerationError> {
        let (width, height) = (self.interior_width, self.interior_height);
        if width % 4 != 0 || height % 4 != 0 {
            return Err(BoardGenerationError::NotDivisibleByFour { width, height });
        }
        if width == 0 || height == 0 {
            return Err(BoardGenerationError::TooSmall { width, height });
        }
        if width > MAX_INTERIOR_SIDE || height > MAX_INTERIOR_SIDE || self.river_ring > MAX_RIVER_RING {
            return Err(self.too_large());
        }
        Ok(())
    }
}

/// Overall heading of a meandering river.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiverDirection {
    Right,
    Down,
    DownRight,
    UpRight,
}

impl RiverDirection {
    pub const ALL: [RiverDirection; 4] = [
        RiverDirection::Right,
        RiverDirection::Down,
        RiverDirection::DownRight,
        RiverDirection::UpRight,
    ];

    /// Whether the river advances column by column (otherwise row by row).
    fn along_cols(&self) -> bool {
        !matches!(self, RiverDirection::Down)
    }

    /// Range the centerline drifts by at each step.
    fn drift(&self) -> (i32, i32) {
        match self {
            RiverDirection::Right | RiverDirection::Down => (-1, 1),
            RiverDirection::DownRight => (0, 2),
            RiverDirection::UpRight => (-2, 0),
        }
    }

    /// Start window as fractions of (height, width): (row_lo, row_hi, col_lo, col_hi).
    fn start_window(&self) -> (f64, f64, f64, f64) {
        match self {
            RiverDirection::Right => (0.25, 0.75, 0.0, 0.25),
            RiverDirection::Down => (0.0, 0.25, 0.25, 0.75),
            RiverDirection::DownRight => (0.0, 0.25, 0.0, 0.25),
            RiverDirection::UpRight => (0.75, 1.0, 0.0, 0.25),
        }
    }
}

/// Generate a complete board: river ring, optional river, resources and genre zones.
pub fn generate_board<R: Rng + ?Sized>(config: &BoardConfig, rng: &mut R) -> Result<Board, BoardGenerationError> {
    config.check()?;

    let mut board = ringed_board(config)?;

    if rng.random_range(1..=1000) <= RIVER_CHANCE {
        let direction = *RiverDirection::ALL.choose(rng).unwrap_or(&RiverDirection::Right);
        let carved = carve_river(&mut board, direction, rng);
        debug!("[BoardGen] River {:?} carved {} tiles", direction, carved);
    }

    for (resource, (count, spread)) in [
        (Resource::City, CITY_COUNT),
        (Resource::Prison, PRISON_COUNT),
        (Resource::Gems, GEM_COUNT),
        (Resource::Shop, SHOP_COUNT),
    ] {
        let placed = place_count_resource(&mut board, resource, count, spread, rng);
        if placed < count {
            warn!("[BoardGen] Placed only {}/{} {:?} tiles", placed, count, resource);
        }
    }

    scatter_resources(&mut board, rng);
    assign_zones(&mut board, config, rng)?;
    Ok(board)
}

/// An empty board whose outer `river_ring` rows and columns are river.
pub fn ringed_board(config: &BoardConfig) -> Result<Board, BoardGenerationError> {
    let (width, height) = match (config.total_width(), config.total_height()) {
        (Some(w), Some(h)) if w.max(h) <= MAX_INTERIOR_SIDE + 2 * MAX_RIVER_RING => (w, h),
        _ => return Err(config.too_large()),
    };
    let mut board = Board::new(width, height);
    let (top, bottom) = config.interior_rows();
    let (left, right) = config.interior_cols();
    for c in board.coords() {
        let interior = c.row >= top && c.row <= bottom && c.col >= left && c.col <= right;
        if !interior {
            if let Some(tile) = board.get_mut(c) {
                tile.terrain = Some(Terrain::River);
            }
        }
    }
    Ok(board)
}

fn fraction_range(size: usize, lo: f64, hi: f64) -> (i32, i32) {
    let lo = ((size as f64 * lo).round() as i32).max(1);
    let hi = ((size as f64 * hi).round() as i32).max(lo);
    (lo, hi)
}

/// Carve a randomized river heading in `direction`. Returns the number of tiles marked.
///
/// The centerline drifts by a bounded random step per column (or row); tiles across
/// the river's width become river with a chance that decays with distance from it.
pub fn carve_river<R: Rng + ?Sized>(board: &mut Board, direction: RiverDirection, rng: &mut R) -> usize {
    let (width, height) = (board.width() as i32, board.height() as i32);
    let (row_lo, row_hi, col_lo, col_hi) = direction.start_window();
    let rows = fraction_range(height as usize, row_lo, row_hi);
    let cols = fraction_range(width as usize, col_lo, col_hi);
    let start = Coord::new(rng.random_range(rows.0..=rows.1), rng.random_range(cols.0..=cols.1));
    let (drift_lo, drift_hi) = direction.drift();

    let mut river = vec![start];
    // Centerline runs across rows when flowing along columns, and vice versa.
    let (mut center, first, last, across) = if direction.along_cols() {
        (start.row, start.col + 1, width, height)
    } else {
        (start.col, start.row + 1, height, width)
    };

    for step in first..=last {
        if !rng.random_bool(RIVER_BASE_CHANCE) {
            break;
        }
        center += rng.random_range(drift_lo..=drift_hi);
        for offset in 1..=across {
            let diff = (offset - center).abs() as f64;
            let chance = RIVER_BASE_CHANCE - 0.25 / RIVER_AVG_WIDTH * diff.powf(RIVER_DENSITY);
            if chance > 0.0 && rng.random::<f64>() < chance {
                river.push(if direction.along_cols() {
                    Coord::new(offset, step)
                } else {
                    Coord::new(step, offset)
                });
            }
        }
    }

    let mut carved = 0;
    for c in river {
        if let Some(tile) = board.get_mut(c) {
            tile.terrain = Some(Terrain::River);
            carved += 1;
        }
    }
    carved
}

/// Place up to `count` tiles of `resource` on bare tiles, at least `min_spread`
/// apart from each other.
///
/// Rejection sampling: after `PLACEMENT_ATTEMPTS_BEFORE_RELAX` consecutive misses the
/// spacing drops by one, and placement gives up once it reaches zero. This trades
/// placement quality for guaranteed termination; the result is best effort and the
/// number actually placed is returned.
pub fn place_count_resource<R: Rng + ?Sized>(
    board: &mut Board,
    resource: Resource,
    count: usize,
    min_spread: i32,
    rng: &mut R,
) -> usize {
    let (width, height) = (board.width() as i32, board.height() as i32);
    if width == 0 || height == 0 {
        return 0;
    }
    let mut spread = min_spread;
    let mut placed = 0;
    let mut attempts = 0;

    while placed < count {
        attempts += 1;
        let c = Coord::new(rng.random_range(1..=height), rng.random_range(1..=width));
        let free = board.get(c).is_some_and(|t| t.is_bare()) && !board.near_resource(c, resource, spread);
        if free {
            if let Some(tile) = board.get_mut(c) {
                tile.resource = Some(resource);
            }
            placed += 1;
            attempts = 0;
        }
        if attempts > PLACEMENT_ATTEMPTS_BEFORE_RELAX {
            spread -= 1;
            attempts = 0;
        }
        if spread <= 0 {
            break;
        }
    }
    placed
}

fn roll<R: Rng + ?Sized>(rng: &mut R, chance: u32) -> bool {
    rng.random_range(1..=1000) <= chance
}

/// Give each bare tile a chance of wheat, wood or a house. Tiles close to the same
/// resource roll with the higher "near" chance, so resources cluster.
pub fn scatter_resources<R: Rng + ?Sized>(board: &mut Board, rng: &mut R) {
    let coords: Vec<Coord> = board.coords().collect();
    for c in coords {
        if !board.get(c).is_some_and(|t| t.is_bare()) {
            continue;
        }
        let resource = scatter_tile(board, c, rng);
        if let Some(tile) = board.get_mut(c) {
            tile.resource = resource;
        }
    }
}

fn scatter_tile<R: Rng + ?Sized>(board: &Board, c: Coord, rng: &mut R) -> Option<Resource> {
    let (far, near, radius) = WHEAT_CHANCE;
    let chance = if board.near_resource(c, Resource::Wheat, radius) { near } else { far };
    if roll(rng, chance) {
        return Some(Resource::Wheat);
    }

    let (far, near, radius) = WOOD_CHANCE;
    let chance = if board.near_resource(c, Resource::Wood, radius) { near } else { far };
    if roll(rng, chance) {
        return Some(Resource::Wood);
    }

    // Houses only cluster with directly adjacent houses.
    let (far, near, _) = HOUSE_CHANCE;
    let chance = if board.next_to_resource(c, Resource::House) { near } else { far };
    if roll(rng, chance) {
        return Some(Resource::House);
    }
    None
}

/// Split the interior into 16 equal rectangles and give each a genre, in random order.
pub fn assign_zones<R: Rng + ?Sized>(
    board: &mut Board,
    config: &BoardConfig,
    rng: &mut R,
) -> Result<(), BoardGenerationError> {
    config.check()?;

    let zone_width = (config.interior_width / 4) as i32;
    let zone_height = (config.interior_height / 4) as i32;
    let ring = config.river_ring as i32;
    let mut order = GENRES.to_vec();
    order.shuffle(rng);

    for (i, genre) in order.iter().take(ZONE_COUNT).enumerate() {
        let top = zone_height * (i as i32 / 4) + ring + 1;
        let left = zone_width * (i as i32 % 4) + ring + 1;
        for row in top..top + zone_height {
            for col in left..left + zone_width {
                if let Some(tile) = board.get_mut(Coord::new(row, col)) {
                    tile.zone = Some(genre.to_string());
                }
            }
        }
    }
    Ok(())
}

/// Pick a start and end station for one player.
///
/// A coin flip decides between a left-to-right and a top-to-bottom track. Both
/// stations must be bare and not already taken.
pub fn place_stations<R: Rng + ?Sized>(
    board: &Board,
    config: &BoardConfig,
    taken: &[Coord],
    tag: &str,
    rng: &mut R,
) -> Result<(Coord, Coord), BoardGenerationError> {
    let (top, bottom) = config.interior_rows();
    let (left, right) = config.interior_cols();
    let horizontal = rng.random_bool(0.5);

    let mut pick = |what: &'static str, taken: &[Coord]| {
        for _ in 0..=LOCATION_ATTEMPTS {
            let c = match (horizontal, what) {
                (true, "start") => Coord::new(rng.random_range(top..=bottom), left),
                (true, _) => Coord::new(rng.random_range(top..=bottom), right),
                (false, "start") => Coord::new(top, rng.random_range(left..=right)),
                (false, _) => Coord::new(bottom, rng.random_range(left..=right)),
            };
            if board.get(c).is_some_and(|t| t.is_bare()) && !taken.contains(&c) {
                return Ok(c);
            }
        }
        Err(BoardGenerationError::NoRoomForPlayer { tag: tag.to_string(), what })
    };

    let start = pick("start", taken)?;
    let mut with_start = taken.to_vec();
    with_start.push(start);
    let end = pick("end", &with_start)?;
    Ok((start, end))
}
