//! Persistence codec.
//!
//! One directory per game holds a JSON snapshot (`gamedata.json`) and the rendered
//! board images. Board tiles are keyed by `"(row, col)"` strings on disk; the
//! conversion happens only in [`board_keys`].

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::game::error::SnapshotError;
use crate::game::grid::{Board, Tile};
use crate::game::state::Game;
use crate::game::types::{Coord, UserId};

pub const SNAPSHOT_FILE: &str = "gamedata.json";
const GUILDS_DIR: &str = "Guilds";
const GAMES_DIR: &str = "Trains";

/// Serde adapter for `Game::board`: a map from `"(row, col)"` to tile.
pub mod board_keys {
    use serde::ser::SerializeMap;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::*;

    pub fn serialize<S: Serializer>(board: &Board, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(board.width() * board.height()))?;
        for (c, tile) in board.iter() {
            map.serialize_entry(&c.to_string(), tile)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Board, D::Error> {
        let raw = BTreeMap::<String, Tile>::deserialize(deserializer)?;
        board_from_keys(raw).map_err(serde::de::Error::custom)
    }
}

/// Parse a `"(row, col)"` board key.
pub fn parse_key(key: &str) -> Result<Coord, SnapshotError> {
    let bad = || SnapshotError::BadKey(key.to_string());
    let inner = key.trim().strip_prefix('(').and_then(|k| k.strip_suffix(')')).ok_or_else(bad)?;
    let (row, col) = inner.split_once(',').ok_or_else(bad)?;
    let row = row.trim().parse().map_err(|_| bad())?;
    let col = col.trim().parse().map_err(|_| bad())?;
    Ok(Coord::new(row, col))
}

/// Rebuild a board from keyed tiles. Every position of the rectangle spanned by
/// the keys must be present exactly once, starting at `(1, 1)`.
pub fn board_from_keys(raw: impl IntoIterator<Item = (String, Tile)>) -> Result<Board, SnapshotError> {
    let mut tiles = BTreeMap::new();
    for (key, tile) in raw {
        let c = parse_key(&key)?;
        if c.row < 1 || c.col < 1 {
            return Err(SnapshotError::NotRectangular(format!("tile {c} is before (1, 1)")));
        }
        if tiles.insert(c, tile).is_some() {
            return Err(SnapshotError::NotRectangular(format!("tile {c} appears twice")));
        }
    }
    let height = tiles.keys().map(|c| c.row).max().unwrap_or(0) as usize;
    let width = tiles.keys().map(|c| c.col).max().unwrap_or(0) as usize;
    if tiles.is_empty() || tiles.len() != width * height {
        return Err(SnapshotError::NotRectangular(format!("{} tiles for a {width}x{height} board", tiles.len())));
    }
    // BTreeMap order over Coord is row-major
    Board::from_tiles(width, height, tiles.into_values().collect())
        .ok_or_else(|| SnapshotError::NotRectangular(format!("{width}x{height}")))
}

/// `<data>/Guilds/<guild>/Trains/<url-encoded name>`
pub fn game_dir(data_dir: &Path, guild_id: u64, name: &str) -> PathBuf {
    guild_games_dir(data_dir, guild_id).join(urlencoding::encode(name).as_ref())
}

fn guild_games_dir(data_dir: &Path, guild_id: u64) -> PathBuf {
    data_dir.join(GUILDS_DIR).join(guild_id.to_string()).join(GAMES_DIR)
}

/// Rendered board images stored next to the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardImage {
    /// One player's fogged view.
    Player(UserId),
    /// The full board, written once the game is complete.
    Master,
}

impl BoardImage {
    pub fn file_name(&self) -> String {
        match self {
            BoardImage::Player(id) => format!("{id}.png"),
            BoardImage::Master => "MASTER.png".to_string(),
        }
    }

    pub fn path(&self, game_dir: &Path) -> PathBuf {
        game_dir.join(self.file_name())
    }
}

/// Write the snapshot atomically: a temp file in the same directory, then a rename.
pub fn save_game(dir: &Path, game: &Game) -> Result<PathBuf, SnapshotError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(SNAPSHOT_FILE);
    let tmp = dir.join(format!("{SNAPSHOT_FILE}.tmp"));
    let json = serde_json::to_vec_pretty(game)?;
    fs::write(&tmp, json)?;
    fs::rename(&tmp, &path)?;
    debug!("[Persistence] Saved '{}' to {}", game.name, path.display());
    Ok(path)
}

pub fn load_game(dir: &Path) -> Result<Game, SnapshotError> {
    let bytes = fs::read(dir.join(SNAPSHOT_FILE))?;
    let game: Game = serde_json::from_slice(&bytes)?;
    check_players(&game)?;
    Ok(game)
}

/// Every stored player coordinate must lie on the stored board.
fn check_players(game: &Game) -> Result<(), SnapshotError> {
    for player in &game.players {
        let coords = [player.start, player.end].into_iter().chain(player.shots.iter().map(|s| s.coords()));
        for c in coords {
            if !game.board.in_bounds(c) {
                return Err(SnapshotError::PlayerOutOfBounds { tag: player.tag.clone(), coord: c.to_string() });
            }
        }
    }
    Ok(())
}

/// Remove a game directory with its snapshot and images.
pub fn delete_game(dir: &Path) -> Result<(), SnapshotError> {
    match fs::remove_dir_all(dir) {
        Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
        _ => Ok(()),
    }
}

/// A snapshot found on disk and the directory it lives in.
#[derive(Debug)]
pub struct StoredGame {
    pub guild_id: u64,
    pub dir: PathBuf,
    pub game: Game,
}

/// Load the active game of every guild under `data_dir`.
///
/// Corrupted snapshots are logged and skipped. When a guild somehow has several
/// active games, the most recently created one wins.
pub fn restore_active(data_dir: &Path) -> Vec<StoredGame> {
    let mut restored: BTreeMap<u64, StoredGame> = BTreeMap::new();
    let Ok(guilds) = fs::read_dir(data_dir.join(GUILDS_DIR)) else {
        return Vec::new();
    };
    for guild in guilds.flatten() {
        let Some(guild_id) = guild.file_name().to_str().and_then(|n| n.parse::<u64>().ok()) else {
            continue;
        };
        let Ok(games) = fs::read_dir(guild_games_dir(data_dir, guild_id)) else {
            continue;
        };
        for entry in games.flatten() {
            let dir = entry.path();
            if !dir.join(SNAPSHOT_FILE).is_file() {
                continue;
            }
            match load_game(&dir) {
                Ok(game) if game.active => {
                    if let Some(prev) = restored.get(&guild_id) {
                        warn!("[Persistence] Guild {guild_id} has several active games, keeping the newest");
                        if prev.game.date > game.date {
                            continue;
                        }
                    }
                    restored.insert(guild_id, StoredGame { guild_id, dir, game });
                }
                Ok(_) => {}
                Err(e) => warn!("[Persistence] Skipping corrupted snapshot {}: {e}", dir.display()),
            }
        }
    }
    restored.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::grid::BoardConfig;
    use crate::game::state::PlayerSeed;
    use crate::game::types::{Shot, ShowInfo, WatchlistSnapshot};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use uuid::Uuid;

    fn temp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("rail-grid-{}", Uuid::new_v4()))
    }

    fn game(name: &str) -> Game {
        let mut rng = StdRng::seed_from_u64(3);
        let seeds = vec![
            PlayerSeed { user_id: 10, tag: "A".to_string(), watchlist: WatchlistSnapshot::default() },
            PlayerSeed { user_id: 20, tag: "B".to_string(), watchlist: WatchlistSnapshot::default() },
        ];
        let config = BoardConfig { interior_width: 8, interior_height: 8, river_ring: 1 };
        let mut game = Game::new(name, seeds, &config, &mut rng).unwrap();
        let start = game.players[0].start;
        let show = ShowInfo { genres: vec!["Drama".to_string()], ..Default::default() };
        game.apply_shot(10, Shot::new(start.row, start.col, 7, "ep 1-3", 1), Some(show)).unwrap();
        game
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let dir = temp_dir();
        let original = game("Night Line");
        save_game(&dir, &original).unwrap();
        let loaded = load_game(&dir).unwrap();
        assert_eq!(loaded, original);
        assert!(!dir.join(format!("{SNAPSHOT_FILE}.tmp")).exists());
        delete_game(&dir).unwrap();
        assert!(!dir.exists());
    }

    #[test]
    fn test_board_keys_are_parenthesized() {
        let json = serde_json::to_value(game("keys")).unwrap();
        let board = json["board"].as_object().unwrap();
        assert_eq!(board.len(), 100);
        assert!(board.contains_key("(1, 1)"));
        assert!(board.contains_key("(10, 10)"));
        for field in ["name", "date", "players", "shop", "known_shows", "active"] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
    }

    #[test]
    fn test_parse_key() {
        assert_eq!(parse_key("(3, 12)").unwrap(), Coord::new(3, 12));
        assert_eq!(parse_key("(3,12)").unwrap(), Coord::new(3, 12));
        assert!(matches!(parse_key("3, 12"), Err(SnapshotError::BadKey(_))));
        assert!(matches!(parse_key("(a, 1)"), Err(SnapshotError::BadKey(_))));
    }

    #[test]
    fn test_rejects_holes_in_board() {
        let mut raw: Vec<(String, Tile)> = (1..=2)
            .flat_map(|r| (1..=2).map(move |c| (Coord::new(r, c).to_string(), Tile::default())))
            .collect();
        assert!(board_from_keys(raw.clone()).is_ok());
        raw.remove(1);
        assert!(matches!(board_from_keys(raw), Err(SnapshotError::NotRectangular(_))));
    }

    #[test]
    fn test_corrupted_snapshot_is_an_error() {
        let dir = temp_dir();
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(SNAPSHOT_FILE), b"{\"name\": \"half").unwrap();
        assert!(matches!(load_game(&dir), Err(SnapshotError::Json(_))));
        assert!(matches!(load_game(&temp_dir()), Err(SnapshotError::Io(_))));
        delete_game(&dir).unwrap();
    }

    #[test]
    fn test_player_outside_board_is_rejected() {
        let dir = temp_dir();
        let mut bad = game("bad");
        bad.players[1].end = Coord::new(40, 40);
        save_game(&dir, &bad).unwrap();
        assert!(matches!(load_game(&dir), Err(SnapshotError::PlayerOutOfBounds { .. })));
        delete_game(&dir).unwrap();
    }

    #[test]
    fn test_restore_skips_corrupted_and_finished_games() {
        let data = temp_dir();
        let active = game("running");
        save_game(&game_dir(&data, 1, "running"), &active).unwrap();

        let mut finished = game("finished");
        finished.active = false;
        save_game(&game_dir(&data, 2, "finished"), &finished).unwrap();

        let broken = game_dir(&data, 3, "broken");
        fs::create_dir_all(&broken).unwrap();
        fs::write(broken.join(SNAPSHOT_FILE), b"not json").unwrap();

        let restored = restore_active(&data);
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].guild_id, 1);
        assert_eq!(restored[0].dir, game_dir(&data, 1, "running"));
        assert_eq!(restored[0].game, active);
        delete_game(&data).unwrap();
    }

    #[test]
    fn test_layout_names() {
        let dir = game_dir(Path::new("/data"), 42, "Night Line");
        assert_eq!(dir, Path::new("/data/Guilds/42/Trains/Night%20Line"));
        assert_eq!(BoardImage::Player(7).path(&dir), dir.join("7.png"));
        assert_eq!(BoardImage::Master.file_name(), "MASTER.png");
    }
}
