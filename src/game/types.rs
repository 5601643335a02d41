use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Deserialize};

/// Chat-platform user id of a player.
pub type UserId = u64;

/// Id of a show in the external media catalog.
pub type ShowId = u64;

/// Board position, 1-based over the full board (river ring included).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn manhattan(&self, other: Coord) -> i32 {
        (self.row - other.row).abs() + (self.col - other.col).abs()
    }

    /// The four orthogonal neighbours (may be off the board).
    pub fn neighbors(&self) -> [Coord; 4] {
        [
            Coord::new(self.row, self.col + 1),
            Coord::new(self.row, self.col - 1),
            Coord::new(self.row + 1, self.col),
            Coord::new(self.row - 1, self.col),
        ]
    }
}

impl From<(i32, i32)> for Coord {
    fn from((row, col): (i32, i32)) -> Self {
        Coord { row, col }
    }
}

impl From<Coord> for (i32, i32) {
    fn from(c: Coord) -> Self {
        (c.row, c.col)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    City,
    Prison,
    Gems,
    Shop,
    Wheat,
    Wood,
    House,
}

impl Resource {
    pub const ALL: [Resource; 7] = [
        Resource::City,
        Resource::Prison,
        Resource::Gems,
        Resource::Shop,
        Resource::Wheat,
        Resource::Wood,
        Resource::House,
    ];

    /// Tiles where a player may buy one item.
    pub fn allows_purchase(&self) -> bool {
        matches!(self, Resource::Shop | Resource::City)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    River,
}

/// Genre labels used for the 16 board zones.
pub const GENRES: [&str; 16] = [
    "Action",
    "Adventure",
    "Drama",
    "Ecchi",
    "Fantasy",
    "Horror",
    "Mecha",
    "Music",
    "Mystery",
    "Psychological",
    "Romance",
    "Sci-Fi",
    "Slice of Life",
    "Sports",
    "Supernatural",
    "Thriller",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Item {
    Telescope,
    Gun,
    Bucket,
    #[serde(rename = "Pontoon Bridge")]
    PontoonBridge,
    Axe,
    Coin,
    MagLev,
}

impl Item {
    pub const ALL: [Item; 7] = [
        Item::Telescope,
        Item::Gun,
        Item::Bucket,
        Item::PontoonBridge,
        Item::Axe,
        Item::Coin,
        Item::MagLev,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Item::Telescope => "Telescope",
            Item::Gun => "Gun",
            Item::Bucket => "Bucket",
            Item::PontoonBridge => "Pontoon Bridge",
            Item::Axe => "Axe",
            Item::Coin => "Coin",
            Item::MagLev => "MagLev",
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Item {
    type Err = String;

    /// Case-insensitive, ignores spaces ("pontoon bridge", "PontoonBridge").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s.chars().filter(|c| !c.is_whitespace()).collect::<String>().to_lowercase();
        Item::ALL
            .iter()
            .find(|item| item.name().replace(' ', "").to_lowercase() == wanted)
            .copied()
            .ok_or_else(|| s.to_string())
    }
}

/// One rail placed by a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub row: i32,
    pub col: i32,
    pub show_id: ShowId,
    pub info: String,
    /// Unix milliseconds.
    pub time: u64,
    /// Rails charged when the shot was committed.
    #[serde(default)]
    pub cost: f64,
    /// A Pontoon Bridge use was consumed by this shot.
    #[serde(default)]
    pub bridged: bool,
    /// Show info of the bridge stack, kept to restore it on undo.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub bridge_info: String,
}

impl Shot {
    pub fn new(row: i32, col: i32, show_id: ShowId, info: impl Into<String>, time: u64) -> Self {
        Self { row, col, show_id, info: info.into(), time, cost: 0.0, bridged: false, bridge_info: String::new() }
    }

    pub fn coords(&self) -> Coord {
        Coord::new(self.row, self.col)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowTag {
    pub name: String,
    pub rank: u32,
}

/// Metadata about a show, as returned by the media lookup service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShowInfo {
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub episodes: Option<u32>,
    #[serde(default)]
    pub tags: Vec<ShowTag>,
}

impl ShowInfo {
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g == genre)
    }
}

/// One entry of a user's watchlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchEntry {
    pub media_id: ShowId,
    pub status: String,
    pub progress: i64,
}

/// A user's watchlist at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistSnapshot {
    #[serde(default)]
    pub entries: Vec<WatchEntry>,
    #[serde(default)]
    pub least_watched_genre: Option<String>,
}

impl WatchlistSnapshot {
    pub fn contains(&self, media_id: ShowId) -> bool {
        self.entries.iter().any(|e| e.media_id == media_id)
    }
}

/// Current unix time in milliseconds.
pub fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
