//! Game state orchestration.
//!
//! `Game` owns the board, the players, the shared shop and the show metadata cache.
//! Every mutating operation validates first and only then commits, so a rejected
//! operation leaves the game untouched.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::game::entities::{default_shop, Player};
use crate::game::error::{BoardGenerationError, GameError, ShotError};
use crate::game::grid::{generate_board, place_stations, Board, BoardConfig};
use crate::game::systems::placement::{check_shot, Placement};
use crate::game::systems::scoring::{score_players, ScoreBreakdown};
use crate::game::systems::visibility;
use crate::game::types::{now_millis, Coord, Item, Resource, Shot, ShowId, ShowInfo, Terrain, UserId,
    WatchlistSnapshot};

/// The one player who connected gems first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirstGem {
    pub tag: String,
    pub coord: Coord,
    pub time: u64,
}

/// A player joining a new game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSeed {
    pub user_id: UserId,
    pub tag: String,
    #[serde(default)]
    pub watchlist: WatchlistSnapshot,
}

/// An item use request. Only the Bucket is usable on demand; the other items act
/// passively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "lowercase")]
pub enum ItemUse {
    Bucket { target: Coord },
}

/// What a committed shot did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotReport {
    pub coord: Coord,
    pub cost: f64,
    pub bridged: bool,
    /// The player reached their end station.
    pub completed: bool,
    pub first_gem: bool,
    /// Every player is done; the game is no longer active.
    pub game_over: bool,
    /// Players who can see the new rail.
    pub viewers: Vec<UserId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResourceStat {
    pub claimed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameStats {
    pub resources: BTreeMap<Resource, ResourceStat>,
    pub railed_tiles: usize,
    pub crossings: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStats {
    pub tag: String,
    pub shots: usize,
    pub rails: f64,
    /// Share of shots whose show matched the tile's genre zone, in percent.
    pub zone_match_pct: f64,
    pub hours_per_rail: u32,
    /// Tiles the player could legally shoot next.
    pub open_moves: usize,
    pub done: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    pub name: String,
    /// Creation time, unix milliseconds.
    pub date: u64,
    pub players: Vec<Player>,
    #[serde(with = "crate::persistence::board_keys")]
    pub board: Board,
    pub shop: BTreeMap<Item, u32>,
    #[serde(default)]
    pub known_shows: BTreeMap<ShowId, ShowInfo>,
    pub active: bool,
    #[serde(default)]
    pub first_gem: Option<FirstGem>,
}

impl Game {
    /// Generate a board and seat every player on it.
    pub fn new<R: Rng + ?Sized>(
        name: impl Into<String>,
        seeds: Vec<PlayerSeed>,
        config: &BoardConfig,
        rng: &mut R,
    ) -> Result<Self, BoardGenerationError> {
        if seeds.is_empty() {
            return Err(BoardGenerationError::NoPlayers);
        }
        let mut tags = BTreeSet::new();
        let mut users = BTreeSet::new();
        for seed in &seeds {
            if seed.tag.trim().is_empty() {
                return Err(BoardGenerationError::EmptyTag);
            }
            if !users.insert(seed.user_id) {
                return Err(BoardGenerationError::DuplicatePlayer(seed.user_id));
            }
            if !tags.insert(seed.tag.as_str()) {
                return Err(BoardGenerationError::DuplicateTag(seed.tag.clone()));
            }
        }

        let board = generate_board(config, rng)?;
        let mut taken = Vec::with_capacity(seeds.len() * 2);
        let mut players = Vec::with_capacity(seeds.len());
        for seed in seeds {
            let (start, end) = place_stations(&board, config, &taken, &seed.tag, rng)?;
            taken.extend([start, end]);
            let mut player = Player::new(seed.user_id, seed.tag, start, end, seed.watchlist);
            visibility::rebuild(&board, &mut player);
            players.push(player);
        }

        let game = Game {
            id: Uuid::new_v4(),
            name: name.into(),
            date: now_millis(),
            players,
            board,
            shop: default_shop(),
            known_shows: BTreeMap::new(),
            active: true,
            first_gem: None,
        };
        info!(
            "[Game] Created '{}' ({}x{}) with {} players",
            game.name,
            game.board.width(),
            game.board.height(),
            game.players.len()
        );
        Ok(game)
    }

    pub fn player_index(&self, user_id: UserId) -> Option<usize> {
        self.players.iter().position(|p| p.user_id == user_id)
    }

    pub fn player(&self, user_id: UserId) -> Option<&Player> {
        self.players.iter().find(|p| p.user_id == user_id)
    }

    fn active_player(&self, user_id: UserId) -> Result<usize, GameError> {
        if !self.active {
            return Err(GameError::GameInactive);
        }
        self.player_index(user_id).ok_or(GameError::UnknownPlayer(user_id))
    }

    /// Run the placement rules for `user_id` without committing anything.
    pub fn check_shot(&self, user_id: UserId, target: Coord) -> Result<Placement, ShotError> {
        check_shot(&self.board, self.player(user_id), target)
    }

    pub fn is_valid_shot(&self, user_id: UserId, target: Coord) -> bool {
        self.active && self.check_shot(user_id, target).is_ok()
    }

    /// Rails charged for shooting `show` onto `target`.
    ///
    /// River tiles cost 2, or 0 when a Pontoon Bridge is spent. A show whose genre
    /// matches the tile's zone halves the cost.
    fn shot_cost(&self, player: &Player, target: Coord, show: &ShowInfo) -> (f64, bool) {
        let Some(tile) = self.board.get(target) else {
            return (1.0, false);
        };
        let (mut cost, bridged) = match (tile.is_river(), player.has_item(Item::PontoonBridge)) {
            (true, true) => (0.0, true),
            (true, false) => (2.0, false),
            (false, _) => (1.0, false),
        };
        if tile.zone.as_deref().is_some_and(|zone| show.has_genre(zone)) {
            cost *= 0.5;
        }
        (cost, bridged)
    }

    /// Validate and commit a shot.
    ///
    /// `show` is the freshly fetched metadata for `shot.show_id`; it may be `None`
    /// when the show is already cached. The cache is only written once the shot
    /// has been committed.
    pub fn apply_shot(&mut self, user_id: UserId, mut shot: Shot, show: Option<ShowInfo>) -> Result<ShotReport, GameError> {
        let idx = self.active_player(user_id)?;
        let target = shot.coords();
        let placement = check_shot(&self.board, Some(&self.players[idx]), target)?;
        let show = match self.known_shows.get(&shot.show_id) {
            Some(cached) => cached.clone(),
            None => show.ok_or(GameError::UnknownShow(shot.show_id))?,
        };
        let (cost, bridged) = self.shot_cost(&self.players[idx], target, &show);

        if !self.board.add_rail(target, &self.players[idx].tag) {
            return Err(ShotError::TileFull(target).into());
        }
        let gem_tile = self.board.get(target).is_some_and(|t| t.resource == Some(Resource::Gems));
        let player = &mut self.players[idx];
        if bridged {
            shot.bridge_info = player.inventory.get(&Item::PontoonBridge).map(|s| s.show_info.clone()).unwrap_or_default();
            player.consume_item(Item::PontoonBridge);
        }
        shot.cost = cost;
        shot.bridged = bridged;
        player.rails += cost;
        let completed = placement == Placement::Complete;
        if completed {
            player.done = true;
            player.done_at = Some(shot.time);
        }
        let radius = player.reveal_radius();
        let time = shot.time;
        let show_id = shot.show_id;
        player.shots.push(shot);
        visibility::reveal(&self.board, player, target, radius);

        let first_gem = gem_tile && self.first_gem.is_none();
        if first_gem {
            self.first_gem = Some(FirstGem { tag: self.players[idx].tag.clone(), coord: target, time });
            info!("[Game] {} connected gems first", self.players[idx].tag);
        }
        self.known_shows.entry(show_id).or_insert(show);

        let game_over = self.is_done();
        if game_over {
            self.active = false;
            info!("[Game] Every player reached their station in '{}'", self.name);
        }
        debug!("[Game] {} railed {} for {}", self.players[idx].tag, target, cost);

        Ok(ShotReport { coord: target, cost, bridged, completed, first_gem, game_over, viewers: self.viewers(target) })
    }

    /// Remove the player's most recent shot, restoring rails, items, the done flag,
    /// the first gem claim and visibility to what they were before it.
    pub fn undo_shot(&mut self, user_id: UserId) -> Result<Shot, GameError> {
        let idx = self.active_player(user_id)?;
        let player = &self.players[idx];
        let last = player.shots.last().ok_or(GameError::NothingToUndo)?;
        let coord = last.coords();
        if player.shops_used.contains(&coord) {
            return Err(GameError::AnchoredByPurchase(coord));
        }

        let player = &mut self.players[idx];
        let Some(shot) = player.shots.pop() else {
            return Err(GameError::NothingToUndo);
        };
        self.board.remove_rail(coord, &player.tag);
        player.rails -= shot.cost;
        // no -0.0 in snapshots
        if player.rails == 0.0 {
            player.rails = 0.0;
        }
        if shot.bridged {
            player.refund_item(Item::PontoonBridge, &shot.bridge_info);
        }
        player.done = false;
        player.done_at = None;
        visibility::rebuild(&self.board, player);

        if self.first_gem.as_ref().is_some_and(|g| g.tag == self.players[idx].tag && g.coord == coord) {
            self.first_gem = self.earliest_gem();
        }
        debug!("[Game] {} took back {}", self.players[idx].tag, coord);
        Ok(shot)
    }

    /// Earliest committed shot on a gem tile, ties going to the first seated player.
    fn earliest_gem(&self) -> Option<FirstGem> {
        self.players
            .iter()
            .flat_map(|p| p.shots.iter().map(move |s| (p, s)))
            .filter(|(_, s)| self.board.get(s.coords()).is_some_and(|t| t.resource == Some(Resource::Gems)))
            .min_by_key(|(_, s)| s.time)
            .map(|(p, s)| FirstGem { tag: p.tag.clone(), coord: s.coords(), time: s.time })
    }

    /// Buy one unit of `item_name` from the shop or city tile the player's track
    /// currently ends on. Each tile serves a player once.
    pub fn buy_item(&mut self, user_id: UserId, item_name: &str, show_info: &str) -> Result<Item, GameError> {
        let idx = self.active_player(user_id)?;
        let item: Item = item_name.parse().map_err(GameError::UnknownItem)?;
        let player = &self.players[idx];
        let head = player.head().ok_or(GameError::NoRailsPlaced)?;
        let sells = self.board.get(head).and_then(|t| t.resource).is_some_and(|r| r.allows_purchase());
        if !sells {
            return Err(GameError::NotOnShop);
        }
        if player.shops_used.contains(&head) {
            return Err(GameError::ShopAlreadyUsed(head));
        }
        let stock = self.shop.get_mut(&item).filter(|s| **s > 0).ok_or(GameError::OutOfStock(item))?;
        *stock -= 1;

        let player = &mut self.players[idx];
        player.add_item(item, show_info);
        player.shops_used.insert(head);
        if item == Item::Telescope {
            visibility::rebuild(&self.board, player);
        }
        debug!("[Game] {} bought a {} at {}", player.tag, item, head);
        Ok(item)
    }

    pub fn use_item(&mut self, user_id: UserId, action: ItemUse) -> Result<(), GameError> {
        let idx = self.active_player(user_id)?;
        match action {
            ItemUse::Bucket { target } => {
                if !self.board.in_bounds(target) {
                    return Err(GameError::OutOfBounds(target));
                }
                if !self.players[idx].has_item(Item::Bucket) {
                    return Err(GameError::ItemNotOwned(Item::Bucket));
                }
                if let Some(tile) = self.board.get_mut(target) {
                    tile.terrain = Some(Terrain::River);
                }
                self.players[idx].consume_item(Item::Bucket);
                debug!("[Game] {} flooded {}", self.players[idx].tag, target);
            }
        }
        Ok(())
    }

    /// Every player reached their end station.
    pub fn is_done(&self) -> bool {
        self.players.iter().all(|p| p.done)
    }

    /// Score the game and close it.
    ///
    /// `end_watchlists` holds freshly fetched watchlists; players missing from it
    /// keep any snapshot stored by an earlier call.
    pub fn calculate_scores(&mut self, end_watchlists: BTreeMap<UserId, WatchlistSnapshot>, now: u64) -> Vec<ScoreBreakdown> {
        let mut end_watchlists = end_watchlists;
        for player in &mut self.players {
            if let Some(snapshot) = end_watchlists.remove(&player.user_id) {
                player.ending_watchlist = Some(snapshot);
            }
        }
        let scores = score_players(self, now);
        for (player, score) in self.players.iter_mut().zip(&scores) {
            player.score = score.clone();
        }
        self.active = false;
        info!("[Game] Scored '{}'", self.name);
        scores
    }

    /// Players whose fog of war includes `coord`.
    pub fn viewers(&self, coord: Coord) -> Vec<UserId> {
        self.players.iter().filter(|p| p.vis_tiles.contains(&coord)).map(|p| p.user_id).collect()
    }

    pub fn stats(&self) -> GameStats {
        let mut resources: BTreeMap<Resource, ResourceStat> =
            Resource::ALL.iter().map(|r| (*r, ResourceStat { claimed: 0, total: 0 })).collect();
        let mut railed_tiles = 0;
        let mut crossings = 0;
        for (_, tile) in self.board.iter() {
            if !tile.rails.is_empty() {
                railed_tiles += 1;
            }
            if tile.rails.len() > 1 {
                crossings += 1;
            }
            if let Some(stat) = tile.resource.and_then(|r| resources.get_mut(&r)) {
                stat.total += 1;
                if !tile.rails.is_empty() {
                    stat.claimed += 1;
                }
            }
        }
        GameStats { resources, railed_tiles, crossings }
    }

    pub fn player_stats(&self, idx: usize) -> Option<PlayerStats> {
        let player = self.players.get(idx)?;
        let matched = player
            .shots
            .iter()
            .filter(|s| {
                let zone = self.board.get(s.coords()).and_then(|t| t.zone.as_deref());
                let show = self.known_shows.get(&s.show_id);
                matches!((zone, show), (Some(zone), Some(show)) if show.has_genre(zone))
            })
            .count();
        let zone_match_pct = if player.shots.is_empty() {
            0.0
        } else {
            100.0 * matched as f64 / player.shots.len() as f64
        };
        let candidates = match player.head() {
            None => vec![player.start],
            Some(head) => head.neighbors().to_vec(),
        };
        let open_moves = candidates.iter().filter(|c| self.is_valid_shot(player.user_id, **c)).count();
        Some(PlayerStats {
            tag: player.tag.clone(),
            shots: player.shots.len(),
            rails: player.rails,
            zone_match_pct,
            hours_per_rail: player.hours_per_rail(),
            open_moves,
            done: player.done,
        })
    }
}
