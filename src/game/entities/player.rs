//! Player entity: track, rail budget, vision, inventory and score.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Serialize, Deserialize};

use crate::config::game::{HOURS_PER_RAIL, MAGLEV_HOURS_PER_RAIL, RENDER_DISTANCE};
use crate::game::entities::shop::item_spec;
use crate::game::types::{Coord, Item, Shot, UserId, WatchlistSnapshot};

/// Progress of a player's track. `Done` is terminal for placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackState {
    NotStarted,
    InProgress,
    Done,
}

/// Units of one item owned by a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    pub amount: u32,
    /// Remaining uses of the unit in hand, `None` for permanent items.
    pub uses: Option<u32>,
    /// What the player watched to pay for it.
    #[serde(default)]
    pub show_info: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub user_id: UserId,
    pub tag: String,
    pub start: Coord,
    pub end: Coord,
    #[serde(default)]
    pub shots: Vec<Shot>,
    /// Cumulative rails spent.
    #[serde(default)]
    pub rails: f64,
    #[serde(default)]
    pub vis_tiles: BTreeSet<Coord>,
    #[serde(default)]
    pub inventory: BTreeMap<Item, ItemStack>,
    /// Shop and city tiles this player already bought from.
    #[serde(default)]
    pub shops_used: BTreeSet<Coord>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub done_at: Option<u64>,
    #[serde(default)]
    pub score: BTreeMap<String, f64>,
    #[serde(default)]
    pub starting_watchlist: WatchlistSnapshot,
    #[serde(default)]
    pub ending_watchlist: Option<WatchlistSnapshot>,
}

impl Player {
    pub fn new(user_id: UserId, tag: impl Into<String>, start: Coord, end: Coord, watchlist: WatchlistSnapshot) -> Self {
        Self {
            user_id,
            tag: tag.into(),
            start,
            end,
            shots: Vec::new(),
            rails: 0.0,
            vis_tiles: BTreeSet::new(),
            inventory: BTreeMap::new(),
            shops_used: BTreeSet::new(),
            done: false,
            done_at: None,
            score: BTreeMap::new(),
            starting_watchlist: watchlist,
            ending_watchlist: None,
        }
    }

    pub fn track_state(&self) -> TrackState {
        if self.done {
            TrackState::Done
        } else if self.shots.is_empty() {
            TrackState::NotStarted
        } else {
            TrackState::InProgress
        }
    }

    /// Where the track currently ends.
    pub fn head(&self) -> Option<Coord> {
        self.shots.last().map(Shot::coords)
    }

    pub fn item_count(&self, item: Item) -> u32 {
        self.inventory.get(&item).map_or(0, |s| s.amount)
    }

    pub fn has_item(&self, item: Item) -> bool {
        self.item_count(item) > 0
    }

    /// Vision radius around each rail.
    pub fn reveal_radius(&self) -> i32 {
        RENDER_DISTANCE + self.item_count(Item::Telescope) as i32
    }

    /// Hours of watching required per rail.
    pub fn hours_per_rail(&self) -> u32 {
        if self.has_item(Item::MagLev) { MAGLEV_HOURS_PER_RAIL } else { HOURS_PER_RAIL }
    }

    /// Add one unit of `item` to the inventory.
    pub fn add_item(&mut self, item: Item, show_info: &str) {
        let uses = item_spec(item).uses;
        let stack = self.inventory.entry(item).or_insert(ItemStack { amount: 0, uses, show_info: String::new() });
        stack.amount += 1;
        if !show_info.is_empty() {
            if !stack.show_info.is_empty() {
                stack.show_info.push(' ');
            }
            stack.show_info.push_str(show_info);
        }
    }

    /// Spend one use of `item`. A unit is gone when its uses run out, and the stack
    /// is removed when no units remain. Returns false if the item is not owned.
    pub fn consume_item(&mut self, item: Item) -> bool {
        let Some(stack) = self.inventory.get_mut(&item) else {
            return false;
        };
        match stack.uses {
            Some(uses) if uses > 1 => stack.uses = Some(uses - 1),
            _ => {
                stack.amount -= 1;
                stack.uses = item_spec(item).uses;
            }
        }
        if stack.amount == 0 {
            self.inventory.remove(&item);
        }
        true
    }

    /// Exact inverse of the most recent `consume_item(item)`. `show_info` is the
    /// stack's text before it was consumed, used if the stack has to be recreated.
    pub fn refund_item(&mut self, item: Item, show_info: &str) {
        let full = item_spec(item).uses;
        match self.inventory.get_mut(&item) {
            None => {
                let stack = ItemStack { amount: 1, uses: full.map(|_| 1), show_info: show_info.to_string() };
                self.inventory.insert(item, stack);
            }
            Some(stack) => match (stack.uses, full) {
                (Some(uses), Some(full)) if uses < full => stack.uses = Some(uses + 1),
                (_, full) => {
                    stack.amount += 1;
                    stack.uses = full.map(|_| 1);
                }
            },
        }
    }
}
