//! End-of-game scoring.
//!
//! Scoring is a pure function of the board, the players' tracks and inventories,
//! the cached show metadata, the watchlist snapshots, and `now` (the finish time
//! used for players who never reached their end station).

use std::collections::BTreeMap;

use crate::config::scoring::{
    AXE_BONUS, CITY_HOUSE_BONUS, CITY_WHEAT_BONUS, COIN_POINTS, FIRST_GEM_BONUS, GEM_POINTS, GUN_PENALTY,
    HOUSE_POINTS, INTERSECTION_POINTS, RAIL_STEP, RAIL_STEP_POINTS, SPEED_BONUS, TARGET_RAILS, WHEAT_POINTS,
    WOOD_POINTS,
};
use crate::game::entities::Player;
use crate::game::grid::Board;
use crate::game::state::Game;
use crate::game::systems::quests::{completed_quests, QuestContext};
use crate::game::types::{Item, Resource, WatchlistSnapshot};
use crate::game::watchlist::diff_watchlist;

pub type ScoreBreakdown = BTreeMap<String, f64>;

fn add(score: &mut ScoreBreakdown, key: &str, val: f64) {
    *score.entry(key.to_string()).or_insert(0.0) += val;
}

/// Player indices ordered by completion time; unfinished players finish at `now`.
pub fn finish_order(players: &[Player], now: u64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..players.len()).collect();
    order.sort_by_key(|&i| (players[i].done_at.unwrap_or(now), i));
    order
}

/// Prison penalty per player tag: prison tiles on their track, plus 0.5 per Gun
/// when they went through at least one prison.
pub fn prison_penalties(board: &Board, players: &[Player]) -> BTreeMap<String, f64> {
    players
        .iter()
        .map(|p| {
            let prisons = p
                .shots
                .iter()
                .filter(|s| board.get(s.coords()).is_some_and(|t| t.resource == Some(Resource::Prison)))
                .count() as f64;
            let guns = if prisons > 0.0 { GUN_PENALTY * p.item_count(Item::Gun) as f64 } else { 0.0 };
            (p.tag.clone(), prisons + guns)
        })
        .collect()
}

/// Rail efficiency: +2 for every 3 rails under the target, -2 for every 3 over.
pub fn rail_bonus(rails: f64) -> f64 {
    let steps = ((rails - TARGET_RAILS) / RAIL_STEP).trunc();
    if steps == 0.0 { 0.0 } else { -RAIL_STEP_POINTS * steps }
}

/// Score every player. The result is indexed like `game.players`; each breakdown
/// includes a "total" entry.
pub fn score_players(game: &Game, now: u64) -> Vec<ScoreBreakdown> {
    let players = &game.players;
    let penalties = prison_penalties(&game.board, players);
    let starting: Vec<&WatchlistSnapshot> = players.iter().map(|p| &p.starting_watchlist).collect();

    let mut scores: Vec<ScoreBreakdown> = vec![ScoreBreakdown::new(); players.len()];
    for (rank, idx) in finish_order(players, now).into_iter().enumerate() {
        if let Some(bonus) = SPEED_BONUS.get(rank) {
            scores[idx].insert("speed bonus".to_string(), *bonus);
        }
    }

    for (idx, player) in players.iter().enumerate() {
        let score = &mut scores[idx];
        let own_penalty = penalties.get(&player.tag).copied().unwrap_or(0.0);

        let coins = player.item_count(Item::Coin);
        if coins > 0 {
            add(score, "coins", COIN_POINTS * coins as f64);
        }

        let mut has_city = false;
        let mut houses = 0usize;
        let mut woods = 0usize;
        for shot in &player.shots {
            let Some(tile) = game.board.get(shot.coords()) else {
                continue;
            };
            if tile.rails.len() > 1 {
                if let Some(other) = tile.other_rail(&player.tag) {
                    let penalty = penalties.get(other).copied().unwrap_or(0.0);
                    add(score, "intersections", INTERSECTION_POINTS - penalty);
                }
            }
            match tile.resource {
                Some(Resource::City) => has_city = true,
                Some(Resource::Wheat) => add(score, "wheat", WHEAT_POINTS),
                Some(Resource::Wood) => {
                    woods += 1;
                    add(score, "wood", WOOD_POINTS);
                }
                Some(Resource::Gems) => add(score, "gems", GEM_POINTS),
                Some(Resource::House) => {
                    houses += 1;
                    add(score, "houses", HOUSE_POINTS);
                }
                _ => {}
            }
        }

        let axes = player.item_count(Item::Axe);
        if axes > 0 && woods > 0 {
            add(score, "axe", AXE_BONUS * axes as f64 * woods as f64);
        }
        if has_city && score.contains_key("wheat") {
            add(score, "wheat", CITY_WHEAT_BONUS);
        }
        if has_city && houses > 0 {
            add(score, "houses", (CITY_HOUSE_BONUS - own_penalty) * houses as f64);
        }
        if game.first_gem.as_ref().is_some_and(|g| g.tag == player.tag) {
            add(score, "first gem", FIRST_GEM_BONUS);
        }

        score.insert("rails bonus".to_string(), rail_bonus(player.rails));

        let changes = player
            .ending_watchlist
            .as_ref()
            .map(|end| diff_watchlist(&player.starting_watchlist, end))
            .unwrap_or_default();
        let ctx = QuestContext {
            player,
            board: &game.board,
            known_shows: &game.known_shows,
            starting_watchlists: &starting,
            changes: &changes,
        };
        for quest in completed_quests(&ctx) {
            score.insert(quest.key().to_string(), quest.reward());
        }

        let total: f64 = score.values().sum();
        score.insert("total".to_string(), total);
    }
    scores
}
