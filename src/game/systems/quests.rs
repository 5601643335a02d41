//! Quests: one-time bonuses evaluated over a player's whole track and watch history.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::scoring::{
    DISTINCT_SOURCES, LEAST_WATCHED_GENRE_SHOTS, OTHER_PLAYERS_SHOWS, QUEST_LEAST_WATCHED_GENRE,
    QUEST_NO_ZONE_MATCH, QUEST_OTHER_PLAYERS_SHOWS, QUEST_RESOURCE_FREE_RUN, QUEST_SOURCES,
    QUEST_TRAIN_TAG, RESOURCE_FREE_RUN, TRAIN_TAG_MIN_RANK, TRAIN_TAG_NAME,
};
use crate::game::entities::Player;
use crate::game::grid::Board;
use crate::game::types::{ShowId, ShowInfo, WatchEntry, WatchlistSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quest {
    /// Finish a show tagged "Trains" during the game.
    TrainTag,
    /// Shoot two shows of your least watched genre.
    LeastWatchedGenre,
    /// Shoot shows from four different sources.
    DifferentSources,
    /// Never shoot a show on a zone of its own genre.
    NoZoneMatch,
    /// Shoot three shows from other players' lists that are not on yours.
    OtherPlayersShows,
    /// Six rails in a row on tiles without resources.
    ResourceFreeRun,
}

impl Quest {
    pub const ALL: [Quest; 6] = [
        Quest::TrainTag,
        Quest::LeastWatchedGenre,
        Quest::DifferentSources,
        Quest::NoZoneMatch,
        Quest::OtherPlayersShows,
        Quest::ResourceFreeRun,
    ];

    /// Score breakdown key.
    pub fn key(&self) -> &'static str {
        match self {
            Quest::TrainTag => "quest: train tag",
            Quest::LeastWatchedGenre => "quest: least watched genre",
            Quest::DifferentSources => "quest: different sources",
            Quest::NoZoneMatch => "quest: genre zone match",
            Quest::OtherPlayersShows => "quest: other player's shows",
            Quest::ResourceFreeRun => "quest: shots without resources",
        }
    }

    pub fn reward(&self) -> f64 {
        match self {
            Quest::TrainTag => QUEST_TRAIN_TAG,
            Quest::LeastWatchedGenre => QUEST_LEAST_WATCHED_GENRE,
            Quest::DifferentSources => QUEST_SOURCES,
            Quest::NoZoneMatch => QUEST_NO_ZONE_MATCH,
            Quest::OtherPlayersShows => QUEST_OTHER_PLAYERS_SHOWS,
            Quest::ResourceFreeRun => QUEST_RESOURCE_FREE_RUN,
        }
    }
}

/// Everything a quest may look at.
pub struct QuestContext<'a> {
    pub player: &'a Player,
    pub board: &'a Board,
    pub known_shows: &'a BTreeMap<ShowId, ShowInfo>,
    /// Starting watchlists of every player in the game, this one included.
    pub starting_watchlists: &'a [&'a WatchlistSnapshot],
    /// Changes to this player's watchlist over the game.
    pub changes: &'a [WatchEntry],
}

impl QuestContext<'_> {
    fn show(&self, id: ShowId) -> ShowInfo {
        self.known_shows.get(&id).cloned().unwrap_or_default()
    }
}

/// Quests the player completed.
pub fn completed_quests(ctx: &QuestContext<'_>) -> Vec<Quest> {
    Quest::ALL.into_iter().filter(|q| is_complete(*q, ctx)).collect()
}

fn is_complete(quest: Quest, ctx: &QuestContext<'_>) -> bool {
    let shots = &ctx.player.shots;
    match quest {
        Quest::TrainTag => shots.iter().any(|shot| {
            let show = ctx.show(shot.show_id);
            let tagged = show
                .tags
                .iter()
                .any(|t| t.name == TRAIN_TAG_NAME && t.rank > TRAIN_TAG_MIN_RANK);
            tagged
                && show.episodes.is_some_and(|episodes| {
                    ctx.changes
                        .iter()
                        .any(|c| c.media_id == shot.show_id && c.progress == episodes as i64)
                })
        }),
        Quest::LeastWatchedGenre => {
            let Some(genre) = ctx.player.starting_watchlist.least_watched_genre.as_deref() else {
                return false;
            };
            !genre.is_empty()
                && shots.iter().filter(|s| ctx.show(s.show_id).has_genre(genre)).count()
                    >= LEAST_WATCHED_GENRE_SHOTS
        }
        Quest::DifferentSources => {
            let sources: BTreeSet<String> = shots.iter().filter_map(|s| ctx.show(s.show_id).source).collect();
            sources.len() >= DISTINCT_SOURCES
        }
        Quest::NoZoneMatch => !shots.iter().any(|s| {
            ctx.board
                .get(s.coords())
                .and_then(|t| t.zone.as_deref())
                .is_some_and(|zone| ctx.show(s.show_id).has_genre(zone))
        }),
        Quest::OtherPlayersShows => {
            let own = &ctx.player.starting_watchlist;
            let borrowed: BTreeSet<ShowId> = shots
                .iter()
                .map(|s| s.show_id)
                .filter(|id| !own.contains(*id) && ctx.starting_watchlists.iter().any(|w| w.contains(*id)))
                .collect();
            borrowed.len() >= OTHER_PLAYERS_SHOWS
        }
        Quest::ResourceFreeRun => {
            let mut run = 0;
            for shot in shots {
                let bare = ctx.board.get(shot.coords()).is_some_and(|t| t.resource.is_none());
                run = if bare { run + 1 } else { 0 };
                if run >= RESOURCE_FREE_RUN {
                    return true;
                }
            }
            false
        }
    }
}
