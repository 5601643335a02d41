//! Shot legality.
//!
//! A pure check over the board and one player's track; committing the shot is
//! the game state's job.

use crate::game::entities::{Player, TrackState};
use crate::game::error::ShotError;
use crate::game::grid::{Board, MAX_RAILS_PER_TILE};
use crate::game::types::Coord;

/// What a legal shot does to the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The track grows by one tile.
    Extend,
    /// The shot reaches the end station; the player becomes done.
    Complete,
}

/// Decide whether `player` may place a rail on `target`.
pub fn check_shot(board: &Board, player: Option<&Player>, target: Coord) -> Result<Placement, ShotError> {
    let player = player.ok_or(ShotError::UnknownPlayer)?;

    let base = match player.track_state() {
        TrackState::Done => return Err(ShotError::AlreadyDone),
        TrackState::NotStarted => {
            if target != player.start {
                return Err(ShotError::MustStartAtStart { start: player.start });
            }
            None
        }
        TrackState::InProgress => player.head(),
    };

    let tile = board.get(target).ok_or(ShotError::OutOfBounds(target))?;
    if tile.rails.len() >= MAX_RAILS_PER_TILE {
        return Err(ShotError::TileFull(target));
    }

    if let Some(base) = base {
        if target.manhattan(base) != 1 {
            return Err(ShotError::NotAdjacent { target, base });
        }

        // Crossing another track is fine, following it is not.
        if let Some(other) = board.get(base).and_then(|t| t.other_rail(&player.tag)) {
            if tile.has_rail(other) {
                return Err(ShotError::RidesAlongRail { tag: other.to_string() });
            }
        }

        if tile.has_rail(&player.tag) {
            return Err(ShotError::AlreadyOnTrack(target));
        }

        let beside_own = target
            .neighbors()
            .iter()
            .filter(|n| **n != base)
            .any(|n| board.get(*n).is_some_and(|t| t.has_rail(&player.tag)));
        if beside_own {
            return Err(ShotError::BesideOwnTrack(target));
        }
    }

    if target == player.end {
        Ok(Placement::Complete)
    } else {
        Ok(Placement::Extend)
    }
}
