//! Fog of war.
//!
//! Each player sees the union of square windows around their start, their rails,
//! and their end station (radius 0). The renderer reads `Player::vis_tiles` to
//! decide which tiles to grey out.

use std::collections::BTreeSet;

use crate::game::entities::Player;
use crate::game::grid::Board;
use crate::game::types::Coord;

/// Add every in-bounds tile within `radius` of `center` to the player's visible set.
pub fn reveal(board: &Board, player: &mut Player, center: Coord, radius: i32) {
    player.vis_tiles.extend(board.window(center, radius));
}

/// The visible set implied by the player's current track and vision radius.
pub fn visible_from_track(board: &Board, player: &Player) -> BTreeSet<Coord> {
    let radius = player.reveal_radius();
    let mut visible: BTreeSet<Coord> = board.window(player.start, radius).collect();
    for shot in &player.shots {
        visible.extend(board.window(shot.coords(), radius));
    }
    visible.extend(board.window(player.end, 0));
    visible
}

/// Recompute the visible set from scratch, dropping tiles no longer covered.
/// Used after an undo and whenever the vision radius changes.
pub fn rebuild(board: &Board, player: &mut Player) {
    player.vis_tiles = visible_from_track(board, player);
}
