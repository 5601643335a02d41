//! Board update fan-out.
//!
//! After a committed move every player who can see the changed tile gets a fresh
//! board, plus the master board once the game is over. Deliveries run on a
//! bounded pool over an immutable snapshot, outside the game session's message
//! handling.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::Semaphore;

use crate::config::server::FANOUT_WORKERS;
use crate::game::state::Game;
use crate::persistence::BoardImage;

/// Receives one board to redraw. Implementations may block (rendering).
pub trait BoardNotifier: Send + Sync + 'static {
    /// `path` is where `image` lives, next to the game's snapshot.
    fn board_updated(&self, game: &Game, image: BoardImage, path: &Path);
}

/// Notifier that only logs; rendering lives outside this service.
pub struct LogNotifier;

impl BoardNotifier for LogNotifier {
    fn board_updated(&self, game: &Game, image: BoardImage, path: &Path) {
        debug!("[Fanout] '{}': {:?} changed, redraw {}", game.name, image, path.display());
    }
}

/// Deliver `game` for every image, at most `FANOUT_WORKERS` at a time.
/// Returns how many deliveries completed.
pub async fn fan_out(notifier: Arc<dyn BoardNotifier>, game: Arc<Game>, dir: PathBuf, images: Vec<BoardImage>) -> usize {
    let permits = Arc::new(Semaphore::new(FANOUT_WORKERS));
    let mut tasks = Vec::with_capacity(images.len());
    for image in images {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let notifier = notifier.clone();
        let game = game.clone();
        let path = image.path(&dir);
        tasks.push(tokio::task::spawn_blocking(move || {
            notifier.board_updated(&game, image, &path);
            drop(permit);
        }));
    }

    let mut delivered = 0;
    for task in tasks {
        match task.await {
            Ok(()) => delivered += 1,
            Err(e) => warn!("[Fanout] Update of '{}' failed: {e}", game.name),
        }
    }
    delivered
}
