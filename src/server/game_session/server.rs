//! Session store and per-game session actors.
//!
//! `GameSessionManager` maps each guild to the actor owning its game. A
//! `GameSession` holds one `Game`, applies operations one message at a time,
//! snapshots the game to disk after every committed change and hands board
//! updates to the fan-out pool.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use actix::prelude::*;
use actix::MessageResult;
use log::{error, info, warn};

use crate::game::error::{GameError, SnapshotError};
use crate::game::grid::BoardConfig;
use crate::game::state::{Game, ItemUse, PlayerSeed, ShotReport};
use crate::game::systems::placement::Placement;
use crate::game::systems::scoring::ScoreBreakdown;
use crate::game::types::{Item, Shot, UserId};
use crate::persistence::{delete_game, game_dir, save_game, BoardImage, StoredGame, SNAPSHOT_FILE};
use crate::server::fanout::{fan_out, BoardNotifier};
use crate::server::game_session::messages::{
    Buy, CalculateScores, CheckShot, GetSnapshot, GetStats, KnowsShow, Shoot, Shutdown, StatsReport, Undo, UseItem,
};
use crate::server::http_error::ApiError;

pub struct GameSession {
    guild_id: u64,
    dir: PathBuf,
    game: Game,
    manager: Addr<GameSessionManager>,
    notifier: Arc<dyn BoardNotifier>,
}

impl Actor for GameSession {
    type Context = Context<Self>;

    fn started(&mut self, _: &mut Self::Context) {
        info!("[GameSession] Guild {} serving '{}'", self.guild_id, self.game.name);
    }
}

impl GameSession {
    pub fn new(
        guild_id: u64,
        dir: PathBuf,
        game: Game,
        manager: Addr<GameSessionManager>,
        notifier: Arc<dyn BoardNotifier>,
    ) -> Self {
        Self { guild_id, dir, game, manager, notifier }
    }

    fn persist(&self) -> Result<(), SnapshotError> {
        save_game(&self.dir, &self.game).map(|_| ()).inspect_err(|e| {
            error!("[GameSession] Could not save '{}' of guild {}: {e}", self.game.name, self.guild_id);
        })
    }

    /// Snapshot, report a finished game, and push the new board to `recipients`
    /// (and the master board once the game is over).
    ///
    /// The change stays applied in memory when the snapshot fails; the error is
    /// still returned so the caller knows it is not durable yet.
    fn after_commit(&self, recipients: Vec<UserId>) -> Result<(), SnapshotError> {
        let saved = self.persist();
        let mut images: Vec<BoardImage> = recipients.into_iter().map(BoardImage::Player).collect();
        if !self.game.active {
            self.manager.do_send(GameFinished { guild_id: self.guild_id });
            images.push(BoardImage::Master);
        }
        if !images.is_empty() {
            let snapshot = Arc::new(self.game.clone());
            actix::spawn(fan_out(self.notifier.clone(), snapshot, self.dir.clone(), images));
        }
        saved
    }

    fn rejected(&self, what: &str, user_id: UserId, e: &GameError) {
        warn!("[GameSession] Guild {}: {what} by {user_id} rejected: {e}", self.guild_id);
    }

    fn everyone(&self) -> Vec<UserId> {
        self.game.players.iter().map(|p| p.user_id).collect()
    }
}

impl Handler<Shoot> for GameSession {
    type Result = Result<ShotReport, ApiError>;

    fn handle(&mut self, msg: Shoot, _: &mut Context<Self>) -> Self::Result {
        match self.game.apply_shot(msg.user_id, msg.shot, msg.show) {
            Ok(report) => {
                self.after_commit(report.viewers.clone())?;
                Ok(report)
            }
            Err(e) => {
                self.rejected("shot", msg.user_id, &e);
                Err(e.into())
            }
        }
    }
}

impl Handler<Undo> for GameSession {
    type Result = Result<Shot, ApiError>;

    fn handle(&mut self, msg: Undo, _: &mut Context<Self>) -> Self::Result {
        match self.game.undo_shot(msg.user_id) {
            Ok(shot) => {
                let mut recipients = self.game.viewers(shot.coords());
                if !recipients.contains(&msg.user_id) {
                    recipients.push(msg.user_id);
                }
                self.after_commit(recipients)?;
                Ok(shot)
            }
            Err(e) => {
                self.rejected("undo", msg.user_id, &e);
                Err(e.into())
            }
        }
    }
}

impl Handler<Buy> for GameSession {
    type Result = Result<Item, ApiError>;

    fn handle(&mut self, msg: Buy, _: &mut Context<Self>) -> Self::Result {
        match self.game.buy_item(msg.user_id, &msg.item, &msg.show_info) {
            Ok(item) => {
                self.after_commit(vec![msg.user_id])?;
                Ok(item)
            }
            Err(e) => {
                self.rejected("purchase", msg.user_id, &e);
                Err(e.into())
            }
        }
    }
}

impl Handler<UseItem> for GameSession {
    type Result = Result<(), ApiError>;

    fn handle(&mut self, msg: UseItem, _: &mut Context<Self>) -> Self::Result {
        let ItemUse::Bucket { target } = msg.action;
        match self.game.use_item(msg.user_id, msg.action) {
            Ok(()) => {
                self.after_commit(self.game.viewers(target))?;
                Ok(())
            }
            Err(e) => {
                self.rejected("item use", msg.user_id, &e);
                Err(e.into())
            }
        }
    }
}

impl Handler<CheckShot> for GameSession {
    type Result = Result<Placement, GameError>;

    fn handle(&mut self, msg: CheckShot, _: &mut Context<Self>) -> Self::Result {
        if !self.game.active {
            return Err(GameError::GameInactive);
        }
        Ok(self.game.check_shot(msg.user_id, msg.target)?)
    }
}

impl Handler<KnowsShow> for GameSession {
    type Result = bool;

    fn handle(&mut self, msg: KnowsShow, _: &mut Context<Self>) -> Self::Result {
        self.game.known_shows.contains_key(&msg.0)
    }
}

impl Handler<GetSnapshot> for GameSession {
    type Result = MessageResult<GetSnapshot>;

    fn handle(&mut self, _: GetSnapshot, _: &mut Context<Self>) -> Self::Result {
        MessageResult(Arc::new(self.game.clone()))
    }
}

impl Handler<CalculateScores> for GameSession {
    type Result = Result<Vec<ScoreBreakdown>, ApiError>;

    fn handle(&mut self, msg: CalculateScores, _: &mut Context<Self>) -> Self::Result {
        let scores = self.game.calculate_scores(msg.end_watchlists, msg.now);
        self.after_commit(self.everyone())?;
        Ok(scores)
    }
}

impl Handler<GetStats> for GameSession {
    type Result = MessageResult<GetStats>;

    fn handle(&mut self, _: GetStats, _: &mut Context<Self>) -> Self::Result {
        let players = (0..self.game.players.len()).filter_map(|i| self.game.player_stats(i)).collect();
        MessageResult(StatsReport { game: self.game.stats(), players })
    }
}

impl Handler<Shutdown> for GameSession {
    type Result = Result<(), SnapshotError>;

    fn handle(&mut self, _: Shutdown, ctx: &mut Context<Self>) -> Self::Result {
        info!("[GameSession] Guild {} ending '{}'", self.guild_id, self.game.name);
        ctx.stop();
        delete_game(&self.dir)
    }
}

struct SessionEntry {
    addr: Addr<GameSession>,
    active: bool,
}

/// Session store: at most one game session per guild.
pub struct GameSessionManager {
    data_dir: PathBuf,
    notifier: Arc<dyn BoardNotifier>,
    sessions: HashMap<u64, SessionEntry>,
}

impl GameSessionManager {
    pub fn new(data_dir: PathBuf, notifier: Arc<dyn BoardNotifier>) -> Self {
        Self { data_dir, notifier, sessions: HashMap::new() }
    }

    fn start_session(&mut self, guild_id: u64, dir: PathBuf, game: Game, ctx: &mut Context<Self>) -> Addr<GameSession> {
        let active = game.active;
        let addr = GameSession::new(guild_id, dir, game, ctx.address(), self.notifier.clone()).start();
        self.sessions.insert(guild_id, SessionEntry { addr: addr.clone(), active });
        addr
    }
}

impl Actor for GameSessionManager {
    type Context = Context<Self>;
}

#[derive(Message)]
#[rtype(result = "Result<Arc<Game>, ApiError>")]
pub struct CreateGame {
    pub guild_id: u64,
    pub name: String,
    pub seeds: Vec<PlayerSeed>,
    pub config: BoardConfig,
}

impl Handler<CreateGame> for GameSessionManager {
    type Result = Result<Arc<Game>, ApiError>;

    fn handle(&mut self, msg: CreateGame, ctx: &mut Context<Self>) -> Self::Result {
        if self.sessions.get(&msg.guild_id).is_some_and(|s| s.active) {
            return Err(ApiError::GameRunning(msg.guild_id));
        }
        let dir = game_dir(&self.data_dir, msg.guild_id, &msg.name);
        if dir.join(SNAPSHOT_FILE).exists() {
            return Err(ApiError::NameTaken(msg.name));
        }
        let game = Game::new(msg.name, msg.seeds, &msg.config, &mut rand::rng())?;
        save_game(&dir, &game)?;
        let snapshot = Arc::new(game.clone());
        self.start_session(msg.guild_id, dir, game, ctx);
        Ok(snapshot)
    }
}

/// Register a game loaded from disk at startup.
#[derive(Message)]
#[rtype(result = "()")]
pub struct RestoreGame(pub StoredGame);

impl Handler<RestoreGame> for GameSessionManager {
    type Result = ();

    fn handle(&mut self, msg: RestoreGame, ctx: &mut Context<Self>) -> Self::Result {
        let StoredGame { guild_id, dir, game } = msg.0;
        info!("[GameSessionManager] Restored '{}' for guild {guild_id}", game.name);
        self.start_session(guild_id, dir, game, ctx);
    }
}

#[derive(Message)]
#[rtype(result = "Result<Addr<GameSession>, ApiError>")]
pub struct GetGameSession {
    pub guild_id: u64,
}

impl Handler<GetGameSession> for GameSessionManager {
    type Result = Result<Addr<GameSession>, ApiError>;

    fn handle(&mut self, msg: GetGameSession, _: &mut Context<Self>) -> Self::Result {
        self.sessions
            .get(&msg.guild_id)
            .map(|s| s.addr.clone())
            .ok_or(ApiError::NoGame(msg.guild_id))
    }
}

/// Remove a guild's session from the store and hand back its address.
#[derive(Message)]
#[rtype(result = "Result<Addr<GameSession>, ApiError>")]
pub struct TakeGameSession {
    pub guild_id: u64,
}

impl Handler<TakeGameSession> for GameSessionManager {
    type Result = Result<Addr<GameSession>, ApiError>;

    fn handle(&mut self, msg: TakeGameSession, _: &mut Context<Self>) -> Self::Result {
        self.sessions
            .remove(&msg.guild_id)
            .map(|s| s.addr)
            .ok_or(ApiError::NoGame(msg.guild_id))
    }
}

/// Sent by a session once its game is no longer active.
#[derive(Message)]
#[rtype(result = "()")]
pub struct GameFinished {
    pub guild_id: u64,
}

impl Handler<GameFinished> for GameSessionManager {
    type Result = ();

    fn handle(&mut self, msg: GameFinished, _: &mut Context<Self>) -> Self::Result {
        if let Some(entry) = self.sessions.get_mut(&msg.guild_id) {
            if entry.active {
                info!("[GameSessionManager] Game of guild {} finished", msg.guild_id);
            }
            entry.active = false;
        }
    }
}
