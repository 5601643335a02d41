//! HTTP handlers for the game operation surface.
//!
//! Handlers fetch whatever external data an operation needs first (show metadata,
//! watchlists) and only then message the guild's game session, so a failed lookup
//! never touches game state.

use std::collections::BTreeMap;

use actix::Addr;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::game::entities::{item_spec, ItemSpec};
use crate::game::error::GameError;
use crate::game::grid::BoardConfig;
use crate::game::state::{ItemUse, PlayerSeed};
use crate::game::systems::placement::Placement;
use crate::game::types::{now_millis, Coord, Item, Shot, ShowId, UserId};
use crate::lookup::LookupError;
use crate::server::game_session::messages::{
    Buy, CalculateScores, CheckShot, GetSnapshot, GetStats, KnowsShow, Shoot, Shutdown, Undo, UseItem,
};
use crate::server::game_session::server::{CreateGame, GetGameSession, TakeGameSession};
use crate::server::game_session::GameSession;
use crate::server::http_error::ApiError;
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SeatRequest {
    pub user_id: UserId,
    pub tag: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateGameRequest {
    pub name: String,
    pub players: Vec<SeatRequest>,
    #[serde(default)]
    pub board: BoardConfig,
}

#[derive(Debug, Deserialize)]
pub struct UserRequest {
    pub user_id: UserId,
}

#[derive(Debug, Deserialize)]
pub struct TargetQuery {
    pub user_id: UserId,
    pub row: i32,
    pub col: i32,
}

#[derive(Debug, Deserialize)]
pub struct ShotRequest {
    pub user_id: UserId,
    pub row: i32,
    pub col: i32,
    pub show_id: ShowId,
    #[serde(default)]
    pub info: String,
}

#[derive(Debug, Deserialize)]
pub struct BuyRequest {
    pub user_id: UserId,
    pub item: String,
    #[serde(default)]
    pub show_info: String,
}

#[derive(Debug, Serialize)]
pub struct ShopEntry {
    #[serde(flatten)]
    pub spec: ItemSpec,
    pub in_stock: u32,
}

#[derive(Debug, Deserialize)]
pub struct UseRequest {
    pub user_id: UserId,
    pub item: String,
    pub row: Option<i32>,
    pub col: Option<i32>,
}

async fn session(data: &AppState, guild_id: u64) -> Result<Addr<GameSession>, ApiError> {
    data.game_session_manager.send(GetGameSession { guild_id }).await?
}

/// Run a lookup on the blocking pool.
async fn fetch<T, F>(f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, LookupError> + Send + 'static,
{
    let fetched = web::block(f).await.map_err(|e| ApiError::Blocking(e.to_string()))?;
    Ok(fetched?)
}

pub async fn create_game(
    data: web::Data<AppState>,
    guild_id: web::Path<u64>,
    body: web::Json<CreateGameRequest>,
) -> Result<HttpResponse, ApiError> {
    let guild_id = guild_id.into_inner();
    let req = body.into_inner();
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("the game needs a name".to_string()));
    }

    let mut seeds = Vec::with_capacity(req.players.len());
    for seat in req.players {
        let source = data.lookup.clone();
        let user_id = seat.user_id;
        let watchlist = fetch(move || source.watchlist(user_id)).await?;
        seeds.push(PlayerSeed { user_id, tag: seat.tag, watchlist });
    }

    let game = data
        .game_session_manager
        .send(CreateGame { guild_id, name: req.name, seeds, config: req.board })
        .await??;
    Ok(HttpResponse::Created().json(game.as_ref()))
}

pub async fn get_game(data: web::Data<AppState>, guild_id: web::Path<u64>) -> Result<HttpResponse, ApiError> {
    let game = session(&data, guild_id.into_inner()).await?.send(GetSnapshot).await?;
    Ok(HttpResponse::Ok().json(game.as_ref()))
}

pub async fn delete_game(data: web::Data<AppState>, guild_id: web::Path<u64>) -> Result<HttpResponse, ApiError> {
    let guild_id = guild_id.into_inner();
    let session = data.game_session_manager.send(TakeGameSession { guild_id }).await??;
    session.send(Shutdown).await??;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn valid_shot(
    data: web::Data<AppState>,
    guild_id: web::Path<u64>,
    query: web::Query<TargetQuery>,
) -> Result<HttpResponse, ApiError> {
    let q = query.into_inner();
    let target = Coord::new(q.row, q.col);
    let checked = session(&data, guild_id.into_inner())
        .await?
        .send(CheckShot { user_id: q.user_id, target })
        .await?;
    let body = match checked {
        Ok(placement) => json!({ "valid": true, "completes": placement == Placement::Complete }),
        Err(e) => json!({ "valid": false, "error": { "code": e.code(), "message": e.to_string() } }),
    };
    Ok(HttpResponse::Ok().json(body))
}

pub async fn shoot(
    data: web::Data<AppState>,
    guild_id: web::Path<u64>,
    body: web::Json<ShotRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    let session = session(&data, guild_id.into_inner()).await?;

    let show = if session.send(KnowsShow(req.show_id)).await? {
        None
    } else {
        let source = data.lookup.clone();
        let show_id = req.show_id;
        Some(fetch(move || source.show_info(show_id)).await?)
    };
    let shot = Shot::new(req.row, req.col, req.show_id, req.info, now_millis());
    let report = session.send(Shoot { user_id: req.user_id, shot, show }).await??;
    Ok(HttpResponse::Ok().json(report))
}

pub async fn undo(
    data: web::Data<AppState>,
    guild_id: web::Path<u64>,
    body: web::Json<UserRequest>,
) -> Result<HttpResponse, ApiError> {
    let shot = session(&data, guild_id.into_inner())
        .await?
        .send(Undo { user_id: body.user_id })
        .await??;
    Ok(HttpResponse::Ok().json(shot))
}

pub async fn buy(
    data: web::Data<AppState>,
    guild_id: web::Path<u64>,
    body: web::Json<BuyRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    let item = session(&data, guild_id.into_inner())
        .await?
        .send(Buy { user_id: req.user_id, item: req.item, show_info: req.show_info })
        .await??;
    Ok(HttpResponse::Ok().json(json!({ "item": item })))
}

pub async fn use_item(
    data: web::Data<AppState>,
    guild_id: web::Path<u64>,
    body: web::Json<UseRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = body.into_inner();
    let item: Item = req.item.parse().map_err(GameError::UnknownItem)?;
    let action = match (item, req.row, req.col) {
        (Item::Bucket, Some(row), Some(col)) => ItemUse::Bucket { target: Coord::new(row, col) },
        (Item::Bucket, _, _) => return Err(ApiError::BadRequest("a bucket needs a row and a col".to_string())),
        (other, _, _) => return Err(GameError::NotUsable(other).into()),
    };
    session(&data, guild_id.into_inner())
        .await?
        .send(UseItem { user_id: req.user_id, action })
        .await??;
    Ok(HttpResponse::NoContent().finish())
}

/// Fetch every player's end-of-game watchlist, then score.
pub async fn score(data: web::Data<AppState>, guild_id: web::Path<u64>) -> Result<HttpResponse, ApiError> {
    let session = session(&data, guild_id.into_inner()).await?;
    let game = session.send(GetSnapshot).await?;

    let mut end_watchlists = BTreeMap::new();
    for player in &game.players {
        let source = data.lookup.clone();
        let user_id = player.user_id;
        end_watchlists.insert(user_id, fetch(move || source.watchlist(user_id)).await?);
    }
    let scores = session.send(CalculateScores { end_watchlists, now: now_millis() }).await??;

    let body: Vec<_> = game
        .players
        .iter()
        .zip(scores)
        .map(|(p, score)| json!({ "user_id": p.user_id, "tag": p.tag, "score": score }))
        .collect();
    Ok(HttpResponse::Ok().json(body))
}

pub async fn stats(data: web::Data<AppState>, guild_id: web::Path<u64>) -> Result<HttpResponse, ApiError> {
    let report = session(&data, guild_id.into_inner()).await?.send(GetStats).await?;
    Ok(HttpResponse::Ok().json(report))
}

/// The item catalog with what is left in this game's shop.
pub async fn shop(data: web::Data<AppState>, guild_id: web::Path<u64>) -> Result<HttpResponse, ApiError> {
    let game = session(&data, guild_id.into_inner()).await?.send(GetSnapshot).await?;
    let entries: Vec<ShopEntry> = Item::ALL
        .iter()
        .map(|&item| ShopEntry { spec: item_spec(item), in_stock: game.shop.get(&item).copied().unwrap_or(0) })
        .collect();
    Ok(HttpResponse::Ok().json(entries))
}
