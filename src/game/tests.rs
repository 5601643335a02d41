use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use uuid::Uuid;

use crate::game::entities::{default_shop, Player};
use crate::game::error::{GameError, ShotError};
use crate::game::grid::{generate_board, Board, BoardConfig, MAX_RAILS_PER_TILE};
use crate::game::state::{Game, ItemUse, PlayerSeed};
use crate::game::systems::quests::Quest;
use crate::game::systems::visibility;
use crate::game::types::{
    Coord, Item, Resource, Shot, ShowInfo, ShowTag, Terrain, UserId, WatchEntry, WatchlistSnapshot,
};

const SHOW: u64 = 1;

fn fixture(players: &[(UserId, &str, Coord, Coord)]) -> Game {
    let board = Board::new(12, 12);
    let players = players
        .iter()
        .map(|&(id, tag, start, end)| {
            let mut p = Player::new(id, tag, start, end, WatchlistSnapshot::default());
            visibility::rebuild(&board, &mut p);
            p
        })
        .collect();
    Game {
        id: Uuid::new_v4(),
        name: "test".to_string(),
        date: 0,
        players,
        board,
        shop: default_shop(),
        known_shows: BTreeMap::from([(SHOW, ShowInfo::default())]),
        active: true,
        first_gem: None,
    }
}

fn two_players() -> Game {
    fixture(&[
        (1, "A", Coord::new(2, 2), Coord::new(2, 6)),
        (2, "B", Coord::new(6, 2), Coord::new(6, 6)),
    ])
}

fn shot(row: i32, col: i32, time: u64) -> Shot {
    Shot::new(row, col, SHOW, "", time)
}

fn shoot_path(game: &mut Game, user: UserId, path: &[(i32, i32)]) {
    for (i, &(r, c)) in path.iter().enumerate() {
        game.apply_shot(user, shot(r, c, i as u64 + 1), None).unwrap();
    }
}

fn set_tile(game: &mut Game, c: Coord, edit: impl FnOnce(&mut crate::game::grid::Tile)) {
    edit(game.board.get_mut(c).unwrap());
}

#[test]
fn test_scenario_ring_and_zones() {
    let mut rng = StdRng::seed_from_u64(7);
    let config = BoardConfig { interior_width: 8, interior_height: 8, river_ring: 1 };
    let board = generate_board(&config, &mut rng).unwrap();
    assert_eq!((board.width(), board.height()), (10, 10));

    let mut zones = std::collections::BTreeSet::new();
    for (c, tile) in board.iter() {
        let ring = c.row == 1 || c.col == 1 || c.row == 10 || c.col == 10;
        if ring {
            assert_eq!(tile.terrain, Some(Terrain::River), "ring tile {c}");
            assert!(tile.zone.is_none());
        } else {
            zones.insert(tile.zone.clone().unwrap());
        }
    }
    assert_eq!(zones.len(), 16);
}

#[test]
fn test_scenario_first_shot_must_be_start() {
    let mut game = two_players();
    assert_eq!(
        game.apply_shot(1, shot(2, 3, 1), None),
        Err(GameError::Shot(ShotError::MustStartAtStart { start: Coord::new(2, 2) }))
    );
    assert!(game.players[0].shots.is_empty());
    assert!(game.board.get(Coord::new(2, 3)).unwrap().rails.is_empty());

    let report = game.apply_shot(1, shot(2, 2, 1), None).unwrap();
    assert_eq!(report.cost, 1.0);
    assert_eq!(game.players[0].rails, 1.0);
    assert_eq!(game.board.get(Coord::new(2, 2)).unwrap().rails, vec!["A".to_string()]);
}

#[test]
fn test_scenario_rejects_non_adjacent_shot() {
    let mut game = two_players();
    shoot_path(&mut game, 1, &[(2, 2)]);
    assert_eq!(
        game.apply_shot(1, shot(4, 2, 2), None),
        Err(GameError::Shot(ShotError::NotAdjacent { target: Coord::new(4, 2), base: Coord::new(2, 2) }))
    );
    assert!(!game.is_valid_shot(1, Coord::new(4, 2)));
    assert!(game.is_valid_shot(1, Coord::new(3, 2)));
}

#[test]
fn test_scenario_buy_requires_shop_or_city() {
    let mut game = two_players();
    assert_eq!(game.buy_item(1, "Coin", ""), Err(GameError::NoRailsPlaced));

    shoot_path(&mut game, 1, &[(2, 2)]);
    assert_eq!(game.buy_item(1, "Coin", "paid"), Err(GameError::NotOnShop));
    assert_eq!(game.shop[&Item::Coin], 4);

    set_tile(&mut game, Coord::new(2, 3), |t| t.resource = Some(Resource::Shop));
    game.apply_shot(1, shot(2, 3, 2), None).unwrap();
    assert_eq!(game.buy_item(1, "coin", "paid"), Ok(Item::Coin));
    assert_eq!(game.shop[&Item::Coin], 3);
    assert_eq!(game.players[0].item_count(Item::Coin), 1);
    assert_eq!(game.buy_item(1, "Coin", ""), Err(GameError::ShopAlreadyUsed(Coord::new(2, 3))));
    assert_eq!(game.buy_item(1, "Jetpack", ""), Err(GameError::UnknownItem("Jetpack".to_string())));
}

#[test]
fn test_city_sells_and_stock_runs_out() {
    let mut game = two_players();
    set_tile(&mut game, Coord::new(2, 2), |t| t.resource = Some(Resource::City));
    set_tile(&mut game, Coord::new(6, 2), |t| t.resource = Some(Resource::City));
    shoot_path(&mut game, 1, &[(2, 2)]);
    shoot_path(&mut game, 2, &[(6, 2)]);

    assert_eq!(game.buy_item(1, "Gun", ""), Ok(Item::Gun));
    assert_eq!(game.buy_item(2, "Gun", ""), Err(GameError::OutOfStock(Item::Gun)));
    assert_eq!(game.players[1].item_count(Item::Gun), 0);
}

#[test]
fn test_scenario_done_player_cannot_shoot() {
    let mut game = two_players();
    shoot_path(&mut game, 1, &[(2, 2), (2, 3), (2, 4), (2, 5)]);
    let report = game.apply_shot(1, shot(2, 6, 9), None).unwrap();
    assert!(report.completed);
    assert!(!report.game_over);
    assert!(game.players[0].done);
    assert_eq!(game.players[0].done_at, Some(9));
    assert!(game.active);

    assert_eq!(game.apply_shot(1, shot(3, 6, 10), None), Err(GameError::Shot(ShotError::AlreadyDone)));
    assert!(!game.is_done());
}

#[test]
fn test_last_player_done_closes_game() {
    let mut game = fixture(&[(1, "A", Coord::new(2, 2), Coord::new(2, 4))]);
    shoot_path(&mut game, 1, &[(2, 2), (2, 3)]);
    let report = game.apply_shot(1, shot(2, 4, 3), None).unwrap();
    assert!(report.game_over);
    assert!(game.is_done());
    assert!(!game.active);
    assert_eq!(game.undo_shot(1), Err(GameError::GameInactive));
}

#[test]
fn test_rail_costs() {
    let mut game = two_players();
    game.known_shows.insert(2, ShowInfo { genres: vec!["Action".to_string()], ..Default::default() });
    set_tile(&mut game, Coord::new(2, 3), |t| t.terrain = Some(Terrain::River));
    set_tile(&mut game, Coord::new(2, 4), |t| {
        t.terrain = Some(Terrain::River);
        t.zone = Some("Action".to_string());
    });
    set_tile(&mut game, Coord::new(2, 5), |t| t.zone = Some("Action".to_string()));

    shoot_path(&mut game, 1, &[(2, 2)]);
    assert_eq!(game.apply_shot(1, shot(2, 3, 2), None).unwrap().cost, 2.0);
    assert_eq!(game.apply_shot(1, Shot::new(2, 4, 2, "", 3), None).unwrap().cost, 1.0);
    assert_eq!(game.apply_shot(1, Shot::new(2, 5, 2, "", 4), None).unwrap().cost, 0.5);
    assert_eq!(game.players[0].rails, 4.5);
}

#[test]
fn test_pontoon_bridge_crosses_river_for_free() {
    let mut game = two_players();
    set_tile(&mut game, Coord::new(2, 3), |t| t.terrain = Some(Terrain::River));
    game.players[0].add_item(Item::PontoonBridge, "");
    shoot_path(&mut game, 1, &[(2, 2)]);

    let report = game.apply_shot(1, shot(2, 3, 2), None).unwrap();
    assert!(report.bridged);
    assert_eq!(report.cost, 0.0);
    assert_eq!(game.players[0].rails, 1.0);
    assert_eq!(game.players[0].inventory[&Item::PontoonBridge].uses, Some(2));
}

#[test]
fn test_undo_restores_pre_shot_state() {
    let mut game = two_players();
    game.known_shows.insert(2, ShowInfo { genres: vec!["Drama".to_string()], ..Default::default() });
    set_tile(&mut game, Coord::new(2, 3), |t| {
        t.terrain = Some(Terrain::River);
        t.zone = Some("Drama".to_string());
    });
    game.players[0].add_item(Item::PontoonBridge, "");
    shoot_path(&mut game, 1, &[(2, 2)]);

    let player_before = game.players[0].clone();
    let board_before = game.board.clone();
    game.apply_shot(1, Shot::new(2, 3, 2, "", 5), None).unwrap();
    assert_ne!(game.players[0], player_before);

    let undone = game.undo_shot(1).unwrap();
    assert_eq!(undone.coords(), Coord::new(2, 3));
    assert_eq!(game.players[0], player_before);
    assert_eq!(game.board, board_before);
}

#[test]
fn test_undo_restores_last_bridge_with_its_show_info() {
    let mut game = two_players();
    set_tile(&mut game, Coord::new(2, 3), |t| t.terrain = Some(Terrain::River));
    game.players[0].add_item(Item::PontoonBridge, "Mushishi ep 1-4");
    game.players[0].inventory.get_mut(&Item::PontoonBridge).unwrap().uses = Some(1);
    shoot_path(&mut game, 1, &[(2, 2)]);

    let before = game.players[0].inventory.clone();
    let report = game.apply_shot(1, shot(2, 3, 2), None).unwrap();
    assert!(report.bridged);
    assert!(!game.players[0].has_item(Item::PontoonBridge));

    game.undo_shot(1).unwrap();
    assert_eq!(game.players[0].inventory, before);
    assert_eq!(game.players[0].inventory[&Item::PontoonBridge].show_info, "Mushishi ep 1-4");
}

#[test]
fn test_undo_of_final_shot_reopens_player() {
    let mut game = fixture(&[
        (1, "A", Coord::new(2, 2), Coord::new(2, 4)),
        (2, "B", Coord::new(6, 2), Coord::new(6, 6)),
    ]);
    shoot_path(&mut game, 1, &[(2, 2), (2, 3)]);
    let before = game.players[0].clone();
    game.apply_shot(1, shot(2, 4, 3), None).unwrap();
    assert!(game.players[0].done);

    game.undo_shot(1).unwrap();
    assert_eq!(game.players[0], before);
    assert!(!game.players[0].done);
    assert_eq!(game.players[0].done_at, None);
    assert_eq!(game.undo_shot(2), Err(GameError::NothingToUndo));
}

#[test]
fn test_purchase_anchors_shot() {
    let mut game = two_players();
    set_tile(&mut game, Coord::new(2, 2), |t| t.resource = Some(Resource::Shop));
    shoot_path(&mut game, 1, &[(2, 2)]);
    game.buy_item(1, "Telescope", "").unwrap();
    assert_eq!(game.undo_shot(1), Err(GameError::AnchoredByPurchase(Coord::new(2, 2))));
    assert_eq!(game.players[0].shots.len(), 1);
}

#[test]
fn test_telescope_widens_vision() {
    let mut game = two_players();
    set_tile(&mut game, Coord::new(2, 2), |t| t.resource = Some(Resource::Shop));
    shoot_path(&mut game, 1, &[(2, 2)]);
    let far = Coord::new(7, 7);
    assert!(!game.players[0].vis_tiles.contains(&far));
    game.buy_item(1, "Telescope", "").unwrap();
    assert!(game.players[0].vis_tiles.contains(&far));
}

#[test]
fn test_failed_lookup_leaves_game_untouched() {
    let mut game = two_players();
    let before = game.clone();
    assert_eq!(game.apply_shot(1, Shot::new(2, 2, 99, "", 1), None), Err(GameError::UnknownShow(99)));
    assert_eq!(game, before);

    let fetched = ShowInfo { source: Some("MANGA".to_string()), ..Default::default() };
    game.apply_shot(1, Shot::new(2, 2, 99, "", 1), Some(fetched.clone())).unwrap();
    assert_eq!(game.known_shows.get(&99), Some(&fetched));
}

#[test]
fn test_rejected_shot_does_not_cache_show() {
    let mut game = two_players();
    let fetched = ShowInfo::default();
    assert!(game.apply_shot(1, Shot::new(3, 3, 42, "", 1), Some(fetched)).is_err());
    assert!(!game.known_shows.contains_key(&42));
}

#[test]
fn test_no_tile_gets_a_third_rail() {
    let mut game = fixture(&[
        (1, "A", Coord::new(4, 1), Coord::new(4, 12)),
        (2, "B", Coord::new(1, 3), Coord::new(12, 3)),
        (3, "C", Coord::new(5, 4), Coord::new(12, 12)),
    ]);
    shoot_path(&mut game, 1, &[(4, 1), (4, 2), (4, 3), (4, 4)]);
    shoot_path(&mut game, 2, &[(1, 3), (2, 3), (3, 3), (4, 3), (5, 3)]);
    shoot_path(&mut game, 3, &[(5, 4), (4, 4)]);

    assert_eq!(game.apply_shot(3, shot(4, 3, 9), None), Err(GameError::Shot(ShotError::TileFull(Coord::new(4, 3)))));
    assert!(!game.board.add_rail(Coord::new(4, 3), "C"));
    assert!(game.board.iter().all(|(_, t)| t.rails.len() <= MAX_RAILS_PER_TILE));

    let stats = game.stats();
    assert_eq!(stats.crossings, 2);
    assert_eq!(stats.railed_tiles, 9);
}

#[test]
fn test_one_first_gem_claim() {
    let mut game = two_players();
    set_tile(&mut game, Coord::new(2, 4), |t| t.resource = Some(Resource::Gems));
    set_tile(&mut game, Coord::new(6, 4), |t| t.resource = Some(Resource::Gems));

    shoot_path(&mut game, 1, &[(2, 2), (2, 3), (2, 4)]);
    game.apply_shot(2, shot(6, 2, 4), None).unwrap();
    game.apply_shot(2, shot(6, 3, 5), None).unwrap();
    let report = game.apply_shot(2, shot(6, 4, 6), None).unwrap();
    assert!(!report.first_gem);
    assert_eq!(game.first_gem.as_ref().map(|g| g.tag.as_str()), Some("A"));

    let scores = game.clone().calculate_scores(BTreeMap::new(), 100);
    let claimed: Vec<_> = scores.iter().filter(|s| s.contains_key("first gem")).collect();
    assert_eq!(claimed.len(), 1);
    assert_eq!(scores[0].get("first gem"), Some(&3.0));

    game.undo_shot(1).unwrap();
    assert_eq!(game.first_gem.as_ref().map(|g| g.tag.as_str()), Some("B"));
    game.undo_shot(2).unwrap();
    assert!(game.first_gem.is_none());
}

#[test]
fn test_bucket_floods_tile() {
    let mut game = two_players();
    let target = Coord::new(3, 3);
    assert_eq!(game.use_item(1, ItemUse::Bucket { target }), Err(GameError::ItemNotOwned(Item::Bucket)));

    game.players[0].add_item(Item::Bucket, "");
    game.use_item(1, ItemUse::Bucket { target }).unwrap();
    assert!(game.board.get(target).unwrap().is_river());
    assert_eq!(game.players[0].inventory[&Item::Bucket].uses, Some(2));
    assert_eq!(
        game.use_item(1, ItemUse::Bucket { target: Coord::new(0, 3) }),
        Err(GameError::OutOfBounds(Coord::new(0, 3)))
    );
}

#[test]
fn test_scores_breakdown() {
    let mut game = two_players();
    set_tile(&mut game, Coord::new(2, 3), |t| t.resource = Some(Resource::Wheat));
    set_tile(&mut game, Coord::new(2, 4), |t| t.resource = Some(Resource::City));
    set_tile(&mut game, Coord::new(2, 5), |t| t.resource = Some(Resource::House));
    game.players[0].add_item(Item::Coin, "");
    shoot_path(&mut game, 1, &[(2, 2), (2, 3), (2, 4), (2, 5), (2, 6)]);
    shoot_path(&mut game, 2, &[(6, 2)]);

    let scores = game.calculate_scores(BTreeMap::new(), 100);
    let a = &scores[0];
    assert_eq!(a["speed bonus"], 2.0);
    assert_eq!(a["wheat"], 4.0);
    assert_eq!(a["houses"], 2.0);
    assert_eq!(a["coins"], 2.0);
    assert_eq!(a["rails bonus"], 14.0);
    assert_eq!(a[Quest::NoZoneMatch.key()], Quest::NoZoneMatch.reward());
    assert_eq!(a["total"], 2.0 + 4.0 + 2.0 + 2.0 + 14.0 + Quest::NoZoneMatch.reward());
    assert_eq!(scores[1]["speed bonus"], 1.0);
    assert_eq!(game.players[0].score, scores[0]);
    assert!(!game.active);
}

#[test]
fn test_intersections_pay_minus_prison_penalty() {
    let mut game = fixture(&[
        (1, "A", Coord::new(4, 1), Coord::new(4, 12)),
        (2, "B", Coord::new(1, 3), Coord::new(12, 3)),
    ]);
    set_tile(&mut game, Coord::new(2, 3), |t| t.resource = Some(Resource::Prison));
    game.players[1].add_item(Item::Gun, "");
    shoot_path(&mut game, 1, &[(4, 1), (4, 2), (4, 3)]);
    shoot_path(&mut game, 2, &[(1, 3), (2, 3), (3, 3), (4, 3)]);

    let scores = game.calculate_scores(BTreeMap::new(), 100);
    assert_eq!(scores[0]["intersections"], 1.0 - 1.5);
    assert_eq!(scores[1]["intersections"], 1.0);
}

#[test]
fn test_quests_from_watch_history() {
    let mut game = fixture(&[
        (1, "A", Coord::new(7, 2), Coord::new(7, 9)),
        (2, "B", Coord::new(2, 2), Coord::new(2, 6)),
    ]);
    let trains = ShowInfo {
        episodes: Some(12),
        tags: vec![ShowTag { name: "Trains".to_string(), rank: 80 }],
        ..Default::default()
    };
    game.known_shows.insert(5, trains);
    let watching = |progress| WatchEntry { media_id: 5, status: "CURRENT".to_string(), progress };
    game.players[0].starting_watchlist.entries.push(watching(0));

    for (i, c) in (2..=7).enumerate() {
        let id = if i == 0 { 5 } else { SHOW };
        game.apply_shot(1, Shot::new(7, c, id, "", i as u64), None).unwrap();
    }

    let end = WatchlistSnapshot { entries: vec![watching(12)], least_watched_genre: None };
    let scores = game.calculate_scores(BTreeMap::from([(1, end.clone())]), 100);
    assert_eq!(scores[0].get(Quest::TrainTag.key()), Some(&Quest::TrainTag.reward()));
    assert_eq!(scores[0].get(Quest::ResourceFreeRun.key()), Some(&Quest::ResourceFreeRun.reward()));
    assert!(!scores[0].contains_key(Quest::DifferentSources.key()));
    assert_eq!(game.players[0].ending_watchlist, Some(end));
}

/// Drive two players around a generated board with random legal shots.
fn random_game(seed: u64) -> Game {
    let mut rng = StdRng::seed_from_u64(seed);
    let seeds = vec![
        PlayerSeed { user_id: 1, tag: "A".to_string(), watchlist: WatchlistSnapshot::default() },
        PlayerSeed { user_id: 2, tag: "B".to_string(), watchlist: WatchlistSnapshot::default() },
    ];
    let mut game = Game::new("walk", seeds, &BoardConfig::default(), &mut rng).unwrap();
    game.known_shows.insert(SHOW, ShowInfo::default());

    for step in 0..80u64 {
        let user = 1 + step % 2;
        let Some(player) = game.player(user) else { continue };
        let candidates: Vec<Coord> = match player.head() {
            None => vec![player.start],
            Some(head) => head.neighbors().into_iter().filter(|c| game.is_valid_shot(user, *c)).collect(),
        };
        let Some(&target) = candidates.choose(&mut rng) else { continue };
        if game.apply_shot(user, Shot::new(target.row, target.col, SHOW, "", step), None).is_err() || !game.active {
            break;
        }
    }
    game
}

#[test]
fn test_random_tracks_are_connected_paths() {
    for seed in 0..10 {
        let game = random_game(seed);
        for player in &game.players {
            let Some(first) = player.shots.first() else { continue };
            assert_eq!(first.coords(), player.start);
            for pair in player.shots.windows(2) {
                assert_eq!(pair[0].coords().manhattan(pair[1].coords()), 1);
            }
            if player.done {
                assert_eq!(player.head(), Some(player.end));
            }
        }
        assert!(game.board.iter().all(|(_, t)| t.rails.len() <= MAX_RAILS_PER_TILE));
    }
}

#[test]
fn test_undo_everything_clears_board() {
    let mut game = random_game(3);
    game.active = true;
    for user in [1, 2] {
        while game.undo_shot(user).is_ok() {}
    }
    assert!(game.board.iter().all(|(_, t)| t.rails.is_empty()));
    assert!(game.players.iter().all(|p| p.rails == 0.0 && !p.done));
    assert!(game.first_gem.is_none());
}

#[test]
fn test_scoring_is_deterministic() {
    let game = random_game(5);
    let ends = BTreeMap::from([(1, WatchlistSnapshot::default()), (2, WatchlistSnapshot::default())]);
    let first = game.clone().calculate_scores(ends.clone(), 1_000);
    let second = game.clone().calculate_scores(ends, 1_000);
    assert_eq!(first, second);
    assert!(first.iter().all(|s| s.contains_key("total")));
}

#[test]
fn test_new_game_rejects_bad_seats() {
    use crate::game::error::BoardGenerationError;
    let mut rng = StdRng::seed_from_u64(1);
    let seat = |user_id: UserId, tag: &str| PlayerSeed {
        user_id,
        tag: tag.to_string(),
        watchlist: WatchlistSnapshot::default(),
    };
    let config = BoardConfig::default();
    assert_eq!(Game::new("g", vec![], &config, &mut rng), Err(BoardGenerationError::NoPlayers));
    assert_eq!(Game::new("g", vec![seat(1, " ")], &config, &mut rng), Err(BoardGenerationError::EmptyTag));
    assert_eq!(
        Game::new("g", vec![seat(1, "A"), seat(2, "A")], &config, &mut rng),
        Err(BoardGenerationError::DuplicateTag("A".to_string()))
    );
    // One user cannot hold two seats, or the second could never move.
    assert_eq!(
        Game::new("g", vec![seat(1, "A"), seat(1, "B")], &config, &mut rng),
        Err(BoardGenerationError::DuplicatePlayer(1))
    );
    assert!(Game::new("g", vec![seat(1, "A"), seat(2, "B")], &config, &mut rng).is_ok());
}

#[test]
fn test_new_game_seats_players_with_vision() {
    let mut rng = StdRng::seed_from_u64(11);
    let seeds = (1..=4)
        .map(|i| PlayerSeed { user_id: i, tag: format!("P{i}"), watchlist: WatchlistSnapshot::default() })
        .collect();
    let game = Game::new("g", seeds, &BoardConfig::default(), &mut rng).unwrap();
    assert!(game.active);
    for player in &game.players {
        assert!(player.vis_tiles.contains(&player.start));
        assert!(player.vis_tiles.contains(&player.end));
        assert!(game.board.get(player.start).unwrap().is_bare());
        assert_ne!(player.start, player.end);
    }
    assert_eq!(game.player_stats(0).map(|s| s.shots), Some(0));
}
