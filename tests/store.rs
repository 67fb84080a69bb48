mod common;

use pretty_assertions::assert_eq;
use rand::{SeedableRng, rngs::StdRng};

use puck_league::{
    LeagueError,
    logic::{
        competition::playoffs::series::Series,
        game::{GameContext, stats::StatDelta},
        ports::LeagueStore,
    },
};

#[tokio::test]
async fn game_rows_can_be_written_piece_by_piece() {
    let league = common::league().await;
    let season_id = common::season(&league).await;
    let home = common::team(&league, "Home", 60).await;
    let away = common::team(&league, "Away", 55).await;

    let context = GameContext::regular(Some(season_id));
    let mut rng = StdRng::seed_from_u64(42);
    let game = league.simulate_game(home, away, context, &mut rng).await.unwrap();

    let game_id = league.store().persist_game_result(&game, context).await.unwrap();
    let saved = league.store().game(game_id).await.unwrap();
    assert_eq!((saved.home_team_id, saved.away_team_id), (home, away));
    assert_eq!(saved.score(), game.score);
    assert_eq!(saved.season_id, Some(season_id));
    assert!(saved.played);
    assert!(!saved.is_playoff);

    // Nothing else comes with the bare result.
    assert!(league.store().game_events(game_id).await.unwrap().is_empty());
    assert_eq!(league.store().team(home).await.unwrap().goals_for, 0);

    let penalty = game.events.iter().find(|event| event.penalty.is_some());
    let picked: Vec<_> = game.events.iter().take(3).chain(penalty).cloned().collect();
    for event in picked.iter() {
        league.store().persist_game_event(game_id, event).await.unwrap();
    }
    assert_eq!(league.store().game_events(game_id).await.unwrap(), picked);
}

#[tokio::test]
async fn stat_deltas_accumulate() {
    let league = common::league().await;
    let team_id = common::team(&league, "A", 50).await;
    let player = league.store().players_by_team(team_id).await.unwrap().remove(0);

    let delta = StatDelta { games_played: 1, goals: 2, assists: 1, shots: 5, plus_minus: -1, ..Default::default() };
    league.store().apply_player_stat_delta(player.id, &delta).await.unwrap();
    league.store().apply_player_stat_delta(player.id, &delta).await.unwrap();

    let stats = league.store().player_stats(player.id).await.unwrap();
    assert_eq!(stats.games_played, 2);
    assert_eq!(stats.goals, 4);
    assert_eq!(stats.assists, 2);
    assert_eq!(stats.shots, 10);
    assert_eq!(stats.plus_minus, -2);
    assert_eq!(stats.points(), 6);
}

#[tokio::test]
async fn empty_stat_delta_writes_nothing() {
    let league = common::league().await;
    let team_id = common::team(&league, "A", 50).await;
    let player = league.store().players_by_team(team_id).await.unwrap().remove(0);

    league.store().apply_player_stat_delta(player.id, &StatDelta::default()).await.unwrap();
    let stats = league.store().player_stats(player.id).await.unwrap();
    assert_eq!(stats.games_played, 0);
    assert_eq!(stats.points(), 0);

    // Not even for a player that does not exist.
    league.store().apply_player_stat_delta(9999, &StatDelta::default()).await.unwrap();
}

#[tokio::test]
async fn series_can_be_created_and_linked_by_hand() {
    let league = common::league().await;
    let season_id = common::season(&league).await;
    let t = common::teams(&league, 2).await;

    let semi = league.store().create_series(&Series::build(season_id, 1, Some(t[0]), Some(t[1]), 3)).await.unwrap();
    let last = league.store().create_series(&Series::build(season_id, 2, None, None, 3)).await.unwrap();

    let series = league.store().series(semi).await.unwrap();
    assert_eq!((series.team1_id, series.team2_id), (Some(t[0]), Some(t[1])));
    assert_eq!(series.next_series_id, None);
    assert_eq!(series.score_line(), "0-0");
    assert!(!series.is_complete);

    league.store().link_series(semi, last).await.unwrap();
    assert_eq!(league.store().series(semi).await.unwrap().next_series_id, Some(last));

    let ids: Vec<u32> = league.store().series_by_season(season_id).await.unwrap().iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![semi, last]);

    // The link carries the winner forward like a planned bracket does.
    league.record_series_game(semi, t[1]).await.unwrap();
    league.record_series_game(semi, t[1]).await.unwrap();
    assert_eq!(league.store().series(last).await.unwrap().team1_id, Some(t[1]));
}

#[tokio::test]
async fn linking_a_missing_series_is_not_found() {
    let league = common::league().await;
    let season_id = common::season(&league).await;
    let last = league.store().create_series(&Series::build(season_id, 1, None, None, 7)).await.unwrap();

    let error = league.store().link_series(999, last).await.unwrap_err();
    assert!(matches!(error, LeagueError::NotFound { entity: "playoff series", id: 999 }));
}
