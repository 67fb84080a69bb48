mod common;

use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use rand::{SeedableRng, rngs::StdRng};
use tempfile::TempDir;

use puck_league::{
    LeagueError, Result,
    logic::{
        competition::playoffs::series::Series,
        game::{GameContext, score::Score},
        league::{SeriesGame, SeriesGameSimulator},
        ports::LeagueStore,
        types::TeamId,
    },
};

// Hands every game to the same team.
struct AlwaysWins {
    team_id: TeamId,
    games: usize,
}

#[async_trait]
impl SeriesGameSimulator for AlwaysWins {
    async fn simulate_game(&mut self, home_id: TeamId, _away_id: TeamId, _series: &Series) -> Result<SeriesGame> {
        self.games += 1;
        Ok(SeriesGame::Score(match home_id == self.team_id {
            true => Score::build(3, 1),
            false => Score::build(1, 3),
        }))
    }
}

#[tokio::test]
async fn eight_teams_make_three_linked_rounds() {
    let league = common::league().await;
    let season_id = common::season(&league).await;
    let t = common::teams(&league, 8).await;

    let bracket = league.start_playoffs(season_id, &t, 7).await.unwrap();
    assert_eq!(bracket.total_rounds(), 3);

    let first = &bracket.rounds[&1];
    let pairs: Vec<(Option<TeamId>, Option<TeamId>)> = first.iter().map(|s| (s.team1_id, s.team2_id)).collect();
    assert_eq!(pairs, vec![
        (Some(t[0]), Some(t[7])),
        (Some(t[1]), Some(t[6])),
        (Some(t[2]), Some(t[5])),
        (Some(t[3]), Some(t[4])),
    ]);

    let second = &bracket.rounds[&2];
    let last = &bracket.rounds[&3];
    assert_eq!(second.len(), 2);
    assert_eq!(last.len(), 1);
    assert!(second.iter().chain(last.iter()).all(|s| s.team1_id.is_none() && s.team2_id.is_none()));

    assert_eq!(first[0].next_series_id, Some(second[0].id));
    assert_eq!(first[1].next_series_id, Some(second[0].id));
    assert_eq!(first[2].next_series_id, Some(second[1].id));
    assert_eq!(first[3].next_series_id, Some(second[1].id));
    assert!(second.iter().all(|s| s.next_series_id == Some(last[0].id)));
    assert_eq!(last[0].next_series_id, None);
    assert!(bracket.series().all(|s| s.best_of == 7 && s.season_id == season_id));

    assert_eq!(bracket.round_name(1), "Quarter Final");
    assert_eq!(bracket.round_name(2), "Semi Final");
    assert_eq!(bracket.round_name(3), "Final");

    let season = league.store().season(season_id).await.unwrap();
    assert!(season.is_playoffs);
    assert!(season.playoffs_started);
}

#[tokio::test]
async fn six_teams_give_one_series_a_bye() {
    let league = common::league().await;
    let season_id = common::season(&league).await;
    let t = common::teams(&league, 6).await;

    let bracket = league.start_playoffs(season_id, &t, 5).await.unwrap();
    assert_eq!(bracket.total_rounds(), 3);
    assert_eq!(bracket.rounds[&1].len(), 3);
    assert_eq!(bracket.rounds[&2].len(), 1);
    assert_eq!(bracket.rounds[&3].len(), 1);

    // The third first round series skips straight to the final.
    let last = &bracket.rounds[&3][0];
    assert_eq!(bracket.rounds[&1][2].next_series_id, Some(last.id));
    assert_eq!(bracket.rounds[&2][0].next_series_id, Some(last.id));
}

#[tokio::test]
async fn playoffs_start_once_per_season() {
    let league = common::league().await;
    let season_id = common::season(&league).await;
    let t = common::teams(&league, 4).await;

    league.start_playoffs(season_id, &t, 7).await.unwrap();
    let error = league.start_playoffs(season_id, &t, 7).await.unwrap_err();
    assert!(matches!(error, LeagueError::InvalidState(_)));
    assert_eq!(league.bracket(season_id).await.unwrap().series().count(), 3);
}

#[tokio::test]
async fn bad_brackets_leave_nothing_behind() {
    let league = common::league().await;
    let season_id = common::season(&league).await;
    let t = common::teams(&league, 5).await;

    assert!(matches!(league.start_playoffs(season_id, &t, 7).await, Err(LeagueError::InvalidState(_))));
    assert!(matches!(league.start_playoffs(season_id, &t[..4], 6).await, Err(LeagueError::InvalidState(_))));
    assert!(matches!(league.start_playoffs(season_id, &[t[0], t[0]], 7).await, Err(LeagueError::InvalidState(_))));
    assert!(matches!(league.start_playoffs(season_id, &[t[0], 999], 7).await, Err(LeagueError::NotFound { entity: "team", id: 999 })));
    assert!(matches!(league.start_playoffs(999, &t[..4], 7).await, Err(LeagueError::NotFound { entity: "season", id: 999 })));

    assert!(league.bracket(season_id).await.unwrap().is_empty());
    assert!(!league.store().season(season_id).await.unwrap().playoffs_started);
}

#[tokio::test]
async fn best_of_seven_ends_at_four_wins() {
    let league = common::league().await;
    let season_id = common::season(&league).await;
    let t = common::teams(&league, 4).await;

    let bracket = league.start_playoffs(season_id, &t, 7).await.unwrap();
    let series = bracket.rounds[&1][0].clone();
    let final_id = bracket.rounds[&2][0].id;

    for _ in 0..3 {
        let outcome = league.record_series_game(series.id, t[0]).await.unwrap();
        assert!(!outcome.is_complete);
    }
    league.record_series_game(series.id, t[3]).await.unwrap();
    let outcome = league.record_series_game(series.id, t[0]).await.unwrap();

    assert!(outcome.is_complete);
    assert!(!outcome.is_championship);
    assert_eq!(outcome.winner_id, Some(t[0]));
    assert_eq!((outcome.team1_wins, outcome.team2_wins), (4, 1));
    assert_eq!(outcome.next_series_id, Some(final_id));

    let saved = league.store().series(series.id).await.unwrap();
    assert_eq!(saved.score_line(), "4-1");
    assert!(saved.is_complete);

    let next = league.store().series(final_id).await.unwrap();
    assert_eq!(next.team1_id, Some(t[0]));
    assert_eq!(next.team2_id, None);

    let error = league.record_series_game(series.id, t[0]).await.unwrap_err();
    assert!(matches!(error, LeagueError::InvalidState(_)));
}

#[tokio::test]
async fn only_teams_in_the_series_can_win_it() {
    let league = common::league().await;
    let season_id = common::season(&league).await;
    let t = common::teams(&league, 4).await;

    let bracket = league.start_playoffs(season_id, &t, 7).await.unwrap();
    let error = league.record_series_game(bracket.rounds[&1][0].id, t[1]).await.unwrap_err();
    assert!(matches!(error, LeagueError::InvalidState(_)));

    let error = league.record_series_game(999, t[0]).await.unwrap_err();
    assert!(matches!(error, LeagueError::NotFound { entity: "playoff series", id: 999 }));
}

#[tokio::test]
async fn second_winner_takes_the_other_slot() {
    let league = common::league().await;
    let season_id = common::season(&league).await;
    let t = common::teams(&league, 4).await;

    let bracket = league.start_playoffs(season_id, &t, 3).await.unwrap();
    let (top, bottom) = (bracket.rounds[&1][0].id, bracket.rounds[&1][1].id);
    let final_id = bracket.rounds[&2][0].id;

    // The lower series finishes first and still only claims team 1.
    league.record_series_game(bottom, t[2]).await.unwrap();
    league.record_series_game(bottom, t[2]).await.unwrap();
    league.record_series_game(top, t[0]).await.unwrap();
    league.record_series_game(top, t[0]).await.unwrap();

    let series = league.store().series(final_id).await.unwrap();
    assert_eq!(series.team1_id, Some(t[2]));
    assert_eq!(series.team2_id, Some(t[0]));

    let error = league.store().fill_series_slot(final_id, t[1]).await.unwrap_err();
    assert!(matches!(error, LeagueError::InvalidState(_)));
    let series = league.store().series(final_id).await.unwrap();
    assert_eq!((series.team1_id, series.team2_id), (Some(t[2]), Some(t[0])));

    league.record_series_game(final_id, t[0]).await.unwrap();
    let outcome = league.record_series_game(final_id, t[0]).await.unwrap();
    assert!(outcome.is_championship);
    assert_eq!(outcome.next_series_id, None);
    assert_eq!(league.bracket(season_id).await.unwrap().champion(), Some(t[0]));
}

#[tokio::test]
async fn sweep_takes_four_games() {
    let league = common::league().await;
    let season_id = common::season(&league).await;
    let t = common::teams(&league, 2).await;

    let bracket = league.start_playoffs(season_id, &t, 7).await.unwrap();
    let series_id = bracket.rounds[&1][0].id;

    let mut simulator = AlwaysWins { team_id: t[0], games: 0 };
    let summary = league.simulate_full_series(series_id, &mut simulator).await.unwrap();

    assert_eq!(simulator.games, 4);
    assert_eq!(summary.results.len(), 4);
    assert_eq!(summary.final_score, "4-0");
    assert_eq!(summary.winner_id, t[0]);
    assert!(summary.is_championship);

    let homes: Vec<TeamId> = summary.results.iter().map(|game| game.home_team_id).collect();
    assert_eq!(homes, vec![t[0], t[0], t[1], t[1]]);
    let running: Vec<&str> = summary.results.iter().map(|game| game.series_score.as_str()).collect();
    assert_eq!(running, vec!["1-0", "2-0", "3-0", "4-0"]);
    assert!(summary.results.iter().all(|game| game.game_id.is_none()));

    let error = league.simulate_full_series(series_id, &mut simulator).await.unwrap_err();
    assert!(matches!(error, LeagueError::InvalidState(_)));
}

#[tokio::test]
async fn series_waiting_for_teams_cannot_be_simulated() {
    let league = common::league().await;
    let season_id = common::season(&league).await;
    let t = common::teams(&league, 4).await;

    let bracket = league.start_playoffs(season_id, &t, 7).await.unwrap();
    let mut simulator = AlwaysWins { team_id: t[0], games: 0 };

    let error = league.simulate_full_series(bracket.rounds[&2][0].id, &mut simulator).await.unwrap_err();
    assert!(matches!(error, LeagueError::InvalidState(_)));
    assert_eq!(simulator.games, 0);
}

#[tokio::test]
async fn simulated_final_crowns_a_champion() {
    let league = common::league().await;
    let season_id = common::season(&league).await;
    let strong = common::team(&league, "Strong", 85).await;
    let weak = common::team(&league, "Weak", 30).await;

    let bracket = league.start_playoffs(season_id, &[strong, weak], 7).await.unwrap();
    let series_id = bracket.rounds[&1][0].id;

    let mut simulator = league.series_simulator(Some(2026));
    let summary = league.simulate_full_series(series_id, &mut simulator).await.unwrap();

    assert!((4..=7).contains(&summary.results.len()));
    assert!(summary.is_championship);
    assert!(summary.results.iter().all(|game| game.home_score != game.away_score));

    // Every game was saved as a playoff game with the score the series counted.
    for result in summary.results.iter() {
        let game = league.store().game(result.game_id.unwrap()).await.unwrap();
        assert!(game.is_playoff);
        assert_eq!((game.home_team_id, game.away_team_id), (result.home_team_id, result.away_team_id));
        assert_eq!((game.home_score, game.away_score), (result.home_score, result.away_score));
        assert_eq!(game.winner(), Some(result.winner_id));
    }

    let series = league.store().series(series_id).await.unwrap();
    assert!(series.is_complete);
    assert_eq!(series.winner_id, Some(summary.winner_id));
    assert_eq!(series.team1_wins.max(series.team2_wins), 4);

    let leaders = league.store().playoff_leaders(season_id, 5).await.unwrap();
    assert!(!leaders.is_empty());
    assert!(leaders.len() <= 5);
    assert!(leaders.windows(2).all(|pair| pair[0].points() >= pair[1].points()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_wins_are_all_counted() {
    let dir = TempDir::new().unwrap();
    let league = Arc::new(common::file_league(&dir).await);
    let season_id = common::season(&league).await;
    let t = common::teams(&league, 2).await;

    let bracket = league.start_playoffs(season_id, &t, 7).await.unwrap();
    let (series_id, winner_id) = (bracket.rounds[&1][0].id, t[0]);

    let handles: Vec<_> = (0..3)
        .map(|_| {
            let league = league.clone();
            tokio::spawn(async move { league.record_series_game(series_id, winner_id).await })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            accepted += 1;
        }
    }

    let series = league.store().series(series_id).await.unwrap();
    assert_eq!(accepted, 3);
    assert_eq!(series.team1_wins, accepted);
    assert_eq!(series.team2_wins, 0);
    assert!(!series.is_complete);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn overlapping_wins_stop_at_the_series_end() {
    let dir = TempDir::new().unwrap();
    let league = Arc::new(common::file_league(&dir).await);
    let season_id = common::season(&league).await;
    let t = common::teams(&league, 2).await;

    let bracket = league.start_playoffs(season_id, &t, 7).await.unwrap();
    let (series_id, winner_id) = (bracket.rounds[&1][0].id, t[1]);

    let handles: Vec<_> = (0..6)
        .map(|_| {
            let league = league.clone();
            tokio::spawn(async move { league.record_series_game(series_id, winner_id).await })
        })
        .collect();

    let (mut accepted, mut rejected, mut championships) = (0, 0, 0);
    for handle in handles {
        match handle.await.unwrap() {
            Ok(outcome) => {
                accepted += 1;
                if outcome.is_championship {
                    championships += 1;
                }
            }
            Err(LeagueError::InvalidState(_)) => rejected += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!((accepted, rejected), (4, 2));
    assert_eq!(championships, 1);

    let series = league.store().series(series_id).await.unwrap();
    assert_eq!(series.score_line(), "0-4");
    assert!(series.is_complete);
    assert_eq!(series.winner_id, Some(t[1]));
}

#[tokio::test]
async fn rejected_series_game_saves_nothing() {
    let league = common::league().await;
    let season_id = common::season(&league).await;
    let t = common::teams(&league, 2).await;

    let bracket = league.start_playoffs(season_id, &t, 3).await.unwrap();
    let series_id = bracket.rounds[&1][0].id;
    league.record_series_game(series_id, t[0]).await.unwrap();
    league.record_series_game(series_id, t[0]).await.unwrap();

    let context = GameContext::playoff(season_id);
    let mut rng = StdRng::seed_from_u64(17);
    let game = league.simulate_game(t[0], t[1], context, &mut rng).await.unwrap();

    let error = league.store().commit_series_game(&game, context, series_id, t[0]).await.unwrap_err();
    assert!(matches!(error, LeagueError::InvalidState(_)));

    assert!(matches!(league.store().game(1).await, Err(LeagueError::NotFound { entity: "game", id: 1 })));
    assert!(league.store().game_events(1).await.unwrap().is_empty());
    for team_id in t.iter().copied() {
        let team = league.store().team(team_id).await.unwrap();
        assert_eq!(team.wins + team.losses + team.ties, 0);
        assert_eq!(team.goals_for, 0);
        for player in league.store().players_by_team(team_id).await.unwrap() {
            assert_eq!(league.store().player_stats(player.id).await.unwrap().games_played, 0);
        }
    }

    let series = league.store().series(series_id).await.unwrap();
    assert_eq!(series.score_line(), "2-0");
}

#[tokio::test]
async fn series_game_is_saved_with_its_win() {
    let league = common::league().await;
    let season_id = common::season(&league).await;
    let t = common::teams(&league, 2).await;

    let bracket = league.start_playoffs(season_id, &t, 7).await.unwrap();
    let series_id = bracket.rounds[&1][0].id;

    let context = GameContext::playoff(season_id);
    let mut rng = StdRng::seed_from_u64(8);
    let game = league.simulate_game(t[0], t[1], context, &mut rng).await.unwrap();
    let winner_id = match game.score.home > game.score.away {
        true => t[0],
        false => t[1],
    };

    let (game_id, series) = league.store().commit_series_game(&game, context, series_id, winner_id).await.unwrap();
    assert_eq!(series.games_played(), 1);
    let wins = match winner_id == t[0] {
        true => series.team1_wins,
        false => series.team2_wins,
    };
    assert_eq!(wins, 1);

    let saved = league.store().game(game_id).await.unwrap();
    assert!(saved.is_playoff);
    assert_eq!(saved.winner(), Some(winner_id));
    assert_eq!(league.store().game_events(game_id).await.unwrap().len(), game.events.len());
}
