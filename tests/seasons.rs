mod common;

use pretty_assertions::assert_eq;
use time::macros::date;

use puck_league::{
    LeagueError,
    logic::{competition::season::Season, ports::LeagueStore},
};

#[tokio::test]
async fn one_active_season_at_a_time() {
    let league = common::league().await;
    let first = common::season(&league).await;

    let error = league.store().create_season(&Season::build("Second", date!(2027 - 01 - 01))).await.unwrap_err();
    assert!(matches!(error, LeagueError::InvalidState(_)));
    assert_eq!(league.store().active_season().await.unwrap().map(|s| s.id), Some(first));

    let ended = league.store().end_season(first).await.unwrap();
    assert!(!ended.is_active);
    assert!(ended.end_date.is_some());
    assert_eq!(league.store().active_season().await.unwrap(), None);

    let second = league.store().create_season(&Season::build("Second", date!(2027 - 10 - 01))).await.unwrap();
    assert!(second.is_active);
    assert!(!second.playoffs_started);
    assert_eq!(second.start_date, date!(2027 - 10 - 01));
}

#[tokio::test]
async fn ending_twice_is_an_error() {
    let league = common::league().await;
    let season_id = common::season(&league).await;

    league.store().end_season(season_id).await.unwrap();
    assert!(matches!(league.store().end_season(season_id).await, Err(LeagueError::InvalidState(_))));
    assert!(matches!(league.store().end_season(99).await, Err(LeagueError::NotFound { entity: "season", id: 99 })));
}

#[tokio::test]
async fn ended_season_leaves_the_playoffs() {
    let league = common::league().await;
    let season_id = common::season(&league).await;
    let t = common::teams(&league, 2).await;

    league.start_playoffs(season_id, &t, 7).await.unwrap();
    let season = league.store().end_season(season_id).await.unwrap();
    assert!(!season.is_playoffs);
    assert!(season.playoffs_started);
    assert_eq!(season.phase(), "over");
}

#[tokio::test]
async fn no_playoffs_after_the_season_ends() {
    let league = common::league().await;
    let season_id = common::season(&league).await;
    let t = common::teams(&league, 4).await;

    league.store().end_season(season_id).await.unwrap();
    let error = league.start_playoffs(season_id, &t, 7).await.unwrap_err();
    assert!(matches!(error, LeagueError::InvalidState(_)));

    let error = league.store().mark_playoffs_started(season_id).await.unwrap_err();
    assert!(matches!(error, LeagueError::InvalidState(_)));
}
