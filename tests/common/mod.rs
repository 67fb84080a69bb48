// Helpers shared by the integration tests.
#![allow(dead_code)]

use puck_league::{
    League,
    db::SqliteStore,
    logic::{
        competition::season::Season,
        game::rules::SimulationRules,
        person::{player::{Player, position::Position}, skills::Skills},
        ports::LeagueStore,
        team::Team,
        types::{SeasonId, TeamId},
    },
};
use tempfile::TempDir;
use time::macros::date;

pub async fn league() -> League<SqliteStore> {
    let store = SqliteStore::connect("sqlite::memory:", 1).await.unwrap();
    League::build(store, SimulationRules::default())
}

// A league on a database file, so several connections can work on it at once.
pub async fn file_league(dir: &TempDir) -> League<SqliteStore> {
    let url = format!("sqlite://{}", dir.path().join("league.db").display());
    let store = SqliteStore::connect(&url, 5).await.unwrap();
    League::build(store, SimulationRules::default())
}

// A team with five skaters and a goalie, everyone rated `skill`.
pub async fn team(league: &League<SqliteStore>, name: &str, skill: u8) -> TeamId {
    let id = league.store().create_team(&Team::build(name, "Springfield")).await.unwrap();

    for i in 0..6u8 {
        let position = match i {
            5 => Position::Goalie,
            _ => Position::Center,
        };
        let player = Player {
            team_id: Some(id),
            number: i + 1,
            ..Player::build(0, &format!("{name} {}", i + 1), position, Skills::uniform(skill))
        };
        league.store().create_player(&player).await.unwrap();
    }

    id
}

pub async fn teams(league: &League<SqliteStore>, count: usize) -> Vec<TeamId> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        ids.push(team(league, &format!("Team {}", i + 1), 50).await);
    }
    ids
}

pub async fn season(league: &League<SqliteStore>) -> SeasonId {
    league.store().create_season(&Season::build("2026-27", date!(2026 - 10 - 01))).await.unwrap().id
}
