// The league database.
mod game;
mod player;
mod playoffs;
mod season;
mod team;

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::{SqliteConnection, sqlite::{SqliteConnectOptions, SqlitePoolOptions}};
use tracing::{debug, info};

use crate::logic::{
    competition::{playoffs::{BracketPlan, series::Series}, season::Season},
    error::{LeagueError, Result},
    game::{Game, GameContext, SimulatedGame, event::Event, stats::{StatDelta, TeamDelta}},
    person::{player::{Player, PlayerStats, PlayoffLeader}, skills::Skills},
    ports::LeagueStore,
    team::Team,
    types::{Db, GameId, PlayerId, SeasonId, SeriesId, TeamId},
};

// Open the database and bring the schema up to date.
pub async fn setup(url: &str, max_connections: u32) -> Result<Db> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // Every connection to an in-memory database sees a database of its own, so it must never be recycled.
    let mut pool = SqlitePoolOptions::new().max_connections(max_connections.max(1));
    if url.contains(":memory:") {
        pool = pool.max_connections(1).idle_timeout(None).max_lifetime(None);
    }

    let db = pool.connect_with(options).await?;
    sqlx::migrate!("sql/migrations").run(&db).await?;

    info!(url, "database ready");
    return Ok(db);
}

// Write a game with its events, player statistics and team results on one connection.
async fn write_game(conn: &mut SqliteConnection, game: &SimulatedGame, context: GameContext) -> Result<GameId> {
    let game_id = game::save_result(&mut *conn, game, context).await?;
    for event in game.events.iter() {
        game::save_event(&mut *conn, game_id, event).await?;
    }
    for (player_id, delta) in game.stats.players.iter() {
        player::apply_stat_delta(&mut *conn, *player_id, delta).await?;
    }
    team::apply_result(&mut *conn, &game.stats.home).await?;
    team::apply_result(&mut *conn, &game.stats.away).await?;

    Ok(game_id)
}

// League storage on top of SQLite.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Db,
}

impl SqliteStore {
    pub fn build(db: Db) -> Self {
        Self { db }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        Ok(Self::build(setup(url, max_connections).await?))
    }

    pub fn db(&self) -> &Db {
        &self.db
    }
}

#[async_trait]
impl LeagueStore for SqliteStore {
    async fn team(&self, id: TeamId) -> Result<Team> {
        Team::fetch_from_db(&self.db, id).await?.ok_or(LeagueError::not_found("team", id))
    }

    async fn create_team(&self, team: &Team) -> Result<TeamId> {
        team.save(&self.db).await
    }

    async fn player(&self, id: PlayerId) -> Result<Player> {
        Player::fetch_from_db(&self.db, id).await?.ok_or(LeagueError::not_found("player", id))
    }

    async fn create_player(&self, player: &Player) -> Result<PlayerId> {
        if let Some(team_id) = player.team_id {
            self.team(team_id).await?;
        }
        player.save(&self.db).await
    }

    async fn players_by_team(&self, team_id: TeamId) -> Result<Vec<Player>> {
        Player::fetch_team(&self.db, team_id).await
    }

    async fn player_skills(&self, player_id: PlayerId) -> Result<Skills> {
        Ok(player::fetch_skills(&self.db, player_id).await?.unwrap_or_default())
    }

    async fn set_player_skills(&self, player_id: PlayerId, skills: &Skills) -> Result<()> {
        let skills = Skills::validated(skills.skating, skills.shooting, skills.passing, skills.defense, skills.physical, skills.goaltending)?;
        player::save_skills(&self.db, player_id, &skills).await
    }

    async fn commit_game(&self, game: &SimulatedGame, context: GameContext) -> Result<GameId> {
        let mut tx = self.db.begin().await?;
        let game_id = write_game(&mut *tx, game, context).await?;
        tx.commit().await?;

        debug!(game_id, events = game.events.len(), players = game.stats.players.len(), "game committed");
        Ok(game_id)
    }

    async fn persist_game_result(&self, game: &SimulatedGame, context: GameContext) -> Result<GameId> {
        game::save_result(&self.db, game, context).await
    }

    async fn persist_game_event(&self, game_id: GameId, event: &Event) -> Result<()> {
        game::save_event(&self.db, game_id, event).await
    }

    async fn apply_player_stat_delta(&self, player_id: PlayerId, delta: &StatDelta) -> Result<()> {
        player::apply_stat_delta(&self.db, player_id, delta).await
    }

    async fn apply_team_result(&self, delta: &TeamDelta) -> Result<()> {
        team::apply_result(&self.db, delta).await
    }

    async fn game(&self, id: GameId) -> Result<Game> {
        Game::fetch_from_db(&self.db, id).await?.ok_or(LeagueError::not_found("game", id))
    }

    async fn game_events(&self, game_id: GameId) -> Result<Vec<Event>> {
        Game::fetch_events(&self.db, game_id).await
    }

    async fn series(&self, id: SeriesId) -> Result<Series> {
        Series::fetch_from_db(&self.db, id).await?.ok_or(LeagueError::not_found("playoff series", id))
    }

    async fn series_by_season(&self, season_id: SeasonId) -> Result<Vec<Series>> {
        Series::fetch_season(&self.db, season_id).await
    }

    async fn create_series(&self, series: &Series) -> Result<SeriesId> {
        series.save(&self.db).await
    }

    async fn link_series(&self, series_id: SeriesId, next_series_id: SeriesId) -> Result<()> {
        playoffs::link(&self.db, series_id, next_series_id).await
    }

    async fn fill_series_slot(&self, series_id: SeriesId, team_id: TeamId) -> Result<Series> {
        match playoffs::fill_slot(&self.db, series_id, team_id).await? {
            Some(series) => Ok(series),
            None => {
                let series = self.series(series_id).await?;
                Err(LeagueError::invalid_state(format!("series {} has no open slot for team {team_id}", series.id)))
            }
        }
    }

    async fn record_series_win(&self, series_id: SeriesId, winner_id: TeamId) -> Result<Series> {
        let mut tx = self.db.begin().await?;
        let series = playoffs::record_win(&mut *tx, series_id, winner_id).await?;
        tx.commit().await?;
        Ok(series)
    }

    async fn commit_series_game(&self, game: &SimulatedGame, context: GameContext, series_id: SeriesId, winner_id: TeamId) -> Result<(GameId, Series)> {
        let mut tx = self.db.begin().await?;
        let game_id = write_game(&mut *tx, game, context).await?;
        let series = playoffs::record_win(&mut *tx, series_id, winner_id).await?;
        tx.commit().await?;

        debug!(game_id, series_id, score = %series.score_line(), "series game committed");
        Ok((game_id, series))
    }

    async fn create_bracket(&self, season_id: SeasonId, plan: &BracketPlan, best_of: u8) -> Result<Vec<Series>> {
        playoffs::save_bracket(&self.db, season_id, plan, best_of).await
    }

    async fn create_season(&self, season: &Season) -> Result<Season> {
        season.save(&self.db).await
    }

    async fn active_season(&self) -> Result<Option<Season>> {
        Season::fetch_active(&self.db).await
    }

    async fn season(&self, id: SeasonId) -> Result<Season> {
        Season::fetch_from_db(&self.db, id).await?.ok_or(LeagueError::not_found("season", id))
    }

    async fn end_season(&self, id: SeasonId) -> Result<Season> {
        Season::end(&self.db, id).await
    }

    async fn mark_playoffs_started(&self, id: SeasonId) -> Result<()> {
        self.season(id).await?;
        Season::mark_playoffs_started(&self.db, id).await
    }

    async fn standings(&self) -> Result<Vec<Team>> {
        Team::fetch_standings(&self.db).await
    }

    async fn player_stats(&self, player_id: PlayerId) -> Result<PlayerStats> {
        self.player(player_id).await?;
        PlayerStats::fetch_from_db(&self.db, player_id).await
    }

    async fn playoff_leaders(&self, season_id: SeasonId, limit: u32) -> Result<Vec<PlayoffLeader>> {
        PlayoffLeader::fetch_season(&self.db, season_id, limit).await
    }
}
