//! Persistence boundary of the league engine.
//!
//! Everything the engine reads or writes goes through [`LeagueStore`]. The SQLite
//! adapter lives in `crate::db`.
use async_trait::async_trait;

use crate::logic::{
    competition::{playoffs::{BracketPlan, series::Series}, season::Season},
    error::Result,
    game::{Game, GameContext, SimulatedGame, event::Event, stats::{StatDelta, TeamDelta}},
    person::{player::{Player, PlayerStats, PlayoffLeader}, skills::Skills},
    team::Team,
    types::{GameId, PlayerId, SeasonId, SeriesId, TeamId},
};

#[async_trait]
pub trait LeagueStore: Send + Sync {
    // Teams and players.
    async fn team(&self, id: TeamId) -> Result<Team>;
    async fn create_team(&self, team: &Team) -> Result<TeamId>;
    async fn player(&self, id: PlayerId) -> Result<Player>;
    async fn create_player(&self, player: &Player) -> Result<PlayerId>;

    /// Every player of a team with a fully populated rating profile.
    async fn players_by_team(&self, team_id: TeamId) -> Result<Vec<Player>>;

    /// Ratings of a player. Players without stored ratings get the defaults.
    async fn player_skills(&self, player_id: PlayerId) -> Result<Skills>;
    async fn set_player_skills(&self, player_id: PlayerId, skills: &Skills) -> Result<()>;

    // Games.
    /// Save a game with its events, player statistics and team results, all or nothing.
    async fn commit_game(&self, game: &SimulatedGame, context: GameContext) -> Result<GameId>;
    async fn persist_game_result(&self, game: &SimulatedGame, context: GameContext) -> Result<GameId>;
    async fn persist_game_event(&self, game_id: GameId, event: &Event) -> Result<()>;
    async fn apply_player_stat_delta(&self, player_id: PlayerId, delta: &StatDelta) -> Result<()>;
    async fn apply_team_result(&self, delta: &TeamDelta) -> Result<()>;
    async fn game(&self, id: GameId) -> Result<Game>;
    async fn game_events(&self, game_id: GameId) -> Result<Vec<Event>>;

    // Playoff series.
    async fn series(&self, id: SeriesId) -> Result<Series>;
    async fn series_by_season(&self, season_id: SeasonId) -> Result<Vec<Series>>;
    async fn create_series(&self, series: &Series) -> Result<SeriesId>;
    async fn link_series(&self, series_id: SeriesId, next_series_id: SeriesId) -> Result<()>;

    /// Put a team into the first open slot of a series. Fails if both slots are taken.
    async fn fill_series_slot(&self, series_id: SeriesId, team_id: TeamId) -> Result<Series>;

    /// Credit one game of a series to a team, and move a finished series' winner on to the next one.
    /// Overlapping calls on the same series never lose a win.
    async fn record_series_win(&self, series_id: SeriesId, winner_id: TeamId) -> Result<Series>;

    /// Save a playoff game and credit its winner in the series in one transaction.
    /// When the series cannot take the win, nothing of the game is saved.
    async fn commit_series_game(&self, game: &SimulatedGame, context: GameContext, series_id: SeriesId, winner_id: TeamId) -> Result<(GameId, Series)>;

    /// Create every series of a bracket and mark the season's playoffs started, all or nothing.
    async fn create_bracket(&self, season_id: SeasonId, plan: &BracketPlan, best_of: u8) -> Result<Vec<Series>>;

    // Seasons.
    async fn create_season(&self, season: &Season) -> Result<Season>;
    async fn active_season(&self) -> Result<Option<Season>>;
    async fn season(&self, id: SeasonId) -> Result<Season>;
    async fn end_season(&self, id: SeasonId) -> Result<Season>;
    async fn mark_playoffs_started(&self, id: SeasonId) -> Result<()>;

    // Reporting.
    async fn standings(&self) -> Result<Vec<Team>>;
    async fn player_stats(&self, player_id: PlayerId) -> Result<PlayerStats>;
    async fn playoff_leaders(&self, season_id: SeasonId, limit: u32) -> Result<Vec<PlayoffLeader>>;
}
