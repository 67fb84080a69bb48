//! Error types surfaced by the league engine.
use thiserror::Error;

use crate::logic::types::TeamId;

pub type Result<T> = std::result::Result<T, LeagueError>;

#[derive(Debug, Error)]
pub enum LeagueError {
    /// A referenced team, player, season, game or series does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: u32 },

    /// The operation does not fit the current state, or the input is malformed.
    #[error("invalid state: {0}")]
    InvalidState(String),

    #[error("team {team_id} has {players} players, at least {required} are needed to play")]
    InsufficientRoster { team_id: TeamId, players: usize, required: usize },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl LeagueError {
    pub fn not_found(entity: &'static str, id: u32) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }
}
