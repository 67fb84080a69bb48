//! Hockey league engine: game simulation, statistics and playoff brackets.
pub mod config;
pub mod db;
pub mod logic;

pub use logic::error::{LeagueError, Result};
pub use logic::league::League;
