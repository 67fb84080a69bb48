pub mod strength;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::logic::{error::{LeagueError, Result}, person::player::Player, team::strength::TeamStrength, types::TeamId};

#[derive(Debug)]
#[derive(Default, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
#[derive(FromRow)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub city: String,
    pub logo: Option<String>,

    // Record.
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,

    // Extended statistics.
    pub goals_for: u32,
    pub goals_against: u32,
    pub shots_for: u32,
    pub shots_against: u32,
    pub penalty_minutes: u32,
    pub home_wins: u32,
    pub home_losses: u32,
    pub away_wins: u32,
    pub away_losses: u32,
}

impl Team {
    pub fn build(name: &str, city: &str) -> Self {
        Self {
            name: name.to_string(),
            city: city.to_string(),
            ..Default::default()
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.city, self.name)
    }

    // Standings points: two for a win, one for a tie.
    pub fn points(&self) -> u32 {
        self.wins * 2 + self.ties
    }

    pub fn record(&self) -> String {
        format!("{}-{}-{}", self.wins, self.losses, self.ties)
    }
}

// The players a team dresses for a game, with their ratings attached.
#[derive(Debug)]
#[derive(Default, Clone)]
pub struct Roster {
    pub team_id: TeamId,
    pub players: Vec<Player>,
}

// Basics.
impl Roster {
    pub fn build(team_id: TeamId, players: Vec<Player>) -> Self {
        Self { team_id, players }
    }

    // Every non-goalie, in roster order.
    pub fn skaters(&self) -> Vec<&Player> {
        self.players.iter().filter(|player| !player.is_goalie()).collect()
    }

    pub fn goalies(&self) -> Vec<&Player> {
        self.players.iter().filter(|player| player.is_goalie()).collect()
    }

    // The goalie in net is the first one listed.
    pub fn starting_goalie(&self) -> Option<&Player> {
        self.players.iter().find(|player| player.is_goalie())
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

// Functional.
impl Roster {
    // Make sure the team has enough players to take the ice.
    pub fn check_playable(&self, min_players: usize) -> Result<()> {
        if self.players.len() < min_players {
            return Err(LeagueError::InsufficientRoster {
                team_id: self.team_id,
                players: self.players.len(),
                required: min_players,
            });
        }
        Ok(())
    }

    pub fn strength(&self) -> TeamStrength {
        TeamStrength::evaluate(&self.players)
    }
}
