pub mod position;

use serde::{Deserialize, Serialize};

use crate::logic::{person::{player::position::Position, skills::{Skill, Skills}}, types::{PlayerId, SkillValue, TeamId}};

#[derive(Debug)]
#[derive(Default, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    pub number: u8,
    pub team_id: Option<TeamId>,

    // Read-only snapshot of the ratings for the duration of a simulation.
    pub skills: Skills,
}

// Basics.
impl Player {
    pub fn build(id: PlayerId, name: &str, position: Position, skills: Skills) -> Self {
        Self {
            id,
            name: name.to_string(),
            position,
            skills,
            ..Default::default()
        }
    }

    pub fn is_goalie(&self) -> bool {
        self.position.is_goalie()
    }

    pub fn skill(&self, skill: Skill) -> SkillValue {
        self.skills.get(skill)
    }
}

// Accumulated statistics of a player.
#[derive(Debug)]
#[derive(Default, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
#[derive(sqlx::FromRow)]
pub struct PlayerStats {
    pub player_id: PlayerId,
    pub games_played: u32,
    pub goals: u32,
    pub assists: u32,
    pub shots: u32,
    pub hits: u32,
    pub blocks: u32,
    pub penalty_minutes: u32,
    pub plus_minus: i32,
    pub saves: u32,
    pub goals_against: u32,
    pub shutouts: u32,
}

impl PlayerStats {
    pub fn points(&self) -> u32 {
        self.goals + self.assists
    }
}

// Scoring of a player over the playoff games of a season.
#[derive(Debug)]
#[derive(Default, Clone, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[derive(sqlx::FromRow)]
pub struct PlayoffLeader {
    pub player_id: PlayerId,
    pub name: String,
    pub team_id: Option<TeamId>,
    pub games_played: u32,
    pub goals: u32,
    pub assists: u32,
}

impl PlayoffLeader {
    pub fn points(&self) -> u32 {
        self.goals + self.assists
    }
}
