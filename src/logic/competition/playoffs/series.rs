// A best-of-N series between two teams.
use serde::{Deserialize, Serialize};

use crate::logic::{
    error::{LeagueError, Result},
    types::{GameId, RoundNumber, SeasonId, SeriesId, TeamId},
};

// Wins needed to take a best-of-N series.
pub fn wins_needed(best_of: u8) -> u8 {
    best_of.div_ceil(2)
}

#[derive(Debug)]
#[derive(Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesState {
    Pending,    // At least one team still comes from an unfinished series.
    Ready,
    InProgress,
    Complete,
}

#[derive(Debug)]
#[derive(Default, Clone, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct Series {
    pub id: SeriesId,
    pub season_id: SeasonId,
    pub round: RoundNumber,

    // None until the feeder series is decided.
    pub team1_id: Option<TeamId>,
    pub team2_id: Option<TeamId>,
    pub team1_wins: u8,
    pub team2_wins: u8,
    pub best_of: u8,
    pub is_complete: bool,
    pub winner_id: Option<TeamId>,

    // The series the winner moves on to. None for the final.
    pub next_series_id: Option<SeriesId>,
}

// Basics.
impl Series {
    pub fn build(season_id: SeasonId, round: RoundNumber, team1_id: Option<TeamId>, team2_id: Option<TeamId>, best_of: u8) -> Self {
        Self {
            season_id,
            round,
            team1_id,
            team2_id,
            best_of,
            ..Default::default()
        }
    }

    pub fn wins_needed(&self) -> u8 {
        wins_needed(self.best_of)
    }

    pub fn is_championship(&self) -> bool {
        self.next_series_id.is_none()
    }

    pub fn has_team(&self, team_id: TeamId) -> bool {
        self.team1_id == Some(team_id) || self.team2_id == Some(team_id)
    }

    pub fn games_played(&self) -> u8 {
        self.team1_wins + self.team2_wins
    }

    pub fn state(&self) -> SeriesState {
        if self.is_complete {
            return SeriesState::Complete;
        }
        if self.team1_id.is_none() || self.team2_id.is_none() {
            return SeriesState::Pending;
        }
        match self.team1_wins.max(self.team2_wins) {
            0 => SeriesState::Ready,
            _ => SeriesState::InProgress,
        }
    }

    // Series score from the point of view of team 1.
    pub fn score_line(&self) -> String {
        format!("{}-{}", self.team1_wins, self.team2_wins)
    }
}

// Functional.
impl Series {
    // Make sure a team can be credited with a game of this series.
    pub fn check_can_win(&self, winner_id: TeamId) -> Result<()> {
        if self.is_complete {
            return Err(LeagueError::invalid_state(format!("series {} is already complete", self.id)));
        }
        if !self.has_team(winner_id) {
            return Err(LeagueError::invalid_state(format!("team {winner_id} is not part of series {}", self.id)));
        }
        Ok(())
    }

    // Close the series once a side has the wins it needs.
    // Returns true only when this call completed it.
    pub fn settle(&mut self) -> bool {
        if self.is_complete {
            return false;
        }

        let needed = self.wins_needed();
        let winner = if self.team1_wins >= needed {
            self.team1_id
        }
        else if self.team2_wins >= needed {
            self.team2_id
        }
        else {
            None
        };

        if winner.is_some() {
            self.is_complete = true;
            self.winner_id = winner;
        }
        self.is_complete
    }

    pub fn outcome(&self) -> SeriesOutcome {
        SeriesOutcome {
            series_id: self.id,
            team1_wins: self.team1_wins,
            team2_wins: self.team2_wins,
            is_complete: self.is_complete,
            winner_id: self.winner_id,
            is_championship: self.is_complete && self.is_championship(),
            next_series_id: self.next_series_id,
        }
    }

    // Put a team into the first open slot, team 1 before team 2. Filled slots are never overwritten.
    pub fn fill_slot(&mut self, team_id: TeamId) -> Result<()> {
        if self.team1_id.is_none() {
            self.team1_id = Some(team_id);
        }
        else if self.team2_id.is_none() {
            self.team2_id = Some(team_id);
        }
        else {
            return Err(LeagueError::invalid_state(format!("series {} has no open slot", self.id)));
        }
        Ok(())
    }

    // Home team of a given game, 2-2-1-1-1. Games past the seventh go to team 2.
    pub fn home_team_for_game(&self, game_number: u8) -> Option<TeamId> {
        match game_number {
            1 | 2 | 5 | 7 => self.team1_id,
            _ => self.team2_id,
        }
    }

    // (home, away) of a given game, once both teams are known.
    pub fn matchup_for_game(&self, game_number: u8) -> Option<(TeamId, TeamId)> {
        let (team1, team2) = (self.team1_id?, self.team2_id?);
        match self.home_team_for_game(game_number) == Some(team1) {
            true => Some((team1, team2)),
            false => Some((team2, team1)),
        }
    }
}

// What recording a single game did to the series.
#[derive(Debug)]
#[derive(Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct SeriesOutcome {
    pub series_id: SeriesId,
    pub team1_wins: u8,
    pub team2_wins: u8,
    pub is_complete: bool,
    pub winner_id: Option<TeamId>,
    pub is_championship: bool,
    pub next_series_id: Option<SeriesId>,
}

// One game of a simulated series.
#[derive(Debug)]
#[derive(Clone, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct SeriesGameResult {
    pub game_number: u8,
    // The saved game, when the simulator produced a full one.
    pub game_id: Option<GameId>,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub home_score: u16,
    pub away_score: u16,
    pub winner_id: TeamId,
    pub series_score: String,
}

impl SeriesGameResult {
    pub fn score_line(&self) -> String {
        format!("{}-{}", self.home_score, self.away_score)
    }
}

#[derive(Debug)]
#[derive(Clone, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct SeriesSummary {
    pub series_id: SeriesId,
    pub results: Vec<SeriesGameResult>,
    pub final_score: String,
    pub winner_id: TeamId,
    pub is_championship: bool,
}
