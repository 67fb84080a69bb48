pub mod event;
pub mod rules;
pub mod score;
pub mod selection;
pub mod stats;

use rand::Rng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use crate::logic::{
    error::Result,
    game::{
        event::{Event, generate_event, generate_goal, goal_period},
        rules::SimulationRules,
        score::{Score, overtime_winner, simulate_score},
        stats::{BoxScore, StatSheet, accumulate},
    },
    team::Roster,
    types::{GameId, SeasonId, TeamId},
};

// Which of the two teams is meant.
#[derive(Eq, Hash, PartialEq)]
#[derive(Debug)]
#[derive(Clone, Copy)]
#[derive(sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub fn opponent(&self) -> Self {
        match self {
            Side::Home => Side::Away,
            Side::Away => Side::Home,
        }
    }

    // Get (own roster, opposing roster) for this side.
    pub fn split<'a>(&self, home: &'a Roster, away: &'a Roster) -> (&'a Roster, &'a Roster) {
        match self {
            Side::Home => (home, away),
            Side::Away => (away, home),
        }
    }
}

// Where a game belongs when it is saved.
#[derive(Debug)]
#[derive(Default, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct GameContext {
    pub season_id: Option<SeasonId>,
    pub is_playoff: bool,
}

impl GameContext {
    pub fn regular(season_id: Option<SeasonId>) -> Self {
        Self { season_id, is_playoff: false }
    }

    pub fn playoff(season_id: SeasonId) -> Self {
        Self { season_id: Some(season_id), is_playoff: true }
    }
}

// A game that has been simulated but not saved.
#[derive(Debug)]
#[derive(Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct SimulatedGame {
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub score: Score,
    pub overtime: bool,
    pub events: Vec<Event>,
    pub stats: StatSheet,
}

impl SimulatedGame {
    pub fn team_id(&self, side: Side) -> TeamId {
        match side {
            Side::Home => self.home_team_id,
            Side::Away => self.away_team_id,
        }
    }

    // The winning team, None for a tie.
    pub fn winner(&self) -> Option<TeamId> {
        self.score.leader().map(|side| self.team_id(side))
    }

    pub fn goals(&self, side: Side) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |event| event.is_goal() && event.side == side)
    }

    // Every goal in the order it was scored.
    pub fn scoring_summary(&self) -> Vec<&Event> {
        let mut goals: Vec<&Event> = self.events.iter().filter(|event| event.is_goal()).collect();
        goals.sort_by_key(|event| (event.period, event.time));
        goals
    }

    pub fn box_score(&self) -> &BoxScore {
        &self.stats.box_score
    }
}

// A saved game.
#[derive(Debug)]
#[derive(Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct Game {
    pub id: GameId,
    pub season_id: Option<SeasonId>,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub home_score: u16,
    pub away_score: u16,
    pub played: bool,
    pub is_playoff: bool,
    pub overtime: bool,
    pub played_at: OffsetDateTime,
}

impl Game {
    pub fn score(&self) -> Score {
        Score::build(self.home_score, self.away_score)
    }

    pub fn winner(&self) -> Option<TeamId> {
        self.score().leader().map(|side| match side {
            Side::Home => self.home_team_id,
            Side::Away => self.away_team_id,
        })
    }
}

// Label of a period for display. Anything past regulation is overtime.
pub fn period_label(period: u8, rules: &SimulationRules) -> String {
    match period > rules.periods {
        true => "OT".to_string(),
        false => period.to_string(),
    }
}

// Simulate a game from start to finish.
// With `overtime` set, a tie after regulation is settled by one sudden-death goal.
pub fn simulate<R: Rng + ?Sized>(rng: &mut R, home: &Roster, away: &Roster, rules: &SimulationRules, overtime: bool) -> Result<SimulatedGame> {
    home.check_playable(rules.min_roster_size.max(1))?;
    away.check_playable(rules.min_roster_size.max(1))?;

    let home_strength = home.strength();
    let away_strength = away.strength();
    let mut score = simulate_score(rng, &home_strength, &away_strength, rules);

    // Play-by-play, home team first in every period.
    let mut events = Vec::new();
    for period in 1..=rules.periods {
        for side in [Side::Home, Side::Away] {
            let count = rules.min_events_per_period as u16 + rng.random_range(0..rules.event_spread.max(1)) as u16;
            for _ in 0..count {
                if let Some(event) = generate_event(rng, period, home, away, side, rules) {
                    events.push(event);
                }
            }
        }
    }

    // Goals are layered on top of the play-by-play.
    for side in [Side::Home, Side::Away] {
        let (team, _) = side.split(home, away);
        for goal_index in 0..score.goals(side) {
            if let Some(goal) = generate_goal(rng, goal_period(goal_index, rules), team, side, rules) {
                events.push(goal);
            }
        }
    }

    let mut went_to_overtime = false;
    if overtime && score.is_tied() {
        let side = overtime_winner(rng, &home_strength, &away_strength);
        let (team, _) = side.split(home, away);
        if let Some(goal) = generate_goal(rng, rules.periods.saturating_add(1), team, side, rules) {
            score.add_goal(side);
            events.push(goal);
            went_to_overtime = true;
        }
    }

    debug!(
        home_team_id = home.team_id,
        away_team_id = away.team_id,
        home_score = score.home,
        away_score = score.away,
        events = events.len(),
        "simulated game"
    );

    Ok(SimulatedGame {
        home_team_id: home.team_id,
        away_team_id: away.team_id,
        stats: accumulate(home, away, score, &events),
        score,
        overtime: went_to_overtime,
        events,
    })
}
