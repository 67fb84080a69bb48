// Fold a finished game into additive statistic updates.
use std::{collections::BTreeMap, ops::AddAssign};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::logic::{
    game::{Side, event::{Event, EventKind}, score::Score},
    team::Roster,
    types::{PlayerId, TeamId},
};

// Additive update to the statistics of one player. Zero fields leave the stat untouched.
#[derive(Debug)]
#[derive(Default, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct StatDelta {
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

impl StatDelta {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl AddAssign for StatDelta {
    fn add_assign(&mut self, other: Self) {
        self.games_played += other.games_played;
        self.goals += other.goals;
        self.assists += other.assists;
        self.shots += other.shots;
        self.hits += other.hits;
        self.blocks += other.blocks;
        self.penalty_minutes += other.penalty_minutes;
        self.plus_minus += other.plus_minus;
        self.saves += other.saves;
        self.goals_against += other.goals_against;
        self.shutouts += other.shutouts;
    }
}

#[derive(Debug)]
#[derive(Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Win,
    Loss,
    Tie,
}

// Per-side totals of the play-by-play.
#[derive(Debug)]
#[derive(Default, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct TeamGameStats {
    pub shots: u32,
    pub hits: u32,
    pub blocked_shots: u32,
    pub penalty_minutes: u32,
}

#[derive(Debug)]
#[derive(Default, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct BoxScore {
    pub home: TeamGameStats,
    pub away: TeamGameStats,
}

impl BoxScore {
    pub fn side(&self, side: Side) -> &TeamGameStats {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut TeamGameStats {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }
}

// Update to the record and team statistics of one team.
#[derive(Debug)]
#[derive(Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct TeamDelta {
    pub team_id: TeamId,
    pub side: Side,
    pub outcome: Outcome,
    pub goals_for: u32,
    pub goals_against: u32,
    pub shots_for: u32,
    pub shots_against: u32,
    pub penalty_minutes: u32,
}

// Everything a finished game adds to the persistent statistics.
#[derive(Debug)]
#[derive(Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct StatSheet {
    pub players: BTreeMap<PlayerId, StatDelta>,
    pub home: TeamDelta,
    pub away: TeamDelta,
    pub box_score: BoxScore,
}

impl StatSheet {
    pub fn player(&self, id: PlayerId) -> StatDelta {
        self.players.get(&id).copied().unwrap_or_default()
    }
}

// Build the stat sheet of a game from its rosters, final score and every event.
pub fn accumulate(home: &Roster, away: &Roster, score: Score, events: &[Event]) -> StatSheet {
    let mut players: BTreeMap<PlayerId, StatDelta> = BTreeMap::new();
    let mut box_score = BoxScore::default();

    for player in home.players.iter().chain(away.players.iter()) {
        players.entry(player.id).or_default().games_played += 1;
    }

    let mut credit = |id: PlayerId, delta: StatDelta| {
        *players.entry(id).or_default() += delta;
    };

    for event in events {
        let totals = box_score.side_mut(event.side);
        match event.kind {
            EventKind::Shot => {
                totals.shots += 1;
                credit(event.player_id, StatDelta { shots: 1, ..Default::default() });
            }
            EventKind::Hit => {
                totals.hits += 1;
                credit(event.player_id, StatDelta { hits: 1, ..Default::default() });
            }
            EventKind::BlockedShot => {
                totals.blocked_shots += 1;
                credit(event.player_id, StatDelta { blocks: 1, ..Default::default() });
            }
            EventKind::Penalty => {
                let minutes = event.penalty_minutes() as u32;
                totals.penalty_minutes += minutes;
                credit(event.player_id, StatDelta { penalty_minutes: minutes, ..Default::default() });
            }
            EventKind::Goal => {
                credit(event.player_id, StatDelta { goals: 1, shots: 1, plus_minus: 1, ..Default::default() });
                if let Some(assist) = event.secondary_id {
                    credit(assist, StatDelta { assists: 1, plus_minus: 1, ..Default::default() });
                }

                let (_, opponents) = event.side.split(home, away);
                if let Some(goalie) = opponents.starting_goalie() {
                    credit(goalie.id, StatDelta { goals_against: 1, plus_minus: -1, ..Default::default() });
                }
            }
        }
    }

    for side in [Side::Home, Side::Away] {
        let (team, _) = side.split(home, away);
        let Some(goalie) = team.starting_goalie() else { continue };

        let shots_against = box_score.side(side.opponent()).shots;
        let goals_allowed = score.goals(side.opponent()) as u32;
        if goals_allowed > shots_against {
            warn!(goalie_id = goalie.id, shots_against, goals_allowed, "more goals than recorded shots, flooring saves at zero");
        }

        credit(goalie.id, StatDelta {
            saves: shots_against.saturating_sub(goals_allowed),
            shutouts: (goals_allowed == 0) as u32,
            ..Default::default()
        });
    }

    StatSheet {
        home: team_delta(home.team_id, Side::Home, score, &box_score),
        away: team_delta(away.team_id, Side::Away, score, &box_score),
        players,
        box_score,
    }
}

fn team_delta(team_id: TeamId, side: Side, score: Score, box_score: &BoxScore) -> TeamDelta {
    let outcome = match score.leader() {
        Some(leader) if leader == side => Outcome::Win,
        Some(_) => Outcome::Loss,
        None => Outcome::Tie,
    };

    TeamDelta {
        team_id,
        side,
        outcome,
        goals_for: score.goals(side) as u32,
        goals_against: score.goals(side.opponent()) as u32,
        shots_for: box_score.side(side).shots,
        shots_against: box_score.side(side.opponent()).shots,
        penalty_minutes: box_score.side(side).penalty_minutes,
    }
}
