// An event is anything worth of writing down that happens during a game.
// Shot, hit, blocked shot, penalty, goal.
use std::{fmt, str::FromStr};

use rand::{Rng, seq::IndexedRandom};
use serde::{Deserialize, Serialize};

use crate::logic::{
    error::LeagueError,
    game::{Side, rules::{EventWeights, SimulationRules}, selection::{pick_by_skill, pick_random}},
    person::{player::Player, skills::Skill},
    team::Roster,
    types::PlayerId,
};

#[derive(Eq, Hash, PartialEq)]
#[derive(Debug)]
#[derive(Clone, Copy)]
#[derive(sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Shot,
    Hit,
    BlockedShot,
    Penalty,
    Goal,
}

impl EventKind {
    // Kinds drawn for the play-by-play. Goals are layered in separately.
    pub const PLAY_BY_PLAY: [EventKind; 4] = [EventKind::Shot, EventKind::Hit, EventKind::BlockedShot, EventKind::Penalty];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Shot => "shot",
            EventKind::Hit => "hit",
            EventKind::BlockedShot => "blocked_shot",
            EventKind::Penalty => "penalty",
            EventKind::Goal => "goal",
        }
    }

    fn weight(&self, weights: &EventWeights) -> f64 {
        match self {
            EventKind::Shot => weights.shot,
            EventKind::Hit => weights.hit,
            EventKind::BlockedShot => weights.blocked_shot,
            EventKind::Penalty => weights.penalty,
            EventKind::Goal => 0.0,
        }
    }

    // Draw a play-by-play kind by comparing one uniform draw against cumulative weights.
    pub fn draw<R: Rng + ?Sized>(rng: &mut R, weights: &EventWeights) -> Self {
        let draw = rng.random::<f64>() * weights.total();
        let mut cumulative = 0.0;

        for kind in Self::PLAY_BY_PLAY {
            cumulative += kind.weight(weights);
            if draw <= cumulative {
                return kind;
            }
        }

        // Rounding can leave the draw a hair above the final cumulative weight.
        return EventKind::Penalty;
    }
}

#[derive(Eq, Hash, PartialEq)]
#[derive(Debug)]
#[derive(Clone, Copy)]
#[derive(sqlx::Type, Serialize, Deserialize)]
pub enum Infraction {
    Tripping,
    Holding,
    Interference,
    Slashing,
    HighSticking,
    Hooking,
}

impl Infraction {
    pub const ALL: [Infraction; 6] = [
        Infraction::Tripping,
        Infraction::Holding,
        Infraction::Interference,
        Infraction::Slashing,
        Infraction::HighSticking,
        Infraction::Hooking,
    ];
}

impl fmt::Display for Infraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Infraction::Tripping => "Tripping",
            Infraction::Holding => "Holding",
            Infraction::Interference => "Interference",
            Infraction::Slashing => "Slashing",
            Infraction::HighSticking => "High-sticking",
            Infraction::Hooking => "Hooking",
        })
    }
}

#[derive(Debug)]
#[derive(Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct Penalty {
    pub infraction: Infraction,
    pub minutes: u8,
}

// Time on the period clock, minutes counting up from 1.
#[derive(Debug)]
#[derive(Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
pub struct GameTime {
    pub minute: u8,
    pub second: u8,
}

impl GameTime {
    pub fn build(minute: u8, second: u8) -> Self {
        Self { minute, second }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R, period_minutes: u8) -> Self {
        Self {
            minute: rng.random_range(1..=period_minutes),
            second: rng.random_range(0..60),
        }
    }
}

impl fmt::Display for GameTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:02}", self.minute, self.second)
    }
}

impl FromStr for GameTime {
    type Err = LeagueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LeagueError::invalid_state(format!("malformed game time: {s}"));
        let (minute, second) = s.split_once(':').ok_or_else(invalid)?;
        Ok(Self {
            minute: minute.parse().map_err(|_| invalid())?,
            second: second.parse().map_err(|_| invalid())?,
        })
    }
}

#[derive(Debug)]
#[derive(Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub side: Side,
    pub player_id: PlayerId,

    // Hit target, the shooter whose shot was blocked, or the assist on a goal.
    pub secondary_id: Option<PlayerId>,
    pub period: u8,
    pub time: GameTime,
    pub penalty: Option<Penalty>,
    pub description: String,
}

// Basics.
impl Event {
    fn build(kind: EventKind, side: Side, player: &Player, period: u8, time: GameTime, description: String) -> Self {
        Self {
            kind,
            side,
            player_id: player.id,
            secondary_id: None,
            period,
            time,
            penalty: None,
            description,
        }
    }

    pub fn is_goal(&self) -> bool {
        self.kind == EventKind::Goal
    }

    pub fn penalty_minutes(&self) -> u8 {
        self.penalty.map(|p| p.minutes).unwrap_or(0)
    }
}

// Generate one play-by-play event for the acting side.
// Returns None when the acting side has no skater to attribute the event to.
pub fn generate_event<R: Rng + ?Sized>(rng: &mut R, period: u8, home: &Roster, away: &Roster, side: Side, rules: &SimulationRules) -> Option<Event> {
    let kind = EventKind::draw(rng, &rules.event_weights);
    event_of_kind(rng, kind, period, home, away, side, rules)
}

// Build a play-by-play event of the given kind.
// Goals only come from `generate_goal`, so a goal kind gives None here.
pub fn event_of_kind<R: Rng + ?Sized>(rng: &mut R, kind: EventKind, period: u8, home: &Roster, away: &Roster, side: Side, rules: &SimulationRules) -> Option<Event> {
    let (team, opponents) = side.split(home, away);
    let skaters = team.skaters();
    let opposing_skaters = opponents.skaters();
    let time = GameTime::random(rng, rules.period_minutes);

    let event = match kind {
        EventKind::Shot => {
            let shooter = pick_by_skill(rng, &skaters, Skill::Shooting)?;
            let description = match opponents.starting_goalie() {
                Some(goalie) => format!("Shot by {} saved by {}", shooter.name, goalie.name),
                None => format!("Shot by {}", shooter.name),
            };
            Event::build(kind, side, shooter, period, time, description)
        }
        EventKind::Hit => {
            let hitter = pick_by_skill(rng, &skaters, Skill::Physical)?;
            let target = pick_random(rng, &opposing_skaters);
            let description = match target {
                Some(target) => format!("{} hits {} along the boards", hitter.name, target.name),
                None => format!("{} throws a hit along the boards", hitter.name),
            };
            Event {
                secondary_id: target.map(|t| t.id),
                ..Event::build(kind, side, hitter, period, time, description)
            }
        }
        EventKind::BlockedShot => {
            let defender = pick_by_skill(rng, &skaters, Skill::Defense)?;
            let shot_taker = pick_random(rng, &opposing_skaters);
            let description = match shot_taker {
                Some(shot_taker) => format!("{} blocks a shot from {}", defender.name, shot_taker.name),
                None => format!("{} blocks a shot", defender.name),
            };
            Event {
                secondary_id: shot_taker.map(|t| t.id),
                ..Event::build(kind, side, defender, period, time, description)
            }
        }
        EventKind::Penalty => {
            let offender = pick_by_skill(rng, &skaters, Skill::Physical)?;
            let penalty = draw_penalty(rng, rules);
            let description = format!("{} minute {} penalty to {}", penalty.minutes, penalty.infraction, offender.name);
            Event {
                penalty: Some(penalty),
                ..Event::build(kind, side, offender, period, time, description)
            }
        }
        EventKind::Goal => return None,
    };

    return Some(event);
}

fn draw_penalty<R: Rng + ?Sized>(rng: &mut R, rules: &SimulationRules) -> Penalty {
    let infraction = *Infraction::ALL.choose(rng).unwrap_or(&Infraction::Tripping);
    let minutes = match rng.random::<f64>() < rules.minor_penalty_chance {
        true => rules.minor_penalty_minutes,
        false => rules.major_penalty_minutes,
    };
    Penalty { infraction, minutes }
}

// The period a goal is placed in: two per period, the rest in the last period.
pub fn goal_period(goal_index: u16, rules: &SimulationRules) -> u8 {
    let period = (goal_index / 2 + 1).min(rules.periods as u16);
    period as u8
}

// Generate a goal for the scoring team, with an optional assist.
// The scorer is drawn from the skaters, or from the whole roster if nobody skates.
// Returns None only for an empty roster.
pub fn generate_goal<R: Rng + ?Sized>(rng: &mut R, period: u8, team: &Roster, side: Side, rules: &SimulationRules) -> Option<Event> {
    let mut skaters = team.skaters();
    if skaters.is_empty() {
        skaters = team.players.iter().collect();
    }

    let scorer = pick_by_skill(rng, &skaters, Skill::Shooting)?;
    let assist = match rng.random::<f64>() < rules.assist_chance {
        true => {
            let teammates: Vec<&Player> = skaters.iter().copied().filter(|p| p.id != scorer.id).collect();
            pick_by_skill(rng, &teammates, Skill::Passing)
        }
        false => None,
    };

    let time = GameTime::random(rng, rules.period_minutes);
    let description = match assist {
        Some(assist) => format!("Goal by {}, assisted by {}", scorer.name, assist.name),
        None => format!("Unassisted goal by {}", scorer.name),
    };

    Some(Event {
        secondary_id: assist.map(|a| a.id),
        ..Event::build(EventKind::Goal, side, scorer, period, time, description)
    })
}
