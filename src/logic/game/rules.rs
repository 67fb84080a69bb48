// Tunable constants of the game simulation.
use serde::{Deserialize, Serialize};

pub const MAX_PERIODS: u8 = 10;
pub const MAX_DIFFERENTIAL_MULTIPLIER: f64 = 100.0;

#[derive(Debug, Clone, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationRules {
    // Score model.
    pub max_base_goals: u8,
    pub differential_multiplier: f64,
    pub home_ice_chance: f64,

    // Event model.
    pub assist_chance: f64,
    pub minor_penalty_chance: f64,
    pub minor_penalty_minutes: u8,
    pub major_penalty_minutes: u8,
    pub min_events_per_period: u8,
    pub event_spread: u8,

    // Game format.
    pub periods: u8,
    pub period_minutes: u8,
    pub min_roster_size: usize,

    pub event_weights: EventWeights,
}

impl Default for SimulationRules {
    fn default() -> Self {
        Self {
            max_base_goals: 3,
            differential_multiplier: 6.0,
            home_ice_chance: 0.2,
            assist_chance: 0.7,
            minor_penalty_chance: 0.9,
            minor_penalty_minutes: 2,
            major_penalty_minutes: 4,
            min_events_per_period: 15,
            event_spread: 5,
            periods: 3,
            period_minutes: 20,
            min_roster_size: 6,
            event_weights: EventWeights::default(),
        }
    }
}

impl SimulationRules {
    // Check that the probabilities and counts make sense.
    pub fn validate(&self) -> Result<(), String> {
        for (name, chance) in [
            ("home_ice_chance", self.home_ice_chance),
            ("assist_chance", self.assist_chance),
            ("minor_penalty_chance", self.minor_penalty_chance),
        ] {
            if !(0.0..=1.0).contains(&chance) {
                return Err(format!("{name} must be between 0 and 1, got {chance}"));
            }
        }

        if !(0.0..=MAX_DIFFERENTIAL_MULTIPLIER).contains(&self.differential_multiplier) {
            return Err(format!("differential_multiplier must be between 0 and {MAX_DIFFERENTIAL_MULTIPLIER}, got {}", self.differential_multiplier));
        }
        if self.periods == 0 || self.period_minutes == 0 {
            return Err("a game needs at least one period of at least one minute".to_string());
        }
        if self.periods > MAX_PERIODS {
            return Err(format!("a game has at most {MAX_PERIODS} periods, got {}", self.periods));
        }
        if self.min_roster_size == 0 {
            return Err("min_roster_size must be at least 1".to_string());
        }

        self.event_weights.validate()
    }
}

// Relative likelihood of each kind of play-by-play event.
#[derive(Debug, Clone, Copy, PartialEq)]
#[derive(Serialize, Deserialize)]
#[serde(default)]
pub struct EventWeights {
    pub shot: f64,
    pub hit: f64,
    pub blocked_shot: f64,
    pub penalty: f64,
}

impl Default for EventWeights {
    fn default() -> Self {
        Self {
            shot: 0.6,
            hit: 0.2,
            blocked_shot: 0.1,
            penalty: 0.1,
        }
    }
}

impl EventWeights {
    pub fn total(&self) -> f64 {
        self.shot + self.hit + self.blocked_shot + self.penalty
    }

    fn validate(&self) -> Result<(), String> {
        let weights = [self.shot, self.hit, self.blocked_shot, self.penalty];
        if weights.iter().any(|w| *w < 0.0 || !w.is_finite()) || self.total() <= 0.0 {
            return Err("event weights must be non-negative and not all zero".to_string());
        }
        Ok(())
    }
}
