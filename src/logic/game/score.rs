// Derive the final score of a game from the strengths of the two teams.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::logic::{game::{Side, rules::SimulationRules}, team::strength::TeamStrength};

#[derive(Debug)]
#[derive(Default, Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
pub struct Score {
    pub home: u16,
    pub away: u16,
}

impl Score {
    pub fn build(home: u16, away: u16) -> Self {
        Self { home, away }
    }

    pub fn goals(&self, side: Side) -> u16 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }

    pub fn add_goal(&mut self, side: Side) {
        match side {
            Side::Home => self.home = self.home.saturating_add(1),
            Side::Away => self.away = self.away.saturating_add(1),
        }
    }

    // The side with more goals, or None for a tie.
    pub fn leader(&self) -> Option<Side> {
        if self.home > self.away {
            return Some(Side::Home);
        }
        if self.away > self.home {
            return Some(Side::Away);
        }
        return None;
    }

    pub fn is_tied(&self) -> bool {
        self.home == self.away
    }
}

// Simulate the regulation score.
// Order of the random draws: home base goals, away base goals, home-ice bonus.
pub fn simulate_score<R: Rng + ?Sized>(rng: &mut R, home: &TeamStrength, away: &TeamStrength, rules: &SimulationRules) -> Score {
    let mut score = Score::build(
        rng.random_range(0..=rules.max_base_goals) as u16,
        rng.random_range(0..=rules.max_base_goals) as u16,
    );

    score.home = score.home.saturating_add(skill_bonus(home, away, rules));
    score.away = score.away.saturating_add(skill_bonus(away, home, rules));

    if rng.random::<f64>() < rules.home_ice_chance {
        score.home = score.home.saturating_add(1);
    }

    return score;
}

// Extra goals for an offense that outclasses the opposing goaltending. Never negative.
pub fn skill_bonus(attacker: &TeamStrength, defender: &TeamStrength, rules: &SimulationRules) -> u16 {
    let differential = (attacker.offense - defender.goaltending) / 100.0;
    (differential * rules.differential_multiplier).max(0.0).floor() as u16
}

// Decide who scores the sudden-death goal, proportionally to overall strength.
pub fn overtime_winner<R: Rng + ?Sized>(rng: &mut R, home: &TeamStrength, away: &TeamStrength) -> Side {
    let total = home.overall + away.overall;
    let home_chance = match total > 0.0 {
        true => home.overall / total,
        false => 0.5,
    };

    match rng.random::<f64>() < home_chance {
        true => Side::Home,
        false => Side::Away,
    }
}
