// Aggregate team strength out of individual ratings.
use serde::{Deserialize, Serialize};

use crate::logic::person::{player::Player, skills::Skills};

#[derive(Debug)]
#[derive(Clone, Copy, PartialEq)]
#[derive(Serialize, Deserialize)]
pub struct TeamStrength {
    pub skating: f64,
    pub offense: f64,
    pub defense: f64,
    pub goaltending: f64,
    pub overall: f64,
}

impl TeamStrength {
    // Weights of the overall blend.
    const SKATING_WEIGHT: f64 = 1.0;
    const OFFENSE_WEIGHT: f64 = 1.0;
    const DEFENSE_WEIGHT: f64 = 2.0;
    const GOALTENDING_WEIGHT: f64 = 3.0;

    // Evaluate the strength of a group of players.
    // Goalies only count towards goaltending, everyone else only towards the skater averages.
    pub fn evaluate(players: &[Player]) -> Self {
        let skaters: Vec<&Skills> = players.iter().filter(|p| !p.is_goalie()).map(|p| &p.skills).collect();
        let goalies: Vec<&Skills> = players.iter().filter(|p| p.is_goalie()).map(|p| &p.skills).collect();

        let skating = Self::skater_mean(&skaters, |s| s.skating as f64);
        let offense = Self::skater_mean(&skaters, Skills::offense);
        let defense = Self::skater_mean(&skaters, |s| s.defense as f64);

        let goaltending = match goalies.is_empty() {
            true => Skills::DEFAULT as f64,
            false => goalies.iter().map(|s| s.goaltending as f64).sum::<f64>() / goalies.len() as f64,
        };

        Self::build(skating, offense, defense, goaltending)
    }

    pub fn build(skating: f64, offense: f64, defense: f64, goaltending: f64) -> Self {
        let overall = (
            skating * Self::SKATING_WEIGHT +
            offense * Self::OFFENSE_WEIGHT +
            defense * Self::DEFENSE_WEIGHT +
            goaltending * Self::GOALTENDING_WEIGHT
        ) / (Self::SKATING_WEIGHT + Self::OFFENSE_WEIGHT + Self::DEFENSE_WEIGHT + Self::GOALTENDING_WEIGHT);

        Self { skating, offense, defense, goaltending, overall }
    }

    // Mean over the skaters. An empty group falls back to the neutral rating.
    fn skater_mean(skaters: &[&Skills], value: impl Fn(&Skills) -> f64) -> f64 {
        if skaters.is_empty() {
            return Skills::DEFAULT as f64;
        }
        skaters.iter().map(|s| value(s)).sum::<f64>() / skaters.len() as f64
    }
}
