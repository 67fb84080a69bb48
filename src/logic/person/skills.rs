use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::logic::{error::{LeagueError, Result}, types::SkillValue};

// Skill data.
#[derive(Hash, PartialEq, Eq)]
#[derive(Debug)]
#[derive(Clone, Copy)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Skill {
    Skating,
    Shooting,
    Passing,
    Defense,
    Physical,
    Goaltending,
}

impl Skill {
    pub const ALL: [Skill; 6] = [
        Skill::Skating,
        Skill::Shooting,
        Skill::Passing,
        Skill::Defense,
        Skill::Physical,
        Skill::Goaltending,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Skill::Skating => "skating",
            Skill::Shooting => "shooting",
            Skill::Passing => "passing",
            Skill::Defense => "defense",
            Skill::Physical => "physical",
            Skill::Goaltending => "goaltending",
        }
    }
}

// The full rating profile of a player.
// Always fully populated: missing ratings are filled in when the profile is built.
#[derive(Debug)]
#[derive(Clone, Copy, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[derive(FromRow)]
pub struct Skills {
    pub skating: SkillValue,
    pub shooting: SkillValue,
    pub passing: SkillValue,
    pub defense: SkillValue,
    pub physical: SkillValue,
    pub goaltending: SkillValue,
}

impl Default for Skills {
    fn default() -> Self {
        Self::uniform(Self::DEFAULT)
    }
}

// Basics.
impl Skills {
    // The rating limits.
    pub const MIN: SkillValue = 1;
    pub const MAX: SkillValue = 100;
    pub const DEFAULT: SkillValue = 50;

    // Build a profile, clamping every rating inside the allowed range.
    pub fn build(skating: SkillValue, shooting: SkillValue, passing: SkillValue, defense: SkillValue, physical: SkillValue, goaltending: SkillValue) -> Self {
        Self {
            skating: Self::clamp(skating),
            shooting: Self::clamp(shooting),
            passing: Self::clamp(passing),
            defense: Self::clamp(defense),
            physical: Self::clamp(physical),
            goaltending: Self::clamp(goaltending),
        }
    }

    // Every skill at the same value.
    pub fn uniform(value: SkillValue) -> Self {
        let value = Self::clamp(value);
        Self {
            skating: value,
            shooting: value,
            passing: value,
            defense: value,
            physical: value,
            goaltending: value,
        }
    }

    // Build a profile for an explicit skill-set operation. Out of range ratings are an error, not clamped.
    pub fn validated(skating: SkillValue, shooting: SkillValue, passing: SkillValue, defense: SkillValue, physical: SkillValue, goaltending: SkillValue) -> Result<Self> {
        let skills = Self { skating, shooting, passing, defense, physical, goaltending };
        for skill in Skill::ALL {
            let value = skills.get(skill);
            if !(Self::MIN..=Self::MAX).contains(&value) {
                return Err(LeagueError::invalid_state(format!(
                    "{} must be between {} and {}, got {value}", skill.name(), Self::MIN, Self::MAX
                )));
            }
        }
        Ok(skills)
    }

    fn clamp(value: SkillValue) -> SkillValue {
        value.clamp(Self::MIN, Self::MAX)
    }
}

// Functional.
impl Skills {
    pub fn get(&self, skill: Skill) -> SkillValue {
        match skill {
            Skill::Skating => self.skating,
            Skill::Shooting => self.shooting,
            Skill::Passing => self.passing,
            Skill::Defense => self.defense,
            Skill::Physical => self.physical,
            Skill::Goaltending => self.goaltending,
        }
    }

    // Mean of shooting and passing, the offensive contribution of a skater.
    pub fn offense(&self) -> f64 {
        (self.shooting as f64 + self.passing as f64) / 2.0
    }
}

// Ratings as they come from storage or user input, any of which may be absent.
#[derive(Debug, Default, Clone, Copy)]
#[derive(Serialize, Deserialize)]
pub struct PartialSkills {
    pub skating: Option<SkillValue>,
    pub shooting: Option<SkillValue>,
    pub passing: Option<SkillValue>,
    pub defense: Option<SkillValue>,
    pub physical: Option<SkillValue>,
    pub goaltending: Option<SkillValue>,
}

impl PartialSkills {
    pub fn is_empty(&self) -> bool {
        [self.skating, self.shooting, self.passing, self.defense, self.physical, self.goaltending]
            .iter()
            .all(Option::is_none)
    }

    // A full profile for a new player. Missing ratings are 50, given ones must be in range.
    pub fn complete(&self) -> Result<Skills> {
        self.apply(&Skills::default())
    }

    // Overwrite the given ratings of an existing profile, keeping the rest.
    pub fn apply(&self, current: &Skills) -> Result<Skills> {
        Skills::validated(
            self.skating.unwrap_or(current.skating),
            self.shooting.unwrap_or(current.shooting),
            self.passing.unwrap_or(current.passing),
            self.defense.unwrap_or(current.defense),
            self.physical.unwrap_or(current.physical),
            self.goaltending.unwrap_or(current.goaltending),
        )
    }
}
