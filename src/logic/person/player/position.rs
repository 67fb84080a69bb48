use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::logic::error::LeagueError;

#[derive(Eq, Hash, PartialEq)]
#[derive(Default, Clone, Copy, Debug)]
#[derive(sqlx::Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Position {
    #[default]
    Center,
    LeftWing,
    RightWing,
    Defenseman,
    Goalie,
}

impl Position {
    pub const ALL: [Position; 5] = [
        Position::Center,
        Position::LeftWing,
        Position::RightWing,
        Position::Defenseman,
        Position::Goalie,
    ];

    // Goalies are the only distinguished position in the simulation, everyone else skates.
    pub fn is_goalie(&self) -> bool {
        *self == Position::Goalie
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Center => "center",
            Position::LeftWing => "left_wing",
            Position::RightWing => "right_wing",
            Position::Defenseman => "defenseman",
            Position::Goalie => "goalie",
        }
    }

    pub fn abbreviation(&self) -> &'static str {
        match self {
            Position::Center => "C",
            Position::LeftWing => "LW",
            Position::RightWing => "RW",
            Position::Defenseman => "D",
            Position::Goalie => "G",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = LeagueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_lowercase().replace([' ', '-'], "_");
        Position::ALL.into_iter()
            .find(|position| position.as_str() == normalised || position.abbreviation().eq_ignore_ascii_case(&normalised))
            .ok_or_else(|| LeagueError::invalid_state(format!("unknown position: {s}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_abbreviations() {
        assert_eq!("goalie".parse::<Position>().unwrap(), Position::Goalie);
        assert_eq!("Left Wing".parse::<Position>().unwrap(), Position::LeftWing);
        assert_eq!("d".parse::<Position>().unwrap(), Position::Defenseman);
        assert!("striker".parse::<Position>().is_err());
    }
}
