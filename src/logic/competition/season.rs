use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::Date;

use crate::logic::{error::{LeagueError, Result}, types::SeasonId};

#[derive(Debug)]
#[derive(Clone, PartialEq, Eq)]
#[derive(Serialize, Deserialize)]
#[derive(FromRow)]
pub struct Season {
    pub id: SeasonId,
    pub name: String,
    pub start_date: Date,
    pub end_date: Option<Date>,
    pub is_active: bool,
    pub is_playoffs: bool,
    pub playoffs_started: bool,
}

impl Default for Season {
    fn default() -> Self {
        Self {
            id: SeasonId::default(),
            name: String::default(),
            start_date: Date::MIN,
            end_date: None,
            is_active: true,
            is_playoffs: false,
            playoffs_started: false,
        }
    }
}

impl Season {
    pub fn build(name: &str, start_date: Date) -> Self {
        Self {
            name: name.to_string(),
            start_date,
            ..Default::default()
        }
    }

    // Which part of the season is being played.
    pub fn phase(&self) -> &'static str {
        if !self.is_active {
            return "over";
        }
        match self.is_playoffs {
            true => "playoffs",
            false => "regular season",
        }
    }

    // Make sure the playoffs of this season can still be started.
    pub fn check_can_start_playoffs(&self) -> Result<()> {
        if !self.is_active {
            return Err(LeagueError::invalid_state(format!("season {} is over", self.name)));
        }
        if self.playoffs_started {
            return Err(LeagueError::invalid_state(format!("playoffs of season {} have already started", self.name)));
        }
        Ok(())
    }
}
