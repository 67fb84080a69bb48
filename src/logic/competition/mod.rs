// A season is played first as a regular season, then as a playoff bracket.
pub mod playoffs;
pub mod season;
