// Custom types that are widely used are defined here.
use sqlx::SqlitePool;

pub type Db = SqlitePool;

// Database ID types.
pub type TeamId = u32;
pub type PlayerId = u32;
pub type GameId = u32;
pub type SeasonId = u32;
pub type SeriesId = u32;

// Skill ratings are always between 1 and 100.
pub type SkillValue = u8;

// Round numbers of a playoff bracket, starting from 1.
pub type RoundNumber = u8;
