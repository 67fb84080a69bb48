pub mod player;
pub mod skills;
