pub mod competition;
pub mod error;
pub mod game;
pub mod league;
pub mod person;
pub mod ports;
pub mod team;
pub mod types;
