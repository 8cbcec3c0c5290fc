pub mod error;
pub mod game;
pub mod runner;
pub mod types;
