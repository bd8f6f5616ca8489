pub mod runner;
pub mod database;

pub use runner::{run_batch, run_game, GameResult, PlayerResult, RunError};
pub use database::{Database, Standing};
