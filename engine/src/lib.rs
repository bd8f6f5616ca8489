pub mod error;
pub mod resources;
pub mod cards;
pub mod wonder;
pub mod catalog;
pub mod config;
pub mod player;
pub mod trade;
pub mod types;
pub mod setup;
pub mod engine;
pub mod scoring;
pub mod visibility;

#[cfg(test)]
mod tests;

pub use error::{EngineError, EngineResult};
pub use resources::{Ledger, Production, Resource};
pub use cards::*;
pub use catalog::Catalog;
pub use config::{GameConfig, SidePolicy};
pub use trade::{Funding, PurchasePlan};
pub use types::*;
