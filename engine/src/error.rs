// ═══════════════════════════════════════════════════════════════════════
// Engine errors
//
// None of these are part of normal play. An unaffordable card is a
// `None` from the resolver, not an error. Everything here means a
// malformed catalog entry or a driver feeding the engine an action that
// was never offered, and the simulation should stop with context.
// ═══════════════════════════════════════════════════════════════════════

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A cost or production string used a code outside the resource alphabet.
    #[error("invalid resource kind {0:?}")]
    InvalidResourceKind(char),

    /// The action names a card that was not in the offered candidate set.
    #[error("seat {seat} cannot acquire {card} (age {age}, round {round})")]
    IllegalCardAcquisition {
        seat: usize,
        age: u8,
        round: u8,
        card: String,
    },

    /// Tried to build a stage past the last one.
    #[error("wonder {wonder} has no stage {stage}")]
    WonderStageOverflow { wonder: String, stage: usize },

    #[error("player count must be 3-7, got {0}")]
    InvalidPlayerCount(usize),

    /// The action does not answer the pending decision (or nothing is pending).
    #[error("action does not match pending decision: {0}")]
    ActionMismatch(String),

    #[error("unknown card {0:?}")]
    UnknownCard(String),

    #[error("catalog has {available} wonders, {needed} needed")]
    NotEnoughWonders { available: usize, needed: usize },
}

pub type EngineResult<T> = Result<T, EngineError>;
