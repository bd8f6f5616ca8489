// ═══════════════════════════════════════════════════════════════════════
// Wonders — per-player stage state machine
// ═══════════════════════════════════════════════════════════════════════

use crate::error::{EngineError, EngineResult};
use crate::resources::{Ledger, Production};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WonderSide {
    A,
    B,
}

impl std::fmt::Display for WonderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WonderSide::A => write!(f, "A"),
            WonderSide::B => write!(f, "B"),
        }
    }
}

/// Non-resource effects a stage can switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WonderSpecial {
    /// Once: the next turn may build any hand card for free.
    FreeBuild,
    /// Once: at the end of the round, build a discarded card for free.
    ReplayDiscard,
    /// Every age: the last card of the hand may be played too.
    PlayLastCard,
    /// Raw materials from both neighbours at the discounted price.
    RawTradeDiscount,
    /// At game end, score the best guild held by a neighbour.
    CopyGuild,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WonderStage {
    pub cost: Ledger,
    pub production: Production,
    pub special: Option<WonderSpecial>,
}

/// Catalog definition of one side of one wonder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WonderDef {
    pub name: String,
    pub side: WonderSide,
    /// Production the city starts with.
    pub starting: Ledger,
    pub stages: Vec<WonderStage>,
}

/// A wonder in play. The only mutation is advancing `built`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wonder {
    pub name: String,
    pub side: WonderSide,
    pub starting: Ledger,
    stages: Vec<WonderStage>,
    built: usize,
}

impl Wonder {
    pub fn new(def: &WonderDef) -> Self {
        Wonder {
            name: def.name.clone(),
            side: def.side,
            starting: def.starting,
            stages: def.stages.clone(),
            built: 0,
        }
    }

    /// Number of stages built so far (0 = unbuilt).
    pub fn built(&self) -> usize {
        self.built
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn is_complete(&self) -> bool {
        self.built >= self.stages.len()
    }

    /// The stage the next `advance` would build.
    pub fn next_stage(&self) -> Option<&WonderStage> {
        self.stages.get(self.built)
    }

    /// Build the next stage and return it.
    pub fn advance(&mut self) -> EngineResult<WonderStage> {
        let stage = self.stages.get(self.built).cloned().ok_or_else(|| {
            EngineError::WonderStageOverflow {
                wonder: self.label(),
                stage: self.built + 1,
            }
        })?;
        self.built += 1;
        Ok(stage)
    }

    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.side)
    }
}
