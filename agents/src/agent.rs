// ═══════════════════════════════════════════════════════════════════════
// Agent Trait — interface that all card selection policies implement
//
// KEY DESIGN PRINCIPLE:
//   Agents receive a `PlayerView` (not raw GameState), which only
//   contains information the player is legally allowed to see.
//   This enforces information hiding at the type level.
//
//   The agent never gets to see:
//     - Other seats' hands
//     - Deck order, or which guilds were drawn into age III
// ═══════════════════════════════════════════════════════════════════════

use crate::heuristic::HeuristicAgent;
use crate::random::RandomAgent;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use wonders_engine::cards::CardId;
use wonders_engine::engine::Action;
use wonders_engine::types::{PendingDecision, TurnOptions};
use wonders_engine::visibility::PlayerView;

/// Trait that all agents must implement.
/// Each method corresponds to a pending decision type.
pub trait Agent: Send + Sync {
    /// Human-readable name for this agent (e.g., "Random", "Heuristic").
    fn name(&self) -> &str;

    /// Make a decision based on the current player view.
    /// This is the universal entry point; it dispatches to the methods below.
    /// With nothing pending for this seat the agent passes.
    fn decide(&mut self, view: &PlayerView) -> Action {
        match view.pending.as_ref() {
            Some(PendingDecision::ChooseAction { options, .. }) => self.choose_action(view, options),
            Some(PendingDecision::PlayDiscarded { options, .. }) => {
                Action::PlayDiscarded(self.choose_discarded(view, options))
            }
            None => Action::PlayDiscarded(None),
        }
    }

    /// Pick a card to play, a card to tuck under the wonder, or a card to sell.
    fn choose_action(&mut self, view: &PlayerView, options: &TurnOptions) -> Action;

    /// Pick a discarded card to build for free. None = pass.
    fn choose_discarded(&mut self, view: &PlayerView, options: &[CardId]) -> Option<CardId>;
}

/// Policies the runner can seat by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Random,
    Heuristic,
}

impl AgentKind {
    pub fn build(self, seed: u64) -> Box<dyn Agent> {
        match self {
            AgentKind::Random => Box::new(RandomAgent::new(seed)),
            AgentKind::Heuristic => Box::new(HeuristicAgent::new(seed)),
        }
    }
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(AgentKind::Random),
            "heuristic" => Ok(AgentKind::Heuristic),
            other => Err(format!("unknown agent '{}' (expected random or heuristic)", other)),
        }
    }
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgentKind::Random => write!(f, "random"),
            AgentKind::Heuristic => write!(f, "heuristic"),
        }
    }
}
