// ═══════════════════════════════════════════════════════════════════════
// Game state — seating, hands, decks, discard pile and pending decision
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::CardId;
use crate::catalog::Catalog;
use crate::config::GameConfig;
use crate::player::{left_seat, right_seat, PlayerState};
use crate::resources::Ledger;
use crate::trade::PurchasePlan;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Every seat acts once per round on the hand it holds.
    Turns,
    /// Hands are down to one card; seats with the special may play it.
    LastCard,
    /// End of round: seats with a pending replay pick from the discards.
    ReplayDiscard,
    Finished,
}

// ── Decisions ──────────────────────────────────────────────────────────

/// A hand card the seat can build, with the price it would pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayOption {
    pub card: CardId,
    pub plan: PurchasePlan,
}

/// Everything the seat may do this turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOptions {
    pub hand: Vec<CardId>,
    /// Affordable hand cards (one entry per distinct card).
    pub playable: Vec<PlayOption>,
    /// Plan for the next wonder stage, if one remains and is affordable.
    pub wonder: Option<PurchasePlan>,
    /// The one-shot free build is in force for this turn.
    pub free_build: bool,
    /// This is the extra action on the last card of the age.
    pub last_card: bool,
}

impl TurnOptions {
    pub fn plan_for(&self, card: CardId) -> Option<PurchasePlan> {
        self.playable.iter().find(|o| o.card == card).map(|o| o.plan)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingDecision {
    ChooseAction { seat: usize, options: TurnOptions },
    /// Build one of `options` from the discard pile for free, or pass.
    PlayDiscarded { seat: usize, options: Vec<CardId> },
}

impl PendingDecision {
    pub fn seat(&self) -> usize {
        match self {
            PendingDecision::ChooseAction { seat, .. } => *seat,
            PendingDecision::PlayDiscarded { seat, .. } => *seat,
        }
    }
}

// ── Action log ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConflictOutcome {
    Victory,
    Defeat,
    Draw,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogEvent {
    Played { card: String, plan: PurchasePlan },
    BuiltStage { wonder: String, stage: usize, plan: PurchasePlan },
    Discarded { card: String },
    PlayedDiscarded { card: String },
    Conflict { opponent: usize, outcome: ConflictOutcome, points: i32 },
}

impl std::fmt::Display for LogEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogEvent::Played { card, plan } if plan.trade_total() > 0 => {
                write!(f, "played {} (paid {} left, {} right)", card, plan.left, plan.right)
            }
            LogEvent::Played { card, .. } => write!(f, "played {}", card),
            LogEvent::BuiltStage { wonder, stage, .. } => {
                write!(f, "activated stage {} of {}", stage, wonder)
            }
            LogEvent::Discarded { card } => write!(f, "discarded {}", card),
            LogEvent::PlayedDiscarded { card } => write!(f, "played {} from the discard pile", card),
            LogEvent::Conflict { opponent, outcome, points } => {
                write!(f, "{:?} against player {} ({:+})", outcome, opponent, points)
            }
        }
    }
}

/// One line of the per-turn action log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub age: u8,
    pub round: u8,
    pub seat: usize,
    pub event: LogEvent,
    /// The seat's ledger right after the event.
    pub resources: Ledger,
}

// ── Game State ─────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub catalog: Arc<Catalog>,
    /// 1..=3
    pub age: u8,
    /// 1-based round within the age.
    pub round: u8,
    pub phase: Phase,
    /// Seat whose turn it is within the current phase.
    pub cursor: usize,
    /// Seating order is trade-adjacency order.
    pub players: Vec<PlayerState>,
    /// `hands[i]` is the hand seat `i` currently holds.
    pub hands: Vec<Vec<CardId>>,
    /// Shuffled decks for ages I-III; emptied as each age is dealt.
    pub decks: Vec<Vec<CardId>>,
    pub discard_pile: Vec<CardId>,
    pub pending: Option<PendingDecision>,
    pub log: Vec<LogEntry>,
}

impl GameState {
    pub fn left_of(&self, seat: usize) -> usize {
        left_seat(seat, self.players.len())
    }

    pub fn right_of(&self, seat: usize) -> usize {
        right_seat(seat, self.players.len())
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn card_name(&self, card: CardId) -> &str {
        &self.catalog.card(card).name
    }
}
