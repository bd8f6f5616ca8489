// ═══════════════════════════════════════════════════════════════════════
// Visibility / Information Model
//
// In the physical game, information is split between:
//   PUBLIC  — built cards, coins, wonder progress, military tokens,
//             hand sizes, the number of discarded cards
//   PRIVATE — the hand the viewer is holding right now
//   HIDDEN  — other hands, deck order, which guilds were drawn
//
// This module produces a "player view" of the game state that only
// contains information that player is legally allowed to know.
// Agents MUST only receive PlayerView, never the raw GameState.
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::CardId;
use crate::catalog::Catalog;
use crate::player::{left_seat, right_seat};
use crate::resources::Ledger;
use crate::types::*;
use crate::wonder::WonderSide;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Public information about one city (visible to all players).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicBoard {
    pub seat: usize,
    pub name: String,
    pub coins: i32,
    /// Fixed production only; either/or choices show up through `played`.
    pub resources: Ledger,
    pub played: Vec<CardId>,
    pub wonder: String,
    pub side: WonderSide,
    pub stages_built: usize,
    pub stage_count: usize,
    pub military_points: i32,
    pub defeats: u32,
    pub hand_size: usize,
}

/// The view of the game state that a specific seat is allowed to see.
/// This is what gets passed to an Agent's decision functions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerView {
    // ── Public info ────────────────────────────────────────
    pub viewer: usize,
    pub age: u8,
    pub round: u8,
    pub phase: Phase,
    pub boards: Vec<PublicBoard>,
    pub discard_count: usize,

    /// Current pending decision (only if it belongs to this seat).
    pub pending: Option<PendingDecision>,

    // ── Private info (only for the viewer) ─────────────────
    pub hand: Vec<CardId>,

    /// Card definitions, for looking up names, costs and effects.
    #[serde(skip)]
    pub catalog: Arc<Catalog>,
}

impl PlayerView {
    pub fn me(&self) -> &PublicBoard {
        &self.boards[self.viewer]
    }

    pub fn left(&self) -> &PublicBoard {
        &self.boards[left_seat(self.viewer, self.boards.len())]
    }

    pub fn right(&self) -> &PublicBoard {
        &self.boards[right_seat(self.viewer, self.boards.len())]
    }
}

/// Build the PlayerView for a specific seat.
pub fn player_view(state: &GameState, viewer: usize) -> PlayerView {
    let boards = state
        .players
        .iter()
        .map(|p| PublicBoard {
            seat: p.seat,
            name: p.name.clone(),
            coins: p.coins(),
            resources: p.resources,
            played: p.played.clone(),
            wonder: p.wonder.name.clone(),
            side: p.wonder.side,
            stages_built: p.wonder.built(),
            stage_count: p.wonder.stage_count(),
            military_points: p.military_points,
            defeats: p.defeats,
            hand_size: state.hands.get(p.seat).map_or(0, |h| h.len()),
        })
        .collect();

    let pending = state
        .pending
        .as_ref()
        .filter(|p| p.seat() == viewer)
        .cloned();

    PlayerView {
        viewer,
        age: state.age,
        round: state.round,
        phase: state.phase,
        boards,
        discard_count: state.discard_pile.len(),
        pending,
        hand: state.hands.get(viewer).cloned().unwrap_or_default(),
        catalog: Arc::clone(&state.catalog),
    }
}
