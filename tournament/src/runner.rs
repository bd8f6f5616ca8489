// ═══════════════════════════════════════════════════════════════════════
// Game Runner — runs complete headless games with agents
// ═══════════════════════════════════════════════════════════════════════

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};
use wonders_agents::{Agent, AgentKind};
use wonders_engine::catalog::Catalog;
use wonders_engine::config::GameConfig;
use wonders_engine::engine;
use wonders_engine::error::EngineError;
use wonders_engine::scoring::{ranking, score_game, ScoreBreakdown};
use wonders_engine::setup::create_initial_state;
use wonders_engine::types::*;
use wonders_engine::visibility::player_view;

#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("game exceeded {limit} decisions without finishing (age {age}, round {round})")]
    DecisionLimit { limit: usize, age: u8, round: u8 },
    #[error("no agent for seat {0}")]
    MissingAgent(usize),
    #[error("game stuck: phase={0:?} with nothing pending")]
    Stuck(Phase),
}

/// Result of a completed game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameResult {
    pub seed: u64,
    /// Seat ranked first.
    pub winner: usize,
    pub decisions: usize,
    /// In seat order.
    pub players: Vec<PlayerResult>,
    pub log: Vec<LogEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerResult {
    pub seat: usize,
    pub name: String,
    pub agent_name: String,
    pub wonder: String,
    pub coins: i32,
    pub score: ScoreBreakdown,
    /// 1 = winner.
    pub rank: usize,
}

impl GameResult {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Seats in finishing order.
    pub fn standings(&self) -> Vec<&PlayerResult> {
        let mut standings: Vec<&PlayerResult> = self.players.iter().collect();
        standings.sort_by_key(|p| p.rank);
        standings
    }
}

/// Run a complete game with the given agents.
/// `agents[i]` plays seat `i`.
/// Returns the result when the game ends.
pub fn run_game(
    agents: &mut [Box<dyn Agent>],
    config: &GameConfig,
    catalog: Arc<Catalog>,
    max_decisions: usize, // safety limit to prevent infinite loops
) -> Result<GameResult, RunError> {
    let mut state = create_initial_state(config.clone(), catalog)?;
    let mut decisions = 0;

    // Main game loop
    loop {
        // Advance engine until it needs a decision or game ends
        engine::advance(&mut state);

        if state.is_finished() {
            let result = build_result(&state, agents, decisions);
            info!(seed = config.seed, winner = result.winner, decisions, "game finished");
            return Ok(result);
        }

        let seat = match &state.pending {
            Some(pending) => pending.seat(),
            None => return Err(RunError::Stuck(state.phase)),
        };
        let agent = agents.get_mut(seat).ok_or(RunError::MissingAgent(seat))?;
        let view = player_view(&state, seat);
        let action = agent.decide(&view);
        debug!(seat, agent = agent.name(), ?action, "decision");
        engine::apply_action(&mut state, action)?;

        decisions += 1;
        if decisions > max_decisions {
            return Err(RunError::DecisionLimit {
                limit: max_decisions,
                age: state.age,
                round: state.round,
            });
        }
    }
}

fn build_result(state: &GameState, agents: &[Box<dyn Agent>], decisions: usize) -> GameResult {
    let scores = score_game(state);
    let order = ranking(state, &scores);

    let players: Vec<PlayerResult> = state
        .players
        .iter()
        .map(|p| PlayerResult {
            seat: p.seat,
            name: p.name.clone(),
            agent_name: agents.get(p.seat).map_or_else(String::new, |a| a.name().to_string()),
            wonder: p.wonder.label(),
            coins: p.coins(),
            score: scores[p.seat],
            rank: order.iter().position(|&s| s == p.seat).map_or(order.len(), |i| i + 1),
        })
        .collect();

    GameResult {
        seed: state.config.seed,
        winner: order.first().copied().unwrap_or(0),
        decisions,
        players,
        log: state.log.clone(),
    }
}

/// Play `games` independent games in parallel. Game `g` uses seed
/// `base.seed + g * 1000`; seat `i` is played by `lineup[i]`.
/// Results come back in game order.
pub fn run_batch(
    lineup: &[AgentKind],
    base: &GameConfig,
    catalog: Arc<Catalog>,
    games: u32,
    max_decisions: usize,
) -> Vec<Result<GameResult, RunError>> {
    (0..games)
        .into_par_iter()
        .map(|g| {
            let seed = base.seed.wrapping_add(g as u64 * 1000);
            let config = GameConfig {
                seed,
                player_count: lineup.len(),
                ..base.clone()
            };
            let mut agents: Vec<Box<dyn Agent>> = lineup
                .iter()
                .enumerate()
                .map(|(seat, kind)| kind.build(seed.wrapping_add(seat as u64)))
                .collect();
            let result = run_game(&mut agents, &config, Arc::clone(&catalog), max_decisions);
            if let Err(e) = &result {
                warn!(game = g, seed, error = %e, "game failed");
            }
            result
        })
        .collect()
}
