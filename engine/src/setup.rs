// ═══════════════════════════════════════════════════════════════════════
// Game setup — creates initial GameState for N players
//
// All randomness happens here: wonder assignment, side choice, guild
// selection and deck order all come from one seeded ChaCha8 stream.
// After setup the game is fully determined by the agents' choices.
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::CardId;
use crate::catalog::Catalog;
use crate::config::{GameConfig, SidePolicy};
use crate::engine::deal_age;
use crate::error::{EngineError, EngineResult};
use crate::player::PlayerState;
use crate::types::*;
use crate::wonder::{Wonder, WonderSide};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use tracing::info;

pub const MIN_PLAYERS: usize = 3;
pub const MAX_PLAYERS: usize = 7;

/// Create a shuffled game from the config's seed.
pub fn create_initial_state(config: GameConfig, catalog: Arc<Catalog>) -> EngineResult<GameState> {
    let n = config.player_count;
    check_player_count(n)?;
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);

    // Each wonder appears twice in the catalog (A and B side).
    let mut names: Vec<&str> = Vec::new();
    for def in &catalog.wonders {
        if !names.contains(&def.name.as_str()) {
            names.push(&def.name);
        }
    }
    if names.len() < n {
        return Err(EngineError::NotEnoughWonders { available: names.len(), needed: n });
    }
    names.shuffle(&mut rng);

    let mut wonders = Vec::with_capacity(n);
    for name in names.into_iter().take(n) {
        let side = match config.wonder_side {
            SidePolicy::A => WonderSide::A,
            SidePolicy::B => WonderSide::B,
            SidePolicy::Random if rng.gen_bool(0.5) => WonderSide::B,
            SidePolicy::Random => WonderSide::A,
        };
        let def = catalog
            .wonders
            .iter()
            .find(|d| d.name == name && d.side == side)
            .or_else(|| catalog.wonders.iter().find(|d| d.name == name))
            .ok_or_else(|| EngineError::NotEnoughWonders { available: 0, needed: n })?;
        wonders.push(Wonder::new(def));
    }

    let mut decks: Vec<Vec<CardId>> = (1..=3).map(|age| catalog.age_deck(age, n)).collect();
    let mut guilds: Vec<CardId> = catalog.guilds().map(|c| c.id).collect();
    guilds.shuffle(&mut rng);
    guilds.truncate(n + 2);
    decks[2].extend(guilds);
    for deck in &mut decks {
        deck.shuffle(&mut rng);
    }

    create_state_with(config, catalog, wonders, decks)
}

/// Create a game from explicit wonders and deck orders. Decks are dealt
/// as given, so tests can stage exact hands.
pub fn create_state_with(
    config: GameConfig,
    catalog: Arc<Catalog>,
    wonders: Vec<Wonder>,
    decks: Vec<Vec<CardId>>,
) -> EngineResult<GameState> {
    let n = config.player_count;
    check_player_count(n)?;
    if wonders.len() < n {
        return Err(EngineError::NotEnoughWonders { available: wonders.len(), needed: n });
    }

    let players: Vec<PlayerState> = wonders
        .into_iter()
        .take(n)
        .enumerate()
        .map(|(seat, wonder)| PlayerState::new(seat, config.player_name(seat), wonder, config.starting_coins))
        .collect();

    let mut decks = decks;
    decks.resize(3, Vec::new());

    let mut state = GameState {
        config,
        catalog,
        age: 1,
        round: 1,
        phase: Phase::Turns,
        cursor: 0,
        players,
        hands: Vec::new(),
        decks,
        discard_pile: Vec::new(),
        pending: None,
        log: Vec::new(),
    };
    deal_age(&mut state);
    for p in &state.players {
        info!(seat = p.seat, name = %p.name, wonder = %p.wonder.label(), "seated");
    }
    Ok(state)
}

fn check_player_count(n: usize) -> EngineResult<()> {
    if (MIN_PLAYERS..=MAX_PLAYERS).contains(&n) {
        Ok(())
    } else {
        Err(EngineError::InvalidPlayerCount(n))
    }
}
