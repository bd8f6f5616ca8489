// ═══════════════════════════════════════════════════════════════════════
// End-of-game scoring
//
// Categories are computed independently per seat and summed:
//   military   accumulated conflict tokens (may be negative)
//   treasury   coins / 3
//   wonder     wonder-stage victory points
//   civic      blue-card victory points
//   commerce   points tallies on yellow cards
//   guilds     purple-card tallies against end-of-game boards
//   science    a² + b² + c² + 7·min(a, b, c), best over choices
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::{Card, CardEffect, CardId};
use crate::resources::{cartesian_product, Ledger, Production, Resource};
use crate::player::{left_seat, right_seat, tally};
use crate::types::GameState;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub seat: usize,
    pub military: i32,
    pub treasury: i32,
    pub wonder: i32,
    pub civic: i32,
    pub commerce: i32,
    pub guilds: i32,
    pub science: i32,
    pub total: i32,
}

/// Points for `a`, `b`, `c` science symbols of each kind.
pub fn science_points(a: i32, b: i32, c: i32) -> i32 {
    a * a + b * b + c * c + 7 * a.min(b).min(c)
}

/// Best science score from fixed symbols plus any either/or choices.
fn best_science(fixed: &Ledger, alternatives: &[Vec<Ledger>]) -> i32 {
    let score = |l: &Ledger| {
        science_points(
            l[Resource::Engineering],
            l[Resource::Writing],
            l[Resource::Mathematics],
        )
    };
    // Only science-bearing choices matter; resource choices would only
    // inflate the product.
    let science: Vec<Vec<Ledger>> = alternatives
        .iter()
        .filter(|opts| opts.iter().any(|o| score(o) > 0))
        .cloned()
        .collect();
    if science.is_empty() {
        return score(fixed);
    }
    cartesian_product(&science)
        .iter()
        .map(|combo| score(&(*fixed + *combo)))
        .max()
        .unwrap_or_else(|| score(fixed))
}

/// Score one guild card for `seat`. Guilds that produce (Scientists)
/// score through the science category instead.
fn guild_points(state: &GameState, seat: usize, card: &Card) -> i32 {
    match &card.effect {
        CardEffect::Guild(t) => tally(&state.players, seat, t, &state.catalog),
        _ => 0,
    }
}

/// Score one seat.
pub fn score_player(state: &GameState, seat: usize) -> ScoreBreakdown {
    let catalog = &state.catalog;
    let player = &state.players[seat];
    let res = &player.resources;

    let mut commerce = 0;
    let mut guilds = 0;
    for &id in &player.played {
        let card = catalog.card(id);
        match &card.effect {
            CardEffect::Commerce { points: Some(t), .. } => {
                commerce += tally(&state.players, seat, t, catalog);
            }
            CardEffect::Guild(_) => guilds += guild_points(state, seat, card),
            _ => {}
        }
    }
    let mut science = best_science(res, &player.alternatives);

    if player.specials.copy_guild {
        let (extra_guild, extra_science) = best_copied_guild(state, seat, science);
        guilds += extra_guild;
        science += extra_science;
    }

    let mut score = ScoreBreakdown {
        seat,
        military: player.military_points,
        treasury: player.coins().max(0) / 3,
        wonder: res[Resource::WonderPoints],
        civic: res[Resource::CivicPoints],
        commerce,
        guilds,
        science,
        total: 0,
    };
    score.total = score.military
        + score.treasury
        + score.wonder
        + score.civic
        + score.commerce
        + score.guilds
        + score.science;
    score
}

/// Best neighbour guild `seat` does not already own, as
/// (guild points gained, science points gained).
fn best_copied_guild(state: &GameState, seat: usize, science_now: i32) -> (i32, i32) {
    let catalog = &state.catalog;
    let player = &state.players[seat];
    let n = state.players.len();

    let mut candidates: Vec<CardId> = Vec::new();
    for neighbour in [left_seat(seat, n), right_seat(seat, n)] {
        for &id in &state.players[neighbour].played {
            let card = catalog.card(id);
            if card.is_guild() && !player.has_built(&card.name, catalog) && !candidates.contains(&id) {
                candidates.push(id);
            }
        }
    }

    candidates
        .into_iter()
        .map(|id| {
            let card = catalog.card(id);
            match &card.production {
                Production::Choice(options) => {
                    let mut alternatives = player.alternatives.clone();
                    alternatives.push(options.clone());
                    let gain = best_science(&player.resources, &alternatives) - science_now;
                    (0, gain)
                }
                Production::Fixed(_) => (guild_points(state, seat, card), 0),
            }
        })
        .max_by_key(|(g, s)| g + s)
        .unwrap_or((0, 0))
}

/// Score every seat, in seat order.
pub fn score_game(state: &GameState) -> Vec<ScoreBreakdown> {
    (0..state.players.len()).map(|seat| score_player(state, seat)).collect()
}

/// Seats ordered best first: total, then coins, then seat.
pub fn ranking(state: &GameState, scores: &[ScoreBreakdown]) -> Vec<usize> {
    let mut seats: Vec<usize> = scores.iter().map(|s| s.seat).collect();
    seats.sort_by_key(|&seat| {
        let total = scores.iter().find(|s| s.seat == seat).map_or(0, |s| s.total);
        (Reverse(total), Reverse(state.players[seat].coins()), seat)
    });
    seats
}
