// ═══════════════════════════════════════════════════════════════════════
// Player state — one city: ledger, built cards, wonder, alternatives
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::{CardId, Color, Counted, Scope, Side, Tally};
use crate::catalog::Catalog;
use crate::resources::{cartesian_product, Ledger, Market, Resource};
use crate::wonder::Wonder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A neighbour market this player buys from at the discounted price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TradeDiscount {
    pub side: Side,
    pub market: Market,
}

/// Wonder specials currently switched on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specials {
    /// One-shot: next turn offers every hand card at zero cost.
    pub free_build: bool,
    /// One-shot: at the end of this round, build from the discard pile.
    pub replay_discard: bool,
    pub play_last_card: bool,
    pub copy_guild: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub seat: usize,
    pub name: String,
    pub resources: Ledger,
    /// Append-only, in build order.
    pub played: Vec<CardId>,
    /// Card names this player may build without paying.
    pub free_to_play: BTreeSet<String>,
    pub military_points: i32,
    pub defeats: u32,
    pub wonder: Wonder,
    /// One entry per either/or production held.
    pub alternatives: Vec<Vec<Ledger>>,
    /// Cartesian product of the alternatives that yield tradeable goods.
    combinations: Vec<Ledger>,
    pub discounts: Vec<TradeDiscount>,
    pub specials: Specials,
}

impl PlayerState {
    pub fn new(seat: usize, name: String, wonder: Wonder, starting_coins: i32) -> Self {
        let mut resources = Ledger::single(Resource::Coin, starting_coins);
        resources += wonder.starting;
        PlayerState {
            seat,
            name,
            resources,
            played: Vec::new(),
            free_to_play: BTreeSet::new(),
            military_points: 0,
            defeats: 0,
            wonder,
            alternatives: Vec::new(),
            combinations: Vec::new(),
            discounts: Vec::new(),
            specials: Specials::default(),
        }
    }

    pub fn coins(&self) -> i32 {
        self.resources.coins()
    }

    pub fn combinations(&self) -> &[Ledger] {
        &self.combinations
    }

    /// Record a new either/or production and rebuild the product.
    /// Science-only choices are kept for scoring and stay out of the product.
    pub fn add_alternatives(&mut self, options: Vec<Ledger>) {
        if options.is_empty() {
            return;
        }
        self.alternatives.push(options);
        let goods: Vec<Vec<Ledger>> = self
            .alternatives
            .iter()
            .filter(|choice| choice.iter().any(yields_goods))
            .cloned()
            .collect();
        self.combinations = cartesian_product(&goods);
    }

    /// Cards are identified by name; the same name can appear in two ages.
    pub fn has_built(&self, name: &str, catalog: &Catalog) -> bool {
        self.played.iter().any(|&id| catalog.card(id).name == name)
    }

    pub fn count_color(&self, color: Color, catalog: &Catalog) -> i32 {
        self.played
            .iter()
            .filter(|&&id| catalog.card(id).color == color)
            .count() as i32
    }

    pub fn has_discount(&self, side: Side, market: Market) -> bool {
        self.discounts
            .iter()
            .any(|d| d.market == market && d.side.includes(side))
    }
}

fn yields_goods(option: &Ledger) -> bool {
    option.iter().any(|(kind, qty)| qty > 0 && kind.market().is_some())
}

// ── Seating ────────────────────────────────────────────────────────────

pub fn left_seat(seat: usize, players: usize) -> usize {
    (seat + players - 1) % players
}

pub fn right_seat(seat: usize, players: usize) -> usize {
    (seat + 1) % players
}

/// Evaluate a tally for `seat` against the current boards.
pub fn tally(players: &[PlayerState], seat: usize, tally: &Tally, catalog: &Catalog) -> i32 {
    let n = players.len();
    let seats: Vec<usize> = match tally.scope {
        Scope::Own => vec![seat],
        Scope::Neighbors => vec![left_seat(seat, n), right_seat(seat, n)],
        Scope::OwnAndNeighbors => vec![left_seat(seat, n), seat, right_seat(seat, n)],
    };
    let count: i32 = seats
        .iter()
        .map(|&s| {
            let p = &players[s];
            match &tally.counted {
                Counted::Cards(colors) => colors.iter().map(|&c| p.count_color(c, catalog)).sum(),
                Counted::WonderStages => p.wonder.built() as i32,
                Counted::Defeats => p.defeats as i32,
            }
        })
        .sum();
    count * tally.each
}
