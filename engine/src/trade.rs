// ═══════════════════════════════════════════════════════════════════════
// Affordability resolver — can this city build a card, and at what price?
//
//   1. Shortfall = negative part of (own production - cost). Empty → free.
//   2. Try every resolved alternative combination; one that clears the
//      shortfall → free. Otherwise each distinct residual shortfall is a
//      candidate shopping list.
//   3. A list is feasible when the two neighbours together hold it.
//   4. Each kind is bought first from the cheaper neighbour (left on a
//      tie), as much as it holds, the rest from the other one.
//   5. Coin cost + trade total must stay strictly below the buyer's coins.
//   6. Cheapest feasible list wins; ties go to the earliest found.
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::{Card, Side};
use crate::catalog::Catalog;
use crate::config::GameConfig;
use crate::player::{left_seat, right_seat, PlayerState};
use crate::resources::{Ledger, Resource};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Why a plan costs what it costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Funding {
    /// Own fixed production covers the cost.
    Owned,
    /// One of the either/or combinations covers it.
    Alternative,
    /// The shortfall is bought from neighbours.
    Trade,
    /// A previously built card grants this one for free.
    Chain,
    /// A wonder special waives the cost.
    WonderSpecial,
}

/// Coins paid to the bank and to each neighbour to build something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasePlan {
    pub bank: i32,
    pub left: i32,
    pub right: i32,
    pub funding: Funding,
}

impl PurchasePlan {
    pub fn free(funding: Funding) -> Self {
        PurchasePlan { bank: 0, left: 0, right: 0, funding }
    }

    pub fn bank_only(bank: i32, funding: Funding) -> Self {
        PurchasePlan { bank, left: 0, right: 0, funding }
    }

    pub fn trade_total(&self) -> i32 {
        self.left + self.right
    }

    pub fn total(&self) -> i32 {
        self.bank + self.left + self.right
    }
}

/// Unit price `buyer` pays for `kind` from the neighbour on `side`.
pub fn unit_price(buyer: &PlayerState, side: Side, kind: Resource, config: &GameConfig) -> i32 {
    match kind.market() {
        Some(market) if buyer.has_discount(side, market) => config.discounted_price,
        _ => config.trade_price,
    }
}

/// Resolve a catalog card for `seat`. `None` means unplayable.
pub fn resolve_card(
    players: &[PlayerState],
    seat: usize,
    card: &Card,
    catalog: &Catalog,
    config: &GameConfig,
) -> Option<PurchasePlan> {
    let buyer = &players[seat];
    if buyer.has_built(&card.name, catalog) {
        return None;
    }
    if buyer.free_to_play.contains(&card.name) {
        return Some(PurchasePlan::free(Funding::Chain));
    }
    let plan = resolve_cost(players, seat, &card.cost, config);
    trace!(seat, card = %card.name, ?plan, "resolved card");
    plan
}

/// Resolve a bare cost (wonder stages go through here directly).
pub fn resolve_cost(
    players: &[PlayerState],
    seat: usize,
    cost: &Ledger,
    config: &GameConfig,
) -> Option<PurchasePlan> {
    let buyer = &players[seat];
    let bank = cost.coins();
    // Coins cannot be bought from neighbours.
    if bank > buyer.coins() {
        return None;
    }

    let shortfall = (buyer.resources - cost.without_coins()).negative_subset();
    if shortfall.is_empty() {
        return Some(PurchasePlan::bank_only(bank, Funding::Owned));
    }

    let mut shopping_lists: Vec<Ledger> = Vec::new();
    if buyer.combinations().is_empty() {
        shopping_lists.push(shortfall.abs());
    } else {
        for combo in buyer.combinations() {
            let residual = (shortfall + *combo).negative_subset();
            if residual.is_empty() {
                return Some(PurchasePlan::bank_only(bank, Funding::Alternative));
            }
            let need = residual.abs();
            if !shopping_lists.contains(&need) {
                shopping_lists.push(need);
            }
        }
    }

    let n = players.len();
    let left = &players[left_seat(seat, n)];
    let right = &players[right_seat(seat, n)];

    let mut best: Option<PurchasePlan> = None;
    for need in &shopping_lists {
        let Some((to_left, to_right)) = quote(buyer, left, right, need, config) else {
            continue;
        };
        if bank + to_left + to_right >= buyer.coins() {
            continue;
        }
        let plan = PurchasePlan { bank, left: to_left, right: to_right, funding: Funding::Trade };
        if best.map_or(true, |b| plan.total() < b.total()) {
            best = Some(plan);
        }
    }
    best
}

/// Price of buying `need` from the two neighbours, or `None` if they
/// cannot cover it between them.
pub fn quote(
    buyer: &PlayerState,
    left: &PlayerState,
    right: &PlayerState,
    need: &Ledger,
    config: &GameConfig,
) -> Option<(i32, i32)> {
    let mut to_left = 0;
    let mut to_right = 0;
    for (kind, qty) in need.iter() {
        if kind.market().is_none() || qty < 0 {
            return None;
        }
        let have_left = left.resources[kind].max(0);
        let have_right = right.resources[kind].max(0);
        if have_left + have_right < qty {
            return None;
        }
        let price_left = unit_price(buyer, Side::Left, kind, config);
        let price_right = unit_price(buyer, Side::Right, kind, config);
        if price_right < price_left {
            let from_right = qty.min(have_right);
            to_right += from_right * price_right;
            to_left += (qty - from_right) * price_left;
        } else {
            let from_left = qty.min(have_left);
            to_left += from_left * price_left;
            to_right += (qty - from_left) * price_right;
        }
    }
    Some((to_left, to_right))
}
