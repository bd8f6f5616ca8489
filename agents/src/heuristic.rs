// ═══════════════════════════════════════════════════════════════════════
// Heuristic Agent — greedy one-ply value estimate.
// Significantly stronger than RandomAgent.
//
// Every candidate gets a rough victory-point value against the public
// boards: direct points, the science gain, shields that change a
// neighbour contest, production early in the game, guild tallies.
// Coins spent are charged at a third of a point each.
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::Agent;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wonders_engine::cards::{Card, CardEffect, CardId, Counted, Scope, Tally};
use wonders_engine::engine::Action;
use wonders_engine::resources::{Ledger, Production, Resource};
use wonders_engine::scoring::science_points;
use wonders_engine::trade::PurchasePlan;
use wonders_engine::types::TurnOptions;
use wonders_engine::visibility::{PlayerView, PublicBoard};
use wonders_engine::wonder::{WonderSpecial, WonderStage};

/// Value of one coin in points.
const COIN: f64 = 1.0 / 3.0;
/// Value of selling a card to the bank.
const SELL: f64 = 0.9;

pub struct HeuristicAgent {
    rng: ChaCha8Rng,
}

impl HeuristicAgent {
    pub fn new(seed: u64) -> Self {
        HeuristicAgent {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Small random nudge so equal candidates do not always resolve the same way.
    fn jitter(&mut self) -> f64 {
        self.rng.gen_range(0.0..0.01)
    }

    /// Estimated value of owning `card` now.
    fn card_value(&self, view: &PlayerView, card: &Card) -> f64 {
        let me = view.me();
        let mut value = self.production_value(view, &card.production);

        value += match &card.effect {
            CardEffect::None => 0.0,
            CardEffect::TradingPost { .. } => match view.age {
                1 => 1.5,
                2 => 0.8,
                _ => 0.0,
            },
            CardEffect::Commerce { coins, points } => {
                let coins = coins.as_ref().map_or(0, |t| board_tally(view, t) + self_bonus(card, t));
                let points = points.as_ref().map_or(0, |t| board_tally(view, t) + self_bonus(card, t));
                coins as f64 * COIN + points as f64
            }
            CardEffect::Guild(t) => board_tally(view, t) as f64,
        };

        // Chains pay off later, less so as the game runs out.
        let later = (3 - view.age.min(3)) as f64;
        value += card.grants_free.len() as f64 * 0.4 * later;

        if me.played.iter().any(|&id| view.catalog.card(id).name == card.name) {
            value = f64::MIN;
        }
        value
    }

    fn production_value(&self, view: &PlayerView, production: &Production) -> f64 {
        match production {
            Production::Fixed(ledger) => self.ledger_value(view, ledger),
            Production::Choice(options) => options
                .iter()
                .map(|o| self.ledger_value(view, o))
                .fold(0.0, f64::max),
        }
    }

    fn ledger_value(&self, view: &PlayerView, ledger: &Ledger) -> f64 {
        let me = view.me();
        let mut value = 0.0;

        value += ledger[Resource::CivicPoints] as f64;
        value += ledger[Resource::WonderPoints] as f64;
        value += ledger[Resource::Coin] as f64 * COIN;

        // Science: marginal gain of the symbols.
        let have = &me.resources;
        let before = science_points(
            have[Resource::Engineering],
            have[Resource::Writing],
            have[Resource::Mathematics],
        );
        let after = science_points(
            have[Resource::Engineering] + ledger[Resource::Engineering],
            have[Resource::Writing] + ledger[Resource::Writing],
            have[Resource::Mathematics] + ledger[Resource::Mathematics],
        );
        value += (after - before) as f64;

        // Shields only matter when they change a contest with a neighbour.
        let shields = ledger[Resource::Military];
        if shields > 0 {
            let mine = have[Resource::Military];
            let win = (1 + 2 * (view.age as i32 - 1)) as f64;
            for rival in [view.left(), view.right()] {
                let theirs = rival.resources[Resource::Military];
                if mine <= theirs && mine + shields > theirs {
                    value += win + 1.0;
                } else if mine + shields > theirs {
                    value += 0.3;
                }
            }
        }

        // Goods are worth the most while there is still a lot to build.
        let goods: i32 = Resource::ALL
            .iter()
            .filter(|r| r.market().is_some())
            .map(|&r| ledger[r])
            .sum();
        let weight = match view.age {
            1 => 1.5,
            2 => 0.8,
            _ => 0.1,
        };
        value += goods as f64 * weight;
        value
    }

    fn stage_value(&self, view: &PlayerView, stage: &WonderStage) -> f64 {
        let mut value = self.production_value(view, &stage.production);
        value += match stage.special {
            None => 0.0,
            Some(WonderSpecial::FreeBuild) => 3.0,
            Some(WonderSpecial::ReplayDiscard) => 2.5,
            Some(WonderSpecial::PlayLastCard) => 2.0 * (4 - view.age.min(3)) as f64,
            Some(WonderSpecial::RawTradeDiscount) => 1.5,
            Some(WonderSpecial::CopyGuild) => 5.0,
        };
        value
    }

    /// The stage the viewer would build next, looked up by wonder and side.
    fn next_stage<'a>(&self, view: &'a PlayerView) -> Option<&'a WonderStage> {
        let me = view.me();
        view.catalog
            .wonders
            .iter()
            .find(|w| w.name == me.wonder && w.side == me.side)
            .and_then(|w| w.stages.get(me.stages_built))
    }

    /// Hand card worth the least to us (first on ties).
    fn cheapest_card(&self, view: &PlayerView, hand: &[CardId]) -> Option<CardId> {
        hand.iter()
            .copied()
            .map(|id| (id, self.card_value(view, view.catalog.card(id))))
            .fold(None, |best: Option<(CardId, f64)>, (id, v)| match best {
                Some((_, bv)) if bv <= v => best,
                _ => Some((id, v)),
            })
            .map(|(id, _)| id)
    }
}

fn cost_of(plan: &PurchasePlan) -> f64 {
    plan.total() as f64 * COIN
}

/// A tally evaluated on the public boards from the viewer's seat.
fn board_tally(view: &PlayerView, tally: &Tally) -> i32 {
    let boards: Vec<&PublicBoard> = match tally.scope {
        Scope::Own => vec![view.me()],
        Scope::Neighbors => vec![view.left(), view.right()],
        Scope::OwnAndNeighbors => vec![view.left(), view.me(), view.right()],
    };
    let count: i32 = boards
        .iter()
        .map(|b| match &tally.counted {
            Counted::Cards(colors) => b
                .played
                .iter()
                .filter(|&&id| colors.contains(&view.catalog.card(id).color))
                .count() as i32,
            Counted::WonderStages => b.stages_built as i32,
            Counted::Defeats => b.defeats as i32,
        })
        .sum();
    count * tally.each
}

/// Own-board tallies also count the card being evaluated.
fn self_bonus(card: &Card, tally: &Tally) -> i32 {
    match (&tally.scope, &tally.counted) {
        (Scope::Own, Counted::Cards(colors)) if colors.contains(&card.color) => tally.each,
        _ => 0,
    }
}

impl Agent for HeuristicAgent {
    fn name(&self) -> &str { "Heuristic" }

    fn choose_action(&mut self, view: &PlayerView, options: &TurnOptions) -> Action {
        let mut best: Option<(Action, f64)> = None;
        let mut consider = |action: Action, value: f64| {
            if best.map_or(true, |(_, v)| value > v) {
                best = Some((action, value));
            }
        };

        for option in &options.playable {
            let card = view.catalog.card(option.card);
            let value = self.card_value(view, card) - cost_of(&option.plan) + self.jitter();
            consider(Action::Play(option.card), value);
        }

        let tuck = self.cheapest_card(view, &options.hand);
        if let (Some(plan), Some(stage), Some(tuck)) = (options.wonder, self.next_stage(view), tuck) {
            let value = self.stage_value(view, stage) - cost_of(&plan) + self.jitter();
            consider(Action::BuildWonder(tuck), value);
        }

        if let Some(card) = tuck {
            consider(Action::Discard(card), SELL);
        }

        best.map_or(Action::PlayDiscarded(None), |(action, _)| action)
    }

    fn choose_discarded(&mut self, view: &PlayerView, options: &[CardId]) -> Option<CardId> {
        options
            .iter()
            .copied()
            .map(|id| (id, self.card_value(view, view.catalog.card(id))))
            .fold(None, |best: Option<(CardId, f64)>, (id, v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((id, v)),
            })
            .map(|(id, _)| id)
    }
}
