// ═══════════════════════════════════════════════════════════════════════
// Game Engine — turn loop and action resolution
//
// Architecture:
//   The engine is a pure state machine. It never does I/O or calls agents.
//   Instead it sets `state.pending` to describe what decision is needed,
//   and the runner/tournament code reads that, asks the appropriate agent,
//   and feeds the answer back via `apply_action()`.
//
// Flow:
//   1. Runner calls `advance()` to push the game forward
//   2. Engine processes until it needs a player decision → sets pending
//   3. Runner reads pending, asks agent, calls `apply_action(state, action)`
//   4. Repeat until state.phase is Finished
//
// Within a round seats act in order, and each seat's options are computed
// just before it acts, so seat i trades against the post-action state of
// seats 0..i-1 and the pre-action state of the rest.
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::{CardEffect, CardId, Side};
use crate::error::{EngineError, EngineResult};
use crate::player::{tally, TradeDiscount};
use crate::resources::{Market, Production, Resource};
use crate::trade::{resolve_card, resolve_cost, Funding, PurchasePlan};
use crate::types::*;
use crate::wonder::WonderSpecial;
use std::sync::Arc;
use tracing::{debug, info};

/// Actions that agents can submit to resolve pending decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Build a hand card at the offered price.
    Play(CardId),
    /// Build the next wonder stage, tucking this hand card under it.
    BuildWonder(CardId),
    /// Sell a hand card to the bank.
    Discard(CardId),
    /// Answer to `PlayDiscarded`: a discarded card to build, or pass.
    PlayDiscarded(Option<CardId>),
}

/// Advance the game state. Processes automatic transitions until a
/// player decision is needed (sets state.pending) or the game ends.
pub fn advance(state: &mut GameState) {
    if state.pending.is_some() {
        return;
    }
    let n = state.players.len();

    loop {
        match state.phase {
            Phase::Turns => {
                while state.cursor < n && state.hands[state.cursor].is_empty() {
                    state.cursor += 1;
                }
                if state.cursor < n {
                    let seat = state.cursor;
                    let options = turn_options(state, seat, false);
                    state.pending = Some(PendingDecision::ChooseAction { seat, options });
                    return;
                }
                state.cursor = 0;
                state.phase = if state.hands.iter().all(|h| h.len() <= 1) {
                    Phase::LastCard
                } else {
                    Phase::ReplayDiscard
                };
            }

            Phase::LastCard => {
                while state.cursor < n {
                    let seat = state.cursor;
                    if state.players[seat].specials.play_last_card && !state.hands[seat].is_empty() {
                        let options = turn_options(state, seat, true);
                        state.pending = Some(PendingDecision::ChooseAction { seat, options });
                        return;
                    }
                    state.cursor += 1;
                }
                // Whatever is left goes to the discard pile
                for hand in &mut state.hands {
                    state.discard_pile.append(hand);
                }
                state.cursor = 0;
                state.phase = Phase::ReplayDiscard;
            }

            Phase::ReplayDiscard => {
                while state.cursor < n {
                    let seat = state.cursor;
                    if state.players[seat].specials.replay_discard {
                        let options = replay_options(state, seat);
                        if !options.is_empty() {
                            state.pending = Some(PendingDecision::PlayDiscarded { seat, options });
                            return;
                        }
                        state.players[seat].specials.replay_discard = false;
                    }
                    state.cursor += 1;
                }
                state.cursor = 0;
                if state.hands.iter().all(|h| h.is_empty()) {
                    end_age(state);
                } else {
                    rotate_hands(state);
                    state.round += 1;
                    state.phase = Phase::Turns;
                }
            }

            Phase::Finished => return,
        }
    }
}

/// Apply a player's action to resolve a pending decision.
/// Nothing is mutated when the action is rejected.
pub fn apply_action(state: &mut GameState, action: Action) -> EngineResult<()> {
    let pending = state
        .pending
        .clone()
        .ok_or_else(|| EngineError::ActionMismatch(format!("{:?} with nothing pending", action)))?;

    match (&pending, action) {
        (PendingDecision::ChooseAction { seat, options }, Action::Play(card)) => {
            let seat = *seat;
            let plan = options.plan_for(card).ok_or_else(|| illegal(state, seat, card))?;
            take_from_hand(state, seat, card)?;
            state.pending = None;
            acquire_card(state, seat, card, plan);
            let name = state.card_name(card).to_string();
            record(state, seat, LogEvent::Played { card: name, plan });
            finish_turn(state, seat, options);
        }

        (PendingDecision::ChooseAction { seat, options }, Action::BuildWonder(tuck)) => {
            let seat = *seat;
            let plan = match options.wonder {
                Some(plan) => plan,
                None if state.players[seat].wonder.is_complete() => {
                    let wonder = &state.players[seat].wonder;
                    return Err(EngineError::WonderStageOverflow {
                        wonder: wonder.label(),
                        stage: wonder.built() + 1,
                    });
                }
                None => return Err(illegal(state, seat, tuck)),
            };
            take_from_hand(state, seat, tuck)?;
            state.pending = None;
            let stage = build_stage(state, seat, plan)?;
            let wonder = state.players[seat].wonder.label();
            record(state, seat, LogEvent::BuiltStage { wonder, stage, plan });
            finish_turn(state, seat, options);
        }

        (PendingDecision::ChooseAction { seat, options }, Action::Discard(card)) => {
            let seat = *seat;
            take_from_hand(state, seat, card)?;
            state.pending = None;
            state.players[seat].resources[Resource::Coin] += state.config.discard_coins;
            state.discard_pile.push(card);
            let name = state.card_name(card).to_string();
            record(state, seat, LogEvent::Discarded { card: name });
            finish_turn(state, seat, options);
        }

        (PendingDecision::PlayDiscarded { seat, options }, Action::PlayDiscarded(choice)) => {
            let seat = *seat;
            if let Some(card) = choice {
                if !options.contains(&card) {
                    return Err(illegal(state, seat, card));
                }
                let pos = state
                    .discard_pile
                    .iter()
                    .position(|&c| c == card)
                    .ok_or_else(|| illegal(state, seat, card))?;
                state.discard_pile.remove(pos);
                acquire_card(state, seat, card, PurchasePlan::free(Funding::WonderSpecial));
                let name = state.card_name(card).to_string();
                record(state, seat, LogEvent::PlayedDiscarded { card: name });
            }
            state.pending = None;
            state.players[seat].specials.replay_discard = false;
            state.cursor += 1;
        }

        (_, action) => {
            return Err(EngineError::ActionMismatch(format!("{:?} for {:?}", action, pending)));
        }
    }

    advance(state);
    Ok(())
}

// ── Options ────────────────────────────────────────────────────────────

/// Build the candidate set for `seat` against the current boards.
pub fn turn_options(state: &GameState, seat: usize, last_card: bool) -> TurnOptions {
    let catalog = &state.catalog;
    let player = &state.players[seat];
    let hand = state.hands[seat].clone();
    let free_build = player.specials.free_build && !last_card;

    let mut playable: Vec<PlayOption> = Vec::new();
    for &card_id in &hand {
        if playable.iter().any(|o| o.card == card_id) {
            continue;
        }
        let card = catalog.card(card_id);
        let resolved = resolve_card(&state.players, seat, card, catalog, &state.config);
        let plan = if last_card || free_build {
            if player.has_built(&card.name, catalog) {
                None
            } else {
                Some(resolved
                    .filter(|p| p.total() == 0)
                    .unwrap_or(PurchasePlan::free(Funding::WonderSpecial)))
            }
        } else {
            resolved
        };
        if let Some(plan) = plan {
            playable.push(PlayOption { card: card_id, plan });
        }
    }

    let wonder = player
        .wonder
        .next_stage()
        .and_then(|stage| resolve_cost(&state.players, seat, &stage.cost, &state.config));

    TurnOptions { hand, playable, wonder, free_build, last_card }
}

/// Distinct discarded cards `seat` has not built yet.
fn replay_options(state: &GameState, seat: usize) -> Vec<CardId> {
    let player = &state.players[seat];
    let mut options: Vec<CardId> = Vec::new();
    for &card in &state.discard_pile {
        if !options.contains(&card) && !player.has_built(state.card_name(card), &state.catalog) {
            options.push(card);
        }
    }
    options
}

// ── Applying moves ─────────────────────────────────────────────────────

fn illegal(state: &GameState, seat: usize, card: CardId) -> EngineError {
    let card = state
        .catalog
        .cards
        .get(card.0 as usize)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| format!("#{}", card.0));
    EngineError::IllegalCardAcquisition { seat, age: state.age, round: state.round, card }
}

fn take_from_hand(state: &mut GameState, seat: usize, card: CardId) -> EngineResult<()> {
    let pos = state.hands[seat]
        .iter()
        .position(|&c| c == card)
        .ok_or_else(|| illegal(state, seat, card))?;
    state.hands[seat].remove(pos);
    Ok(())
}

fn finish_turn(state: &mut GameState, seat: usize, options: &TurnOptions) {
    if options.free_build {
        state.players[seat].specials.free_build = false;
    }
    state.cursor += 1;
}

/// Move coins for a plan: bank share disappears, neighbour shares are credited.
fn pay(state: &mut GameState, seat: usize, plan: PurchasePlan) {
    let left = state.left_of(seat);
    let right = state.right_of(seat);
    state.players[seat].resources[Resource::Coin] -= plan.total();
    state.players[left].resources[Resource::Coin] += plan.left;
    state.players[right].resources[Resource::Coin] += plan.right;
}

/// Pay for and build a card: history, grants, side effects, then production.
pub fn acquire_card(state: &mut GameState, seat: usize, card_id: CardId, plan: PurchasePlan) {
    let catalog = Arc::clone(&state.catalog);
    let card = catalog.card(card_id);
    pay(state, seat, plan);

    {
        let player = &mut state.players[seat];
        player.played.push(card_id);
        player.free_to_play.extend(card.grants_free.iter().cloned());
    }

    // Coin bonuses count the card itself, so they run after it is recorded.
    let bonus = match &card.effect {
        CardEffect::Commerce { coins: Some(t), .. } => tally(&state.players, seat, t, &catalog),
        _ => 0,
    };
    let player = &mut state.players[seat];
    player.resources[Resource::Coin] += bonus;
    if let CardEffect::TradingPost { side, market } = &card.effect {
        player.discounts.push(TradeDiscount { side: *side, market: *market });
    }

    match &card.production {
        Production::Fixed(ledger) => player.resources += *ledger,
        Production::Choice(options) => player.add_alternatives(options.clone()),
    }
    debug!(seat, age = state.age, round = state.round, card = %card.name, ?plan, "built card");
}

/// Pay for and activate the next wonder stage. Returns the stage number.
fn build_stage(state: &mut GameState, seat: usize, plan: PurchasePlan) -> EngineResult<usize> {
    let stage = state.players[seat].wonder.advance()?;
    pay(state, seat, plan);

    let player = &mut state.players[seat];
    match stage.production {
        Production::Fixed(ledger) => player.resources += ledger,
        Production::Choice(options) => player.add_alternatives(options),
    }
    match stage.special {
        Some(WonderSpecial::FreeBuild) => player.specials.free_build = true,
        Some(WonderSpecial::ReplayDiscard) => player.specials.replay_discard = true,
        Some(WonderSpecial::PlayLastCard) => player.specials.play_last_card = true,
        Some(WonderSpecial::CopyGuild) => player.specials.copy_guild = true,
        Some(WonderSpecial::RawTradeDiscount) => {
            player.discounts.push(TradeDiscount { side: Side::Both, market: Market::Raw });
        }
        None => {}
    }
    let built = player.wonder.built();
    debug!(seat, wonder = %player.wonder.name, stage = built, "built wonder stage");
    Ok(built)
}

fn record(state: &mut GameState, seat: usize, event: LogEvent) {
    let entry = LogEntry {
        age: state.age,
        round: state.round,
        seat,
        event,
        resources: state.players[seat].resources,
    };
    state.log.push(entry);
}

// ── Age transitions ────────────────────────────────────────────────────

/// Pass every hand to the next seat: clockwise (seat+1) in age II,
/// counter-clockwise (seat-1) in ages I and III.
pub fn rotate_hands(state: &mut GameState) {
    if state.age == 2 {
        state.hands.rotate_right(1);
    } else {
        state.hands.rotate_left(1);
    }
}

/// Deal the current age's deck into equal hands in seating order.
pub fn deal_age(state: &mut GameState) {
    let n = state.players.len();
    let idx = (state.age - 1) as usize;
    let mut deck = std::mem::take(&mut state.decks[idx]);
    let hand_size = deck.len() / n;
    let leftover = deck.split_off(hand_size * n);
    state.hands = deck.chunks(hand_size.max(1)).map(|c| c.to_vec()).collect();
    state.hands.resize(n, Vec::new());
    state.discard_pile.extend(leftover);
    info!(age = state.age, hand_size, "dealt age");
}

/// Every seat fights both neighbours; each adjacent pair is settled once.
pub fn resolve_military(state: &mut GameState) {
    let n = state.players.len();
    let win_points = 1 + 2 * (state.age as i32 - 1);
    for a in 0..n {
        let b = (a + 1) % n;
        let strength_a = state.players[a].resources[Resource::Military];
        let strength_b = state.players[b].resources[Resource::Military];
        let (winner, loser) = match strength_a.cmp(&strength_b) {
            std::cmp::Ordering::Greater => (a, b),
            std::cmp::Ordering::Less => (b, a),
            std::cmp::Ordering::Equal => {
                record(state, a, LogEvent::Conflict { opponent: b, outcome: ConflictOutcome::Draw, points: 0 });
                record(state, b, LogEvent::Conflict { opponent: a, outcome: ConflictOutcome::Draw, points: 0 });
                continue;
            }
        };
        state.players[winner].military_points += win_points;
        state.players[loser].military_points -= 1;
        state.players[loser].defeats += 1;
        info!(age = state.age, winner, loser, "military conflict");
        record(state, winner, LogEvent::Conflict {
            opponent: loser,
            outcome: ConflictOutcome::Victory,
            points: win_points,
        });
        record(state, loser, LogEvent::Conflict {
            opponent: winner,
            outcome: ConflictOutcome::Defeat,
            points: -1,
        });
    }
}

fn end_age(state: &mut GameState) {
    resolve_military(state);
    if state.age >= 3 {
        state.phase = Phase::Finished;
        info!("game over");
        return;
    }
    state.age += 1;
    state.round = 1;
    deal_age(state);
    state.phase = Phase::Turns;
}
