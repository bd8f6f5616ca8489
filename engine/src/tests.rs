// ═══════════════════════════════════════════════════════════════════════
// Engine test suite — resolver, turn loop, wonder specials and scoring
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::{AgeSlot, CardId};
use crate::catalog::Catalog;
use crate::config::GameConfig;
use crate::engine::{acquire_card, advance, apply_action, resolve_military, rotate_hands, Action};
use crate::error::EngineError;
use crate::resources::{Ledger, Resource};
use crate::scoring::{ranking, score_game, score_player, ScoreBreakdown};
use crate::setup::{create_initial_state, create_state_with};
use crate::trade::{resolve_card, resolve_cost, Funding, PurchasePlan};
use crate::types::*;
use crate::wonder::{Wonder, WonderSide};
use proptest::prelude::*;
use std::sync::Arc;

// ── Helpers ────────────────────────────────────────────────────────────

fn catalog() -> Arc<Catalog> {
    Arc::new(Catalog::standard().unwrap())
}

/// Unshuffled game: side-A wonders in catalog order, decks in catalog order.
///
/// For 3 players the first hands are
///   seat 0: Lumber Yard, Stone Pit, Clay Pool, Ore Vein, Clay Pit, Timber Yard, Loom
///   seat 1: Glassworks, Press, Baths, Altar, Theater, East Trading Post, West Trading Post
///   seat 2: Marketplace, Stockade, Barracks, Guard Tower, Apothecary, Workshop, Scriptorium
fn scripted(n: usize) -> GameState {
    let catalog = catalog();
    let wonders: Vec<Wonder> = catalog
        .wonders
        .iter()
        .filter(|w| w.side == WonderSide::A)
        .take(n)
        .map(Wonder::new)
        .collect();
    let mut decks: Vec<Vec<CardId>> = (1..=3).map(|age| catalog.age_deck(age, n)).collect();
    decks[2].extend(catalog.guilds().take(n + 2).map(|c| c.id));
    create_state_with(GameConfig::new(n, 1), catalog, wonders, decks).unwrap()
}

fn card(state: &GameState, name: &str) -> CardId {
    state.catalog.card_by_name(name).unwrap().id
}

fn card_in_age(state: &GameState, name: &str, age: u8) -> CardId {
    state
        .catalog
        .cards
        .iter()
        .find(|c| c.name == name && c.age == AgeSlot::Age(age))
        .unwrap()
        .id
}

fn give(state: &mut GameState, seat: usize, name: &str) {
    let id = card(state, name);
    acquire_card(state, seat, id, PurchasePlan::free(Funding::WonderSpecial));
}

fn pending_options(state: &GameState) -> TurnOptions {
    match &state.pending {
        Some(PendingDecision::ChooseAction { options, .. }) => options.clone(),
        other => panic!("expected ChooseAction, got {:?}", other),
    }
}

/// Play the first offered card, else build the wonder, else discard.
fn first_option(state: &GameState) -> Action {
    match state.pending.as_ref().unwrap() {
        PendingDecision::ChooseAction { options, .. } => {
            if let Some(opt) = options.playable.first() {
                Action::Play(opt.card)
            } else if options.wonder.is_some() {
                Action::BuildWonder(options.hand[0])
            } else {
                Action::Discard(options.hand[0])
            }
        }
        PendingDecision::PlayDiscarded { options, .. } => Action::PlayDiscarded(options.first().copied()),
    }
}

fn discard_first(state: &GameState) -> Action {
    Action::Discard(pending_options(state).hand[0])
}

/// Drive a game to the end, checking the running invariants.
fn play_out(state: &mut GameState, policy: fn(&GameState) -> Action) {
    advance(state);
    let mut steps = 0;
    while !state.is_finished() {
        steps += 1;
        assert!(steps < 10_000, "game did not terminate");
        let action = policy(state);
        apply_action(state, action).unwrap();
        for p in &state.players {
            assert!(p.coins() >= 0, "seat {} in debt", p.seat);
            assert!(p.wonder.built() <= p.wonder.stage_count());
        }
    }
}

// ── Resolver ───────────────────────────────────────────────────────────

#[test]
fn test_zero_cost_is_always_affordable() {
    let mut state = scripted(3);
    state.players[0].resources[Resource::Coin] = 0;
    let plan = resolve_cost(&state.players, 0, &Ledger::new(), &state.config).unwrap();
    assert_eq!(plan.total(), 0);
    assert_eq!(plan.funding, Funding::Owned);
}

#[test]
fn test_single_ore_strict_debt_rule() {
    // Seat 1 (Alexandria) needs one ore; only its left neighbour (Rhodes) has one.
    let mut state = scripted(3);
    let cost = Ledger::from_codes("O").unwrap();

    state.players[1].resources[Resource::Coin] = 2;
    assert!(resolve_cost(&state.players, 1, &cost, &state.config).is_none());

    state.players[1].resources[Resource::Coin] = 3;
    let plan = resolve_cost(&state.players, 1, &cost, &state.config).unwrap();
    assert_eq!((plan.left, plan.right, plan.bank), (2, 0, 0));
    assert_eq!(plan.funding, Funding::Trade);
}

#[test]
fn test_neighbour_shortfall_is_unaffordable() {
    let mut state = scripted(3);
    state.players[1].resources[Resource::Coin] = 50;
    let cost = Ledger::from_codes("OO").unwrap();
    assert!(resolve_cost(&state.players, 1, &cost, &state.config).is_none());
}

#[test]
fn test_built_name_is_never_offered_again() {
    let mut state = scripted(3);
    give(&mut state, 0, "Loom");
    let loom_two = card_in_age(&state, "Loom", 2);
    let c = state.catalog.clone();
    assert!(resolve_card(&state.players, 0, c.card(loom_two), &c, &state.config).is_none());
}

#[test]
fn test_chain_grants_free_build() {
    let mut state = scripted(3);
    give(&mut state, 0, "Baths");
    let c = state.catalog.clone();
    let aqueduct = c.card_by_name("Aqueduct").unwrap();
    let plan = resolve_card(&state.players, 0, aqueduct, &c, &state.config).unwrap();
    assert_eq!(plan, PurchasePlan::free(Funding::Chain));
}

#[test]
fn test_alternative_covers_cost() {
    let mut state = scripted(3);
    give(&mut state, 1, "Clay Pit");
    let plan = resolve_cost(&state.players, 1, &Ledger::from_codes("C").unwrap(), &state.config).unwrap();
    assert_eq!(plan, PurchasePlan::bank_only(0, Funding::Alternative));
}

#[test]
fn test_trading_post_discount_applies() {
    let mut state = scripted(3);
    // Seat 2 buys ore from its right neighbour, seat 0.
    give(&mut state, 2, "East Trading Post");
    let plan = resolve_cost(&state.players, 2, &Ledger::from_codes("O").unwrap(), &state.config).unwrap();
    assert_eq!((plan.left, plan.right), (0, 1));
}

#[test]
fn test_cheapest_shopping_list_wins() {
    // Seat 1 can turn Caravansery into S or O, so "SO" leaves either O
    // (left, 2 coins) or S (right, 1 coin with the trading post) to buy.
    let mut state = scripted(3);
    give(&mut state, 1, "Caravansery");
    give(&mut state, 1, "East Trading Post");
    state.players[2].resources[Resource::Stone] += 1;
    let plan = resolve_cost(&state.players, 1, &Ledger::from_codes("SO").unwrap(), &state.config).unwrap();
    assert_eq!(plan, PurchasePlan { bank: 0, left: 0, right: 1, funding: Funding::Trade });
}

#[test]
fn test_unsuppliable_list_is_skipped() {
    // Nobody next to seat 1 has stone: only the list "O" can be bought.
    let mut state = scripted(3);
    give(&mut state, 1, "Caravansery");
    let plan = resolve_cost(&state.players, 1, &Ledger::from_codes("SO").unwrap(), &state.config).unwrap();
    assert_eq!(plan, PurchasePlan { bank: 0, left: 2, right: 0, funding: Funding::Trade });
}

#[test]
fn test_unaffordable_list_is_skipped_and_ties_go_first() {
    // With 3 coins the full "SO" list (4 coins) is out. "O" from the left and
    // "S" from the right both cost 2; the first one found is kept.
    let mut state = scripted(3);
    give(&mut state, 1, "Caravansery");
    state.players[2].resources[Resource::Stone] += 1;
    state.players[1].resources[Resource::Coin] = 3;
    let plan = resolve_cost(&state.players, 1, &Ledger::from_codes("SO").unwrap(), &state.config).unwrap();
    assert_eq!(plan, PurchasePlan { bank: 0, left: 2, right: 0, funding: Funding::Trade });

    state.players[1].resources[Resource::Coin] = 2;
    assert!(resolve_cost(&state.players, 1, &Ledger::from_codes("SO").unwrap(), &state.config).is_none());
}

// ── Card effects ───────────────────────────────────────────────────────

#[test]
fn test_acquire_card_pays_neighbours() {
    let mut state = scripted(3);
    let plan = PurchasePlan { bank: 1, left: 2, right: 0, funding: Funding::Trade };
    let id = card(&state, "Stockade");
    acquire_card(&mut state, 1, id, plan);
    assert_eq!(state.players[1].coins(), 1);
    assert_eq!(state.players[0].coins(), 6);
    assert_eq!(state.players[2].coins(), 4);
    assert_eq!(state.players[1].resources[Resource::Military], 1);
}

#[test]
fn test_commerce_coins_count_current_boards() {
    let mut state = scripted(3);
    give(&mut state, 1, "Lumber Yard");
    give(&mut state, 2, "Ore Vein");
    give(&mut state, 2, "Stone Pit");
    give(&mut state, 0, "Vineyard");
    assert_eq!(state.players[0].coins(), 4 + 3);

    give(&mut state, 0, "Clay Pool");
    give(&mut state, 0, "Haven");
    // Haven counts own brown cards: Clay Pool only.
    assert_eq!(state.players[0].coins(), 4 + 3 + 1);
}

#[test]
fn test_split_production_feeds_alternatives() {
    let mut state = scripted(3);
    give(&mut state, 0, "Caravansery");
    assert_eq!(state.players[0].alternatives.len(), 1);
    assert_eq!(state.players[0].combinations().len(), 4);
}

// ── Turn loop ──────────────────────────────────────────────────────────

#[test]
fn test_first_pending_is_seat_zero() {
    let mut state = scripted(3);
    advance(&mut state);
    let options = pending_options(&state);
    assert_eq!(state.pending.as_ref().unwrap().seat(), 0);
    assert_eq!(options.hand.len(), 7);
    // Clay Pit and Timber Yard cost a coin each.
    let clay_pit = card(&state, "Clay Pit");
    assert_eq!(options.plan_for(clay_pit).unwrap().bank, 1);
    assert!(options.wonder.is_none(), "Rhodes stage 1 needs two timber");
}

#[test]
fn test_discard_pays_three_coins() {
    let mut state = scripted(3);
    advance(&mut state);
    let action = discard_first(&state);
    apply_action(&mut state, action).unwrap();
    assert_eq!(state.players[0].coins(), 7);
    assert_eq!(state.discard_pile, vec![card(&state, "Lumber Yard")]);
    assert_eq!(state.pending.as_ref().unwrap().seat(), 1);
}

#[test]
fn test_hands_pass_left_in_age_one() {
    let mut state = scripted(3);
    let before = state.hands.clone();
    advance(&mut state);
    for _ in 0..3 {
        let action = discard_first(&state);
        apply_action(&mut state, action).unwrap();
    }
    assert_eq!(state.round, 2);
    assert_eq!(state.hands[0], before[1][1..].to_vec());
    assert_eq!(state.hands[2], before[0][1..].to_vec());
}

#[test]
fn test_hands_pass_right_in_age_two() {
    let mut state = scripted(3);
    state.age = 2;
    let before = state.hands.clone();
    rotate_hands(&mut state);
    assert_eq!(state.hands[1], before[0]);
    assert_eq!(state.hands[0], before[2]);
}

#[test]
fn test_age_ends_after_six_rounds() {
    let mut state = scripted(3);
    advance(&mut state);
    for _ in 0..18 {
        let action = discard_first(&state);
        apply_action(&mut state, action).unwrap();
    }
    assert_eq!(state.age, 2);
    assert_eq!(state.round, 1);
    // 18 discards plus the three leftover cards
    assert_eq!(state.discard_pile.len(), 21);
    assert!(state.hands.iter().all(|h| h.len() == 7));
    assert!(state
        .log
        .iter()
        .any(|e| matches!(e.event, LogEvent::Conflict { outcome: ConflictOutcome::Draw, .. })));
}

#[test]
fn test_build_wonder_stage() {
    let mut state = scripted(3);
    // Rhodes A stage 1 costs two timber.
    state.players[0].resources[Resource::Timber] = 2;
    advance(&mut state);
    let options = pending_options(&state);
    assert!(options.wonder.is_some());
    let tuck = options.hand[3];
    apply_action(&mut state, Action::BuildWonder(tuck)).unwrap();
    assert_eq!(state.players[0].wonder.built(), 1);
    assert_eq!(state.players[0].resources[Resource::WonderPoints], 3);
    assert!(!state.discard_pile.contains(&tuck));
    assert!(matches!(state.log[0].event, LogEvent::BuiltStage { stage: 1, .. }));
}

// ── Illegal actions ────────────────────────────────────────────────────

#[test]
fn test_card_not_in_hand_is_rejected() {
    let mut state = scripted(3);
    advance(&mut state);
    let before_hands = state.hands.clone();
    let before_pending = state.pending.clone();
    let baths = card(&state, "Baths");

    let err = apply_action(&mut state, Action::Play(baths)).unwrap_err();
    assert_eq!(
        err,
        EngineError::IllegalCardAcquisition { seat: 0, age: 1, round: 1, card: "Baths".into() }
    );
    assert_eq!(state.hands, before_hands);
    assert_eq!(state.pending, before_pending);
    assert_eq!(state.players[0].coins(), 4);
}

#[test]
fn test_unaffordable_card_is_rejected() {
    let mut state = scripted(3);
    state.players[0].resources[Resource::Coin] = 0;
    advance(&mut state);
    let clay_pit = card(&state, "Clay Pit");
    let err = apply_action(&mut state, Action::Play(clay_pit)).unwrap_err();
    assert!(matches!(err, EngineError::IllegalCardAcquisition { seat: 0, .. }));
}

#[test]
fn test_complete_wonder_overflows() {
    let mut state = scripted(3);
    while !state.players[0].wonder.is_complete() {
        state.players[0].wonder.advance().unwrap();
    }
    advance(&mut state);
    let hand = pending_options(&state).hand;
    let err = apply_action(&mut state, Action::BuildWonder(hand[0])).unwrap_err();
    assert!(matches!(err, EngineError::WonderStageOverflow { stage: 4, .. }));
}

#[test]
fn test_wrong_action_kind_is_mismatch() {
    let mut state = scripted(3);
    advance(&mut state);
    let err = apply_action(&mut state, Action::PlayDiscarded(None)).unwrap_err();
    assert!(matches!(err, EngineError::ActionMismatch(_)));
}

// ── Wonder specials ────────────────────────────────────────────────────

#[test]
fn test_free_build_offers_whole_hand_once() {
    let mut state = scripted(3);
    state.players[0].specials.free_build = true;
    state.players[0].resources[Resource::Coin] = 0;
    advance(&mut state);

    let options = pending_options(&state);
    assert!(options.free_build);
    assert_eq!(options.playable.len(), 7);
    assert!(options.playable.iter().all(|o| o.plan.total() == 0));

    let clay_pit = card(&state, "Clay Pit");
    assert_eq!(options.plan_for(clay_pit).unwrap().funding, Funding::WonderSpecial);
    apply_action(&mut state, Action::Play(clay_pit)).unwrap();
    assert_eq!(state.players[0].coins(), 0);
    assert!(!state.players[0].specials.free_build);
}

#[test]
fn test_replay_discard_at_end_of_round() {
    let mut state = scripted(3);
    state.players[2].specials.replay_discard = true;
    advance(&mut state);
    for _ in 0..3 {
        let action = discard_first(&state);
        apply_action(&mut state, action).unwrap();
    }

    let lumber = card(&state, "Lumber Yard");
    match &state.pending {
        Some(PendingDecision::PlayDiscarded { seat, options }) => {
            assert_eq!(*seat, 2);
            assert_eq!(options.len(), 3);
            assert!(options.contains(&lumber));
        }
        other => panic!("expected PlayDiscarded, got {:?}", other),
    }

    apply_action(&mut state, Action::PlayDiscarded(Some(lumber))).unwrap();
    assert_eq!(state.players[2].played, vec![lumber]);
    assert_eq!(state.players[2].resources[Resource::Timber], 1);
    assert!(!state.players[2].specials.replay_discard);
    assert_eq!(state.discard_pile.len(), 2);
    assert_eq!(state.round, 2);
    assert_eq!(state.pending.as_ref().unwrap().seat(), 0);
}

#[test]
fn test_play_last_card() {
    let mut state = scripted(3);
    state.players[1].specials.play_last_card = true;
    advance(&mut state);
    for _ in 0..18 {
        let action = discard_first(&state);
        apply_action(&mut state, action).unwrap();
    }

    let options = pending_options(&state);
    assert!(options.last_card);
    assert_eq!(options.hand.len(), 1);
    assert_eq!(state.pending.as_ref().unwrap().seat(), 1);
    let last = options.hand[0];
    assert_eq!(options.plan_for(last).unwrap().total(), 0);

    apply_action(&mut state, Action::Play(last)).unwrap();
    assert_eq!(state.players[1].played, vec![last]);
    assert_eq!(state.age, 2);
    // 18 discards plus the two leftovers nobody could play
    assert_eq!(state.discard_pile.len(), 20);
}

// ── Military ───────────────────────────────────────────────────────────

#[test]
fn test_military_age_one() {
    let mut state = scripted(3);
    state.players[0].resources[Resource::Military] = 2;
    resolve_military(&mut state);
    assert_eq!(state.players[0].military_points, 2);
    assert_eq!(state.players[1].military_points, -1);
    assert_eq!(state.players[2].military_points, -1);
    assert_eq!(state.players[1].defeats, 1);
    assert_eq!(state.players[0].defeats, 0);
}

#[test]
fn test_military_age_three_pays_five() {
    let mut state = scripted(4);
    state.age = 3;
    state.players[1].resources[Resource::Military] = 3;
    state.players[2].resources[Resource::Military] = 1;
    resolve_military(&mut state);
    assert_eq!(state.players[1].military_points, 10);
    // Seat 2 beat seat 3 and lost to seat 1
    assert_eq!(state.players[2].military_points, 4);
    assert_eq!(state.players[3].military_points, -1);
    assert_eq!(state.players[0].military_points, -1);
}

// ── Scoring ────────────────────────────────────────────────────────────

#[test]
fn test_score_categories_sum() {
    let mut state = scripted(3);
    let p = &mut state.players[0];
    p.resources[Resource::Coin] = 10;
    p.military_points = 4;
    p.resources[Resource::WonderPoints] = 5;
    p.resources[Resource::CivicPoints] = 6;
    p.resources[Resource::Engineering] = 2;
    p.resources[Resource::Writing] = 1;
    p.resources[Resource::Mathematics] = 1;

    let score = score_player(&state, 0);
    assert_eq!(score.treasury, 3);
    assert_eq!(score.science, 13);
    assert_eq!(score.total, 4 + 3 + 5 + 6 + 13);
}

#[test]
fn test_guild_scores_neighbour_boards() {
    let mut state = scripted(3);
    give(&mut state, 0, "Workers Guild");
    give(&mut state, 0, "Clay Pool");
    give(&mut state, 1, "Lumber Yard");
    give(&mut state, 1, "Stone Pit");
    give(&mut state, 2, "Ore Vein");
    assert_eq!(score_player(&state, 0).guilds, 3);
}

#[test]
fn test_commerce_points_at_game_end() {
    let mut state = scripted(3);
    give(&mut state, 0, "Lighthouse");
    give(&mut state, 0, "Tavern");
    give(&mut state, 0, "Marketplace");
    assert_eq!(score_player(&state, 0).commerce, 3);
}

#[test]
fn test_copy_guild_takes_best_neighbour_guild() {
    let mut state = scripted(3);
    state.players[0].specials.copy_guild = true;
    state.players[0].resources[Resource::Engineering] = 2;
    state.players[0].resources[Resource::Writing] = 1;
    give(&mut state, 1, "Spies Guild");
    give(&mut state, 1, "Barracks");
    give(&mut state, 2, "Scientists Guild");

    let score = score_player(&state, 0);
    // Spies would give 1; a copied science symbol lifts 5 to 13.
    assert_eq!(score.science, 13);
    assert_eq!(score.guilds, 0);
}

#[test]
fn test_ranking_breaks_ties_on_coins() {
    let mut state = scripted(3);
    state.players[0].resources[Resource::Coin] = 3;
    state.players[1].resources[Resource::Coin] = 6;
    let scores = vec![
        ScoreBreakdown { seat: 0, total: 10, ..Default::default() },
        ScoreBreakdown { seat: 1, total: 10, ..Default::default() },
        ScoreBreakdown { seat: 2, total: 5, ..Default::default() },
    ];
    assert_eq!(ranking(&state, &scores), vec![1, 0, 2]);
}

// ── Full games ─────────────────────────────────────────────────────────

#[test]
fn test_game_completes_all_player_counts() {
    for n in 3..=7 {
        let mut state = create_initial_state(GameConfig::new(n, 11), catalog()).unwrap();
        play_out(&mut state, first_option);
        assert_eq!(state.age, 3);
        assert!(state.hands.iter().all(|h| h.is_empty()));
        assert!(state.decks.iter().all(|d| d.is_empty()));
        assert_eq!(score_game(&state).len(), n);
    }
}

#[test]
fn test_deterministic_game() {
    let run = |seed| {
        let mut state = create_initial_state(GameConfig::new(5, seed), catalog()).unwrap();
        play_out(&mut state, first_option);
        (state.log.clone(), score_game(&state))
    };
    assert_eq!(run(77), run(77));
}

#[test]
fn test_three_player_seed_reproduces_log_and_ranking() {
    let run = || {
        let mut state = create_initial_state(GameConfig::new(3, 2024), catalog()).unwrap();
        play_out(&mut state, first_option);
        let scores = score_game(&state);
        let order = ranking(&state, &scores);
        (state.log, order)
    };
    let (log, order) = run();
    assert_eq!((log.clone(), order.clone()), run());
    assert_eq!(order.len(), 3);
    assert!(log.iter().any(|e| e.age == 3));
}

#[test]
fn test_discard_only_game_scores_coins() {
    let mut state = create_initial_state(GameConfig::new(3, 5), catalog()).unwrap();
    play_out(&mut state, discard_first);
    for score in score_game(&state) {
        assert_eq!(score.wonder, 0);
        assert_eq!(score.military, 0);
        // 4 starting coins plus 18 discards at 3 coins each
        assert_eq!(score.treasury, (4 + 18 * 3) / 3);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_cards_are_conserved(seed in any::<u64>(), n in 3usize..=7) {
        let mut state = create_initial_state(GameConfig::new(n, seed), catalog()).unwrap();
        play_out(&mut state, first_option);
        let played: usize = state.players.iter().map(|p| p.played.len()).sum();
        let tucked: usize = state.players.iter().map(|p| p.wonder.built()).sum();
        prop_assert_eq!(played + tucked + state.discard_pile.len(), 21 * n);
        for p in &state.players {
            let mut names: Vec<&str> = p.played.iter().map(|&c| state.card_name(c)).collect();
            let total = names.len();
            names.sort();
            names.dedup();
            prop_assert_eq!(names.len(), total, "seat {} built a name twice", p.seat);
        }
    }
}
