// ═══════════════════════════════════════════════════════════════════════
// Random Agent — the reference policy.
// Uniform over every affordable candidate (hand cards and the next wonder
// stage); with no candidate it sells a random hand card.
// ═══════════════════════════════════════════════════════════════════════

use crate::agent::Agent;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wonders_engine::cards::CardId;
use wonders_engine::engine::Action;
use wonders_engine::types::TurnOptions;
use wonders_engine::visibility::PlayerView;

pub struct RandomAgent {
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        RandomAgent {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &str { "Random" }

    fn choose_action(&mut self, _view: &PlayerView, options: &TurnOptions) -> Action {
        let mut candidates: Vec<Action> = options.playable.iter().map(|o| Action::Play(o.card)).collect();
        if options.wonder.is_some() {
            if let Some(&tuck) = options.hand.choose(&mut self.rng) {
                candidates.push(Action::BuildWonder(tuck));
            }
        }
        if let Some(&action) = candidates.choose(&mut self.rng) {
            return action;
        }
        match options.hand.choose(&mut self.rng) {
            Some(&card) => Action::Discard(card),
            None => Action::PlayDiscarded(None),
        }
    }

    fn choose_discarded(&mut self, _view: &PlayerView, options: &[CardId]) -> Option<CardId> {
        options.choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use wonders_engine::catalog::Catalog;
    use wonders_engine::config::GameConfig;
    use wonders_engine::engine::{advance, apply_action};
    use wonders_engine::setup::create_initial_state;
    use wonders_engine::types::PendingDecision;
    use wonders_engine::visibility::player_view;

    #[test]
    fn test_random_agent_only_takes_offered_actions() {
        let catalog = Arc::new(Catalog::standard().unwrap());
        let mut state = create_initial_state(GameConfig::new(4, 3), catalog).unwrap();
        let mut agents: Vec<RandomAgent> = (0..4).map(|s| RandomAgent::new(100 + s)).collect();
        advance(&mut state);
        while !state.is_finished() {
            let seat = state.pending.as_ref().unwrap().seat();
            let view = player_view(&state, seat);
            let action = agents[seat].decide(&view);
            if let Some(PendingDecision::ChooseAction { options, .. }) = &view.pending {
                match action {
                    Action::Play(c) => assert!(options.plan_for(c).is_some()),
                    Action::BuildWonder(c) | Action::Discard(c) => assert!(options.hand.contains(&c)),
                    Action::PlayDiscarded(_) => panic!("wrong answer for ChooseAction"),
                }
            }
            apply_action(&mut state, action).unwrap();
        }
    }

    #[test]
    fn test_same_seed_same_choices() {
        let catalog = Arc::new(Catalog::standard().unwrap());
        let mut state = create_initial_state(GameConfig::new(3, 8), catalog).unwrap();
        advance(&mut state);
        let view = player_view(&state, 0);
        let a = RandomAgent::new(5).decide(&view);
        let b = RandomAgent::new(5).decide(&view);
        assert_eq!(a, b);
    }
}
