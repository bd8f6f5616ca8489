// ═══════════════════════════════════════════════════════════════════════
// Game configuration — seed, seating and economy constants
// ═══════════════════════════════════════════════════════════════════════

use serde::{Deserialize, Serialize};

/// How each player's wonder side is picked at setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SidePolicy {
    Random,
    A,
    B,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Drives wonder assignment and deck shuffles.
    pub seed: u64,
    pub player_count: usize,
    /// Optional display names by seat; missing ones become "Player N".
    pub player_names: Vec<String>,
    pub starting_coins: i32,
    /// Coins paid by the bank for discarding a card.
    pub discard_coins: i32,
    /// Unit price of a neighbour's resource.
    pub trade_price: i32,
    /// Unit price with a trading post or wonder discount.
    pub discounted_price: i32,
    pub wonder_side: SidePolicy,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            seed: 42,
            player_count: 3,
            player_names: Vec::new(),
            starting_coins: 4,
            discard_coins: 3,
            trade_price: 2,
            discounted_price: 1,
            wonder_side: SidePolicy::Random,
        }
    }
}

impl GameConfig {
    pub fn new(player_count: usize, seed: u64) -> Self {
        GameConfig { player_count, seed, ..GameConfig::default() }
    }

    /// Parse a JSON document; absent fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn player_name(&self, seat: usize) -> String {
        self.player_names
            .get(seat)
            .cloned()
            .unwrap_or_else(|| format!("Player {}", seat))
    }
}
