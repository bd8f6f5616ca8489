// ═══════════════════════════════════════════════════════════════════════
// Card definitions — immutable catalog entities
//
// Special rules are carried as a tagged `CardEffect` resolved when the
// catalog is built, so the engine dispatches on the effect and never on
// card names.
// ═══════════════════════════════════════════════════════════════════════

use crate::error::{EngineError, EngineResult};
use crate::resources::{Ledger, Market, Production};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u16);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    Brown,
    Gray,
    Yellow,
    Blue,
    Red,
    Green,
    Purple,
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Color::Brown => "brown",
            Color::Gray => "gray",
            Color::Yellow => "yellow",
            Color::Blue => "blue",
            Color::Red => "red",
            Color::Green => "green",
            Color::Purple => "purple",
        };
        write!(f, "{}", name)
    }
}

/// Which deck a card belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeSlot {
    Age(u8),
    /// Guilds are drawn at random into the age III deck.
    Guild,
}

/// Neighbour(s) a trading discount applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
    Both,
}

impl Side {
    pub fn includes(self, other: Side) -> bool {
        self == Side::Both || self == other
    }
}

/// Whose boards a tally looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    Own,
    Neighbors,
    OwnAndNeighbors,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Counted {
    Cards(Vec<Color>),
    WonderStages,
    Defeats,
}

/// "`each` per thing counted on the boards in `scope`".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tally {
    pub scope: Scope,
    pub counted: Counted,
    pub each: i32,
}

impl Tally {
    pub fn cards(scope: Scope, colors: &[Color], each: i32) -> Self {
        Tally { scope, counted: Counted::Cards(colors.to_vec()), each }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardEffect {
    None,
    /// Buy from the given side(s) at the discounted price.
    TradingPost { side: Side, market: Market },
    /// Coins paid once when played, points scored at game end.
    Commerce { coins: Option<Tally>, points: Option<Tally> },
    /// Scored at game end only.
    Guild(Tally),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub name: String,
    pub cost: Ledger,
    pub production: Production,
    /// Names of cards this one lets its owner build for free later.
    pub grants_free: Vec<String>,
    /// Copies in a 3, 4, 5, 6, 7 player game. Empty for guilds.
    pub copies: Vec<u8>,
    pub age: AgeSlot,
    pub color: Color,
    pub effect: CardEffect,
}

impl Card {
    /// Copies of this card in a game of `players` seats.
    pub fn copies_for(&self, players: usize) -> u8 {
        players
            .checked_sub(3)
            .and_then(|i| self.copies.get(i))
            .copied()
            .unwrap_or(0)
    }

    pub fn is_guild(&self) -> bool {
        self.age == AgeSlot::Guild
    }
}

/// Row-shaped input for building a `Card`, mirroring the tabular source:
/// cost codes, name, production codes, free grants, copies, age, color.
#[derive(Debug, Clone)]
pub struct CardRow<'a> {
    pub cost: &'a str,
    pub name: &'a str,
    pub production: &'a str,
    pub grants_free: &'a [&'a str],
    pub copies: &'a [u8],
    pub age: AgeSlot,
    pub color: Color,
    pub effect: CardEffect,
}

impl CardRow<'_> {
    pub fn build(&self, id: CardId) -> EngineResult<Card> {
        if self.name.trim().is_empty() {
            return Err(EngineError::UnknownCard(String::new()));
        }
        Ok(Card {
            id,
            name: self.name.trim().to_string(),
            cost: Ledger::from_codes(self.cost)?,
            production: Production::parse(self.production)?,
            grants_free: self.grants_free.iter().map(|s| s.to_string()).collect(),
            copies: self.copies.to_vec(),
            age: self.age,
            color: self.color,
            effect: self.effect.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Resource;

    #[test]
    fn test_row_builds_card() {
        let row = CardRow {
            cost: "$",
            name: " Tree Farm ",
            production: "T/C",
            grants_free: &[],
            copies: &[0, 0, 0, 1, 1],
            age: AgeSlot::Age(1),
            color: Color::Brown,
            effect: CardEffect::None,
        };
        let card = row.build(CardId(7)).unwrap();
        assert_eq!(card.name, "Tree Farm");
        assert_eq!(card.cost[Resource::Coin], 1);
        assert!(card.production.is_choice());
        assert_eq!(card.copies_for(3), 0);
        assert_eq!(card.copies_for(6), 1);
        assert_eq!(card.copies_for(2), 0);
    }

    #[test]
    fn test_bad_codes_rejected() {
        let row = CardRow {
            cost: "K",
            name: "Broken",
            production: "",
            grants_free: &[],
            copies: &[1, 1, 1, 1, 1],
            age: AgeSlot::Age(1),
            color: Color::Blue,
            effect: CardEffect::None,
        };
        assert_eq!(row.build(CardId(0)), Err(EngineError::InvalidResourceKind('K')));
    }

    #[test]
    fn test_side_includes() {
        assert!(Side::Both.includes(Side::Left));
        assert!(Side::Left.includes(Side::Left));
        assert!(!Side::Right.includes(Side::Left));
    }
}
