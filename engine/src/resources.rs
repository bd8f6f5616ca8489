// ═══════════════════════════════════════════════════════════════════════
// Resource ledger — signed counters over the fixed resource alphabet
//
// Each kind has a single-character code used by cost/production strings:
//   $ coin   T timber  S stone  C clay  O ore
//   L loom   G glass   P papyrus
//   X military  & engineering  # writing  @ mathematics
//   V blue-card points  W wonder points
// Split productions are written as `/`-separated alternatives: "T/S/C/O".
// ═══════════════════════════════════════════════════════════════════════

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Sub, SubAssign};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resource {
    Coin,
    Timber,
    Stone,
    Clay,
    Ore,
    Loom,
    Glass,
    Papyrus,
    Military,
    Engineering,
    Writing,
    Mathematics,
    CivicPoints,
    WonderPoints,
}

impl Resource {
    pub const COUNT: usize = 14;

    pub const ALL: [Resource; Resource::COUNT] = [
        Resource::Coin,
        Resource::Timber,
        Resource::Stone,
        Resource::Clay,
        Resource::Ore,
        Resource::Loom,
        Resource::Glass,
        Resource::Papyrus,
        Resource::Military,
        Resource::Engineering,
        Resource::Writing,
        Resource::Mathematics,
        Resource::CivicPoints,
        Resource::WonderPoints,
    ];

    pub fn code(self) -> char {
        match self {
            Resource::Coin => '$',
            Resource::Timber => 'T',
            Resource::Stone => 'S',
            Resource::Clay => 'C',
            Resource::Ore => 'O',
            Resource::Loom => 'L',
            Resource::Glass => 'G',
            Resource::Papyrus => 'P',
            Resource::Military => 'X',
            Resource::Engineering => '&',
            Resource::Writing => '#',
            Resource::Mathematics => '@',
            Resource::CivicPoints => 'V',
            Resource::WonderPoints => 'W',
        }
    }

    pub fn from_code(code: char) -> EngineResult<Resource> {
        Resource::ALL
            .iter()
            .copied()
            .find(|r| r.code() == code)
            .ok_or(EngineError::InvalidResourceKind(code))
    }

    /// Which neighbour market sells this kind, if any.
    pub fn market(self) -> Option<Market> {
        match self {
            Resource::Timber | Resource::Stone | Resource::Clay | Resource::Ore => Some(Market::Raw),
            Resource::Loom | Resource::Glass | Resource::Papyrus => Some(Market::Manufactured),
            _ => None,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Coin => "coin",
            Resource::Timber => "timber",
            Resource::Stone => "stone",
            Resource::Clay => "clay",
            Resource::Ore => "ore",
            Resource::Loom => "loom",
            Resource::Glass => "glass",
            Resource::Papyrus => "papyrus",
            Resource::Military => "military",
            Resource::Engineering => "engineering",
            Resource::Writing => "writing",
            Resource::Mathematics => "mathematics",
            Resource::CivicPoints => "civic points",
            Resource::WonderPoints => "wonder points",
        };
        write!(f, "{}", name)
    }
}

/// The two independently priced trading markets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Market {
    /// Timber, stone, clay, ore.
    Raw,
    /// Loom, glass, papyrus.
    Manufactured,
}

// ── Ledger ─────────────────────────────────────────────────────────────

/// A value-type multiset of resource counters. Missing kinds are zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Ledger([i32; Resource::COUNT]);

impl Ledger {
    pub fn new() -> Self {
        Ledger::default()
    }

    pub fn single(kind: Resource, amount: i32) -> Self {
        let mut ledger = Ledger::default();
        ledger[kind] = amount;
        ledger
    }

    /// Parse a code string such as "SSO" (two stone, one ore).
    /// Whitespace is ignored; an empty string is the zero ledger.
    pub fn from_codes(codes: &str) -> EngineResult<Self> {
        let mut ledger = Ledger::default();
        for c in codes.chars().filter(|c| !c.is_whitespace()) {
            ledger[Resource::from_code(c)?] += 1;
        }
        Ok(ledger)
    }

    pub fn get(&self, kind: Resource) -> i32 {
        self.0[kind.index()]
    }

    pub fn coins(&self) -> i32 {
        self[Resource::Coin]
    }

    /// True when every counter is zero.
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&v| v == 0)
    }

    /// The entries that are strictly below zero; everything else is dropped.
    pub fn negative_subset(&self) -> Ledger {
        let mut out = Ledger::default();
        for (slot, &v) in out.0.iter_mut().zip(self.0.iter()) {
            if v < 0 {
                *slot = v;
            }
        }
        out
    }

    pub fn abs(&self) -> Ledger {
        let mut out = *self;
        for v in out.0.iter_mut() {
            *v = v.abs();
        }
        out
    }

    /// True when no counter of `self` is below the matching counter of `other`.
    pub fn covers(&self, other: &Ledger) -> bool {
        self.0.iter().zip(other.0.iter()).all(|(a, b)| a >= b)
    }

    /// Same ledger with the coin counter zeroed.
    pub fn without_coins(&self) -> Ledger {
        let mut out = *self;
        out[Resource::Coin] = 0;
        out
    }

    /// Non-zero entries in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (Resource, i32)> + '_ {
        Resource::ALL
            .iter()
            .map(move |&r| (r, self.get(r)))
            .filter(|&(_, v)| v != 0)
    }

    /// Encode back to codes. Only meaningful for non-negative ledgers.
    pub fn to_codes(&self) -> String {
        self.iter()
            .flat_map(|(r, v)| std::iter::repeat(r.code()).take(v.max(0) as usize))
            .collect()
    }
}

impl Index<Resource> for Ledger {
    type Output = i32;
    fn index(&self, kind: Resource) -> &i32 {
        &self.0[kind.index()]
    }
}

impl IndexMut<Resource> for Ledger {
    fn index_mut(&mut self, kind: Resource) -> &mut i32 {
        &mut self.0[kind.index()]
    }
}

impl Add for Ledger {
    type Output = Ledger;
    fn add(mut self, rhs: Ledger) -> Ledger {
        self += rhs;
        self
    }
}

impl AddAssign for Ledger {
    fn add_assign(&mut self, rhs: Ledger) {
        for (a, b) in self.0.iter_mut().zip(rhs.0.iter()) {
            *a += b;
        }
    }
}

impl Sub for Ledger {
    type Output = Ledger;
    fn sub(mut self, rhs: Ledger) -> Ledger {
        self -= rhs;
        self
    }
}

impl SubAssign for Ledger {
    fn sub_assign(&mut self, rhs: Ledger) {
        for (a, b) in self.0.iter_mut().zip(rhs.0.iter()) {
            *a -= b;
        }
    }
}

impl fmt::Display for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "None");
        }
        let parts: Vec<String> = self.iter().map(|(r, v)| format!("{}{}", r.code(), v)).collect();
        write!(f, "{{{}}}", parts.join(" "))
    }
}

// ── Production ─────────────────────────────────────────────────────────

/// What a card or wonder stage yields when acquired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Production {
    Fixed(Ledger),
    /// Mutually exclusive alternatives; one is picked per use.
    Choice(Vec<Ledger>),
}

impl Production {
    pub fn none() -> Self {
        Production::Fixed(Ledger::default())
    }

    /// "TT" is fixed, "T/S/C/O" is a choice between single kinds.
    pub fn parse(codes: &str) -> EngineResult<Self> {
        if codes.contains('/') {
            let options = codes
                .split('/')
                .map(Ledger::from_codes)
                .collect::<EngineResult<Vec<_>>>()?;
            Ok(Production::Choice(options))
        } else {
            Ok(Production::Fixed(Ledger::from_codes(codes)?))
        }
    }

    pub fn is_choice(&self) -> bool {
        matches!(self, Production::Choice(_))
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Production::Fixed(l) => write!(f, "{}", l),
            Production::Choice(opts) => {
                let parts: Vec<String> = opts.iter().map(|o| o.to_codes()).collect();
                write!(f, "{}", parts.join("/"))
            }
        }
    }
}

/// Every way of picking one option from each choice set.
/// An empty input yields an empty product (no alternatives held).
pub fn cartesian_product(sets: &[Vec<Ledger>]) -> Vec<Ledger> {
    if sets.is_empty() {
        return Vec::new();
    }
    sets.iter().fold(vec![Ledger::default()], |acc, options| {
        acc.iter()
            .flat_map(|partial| options.iter().map(move |o| *partial + *o))
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ledger_strategy() -> impl Strategy<Value = Ledger> {
        proptest::array::uniform14(-20i32..20).prop_map(Ledger)
    }

    proptest! {
        #[test]
        fn add_then_subtract_round_trips(a in ledger_strategy(), b in ledger_strategy()) {
            prop_assert_eq!((a + b) - b, a);
        }

        #[test]
        fn negative_subset_holds_only_negatives(a in ledger_strategy()) {
            let neg = a.negative_subset();
            for (kind, v) in neg.iter() {
                prop_assert!(v < 0);
                prop_assert_eq!(v, a.get(kind));
            }
            for (_, v) in neg.abs().iter() {
                prop_assert!(v >= 0);
            }
        }
    }

    #[test]
    fn parses_codes() {
        let l = Ledger::from_codes("SSO$").unwrap();
        assert_eq!(l[Resource::Stone], 2);
        assert_eq!(l[Resource::Ore], 1);
        assert_eq!(l.coins(), 1);
        assert_eq!(l.to_codes(), "$SSO");
    }

    #[test]
    fn rejects_unknown_code() {
        assert_eq!(Ledger::from_codes("SZ"), Err(EngineError::InvalidResourceKind('Z')));
        assert!(Production::parse("T/Q").is_err());
    }

    #[test]
    fn subtract_yields_shortfall() {
        let have = Ledger::from_codes("S").unwrap();
        let cost = Ledger::from_codes("SSO").unwrap();
        let short = (have - cost).negative_subset();
        assert_eq!(short[Resource::Stone], -1);
        assert_eq!(short[Resource::Ore], -1);
        assert_eq!(short.abs().to_codes(), "SO");
    }

    #[test]
    fn split_production_parses() {
        let p = Production::parse("T/S/C/O").unwrap();
        match p {
            Production::Choice(opts) => assert_eq!(opts.len(), 4),
            _ => panic!("expected choice"),
        }
        assert!(!Production::parse("TT").unwrap().is_choice());
    }

    #[test]
    fn product_grows_multiplicatively() {
        let a = vec![Ledger::single(Resource::Timber, 1), Ledger::single(Resource::Clay, 1)];
        let b = vec![Ledger::single(Resource::Stone, 1), Ledger::single(Resource::Ore, 1)];
        let product = cartesian_product(&[a.clone(), b]);
        assert_eq!(product.len(), 4);
        assert!(product.contains(&Ledger::from_codes("TS").unwrap()));
        assert!(product.contains(&Ledger::from_codes("CO").unwrap()));
        assert_eq!(cartesian_product(&[a]).len(), 2);
        assert!(cartesian_product(&[]).is_empty());
    }

    #[test]
    fn markets() {
        assert_eq!(Resource::Ore.market(), Some(Market::Raw));
        assert_eq!(Resource::Glass.market(), Some(Market::Manufactured));
        assert_eq!(Resource::Coin.market(), None);
    }
}
