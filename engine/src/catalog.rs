// ═══════════════════════════════════════════════════════════════════════
// Catalog — the base-game cards and wonders as already-parsed entities
//
// Copies columns are the number of copies in a 3/4/5/6/7 player game.
// Seating: left neighbour = seat-1, right neighbour = seat+1, so the
// West Trading Post buys from the left and the East one from the right.
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::*;
use crate::error::{EngineError, EngineResult};
use crate::resources::{Ledger, Market, Production};
use crate::wonder::{WonderDef, WonderSide, WonderSpecial, WonderStage};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub cards: Vec<Card>,
    pub wonders: Vec<WonderDef>,
}

impl Catalog {
    /// Build a catalog from rows and wonder definitions, checking that
    /// every free-build grant names a real card.
    pub fn from_rows(rows: &[CardRow<'_>], wonders: Vec<WonderDef>) -> EngineResult<Self> {
        let cards = rows
            .iter()
            .enumerate()
            .map(|(i, row)| row.build(CardId(i as u16)))
            .collect::<EngineResult<Vec<_>>>()?;
        let catalog = Catalog { cards, wonders };
        for card in &catalog.cards {
            for grant in &card.grants_free {
                if catalog.card_by_name(grant).is_none() {
                    return Err(EngineError::UnknownCard(grant.clone()));
                }
            }
        }
        Ok(catalog)
    }

    /// Base game: ages I-III, ten guilds, seven wonders with both sides.
    pub fn standard() -> EngineResult<Self> {
        Catalog::from_rows(&standard_cards(), standard_wonders()?)
    }

    pub fn card(&self, id: CardId) -> &Card {
        &self.cards[id.0 as usize]
    }

    pub fn card_by_name(&self, name: &str) -> Option<&Card> {
        self.cards.iter().find(|c| c.name == name)
    }

    pub fn guilds(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(|c| c.is_guild())
    }

    /// Every copy of every non-guild card for `age` in a game of `players`.
    pub fn age_deck(&self, age: u8, players: usize) -> Vec<CardId> {
        self.cards
            .iter()
            .filter(|c| c.age == AgeSlot::Age(age))
            .flat_map(|c| std::iter::repeat(c.id).take(c.copies_for(players) as usize))
            .collect()
    }
}

// ── Cards ──────────────────────────────────────────────────────────────

fn row<'a>(
    cost: &'a str,
    name: &'a str,
    production: &'a str,
    grants_free: &'a [&'a str],
    copies: &'a [u8],
    age: u8,
    color: Color,
) -> CardRow<'a> {
    CardRow {
        cost,
        name,
        production,
        grants_free,
        copies,
        age: AgeSlot::Age(age),
        color,
        effect: CardEffect::None,
    }
}

fn with(mut r: CardRow<'_>, effect: CardEffect) -> CardRow<'_> {
    r.effect = effect;
    r
}

fn guild<'a>(cost: &'a str, name: &'a str, production: &'a str, effect: CardEffect) -> CardRow<'a> {
    CardRow {
        cost,
        name,
        production,
        grants_free: &[],
        copies: &[],
        age: AgeSlot::Guild,
        color: Color::Purple,
        effect,
    }
}

fn trading_post(side: Side, market: Market) -> CardEffect {
    CardEffect::TradingPost { side, market }
}

fn coins(scope: Scope, colors: &[Color], each: i32) -> CardEffect {
    CardEffect::Commerce { coins: Some(Tally::cards(scope, colors, each)), points: None }
}

fn coins_and_points(counted: Counted, coins_each: i32, points_each: i32) -> CardEffect {
    CardEffect::Commerce {
        coins: Some(Tally { scope: Scope::Own, counted: counted.clone(), each: coins_each }),
        points: Some(Tally { scope: Scope::Own, counted, each: points_each }),
    }
}

fn neighbour_guild(colors: &[Color], each: i32) -> CardEffect {
    CardEffect::Guild(Tally::cards(Scope::Neighbors, colors, each))
}

use Color::*;

fn standard_cards() -> Vec<CardRow<'static>> {
    vec![
        // ── Age I ──
        row("",      "Lumber Yard",        "T",        &[], &[1, 2, 2, 2, 2], 1, Brown),
        row("",      "Stone Pit",          "S",        &[], &[1, 1, 2, 2, 2], 1, Brown),
        row("",      "Clay Pool",          "C",        &[], &[1, 1, 2, 2, 2], 1, Brown),
        row("",      "Ore Vein",           "O",        &[], &[1, 2, 2, 2, 2], 1, Brown),
        row("$",     "Tree Farm",          "T/C",      &[], &[0, 0, 0, 1, 1], 1, Brown),
        row("$",     "Excavation",         "S/C",      &[], &[0, 1, 1, 1, 1], 1, Brown),
        row("$",     "Clay Pit",           "C/O",      &[], &[1, 1, 1, 1, 1], 1, Brown),
        row("$",     "Timber Yard",        "S/T",      &[], &[1, 1, 1, 1, 1], 1, Brown),
        row("$",     "Forest Cave",        "T/O",      &[], &[0, 0, 1, 1, 1], 1, Brown),
        row("$",     "Mine",               "S/O",      &[], &[0, 0, 0, 1, 1], 1, Brown),
        row("",      "Loom",               "L",        &[], &[1, 1, 1, 2, 2], 1, Gray),
        row("",      "Glassworks",         "G",        &[], &[1, 1, 1, 2, 2], 1, Gray),
        row("",      "Press",              "P",        &[], &[1, 1, 1, 2, 2], 1, Gray),
        row("",      "Pawnshop",           "VVV",      &[], &[0, 1, 1, 1, 2], 1, Blue),
        row("S",     "Baths",              "VVV",      &["Aqueduct"], &[1, 1, 1, 1, 2], 1, Blue),
        row("",      "Altar",              "VV",       &["Temple"], &[1, 1, 2, 2, 2], 1, Blue),
        row("",      "Theater",            "VV",       &["Statue"], &[1, 1, 1, 2, 2], 1, Blue),
        row("",      "Tavern",             "$$$$$",    &[], &[0, 1, 2, 2, 3], 1, Yellow),
        with(row("", "East Trading Post",  "",         &["Forum"], &[1, 1, 1, 1, 2], 1, Yellow),
             trading_post(Side::Right, Market::Raw)),
        with(row("", "West Trading Post",  "",         &["Forum"], &[1, 1, 1, 1, 2], 1, Yellow),
             trading_post(Side::Left, Market::Raw)),
        with(row("", "Marketplace",        "",         &["Caravansery"], &[1, 1, 1, 2, 2], 1, Yellow),
             trading_post(Side::Both, Market::Manufactured)),
        row("T",     "Stockade",           "X",        &[], &[1, 1, 1, 1, 2], 1, Red),
        row("O",     "Barracks",           "X",        &[], &[1, 1, 2, 2, 2], 1, Red),
        row("C",     "Guard Tower",        "X",        &[], &[1, 2, 2, 2, 2], 1, Red),
        row("L",     "Apothecary",         "@",        &["Stables", "Dispensary"], &[1, 1, 2, 2, 2], 1, Green),
        row("G",     "Workshop",           "&",        &["Archery Range", "Laboratory"], &[1, 1, 1, 1, 2], 1, Green),
        row("P",     "Scriptorium",        "#",        &["Courthouse", "Library"], &[1, 2, 2, 2, 2], 1, Green),
        // ── Age II ──
        row("$",     "Sawmill",            "TT",       &[], &[1, 2, 2, 2, 2], 2, Brown),
        row("$",     "Quarry",             "SS",       &[], &[1, 2, 2, 2, 2], 2, Brown),
        row("$",     "Brickyard",          "CC",       &[], &[1, 2, 2, 2, 2], 2, Brown),
        row("$",     "Foundry",            "OO",       &[], &[1, 2, 2, 2, 2], 2, Brown),
        row("",      "Loom",               "L",        &[], &[1, 1, 2, 2, 2], 2, Gray),
        row("",      "Glassworks",         "G",        &[], &[1, 1, 2, 2, 2], 2, Gray),
        row("",      "Press",              "P",        &[], &[1, 1, 2, 2, 2], 2, Gray),
        row("SSS",   "Aqueduct",           "VVVVV",    &[], &[1, 1, 1, 1, 2], 2, Blue),
        row("TCG",   "Temple",             "VVV",      &["Pantheon"], &[1, 1, 1, 2, 2], 2, Blue),
        row("OOT",   "Statue",             "VVVV",     &["Gardens"], &[1, 1, 1, 2, 2], 2, Blue),
        row("CCL",   "Courthouse",         "VVVV",     &[], &[1, 1, 2, 2, 2], 2, Blue),
        row("CC",    "Forum",              "L/G/P",    &["Haven"], &[1, 1, 1, 2, 3], 2, Yellow),
        row("TT",    "Caravansery",        "T/S/C/O",  &["Lighthouse"], &[1, 1, 2, 3, 3], 2, Yellow),
        with(row("", "Vineyard",           "",         &[], &[1, 1, 1, 2, 2], 2, Yellow),
             coins(Scope::Neighbors, &[Brown], 1)),
        with(row("", "Bazar",              "",         &[], &[0, 1, 1, 1, 2], 2, Yellow),
             coins(Scope::Neighbors, &[Gray], 2)),
        row("SSS",   "Walls",              "XX",       &["Fortifications"], &[1, 1, 1, 1, 2], 2, Red),
        row("OOT",   "Training Ground",    "XX",       &["Circus"], &[0, 1, 1, 2, 3], 2, Red),
        row("COT",   "Stables",            "XX",       &[], &[1, 1, 2, 2, 2], 2, Red),
        row("TTO",   "Archery Range",      "XX",       &[], &[1, 1, 1, 2, 2], 2, Red),
        row("OOG",   "Dispensary",         "@",        &["Arena", "Lodge"], &[1, 2, 2, 2, 2], 2, Green),
        row("CCP",   "Laboratory",         "&",        &["Siege Workshop", "Observatory"], &[1, 1, 2, 2, 2], 2, Green),
        row("SSL",   "Library",            "#",        &["Senate", "University"], &[1, 1, 1, 2, 2], 2, Green),
        row("TP",    "School",             "#",        &["Academy", "Study"], &[1, 1, 1, 1, 2], 2, Green),
        // ── Age III ──
        row("CCOGPL", "Pantheon",          "VVVVVVV",  &[], &[1, 1, 1, 2, 2], 3, Blue),
        row("CCT",   "Gardens",            "VVVVV",    &[], &[1, 2, 2, 2, 2], 3, Blue),
        row("SSOG",  "Town Hall",          "VVVVVV",   &[], &[1, 1, 2, 3, 3], 3, Blue),
        row("TSCOGPL", "Palace",           "VVVVVVVV", &[], &[1, 1, 1, 1, 2], 3, Blue),
        row("TTSO",  "Senate",             "VVVVVV",   &[], &[1, 1, 2, 2, 2], 3, Blue),
        with(row("TOL", "Haven",           "",         &[], &[1, 2, 2, 2, 2], 3, Yellow),
             coins_and_points(Counted::Cards(vec![Brown]), 1, 1)),
        with(row("SG", "Lighthouse",       "",         &[], &[1, 1, 1, 2, 2], 3, Yellow),
             coins_and_points(Counted::Cards(vec![Yellow]), 1, 1)),
        with(row("CCP", "Chamber of Commerce", "",     &[], &[0, 1, 1, 2, 2], 3, Yellow),
             coins_and_points(Counted::Cards(vec![Gray]), 2, 2)),
        with(row("SSO", "Arena",           "",         &[], &[1, 1, 2, 2, 3], 3, Yellow),
             coins_and_points(Counted::WonderStages, 3, 1)),
        row("OOOS",  "Fortifications",     "XXX",      &[], &[1, 1, 1, 1, 2], 3, Red),
        row("SSSO",  "Circus",             "XXX",      &[], &[0, 1, 2, 3, 3], 3, Red),
        row("TTOL",  "Arsenal",            "XXX",      &[], &[1, 2, 2, 2, 3], 3, Red),
        row("CCCT",  "Siege Workshop",     "XXX",      &[], &[1, 1, 2, 2, 2], 3, Red),
        row("CCPL",  "Lodge",              "@",        &[], &[1, 1, 1, 2, 2], 3, Green),
        row("OOGL",  "Observatory",        "&",        &[], &[1, 1, 1, 1, 2], 3, Green),
        row("TTGP",  "University",         "#",        &[], &[1, 2, 2, 2, 2], 3, Green),
        row("SSSG",  "Academy",            "@",        &[], &[1, 1, 1, 1, 2], 3, Green),
        row("TPL",   "Study",              "&",        &[], &[1, 1, 2, 2, 2], 3, Green),
        // ── Guilds ──
        guild("OOSCT", "Workers Guild",      "", neighbour_guild(&[Brown], 1)),
        guild("OOSS",  "Craftsmens Guild",   "", neighbour_guild(&[Gray], 2)),
        guild("LPG",   "Traders Guild",      "", neighbour_guild(&[Yellow], 1)),
        guild("CCCLP", "Philosophers Guild", "", neighbour_guild(&[Green], 1)),
        guild("CCCG",  "Spies Guild",        "", neighbour_guild(&[Red], 1)),
        guild("TTTSL", "Magistrates Guild",  "", neighbour_guild(&[Blue], 1)),
        guild("OOSL",  "Strategists Guild",  "",
              CardEffect::Guild(Tally { scope: Scope::Neighbors, counted: Counted::Defeats, each: 1 })),
        guild("TTTGP", "Shipowners Guild",   "",
              CardEffect::Guild(Tally::cards(Scope::Own, &[Brown, Gray, Purple], 1))),
        guild("SSCCG", "Builders Guild",     "",
              CardEffect::Guild(Tally { scope: Scope::OwnAndNeighbors, counted: Counted::WonderStages, each: 1 })),
        guild("TTOOP", "Scientists Guild",   "&/#/@", CardEffect::None),
    ]
}

// ── Wonders ────────────────────────────────────────────────────────────

fn stage(cost: &str, production: &str, special: Option<WonderSpecial>) -> EngineResult<WonderStage> {
    Ok(WonderStage {
        cost: Ledger::from_codes(cost)?,
        production: Production::parse(production)?,
        special,
    })
}

fn wonder(name: &str, side: WonderSide, starting: &str, stages: Vec<WonderStage>) -> EngineResult<WonderDef> {
    Ok(WonderDef {
        name: name.to_string(),
        side,
        starting: Ledger::from_codes(starting)?,
        stages,
    })
}

fn standard_wonders() -> EngineResult<Vec<WonderDef>> {
    use WonderSide::{A, B};
    use WonderSpecial::*;

    Ok(vec![
        wonder("Colossus of Rhodes", A, "O", vec![
            stage("TT", "WWW", None)?,
            stage("CCC", "XX", None)?,
            stage("OOOO", "WWWWWWW", None)?,
        ])?,
        wonder("Colossus of Rhodes", B, "O", vec![
            stage("SSS", "XWWW$$$", None)?,
            stage("OOOO", "XWWWW$$$$", None)?,
        ])?,
        wonder("Lighthouse of Alexandria", A, "G", vec![
            stage("SS", "WWW", None)?,
            stage("OO", "T/S/C/O", None)?,
            stage("GG", "WWWWWWW", None)?,
        ])?,
        wonder("Lighthouse of Alexandria", B, "G", vec![
            stage("CC", "T/S/C/O", None)?,
            stage("TT", "L/G/P", None)?,
            stage("SSS", "WWWWWWW", None)?,
        ])?,
        wonder("Temple of Artemis", A, "P", vec![
            stage("SS", "WWW", None)?,
            stage("TT", "$$$$$$$$$", None)?,
            stage("PP", "WWWWWWW", None)?,
        ])?,
        wonder("Temple of Artemis", B, "P", vec![
            stage("SS", "WW$$$$", None)?,
            stage("TT", "WWW$$$$", None)?,
            stage("PLG", "WWWWW$$$$", None)?,
        ])?,
        wonder("Hanging Gardens of Babylon", A, "C", vec![
            stage("CC", "WWW", None)?,
            stage("TTT", "&/#/@", None)?,
            stage("CCCC", "WWWWWWW", None)?,
        ])?,
        wonder("Hanging Gardens of Babylon", B, "C", vec![
            stage("CL", "WWW", None)?,
            stage("TTG", "", Some(PlayLastCard))?,
            stage("CCCP", "&/#/@", None)?,
        ])?,
        wonder("Statue of Zeus", A, "T", vec![
            stage("TT", "WWW", None)?,
            stage("SS", "", Some(FreeBuild))?,
            stage("OO", "WWWWWWW", None)?,
        ])?,
        wonder("Statue of Zeus", B, "T", vec![
            stage("TT", "", Some(RawTradeDiscount))?,
            stage("SS", "WWWWW", None)?,
            stage("CCL", "", Some(CopyGuild))?,
        ])?,
        wonder("Mausoleum of Halikarnassos", A, "L", vec![
            stage("CC", "WWW", None)?,
            stage("OOO", "", Some(ReplayDiscard))?,
            stage("LL", "WWWWWWW", None)?,
        ])?,
        wonder("Mausoleum of Halikarnassos", B, "L", vec![
            stage("OO", "WW", Some(ReplayDiscard))?,
            stage("CCC", "W", Some(ReplayDiscard))?,
            stage("GPL", "", Some(ReplayDiscard))?,
        ])?,
        wonder("Pyramids of Giza", A, "S", vec![
            stage("SS", "WWW", None)?,
            stage("TTT", "WWWWW", None)?,
            stage("SSSS", "WWWWWWW", None)?,
        ])?,
        wonder("Pyramids of Giza", B, "S", vec![
            stage("TT", "WWW", None)?,
            stage("SSS", "WWWWW", None)?,
            stage("CCC", "WWWWW", None)?,
            stage("SSSSP", "WWWWWWW", None)?,
        ])?,
    ])
}
