//! Symbol definitions and symbol rows

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use rf_core::{SlotError, SlotResult};

/// Number of reels on the machine (and symbols in a row)
pub const REEL_COUNT: usize = 5;

/// Number of distinct symbols (cards per reel)
pub const SYMBOL_COUNT: usize = 16;

/// Symbol family classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum SymbolFamily {
    /// Seven, cross, respin, question: never merge by family
    Special = 0,
    Fruit = 1,
    Suit = 2,
    Jewel = 3,
}

/// A reel symbol
///
/// The discriminant is the card index on every reel, so a reel resting at
/// integer position `n` shows `Symbol::from_index(n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Symbol {
    /// Biggest base value, doesn't combine with others
    Seven = 0,
    /// Breaker - truncates adjacent combos
    Cross = 1,
    /// Auto respin trigger
    Respin = 2,
    /// Wildcard - combines with any neighbour at reduced price
    Question = 3,
    Apple = 4,
    Carrot = 5,
    Corn = 6,
    Grape = 7,
    Spade = 8,
    Club = 9,
    Heart = 10,
    Diamond = 11,
    Amethyst = 12,
    Emerald = 13,
    Topaz = 14,
    Crystal = 15,
}

impl Symbol {
    /// All symbols in card order
    pub const ALL: [Symbol; SYMBOL_COUNT] = [
        Symbol::Seven,
        Symbol::Cross,
        Symbol::Respin,
        Symbol::Question,
        Symbol::Apple,
        Symbol::Carrot,
        Symbol::Corn,
        Symbol::Grape,
        Symbol::Spade,
        Symbol::Club,
        Symbol::Heart,
        Symbol::Diamond,
        Symbol::Amethyst,
        Symbol::Emerald,
        Symbol::Topaz,
        Symbol::Crystal,
    ];

    /// Symbol for a card index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Card index on the reel
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable lowercase name (also the texture key on the render side)
    pub fn name(self) -> &'static str {
        match self {
            Symbol::Seven => "seven",
            Symbol::Cross => "cross",
            Symbol::Respin => "respin",
            Symbol::Question => "question",
            Symbol::Apple => "apple",
            Symbol::Carrot => "carrot",
            Symbol::Corn => "corn",
            Symbol::Grape => "grape",
            Symbol::Spade => "spade",
            Symbol::Club => "club",
            Symbol::Heart => "heart",
            Symbol::Diamond => "diamond",
            Symbol::Amethyst => "amethyst",
            Symbol::Emerald => "emerald",
            Symbol::Topaz => "topaz",
            Symbol::Crystal => "crystal",
        }
    }

    pub fn family(self) -> SymbolFamily {
        match self {
            Symbol::Seven | Symbol::Cross | Symbol::Respin | Symbol::Question => {
                SymbolFamily::Special
            }
            Symbol::Apple | Symbol::Carrot | Symbol::Corn | Symbol::Grape => SymbolFamily::Fruit,
            Symbol::Spade | Symbol::Club | Symbol::Heart | Symbol::Diamond => SymbolFamily::Suit,
            Symbol::Amethyst | Symbol::Emerald | Symbol::Topaz | Symbol::Crystal => {
                SymbolFamily::Jewel
            }
        }
    }

    /// Base point value before multipliers
    pub const fn base_value(self) -> u32 {
        match self {
            Symbol::Seven => 32,
            Symbol::Cross | Symbol::Respin | Symbol::Question => 12,
            Symbol::Apple | Symbol::Carrot | Symbol::Corn | Symbol::Grape => 8,
            Symbol::Spade | Symbol::Club | Symbol::Heart | Symbol::Diamond => 16,
            Symbol::Amethyst | Symbol::Emerald | Symbol::Topaz | Symbol::Crystal => 24,
        }
    }

    #[inline]
    pub fn is_wildcard(self) -> bool {
        self == Symbol::Question
    }

    #[inline]
    pub fn is_breaker(self) -> bool {
        self == Symbol::Cross
    }

    #[inline]
    pub fn triggers_respin(self) -> bool {
        self == Symbol::Respin
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Symbol {
    type Err = SlotError;

    /// Parses a symbol name (`"seven"`) or a card index (`"0"`)
    fn from_str(s: &str) -> SlotResult<Self> {
        let s = s.trim();
        if let Ok(index) = s.parse::<usize>() {
            return Self::from_index(index).ok_or_else(|| SlotError::UnknownSymbol(s.to_string()));
        }
        Self::ALL
            .iter()
            .copied()
            .find(|sym| sym.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SlotError::UnknownSymbol(s.to_string()))
    }
}

/// One symbol per reel, left to right
pub type SymbolRow = [Symbol; REEL_COUNT];

/// Parse a row from comma- or whitespace-separated symbols
pub fn parse_row(text: &str) -> SlotResult<SymbolRow> {
    let symbols = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(Symbol::from_str)
        .collect::<SlotResult<Vec<_>>>()?;

    let got = symbols.len();
    symbols
        .try_into()
        .map_err(|_| SlotError::RowLength {
            expected: REEL_COUNT,
            got,
        })
}

/// Format a row as `seven, cross, ...`
pub fn format_row(row: &SymbolRow) -> String {
    row.iter().map(|s| s.name()).collect::<Vec<_>>().join(", ")
}
