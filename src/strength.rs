//! Packed, totally ordered hand strength.
//!
//! Layout of the inner `u32`:
//! bits 20..23 : category (0..9), higher is better
//! bits 16..19 : r0
//! bits 12..15 : r1
//! bits  8..11 : r2
//! bits  4..7  : r3
//! bits  0..3  : r4
//!
//! Each r* is a rank index (0..12), most significant first. Slots a category
//! does not use are 0, so plain integer comparison is the poker ordering.

use std::fmt;

use crate::card::Rank;

/// Hand categories (higher is better).
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    Trips = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    Quads = 7,
    StraightFlush = 8,
    /// Ace-high straight flush.
    RoyalFlush = 9,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::HighCard,
        Category::OnePair,
        Category::TwoPair,
        Category::Trips,
        Category::Straight,
        Category::Flush,
        Category::FullHouse,
        Category::Quads,
        Category::StraightFlush,
        Category::RoyalFlush,
    ];

    const fn from_u8(x: u8) -> Category {
        match x {
            0 => Category::HighCard,
            1 => Category::OnePair,
            2 => Category::TwoPair,
            3 => Category::Trips,
            4 => Category::Straight,
            5 => Category::Flush,
            6 => Category::FullHouse,
            7 => Category::Quads,
            8 => Category::StraightFlush,
            _ => Category::RoyalFlush,
        }
    }

    /// How many tiebreak ranks this category carries.
    pub const fn tiebreak_len(self) -> usize {
        match self {
            Category::HighCard | Category::Flush => 5,
            Category::OnePair => 4,
            Category::TwoPair | Category::Trips => 3,
            Category::FullHouse | Category::Quads => 2,
            Category::Straight | Category::StraightFlush | Category::RoyalFlush => 1,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Category::HighCard => "high card",
            Category::OnePair => "pair",
            Category::TwoPair => "two pair",
            Category::Trips => "three of a kind",
            Category::Straight => "straight",
            Category::Flush => "flush",
            Category::FullHouse => "full house",
            Category::Quads => "four of a kind",
            Category::StraightFlush => "straight flush",
            Category::RoyalFlush => "royal flush",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[repr(transparent)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HandStrength(u32);

impl HandStrength {
    #[inline(always)]
    pub(crate) fn pack(cat: Category, r: [u8; 5]) -> Self {
        Self(
            ((cat as u32) << 20)
                | ((r[0] as u32) << 16)
                | ((r[1] as u32) << 12)
                | ((r[2] as u32) << 8)
                | ((r[3] as u32) << 4)
                | (r[4] as u32 & 0xF),
        )
    }

    /// The packed value; larger is stronger.
    #[inline(always)]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub const fn category(self) -> Category {
        Category::from_u8(((self.0 >> 20) & 0xF) as u8)
    }

    /// Tiebreak ranks, most significant first: multiplicity groups by
    /// (count desc, rank desc) then kickers. Straights carry only their
    /// high card, which is the Five for the wheel.
    pub fn tiebreaks(self) -> Vec<Rank> {
        (0..self.category().tiebreak_len())
            .map(|i| Rank::from_u8(((self.0 >> (16 - 4 * i)) & 0xF) as u8))
            .collect()
    }
}

impl fmt::Display for HandStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.category())?;
        for r in self.tiebreaks() {
            write!(f, "{r}")?;
        }
        write!(f, ")")
    }
}
