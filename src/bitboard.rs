//! 4×13 bitboard: one 13-bit rank mask per suit.
//!
//! This is the evaluator's input shape. Because card ids are
//! `suit * 13 + rank`, a [`CardSet`] converts to it with four shifts.

use crate::card::{Card, Suit};
use crate::mask::CardSet;

pub const MASK13: u16 = (1u16 << 13) - 1;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub struct SuitMasks {
    suits: [u16; 4],
}

impl SuitMasks {
    #[inline(always)]
    pub const fn new() -> Self {
        Self { suits: [0; 4] }
    }

    #[inline]
    pub fn from_cards<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        let mut b = Self::new();
        for c in iter {
            b.add(c);
        }
        b
    }

    #[inline(always)]
    pub const fn from_set(set: CardSet) -> Self {
        let bits = set.bits();
        Self {
            suits: [
                (bits & MASK13 as u64) as u16,
                ((bits >> 13) & MASK13 as u64) as u16,
                ((bits >> 26) & MASK13 as u64) as u16,
                ((bits >> 39) & MASK13 as u64) as u16,
            ],
        }
    }

    #[inline(always)]
    pub const fn suits_array(&self) -> &[u16; 4] {
        &self.suits
    }

    #[inline(always)]
    pub const fn suit_mask(&self, suit: Suit) -> u16 {
        self.suits[suit.idx()]
    }

    /// Returns true if the card was already present.
    #[inline(always)]
    pub fn add(&mut self, card: Card) -> bool {
        let s = card.suit.idx();
        let bit = 1u16 << card.rank.idx();
        let already = (self.suits[s] & bit) != 0;
        self.suits[s] |= bit;
        already
    }

    #[inline(always)]
    pub fn len(&self) -> u32 {
        self.suits.iter().map(|m| m.count_ones()).sum()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.suits == [0; 4]
    }

    /// Ranks present in any suit.
    #[inline(always)]
    pub fn ranks_any(&self) -> u16 {
        self.suits[0] | self.suits[1] | self.suits[2] | self.suits[3]
    }

    /// Ranks held at least twice.
    #[inline(always)]
    pub fn ge2(&self) -> u16 {
        let [h0, h1, h2, h3] = self.suits;
        (h0 & h1) | (h0 & h2) | (h0 & h3) | (h1 & h2) | (h1 & h3) | (h2 & h3)
    }

    /// Ranks held at least three times.
    #[inline(always)]
    pub fn ge3(&self) -> u16 {
        let [h0, h1, h2, h3] = self.suits;
        (h0 & h1 & h2) | (h0 & h1 & h3) | (h0 & h2 & h3) | (h1 & h2 & h3)
    }

    /// Ranks held in all four suits.
    #[inline(always)]
    pub fn ge4(&self) -> u16 {
        self.suits[0] & self.suits[1] & self.suits[2] & self.suits[3]
    }
}
