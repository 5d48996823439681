//! 52-bit card set over card ids, used for dead/used-card bookkeeping.

use crate::card::Card;
use crate::error::{Error, Result};

pub const FULL_DECK: u64 = (1u64 << 52) - 1;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct CardSet(u64);

impl CardSet {
    #[inline(always)]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline(always)]
    pub const fn full() -> Self {
        Self(FULL_DECK)
    }

    /// Bits above 51 are dropped.
    #[inline(always)]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits & FULL_DECK)
    }

    #[inline(always)]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Build a set, failing on the first duplicate.
    pub fn from_distinct(cards: &[Card]) -> Result<Self> {
        let mut set = Self::empty();
        for &c in cards {
            set.insert_distinct(c)?;
        }
        Ok(set)
    }

    /// Returns true if the card was already present.
    #[inline(always)]
    pub fn insert(&mut self, card: Card) -> bool {
        let bit = 1u64 << card.id();
        let already = (self.0 & bit) != 0;
        self.0 |= bit;
        already
    }

    #[inline]
    pub fn insert_distinct(&mut self, card: Card) -> Result<()> {
        if self.insert(card) {
            return Err(Error::InvalidCard(format!("duplicate card {card}")));
        }
        Ok(())
    }

    #[inline(always)]
    pub fn remove(&mut self, card: Card) {
        self.0 &= !(1u64 << card.id());
    }

    #[inline(always)]
    pub const fn contains(self, card: Card) -> bool {
        (self.0 >> card.id()) & 1 == 1
    }

    #[inline(always)]
    pub const fn intersects(self, other: CardSet) -> bool {
        (self.0 & other.0) != 0
    }

    #[inline(always)]
    pub const fn union(self, other: CardSet) -> CardSet {
        CardSet(self.0 | other.0)
    }

    #[inline(always)]
    pub const fn complement(self) -> CardSet {
        CardSet(!self.0 & FULL_DECK)
    }

    #[inline(always)]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    #[inline(always)]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Cards in ascending id order.
    pub fn iter(self) -> impl Iterator<Item = Card> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let id = bits.trailing_zeros() as u8;
            bits &= bits - 1;
            Some(Card::from_id(id))
        })
    }
}

impl FromIterator<Card> for CardSet {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        let mut set = Self::empty();
        for c in iter {
            set.insert(c);
        }
        set
    }
}
