//! Live deck: the 52 cards minus an exclusion set, sampled without
//! replacement by partial Fisher–Yates.

use rand::Rng;

use crate::card::Card;
use crate::error::{Error, Result};
use crate::mask::CardSet;

/// Remaining cards, stored as ids in a fixed array so copying a deck per
/// trial never allocates.
#[derive(Copy, Clone, Debug)]
pub struct Deck {
    ids: [u8; 52],
    len: usize,
}

/// Build the live deck with `excluded` removed.
///
/// Fails with [`Error::InvalidCard`] on a repeated card or more than 52
/// exclusions.
pub fn make_deck(excluded: &[Card]) -> Result<Deck> {
    if excluded.len() > 52 {
        return Err(Error::InvalidCard(format!(
            "{} excluded cards exceed the deck",
            excluded.len()
        )));
    }
    let dead = CardSet::from_distinct(excluded)?;
    Ok(Deck::without(dead))
}

impl Deck {
    /// Full deck in id order.
    pub fn full() -> Self {
        Self::without(CardSet::empty())
    }

    pub fn without(dead: CardSet) -> Self {
        let mut ids = [0u8; 52];
        let mut len = 0usize;
        for c in dead.complement().iter() {
            ids[len] = c.id();
            len += 1;
        }
        Self { ids, len }
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn cards(&self) -> impl Iterator<Item = Card> + '_ {
        self.ids[..self.len].iter().map(|&id| Card::from_id(id))
    }

    pub fn as_set(&self) -> CardSet {
        self.cards().collect()
    }

    pub fn contains(&self, card: Card) -> bool {
        self.ids[..self.len].contains(&card.id())
    }

    /// Drop every card of `dead` still in the deck.
    pub fn remove_all(&mut self, dead: CardSet) {
        let mut w = 0usize;
        for r in 0..self.len {
            let id = self.ids[r];
            if !dead.contains(Card::from_id(id)) {
                self.ids[w] = id;
                w += 1;
            }
        }
        self.len = w;
    }

    /// Fill `out` with distinct cards drawn uniformly, removing them.
    pub fn draw_into<R: Rng + ?Sized>(&mut self, out: &mut [Card], rng: &mut R) -> Result<()> {
        let n = out.len();
        if n > self.len {
            return Err(Error::InsufficientCards {
                requested: n,
                available: self.len,
            });
        }
        // swap the chosen card into the tail, then shrink
        for slot in out.iter_mut() {
            let j = rng.random_range(0..self.len);
            let last = self.len - 1;
            self.ids.swap(j, last);
            *slot = Card::from_id(self.ids[last]);
            self.len = last;
        }
        Ok(())
    }

    /// Draw `n` distinct cards uniformly at random, removing them.
    pub fn draw_random<R: Rng + ?Sized>(&mut self, n: usize, rng: &mut R) -> Result<Vec<Card>> {
        let mut out = vec![Card::from_id(0); n];
        self.draw_into(&mut out, rng)?;
        Ok(out)
    }

    /// Deal `players` hands of `each` cards.
    pub fn deal<R: Rng + ?Sized>(
        &mut self,
        players: usize,
        each: usize,
        rng: &mut R,
    ) -> Result<Vec<Vec<Card>>> {
        let need = players * each;
        if need > self.len {
            return Err(Error::InsufficientCards {
                requested: need,
                available: self.len,
            });
        }
        (0..players).map(|_| self.draw_random(each, rng)).collect()
    }
}
