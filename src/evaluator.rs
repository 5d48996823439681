//! Table-driven evaluator over [`SuitMasks`].
//!
//! One pass over the four suit masks: derive the rank union and the
//! multiplicity masks, take the best category top-down, pack into a
//! [`HandStrength`]. For 6 and 7 cards this scan yields the same value as the
//! maximum over every 5-card subset, without enumerating them.

use crate::bitboard::SuitMasks;
use crate::card::Card;
use crate::error::{Error, Result};
use crate::lut::{count, straight, top, top_k};
use crate::strength::{Category, HandStrength};

#[inline(always)]
fn bit(rank: i8) -> u16 {
    1u16 << rank
}

/// Evaluate 5 to 7 cards already packed into suit masks.
///
/// Unchecked: the caller guarantees at least five distinct cards.
#[inline(always)]
pub fn evaluate_masks(hand: &SuitMasks) -> HandStrength {
    let suits = *hand.suits_array();
    let ranks = hand.ranks_any();
    let ge2 = hand.ge2();
    let ge3 = hand.ge3();
    let ge4 = hand.ge4();

    let mut best_sf: i8 = -1;
    for &m in &suits {
        if count(m) >= 5 {
            best_sf = best_sf.max(straight(m));
        }
    }
    if best_sf == 12 {
        return HandStrength::pack(Category::RoyalFlush, [12, 0, 0, 0, 0]);
    }
    if best_sf >= 0 {
        return HandStrength::pack(Category::StraightFlush, [best_sf as u8, 0, 0, 0, 0]);
    }

    if ge4 != 0 {
        let q = top(ge4);
        let k = top(ranks & !bit(q));
        return HandStrength::pack(Category::Quads, [q as u8, k as u8, 0, 0, 0]);
    }

    // second group may itself be a set (two trips in seven cards)
    if ge3 != 0 {
        let t = top(ge3);
        let p = top(ge2 & !bit(t));
        if p >= 0 {
            return HandStrength::pack(Category::FullHouse, [t as u8, p as u8, 0, 0, 0]);
        }
    }

    for &m in &suits {
        if count(m) >= 5 {
            return HandStrength::pack(Category::Flush, top_k::<5>(m));
        }
    }

    let s = straight(ranks);
    if s >= 0 {
        return HandStrength::pack(Category::Straight, [s as u8, 0, 0, 0, 0]);
    }

    if ge3 != 0 {
        let t = top(ge3);
        let [k1, k2] = top_k::<2>(ranks & !bit(t));
        return HandStrength::pack(Category::Trips, [t as u8, k1, k2, 0, 0]);
    }

    if count(ge2) >= 2 {
        let [p1, p2] = top_k::<2>(ge2);
        let k = top(ranks & !((1u16 << p1) | (1u16 << p2)));
        return HandStrength::pack(Category::TwoPair, [p1, p2, k as u8, 0, 0]);
    }

    if ge2 != 0 {
        let p = top(ge2);
        let [k1, k2, k3] = top_k::<3>(ranks & !bit(p));
        return HandStrength::pack(Category::OnePair, [p as u8, k1, k2, k3, 0]);
    }

    HandStrength::pack(Category::HighCard, top_k::<5>(ranks))
}

fn pack_checked(cards: &[Card]) -> Result<SuitMasks> {
    if !(5..=7).contains(&cards.len()) {
        return Err(Error::InvalidHand(format!(
            "expected 5, 6 or 7 cards, got {}",
            cards.len()
        )));
    }
    let mut masks = SuitMasks::new();
    for &c in cards {
        if masks.add(c) {
            return Err(Error::InvalidHand(format!("duplicate card {c}")));
        }
    }
    Ok(masks)
}

/// Strength of the best five-card hand within `cards` (5, 6 or 7 distinct
/// cards, any order).
pub fn evaluate(cards: &[Card]) -> Result<HandStrength> {
    pack_checked(cards).map(|m| evaluate_masks(&m))
}

/// The five cards that make the best hand, with its strength.
///
/// Walks the (at most 21) five-card subsets explicitly; the first subset
/// reaching the maximum wins, so the choice is stable for a given input
/// order.
pub fn best_five(cards: &[Card]) -> Result<(HandStrength, [Card; 5])> {
    pack_checked(cards)?;
    let n = cards.len();
    let mut best: Option<(HandStrength, [Card; 5])> = None;
    for a in 0..n {
        for b in (a + 1)..n {
            for c in (b + 1)..n {
                for d in (c + 1)..n {
                    for e in (d + 1)..n {
                        let five = [cards[a], cards[b], cards[c], cards[d], cards[e]];
                        let s = evaluate_masks(&SuitMasks::from_cards(five));
                        if best.map_or(true, |(bs, _)| s > bs) {
                            best = Some((s, five));
                        }
                    }
                }
            }
        }
    }
    best.ok_or_else(|| Error::InvalidHand("no five-card subset".into()))
}
