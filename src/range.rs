//! Starting-hand combos, weighted ranges, and the holding a player brings
//! to a query.
//!
//! Range notation (comma separated, optional `:weight` suffix):
//! - `"AA"`      all 6 pair combos
//! - `"AKs"`     4 suited combos, `"AKo"` 12 offsuit, `"AK"` all 16
//! - `"77+"`     77 through AA
//! - `"ATs+"`    ATs, AJs, AQs, AKs (kicker climbs, top card fixed)
//! - `"AsKs"`    one specific combo
//! - `"random"`  all 1326 combos
//!
//! Later tokens override earlier ones for the same combo.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rand::distr::weighted::WeightedIndex;
use rand::distr::Distribution;
use rand::Rng;

use crate::card::{parse_cards, Card, Rank, Suit};
use crate::error::{Error, Result};
use crate::mask::CardSet;

/// Two distinct hole cards, stored higher id first.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combo {
    hi: Card,
    lo: Card,
}

impl Combo {
    pub fn new(a: Card, b: Card) -> Result<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Greater => Ok(Self { hi: a, lo: b }),
            std::cmp::Ordering::Less => Ok(Self { hi: b, lo: a }),
            std::cmp::Ordering::Equal => {
                Err(Error::InvalidCard(format!("combo repeats card {a}")))
            }
        }
    }

    pub fn from_cards(cards: &[Card]) -> Result<Self> {
        match cards {
            [a, b] => Self::new(*a, *b),
            _ => Err(Error::InvalidRange(format!(
                "a combo needs exactly 2 cards, got {}",
                cards.len()
            ))),
        }
    }

    #[inline(always)]
    pub const fn cards(self) -> [Card; 2] {
        [self.hi, self.lo]
    }

    #[inline(always)]
    pub const fn mask(self) -> CardSet {
        CardSet::from_bits((1u64 << self.hi.id()) | (1u64 << self.lo.id()))
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.hi, self.lo)
    }
}

impl FromStr for Combo {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_cards(&parse_cards(s)?)
    }
}

/// Weighted set of combos. Zero-weight entries are never stored.
#[derive(Clone, Debug, Default)]
pub struct Range {
    entries: Vec<(Combo, f64)>,
    index: Option<WeightedIndex<f64>>,
}

impl Range {
    fn from_map(map: BTreeMap<Combo, f64>) -> Self {
        let entries: Vec<(Combo, f64)> = map.into_iter().filter(|&(_, w)| w > 0.0).collect();
        let index = WeightedIndex::new(entries.iter().map(|&(_, w)| w)).ok();
        Self { entries, index }
    }

    /// A range holding exactly one combo.
    pub fn from_fixed_hand(cards: &[Card]) -> Result<Self> {
        let combo = Combo::from_cards(cards)?;
        Ok(Self::from_map(BTreeMap::from([(combo, 1.0)])))
    }

    /// Build from parallel slices of 2-card entries and relative weights.
    pub fn from_range_spec<E: AsRef<[Card]>>(entries: &[E], weights: &[f64]) -> Result<Self> {
        if entries.len() != weights.len() {
            return Err(Error::InvalidRange(format!(
                "{} entries but {} weights",
                entries.len(),
                weights.len()
            )));
        }
        let mut map = BTreeMap::new();
        for (cards, &w) in entries.iter().zip(weights) {
            check_weight(w)?;
            map.insert(Combo::from_cards(cards.as_ref())?, w);
        }
        Ok(Self::from_map(map))
    }

    pub fn from_combos<I: IntoIterator<Item = (Combo, f64)>>(combos: I) -> Result<Self> {
        let mut map = BTreeMap::new();
        for (c, w) in combos {
            check_weight(w)?;
            map.insert(c, w);
        }
        Ok(Self::from_map(map))
    }

    /// Parse range notation, see the module docs.
    pub fn parse(s: &str) -> Result<Self> {
        let mut map = BTreeMap::new();
        for token in s.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (hand, weight) = match token.split_once(':') {
                Some((h, w)) => {
                    let w: f64 = w
                        .trim()
                        .parse()
                        .map_err(|_| Error::InvalidRange(format!("bad weight in {token:?}")))?;
                    (h.trim(), w)
                }
                None => (token, 1.0),
            };
            check_weight(weight)?;
            for combo in expand_token(hand)? {
                map.insert(combo, weight);
            }
        }
        Ok(Self::from_map(map))
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(Combo, f64)] {
        &self.entries
    }

    pub fn total_weight(&self) -> f64 {
        self.entries.iter().map(|&(_, w)| w).sum()
    }

    pub fn weight_of(&self, combo: Combo) -> f64 {
        self.entries
            .binary_search_by(|(c, _)| c.cmp(&combo))
            .map_or(0.0, |i| self.entries[i].1)
    }

    /// Drop every combo touching `dead`. Weights are kept as they are;
    /// normalisation happens at sampling time.
    pub fn filter_dead(&self, dead: CardSet) -> Self {
        let entries: Vec<(Combo, f64)> = self
            .entries
            .iter()
            .copied()
            .filter(|(c, _)| !c.mask().intersects(dead))
            .collect();
        let index = WeightedIndex::new(entries.iter().map(|&(_, w)| w)).ok();
        Self { entries, index }
    }

    /// Draw one combo proportionally to weight.
    pub fn sample_one<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Combo> {
        match &self.index {
            Some(index) => Ok(self.entries[index.sample(rng)].0),
            None => Err(Error::RangeExhausted { player: None }),
        }
    }
}

impl FromStr for Range {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn check_weight(w: f64) -> Result<()> {
    if !w.is_finite() || w < 0.0 {
        return Err(Error::InvalidRange(format!("weight {w} must be finite and >= 0")));
    }
    Ok(())
}

fn rank_of(c: char, token: &str) -> Result<Rank> {
    Rank::from_char(c).ok_or_else(|| Error::InvalidRange(format!("bad rank {c:?} in {token:?}")))
}

fn pair_combos(r: Rank, out: &mut Vec<Combo>) {
    for (i, &s1) in Suit::ALL.iter().enumerate() {
        for &s2 in &Suit::ALL[i + 1..] {
            out.extend(Combo::new(Card::new(r, s1), Card::new(r, s2)).ok());
        }
    }
}

fn unpaired_combos(hi: Rank, lo: Rank, suited: Option<bool>, out: &mut Vec<Combo>) {
    for s1 in Suit::ALL {
        for s2 in Suit::ALL {
            let keep = match suited {
                Some(true) => s1 == s2,
                Some(false) => s1 != s2,
                None => true,
            };
            if keep {
                out.extend(Combo::new(Card::new(hi, s1), Card::new(lo, s2)).ok());
            }
        }
    }
}

fn expand_token(token: &str) -> Result<Vec<Combo>> {
    let mut out = Vec::new();
    if token.eq_ignore_ascii_case("random") || token.eq_ignore_ascii_case("any") {
        let all: Vec<Card> = Card::all().collect();
        for (i, &a) in all.iter().enumerate() {
            for &b in &all[i + 1..] {
                out.extend(Combo::new(a, b).ok());
            }
        }
        return Ok(out);
    }

    let chars: Vec<char> = token.chars().collect();
    if chars.len() == 4 && Suit::from_char(chars[1]).is_some() && chars[3] != '+' {
        out.push(token.parse::<Combo>().map_err(|_| {
            Error::InvalidRange(format!("bad combo {token:?}"))
        })?);
        return Ok(out);
    }

    let (body, plus) = match chars.split_last() {
        Some((&'+', rest)) => (rest, true),
        _ => (&chars[..], false),
    };
    let suited = match body {
        [_, _] => None,
        [_, _, 's' | 'S'] => Some(true),
        [_, _, 'o' | 'O'] => Some(false),
        _ => return Err(Error::InvalidRange(format!("unrecognised hand {token:?}"))),
    };
    let a = rank_of(body[0], token)?;
    let b = rank_of(body[1], token)?;
    let (hi, lo) = if a >= b { (a, b) } else { (b, a) };

    if hi == lo {
        if suited.is_some() {
            return Err(Error::InvalidRange(format!("pair cannot be suited/offsuit: {token:?}")));
        }
        let top = if plus { Rank::Ace.idx() } else { hi.idx() };
        for r in hi.idx()..=top {
            pair_combos(Rank::from_u8(r), &mut out);
        }
    } else {
        let top = if plus { hi.idx() - 1 } else { lo.idx() };
        for r in lo.idx()..=top {
            unpaired_combos(hi, Rank::from_u8(r), suited, &mut out);
        }
    }
    Ok(out)
}

/// What a player holds: known hole cards or a weighted range.
#[derive(Clone, Debug)]
pub enum Holding {
    Fixed(Combo),
    Weighted(Range),
}

impl Holding {
    pub fn fixed(a: Card, b: Card) -> Result<Self> {
        Combo::new(a, b).map(Holding::Fixed)
    }

    /// `"AsKd"` is a fixed hand, anything else is range notation.
    pub fn parse(s: &str) -> Result<Self> {
        match s.parse::<Combo>() {
            Ok(c) => Ok(Holding::Fixed(c)),
            Err(_) => Range::parse(s).map(Holding::Weighted),
        }
    }

    /// Cards known before any sampling.
    pub fn known(&self) -> CardSet {
        match self {
            Holding::Fixed(c) => c.mask(),
            Holding::Weighted(_) => CardSet::empty(),
        }
    }

    /// One draw of hole cards from this holding alone. Keeping the table's
    /// hands disjoint is the caller's job.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Combo> {
        match self {
            Holding::Fixed(c) => Ok(*c),
            Holding::Weighted(r) => r.sample_one(rng),
        }
    }
}

impl From<Combo> for Holding {
    fn from(c: Combo) -> Self {
        Holding::Fixed(c)
    }
}

impl From<Range> for Holding {
    fn from(r: Range) -> Self {
        Holding::Weighted(r)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn combo(s: &str) -> Combo {
        s.parse().unwrap()
    }

    #[test]
    fn combo_is_order_independent() {
        assert_eq!(combo("AsKd"), combo("KdAs"));
        assert!(matches!("AsAs".parse::<Combo>(), Err(Error::InvalidCard(_))));
        assert!(matches!("AsKdQh".parse::<Combo>(), Err(Error::InvalidRange(_))));
    }

    #[test]
    fn notation_counts() {
        assert_eq!(Range::parse("AA").unwrap().len(), 6);
        assert_eq!(Range::parse("AKs").unwrap().len(), 4);
        assert_eq!(Range::parse("AKo").unwrap().len(), 12);
        assert_eq!(Range::parse("AK").unwrap().len(), 16);
        assert_eq!(Range::parse("QQ+").unwrap().len(), 18);
        assert_eq!(Range::parse("ATs+").unwrap().len(), 16);
        assert_eq!(Range::parse("KQo+").unwrap().len(), 12);
        assert_eq!(Range::parse("AsKs").unwrap().len(), 1);
        assert_eq!(Range::parse("random").unwrap().len(), 1326);
        assert_eq!(Range::parse("AA, KK, AKs").unwrap().len(), 16);
    }

    #[test]
    fn notation_weights_and_overrides() {
        let r = Range::parse("QQ+,KK:0.25,AsKs:2").unwrap();
        assert_eq!(r.weight_of(combo("AsAh")), 1.0);
        assert_eq!(r.weight_of(combo("KsKh")), 0.25);
        assert_eq!(r.weight_of(combo("AsKs")), 2.0);
        assert_eq!(r.weight_of(combo("JsJh")), 0.0);
        let zeroed = Range::parse("AA,KK:0").unwrap();
        assert_eq!(zeroed.len(), 6);
    }

    #[test]
    fn notation_errors() {
        for bad in ["AAs", "AX", "AK:-1", "AK:x", "AKq", "A", "AsAs"] {
            assert!(
                matches!(Range::parse(bad), Err(Error::InvalidRange(_))),
                "{bad} should fail"
            );
        }
    }

    #[test]
    fn range_spec_validation() {
        let ok = Range::from_range_spec(
            &[parse_cards("AsAh").unwrap(), parse_cards("KsKh").unwrap()],
            &[1.0, 3.0],
        )
        .unwrap();
        assert_eq!(ok.len(), 2);
        assert_eq!(ok.total_weight(), 4.0);

        let neg = Range::from_range_spec(&[parse_cards("AsAh").unwrap()], &[-0.5]);
        assert!(matches!(neg, Err(Error::InvalidRange(_))));

        let three = Range::from_range_spec(&[parse_cards("AsAhAd").unwrap()], &[1.0]);
        assert!(matches!(three, Err(Error::InvalidRange(_))));

        let mismatch = Range::from_range_spec(&[parse_cards("AsAh").unwrap()], &[1.0, 2.0]);
        assert!(matches!(mismatch, Err(Error::InvalidRange(_))));
    }

    #[test]
    fn filter_dead_keeps_raw_weights() {
        let r = Range::parse("AA:0.5,KK").unwrap();
        let dead: CardSet = parse_cards("As").unwrap().into_iter().collect();
        let f = r.filter_dead(dead);
        assert_eq!(f.len(), 3 + 6);
        assert_eq!(f.weight_of(combo("AhAd")), 0.5);
        assert_eq!(f.total_weight(), 3.0 * 0.5 + 6.0);
    }

    #[test]
    fn exhausted_range_refuses_to_sample() {
        let r = Range::parse("AsAh,AsAd").unwrap();
        let dead: CardSet = parse_cards("As").unwrap().into_iter().collect();
        let f = r.filter_dead(dead);
        assert!(f.is_empty());
        let mut rng = SmallRng::seed_from_u64(0);
        assert_eq!(
            f.sample_one(&mut rng).unwrap_err(),
            Error::RangeExhausted { player: None }
        );
    }

    #[test]
    fn sampling_follows_weights() {
        let r = Range::parse("AsAh:3,KsKh:1").unwrap();
        let mut rng = SmallRng::seed_from_u64(11);
        let aces = (0..40_000)
            .filter(|_| r.sample_one(&mut rng).unwrap() == combo("AsAh"))
            .count();
        let share = aces as f64 / 40_000.0;
        assert!((share - 0.75).abs() < 0.015, "{share}");
    }

    #[test]
    fn from_combos_validates_and_drops_zero_weights() {
        let r = Range::from_combos([(combo("AsAh"), 2.0), (combo("KsKh"), 0.0)]).unwrap();
        assert_eq!(r.len(), 1);
        assert_eq!(r.weight_of(combo("AsAh")), 2.0);
        assert!(matches!(
            Range::from_combos([(combo("AsAh"), f64::NAN)]),
            Err(Error::InvalidRange(_))
        ));
    }

    #[test]
    fn holding_parse_and_sample() {
        let mut rng = SmallRng::seed_from_u64(9);
        let fixed = Holding::parse("AsKs").unwrap();
        assert!(matches!(fixed, Holding::Fixed(_)));
        assert_eq!(fixed.known().len(), 2);
        assert_eq!(fixed.sample(&mut rng).unwrap(), combo("AsKs"));

        let ranged = Holding::parse("QQ+").unwrap();
        assert!(ranged.known().is_empty());
        for _ in 0..100 {
            let c = ranged.sample(&mut rng).unwrap();
            assert!(c.cards().iter().all(|card| card.rank >= Rank::Queen));
        }
        let empty = Holding::Weighted(Range::default());
        assert_eq!(
            empty.sample(&mut rng).unwrap_err(),
            Error::RangeExhausted { player: None }
        );
    }
}
