//! Const-built tables over 13-bit rank masks (0..8191).
//!
//! - `COUNT`    -> number of ranks in the mask
//! - `TOP`      -> highest rank index (0..12), or -1 for an empty mask
//! - `STRAIGHT` -> high rank of the best five-rank run, or -1.
//!   The wheel A2345 reports 3 (the Five), below every other run.

use crate::bitboard::MASK13;

const N: usize = 1 << 13;
const RUN5: u16 = 0b1_1111;
const WHEEL: u16 = (1 << 12) | 0b1111;

const fn top_rank(mask: u16) -> i8 {
    if mask == 0 {
        -1
    } else {
        15 - mask.leading_zeros() as i8
    }
}

const fn straight_high(mask: u16) -> i8 {
    let mut low: i8 = 8;
    while low >= 0 {
        let run = RUN5 << low as u16;
        if mask & run == run {
            return low + 4;
        }
        low -= 1;
    }
    if mask & WHEEL == WHEEL {
        return 3;
    }
    -1
}

const fn build_count() -> [u8; N] {
    let mut t = [0u8; N];
    let mut m = 0;
    while m < N {
        t[m] = (m as u16).count_ones() as u8;
        m += 1;
    }
    t
}

const fn build_top() -> [i8; N] {
    let mut t = [0i8; N];
    let mut m = 0;
    while m < N {
        t[m] = top_rank(m as u16);
        m += 1;
    }
    t
}

const fn build_straight() -> [i8; N] {
    let mut t = [0i8; N];
    let mut m = 0;
    while m < N {
        t[m] = straight_high(m as u16);
        m += 1;
    }
    t
}

static COUNT: [u8; N] = build_count();
static TOP: [i8; N] = build_top();
static STRAIGHT: [i8; N] = build_straight();

#[inline(always)]
pub fn count(mask: u16) -> u8 {
    COUNT[(mask & MASK13) as usize]
}

#[inline(always)]
pub fn top(mask: u16) -> i8 {
    TOP[(mask & MASK13) as usize]
}

#[inline(always)]
pub fn straight(mask: u16) -> i8 {
    STRAIGHT[(mask & MASK13) as usize]
}

/// The `K` highest ranks of `mask`, descending. Missing slots are 0;
/// callers only ask for as many ranks as the mask is known to hold.
#[inline(always)]
pub fn top_k<const K: usize>(mut mask: u16) -> [u8; K] {
    let mut out = [0u8; K];
    for slot in out.iter_mut() {
        let r = top(mask);
        if r < 0 {
            break;
        }
        *slot = r as u8;
        mask &= !(1u16 << r);
    }
    out
}
