//! Equity engine: exact enumeration when the unknown-card space is small,
//! seeded Monte Carlo otherwise.
//!
//! Both modes split their work into `workers` contiguous chunks. Every chunk
//! owns its tally (and, when sampling, its own `SmallRng` seeded from the
//! master seed and the chunk index); tallies are merged once, in chunk
//! order. Results therefore depend on `(seed, workers)` only, never on how
//! many threads actually ran the chunks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::bitboard::SuitMasks;
use crate::card::Card;
use crate::deck::Deck;
use crate::error::{Error, Result};
use crate::evaluator::evaluate_masks;
use crate::mask::CardSet;
use crate::range::{Combo, Holding, Range};
use crate::strength::HandStrength;

pub const MAX_PLAYERS: usize = 10;
pub const DEFAULT_TRIALS: u64 = 100_000;
pub const DEFAULT_ENUMERATION_CEILING: u64 = 2_000_000;
pub const DEFAULT_WORKERS: usize = 8;
pub const MAX_WORKERS: usize = 256;
pub const DEFAULT_MAX_RETRIES: u32 = 1_000;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EquityConfig {
    /// Monte Carlo trials; ignored when the query is enumerated.
    pub trials: u64,
    /// Master seed. `None` draws one and reports it in the result.
    pub seed: Option<u64>,
    /// Enumerate exactly when the showdown count is at most this.
    pub enumeration_ceiling: u64,
    pub timeout: Option<Duration>,
    /// Number of work chunks (and RNG streams).
    pub workers: usize,
    /// Whole-trial re-deals allowed after ranged hands collide, before the
    /// query fails.
    pub max_retries: u32,
}

impl Default for EquityConfig {
    fn default() -> Self {
        Self {
            trials: DEFAULT_TRIALS,
            seed: None,
            enumeration_ceiling: DEFAULT_ENUMERATION_CEILING,
            timeout: None,
            workers: DEFAULT_WORKERS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl EquityConfig {
    pub fn with_trials(mut self, trials: u64) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_enumeration_ceiling(mut self, ceiling: u64) -> Self {
        self.enumeration_ceiling = ceiling;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.trials == 0 {
            return Err(Error::InvalidConfig("trials must be at least 1"));
        }
        if self.workers == 0 || self.workers > MAX_WORKERS {
            return Err(Error::InvalidConfig("workers must be between 1 and 256"));
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    Exact,
    Sampled,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Status {
    Complete,
    /// Stopped by the timeout; counts cover the trials that finished.
    Partial,
    /// Stopped by the cancel flag.
    Cancelled,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerEquity {
    pub wins: u64,
    /// `ties[k]` counts showdowns split `k` ways (index 0 and 1 stay 0).
    pub ties: Vec<u64>,
    pub losses: u64,
    /// Expected share of the pot in [0, 1].
    pub equity: f64,
    /// Standard error of `equity`. `None` only for a complete enumeration.
    pub std_error: Option<f64>,
}

impl PlayerEquity {
    pub fn tie_count(&self) -> u64 {
        self.ties.iter().sum()
    }

    pub fn showdowns(&self) -> u64 {
        self.wins + self.tie_count() + self.losses
    }

    /// (win, tie, loss) frequencies over raw showdown counts.
    pub fn probabilities(&self) -> (f64, f64, f64) {
        let t = self.showdowns() as f64;
        if t == 0.0 {
            return (0.0, 0.0, 0.0);
        }
        (
            self.wins as f64 / t,
            self.tie_count() as f64 / t,
            self.losses as f64 / t,
        )
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EquityResult {
    /// Hero first, then opponents in the order given.
    pub players: Vec<PlayerEquity>,
    pub mode: Mode,
    pub status: Status,
    /// Showdowns evaluated (enumerated or sampled).
    pub trials: u64,
    /// Master seed of a sampled run.
    pub seed: Option<u64>,
    pub workers: usize,
    pub elapsed: Duration,
}

impl EquityResult {
    pub fn hero(&self) -> &PlayerEquity {
        &self.players[0]
    }

    pub fn equities(&self) -> Vec<f64> {
        self.players.iter().map(|p| p.equity).collect()
    }

    pub fn is_exact(&self) -> bool {
        self.mode == Mode::Exact && self.status == Status::Complete
    }

    pub fn trials_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.trials as f64 / secs
    }
}

/// Equal when every outcome field matches; wall time is ignored.
impl PartialEq for EquityResult {
    fn eq(&self, other: &Self) -> bool {
        self.players == other.players
            && self.mode == other.mode
            && self.status == other.status
            && self.trials == other.trials
            && self.seed == other.seed
            && self.workers == other.workers
    }
}

// -------------------------
// Tally
// -------------------------

/// Per-seat counts plus weighted moments of the pot share `s`:
/// `share = Σ w·s`, `share_sq = Σ w²·s²`, `share_cross = Σ w²·s`.
#[derive(Clone, Debug)]
struct Seat {
    wins: u64,
    ties: Vec<u64>,
    losses: u64,
    share: f64,
    share_sq: f64,
    share_cross: f64,
}

#[derive(Clone, Debug)]
struct Tally {
    seats: Vec<Seat>,
    trials: u64,
    weight: f64,
    weight_sq: f64,
}

impl Tally {
    fn new(players: usize) -> Self {
        let seat = Seat {
            wins: 0,
            ties: vec![0; players + 1],
            losses: 0,
            share: 0.0,
            share_sq: 0.0,
            share_cross: 0.0,
        };
        Self {
            seats: vec![seat; players],
            trials: 0,
            weight: 0.0,
            weight_sq: 0.0,
        }
    }

    #[inline]
    fn record(&mut self, scores: &[HandStrength], weight: f64) {
        let Some(&best) = scores.iter().max() else {
            return;
        };
        let k = scores.iter().filter(|&&s| s == best).count();
        let part = 1.0 / k as f64;
        let w_sq = weight * weight;
        for (seat, &s) in self.seats.iter_mut().zip(scores) {
            if s != best {
                seat.losses += 1;
                continue;
            }
            if k == 1 {
                seat.wins += 1;
            } else {
                seat.ties[k] += 1;
            }
            seat.share += weight * part;
            seat.share_sq += w_sq * part * part;
            seat.share_cross += w_sq * part;
        }
        self.trials += 1;
        self.weight += weight;
        self.weight_sq += w_sq;
    }

    fn merge(&mut self, other: &Tally) {
        for (a, b) in self.seats.iter_mut().zip(&other.seats) {
            a.wins += b.wins;
            a.losses += b.losses;
            for (x, y) in a.ties.iter_mut().zip(&b.ties) {
                *x += y;
            }
            a.share += b.share;
            a.share_sq += b.share_sq;
            a.share_cross += b.share_cross;
        }
        self.trials += other.trials;
        self.weight += other.weight;
        self.weight_sq += other.weight_sq;
    }

    /// With `estimated` set, each seat gets the standard error of the
    /// weighted mean share, `sqrt(Σ w²(s - μ)²) / Σ w`. With unit weights
    /// that is `sqrt(Var(s) / n)`.
    fn finish(&self, estimated: bool) -> Vec<PlayerEquity> {
        self.seats
            .iter()
            .map(|s| {
                let equity = if self.weight > 0.0 {
                    s.share / self.weight
                } else {
                    0.0
                };
                let std_error = (estimated && self.weight > 0.0).then(|| {
                    let spread = s.share_sq - 2.0 * equity * s.share_cross
                        + equity * equity * self.weight_sq;
                    spread.max(0.0).sqrt() / self.weight
                });
                PlayerEquity {
                    wins: s.wins,
                    ties: s.ties.clone(),
                    losses: s.losses,
                    equity,
                    std_error,
                }
            })
            .collect()
    }
}

// -------------------------
// Query preparation
// -------------------------

/// Validated query: board, holdings filtered against every known card,
/// and the dead set (board plus fixed hole cards).
struct Table {
    board: [Card; 5],
    board_len: usize,
    holdings: Vec<Holding>,
    dead: CardSet,
    /// Ranged seats holding every live combo at one weight. Given the other
    /// hands their conditional draw is uniform over the remaining deck.
    from_deck: Vec<bool>,
}

impl Table {
    fn prepare(hero: &Holding, opponents: &[Holding], board: &[Card]) -> Result<Self> {
        if opponents.is_empty() {
            return Err(Error::TooFewPlayers);
        }
        let players = opponents.len() + 1;
        if players > MAX_PLAYERS {
            return Err(Error::TooManyPlayers(players));
        }
        if !matches!(board.len(), 0 | 3 | 4 | 5) {
            return Err(Error::InvalidBoard(board.len()));
        }

        let mut dead = CardSet::from_distinct(board)?;
        let mut holdings: Vec<Holding> = std::iter::once(hero).chain(opponents).cloned().collect();
        for h in &holdings {
            if let Holding::Fixed(c) = h {
                for card in c.cards() {
                    dead.insert_distinct(card)?;
                }
            }
        }

        // a range narrowed to one combo becomes a fixed hand, which may
        // narrow the others further
        loop {
            let mut promoted = false;
            for (i, h) in holdings.iter_mut().enumerate() {
                let Holding::Weighted(range) = h else {
                    continue;
                };
                let live = range.filter_dead(dead);
                if live.is_empty() {
                    return Err(Error::RangeExhausted { player: Some(i) });
                }
                *h = if live.len() == 1 {
                    let combo = live.entries()[0].0;
                    dead = dead.union(combo.mask());
                    promoted = true;
                    Holding::Fixed(combo)
                } else {
                    Holding::Weighted(live)
                };
            }
            if !promoted {
                break;
            }
        }

        let pairs = choose(52 - dead.len(), 2);
        let from_deck = holdings
            .iter()
            .map(|h| match h {
                Holding::Weighted(r) => {
                    r.len() as u64 == pairs && r.entries().windows(2).all(|w| w[0].1 == w[1].1)
                }
                Holding::Fixed(_) => false,
            })
            .collect();

        let mut cards = [Card::from_id(0); 5];
        cards[..board.len()].copy_from_slice(board);
        Ok(Self {
            board: cards,
            board_len: board.len(),
            holdings,
            dead,
            from_deck,
        })
    }

    fn players(&self) -> usize {
        self.holdings.len()
    }

    fn missing(&self) -> usize {
        5 - self.board_len
    }

    fn unresolved(&self) -> Vec<(usize, &Range)> {
        self.holdings
            .iter()
            .enumerate()
            .filter_map(|(i, h)| match h {
                Holding::Weighted(r) => Some((i, r)),
                Holding::Fixed(_) => None,
            })
            .collect()
    }

    /// Cards left for the runout once every hole card is assigned.
    fn runout_pool(&self) -> usize {
        52 - self.dead.len() - 2 * self.unresolved().len()
    }

    /// Upper bound on showdowns an exact run would evaluate.
    fn showdown_count(&self) -> u64 {
        self.unresolved()
            .iter()
            .fold(choose(self.runout_pool(), self.missing()), |acc, (_, r)| {
                acc.saturating_mul(r.len() as u64)
            })
    }

    /// Hole cards before any assignment; ranges get a placeholder.
    fn initial_holes(&self) -> Vec<Combo> {
        self.holdings
            .iter()
            .map(|h| match h {
                Holding::Fixed(c) => *c,
                Holding::Weighted(r) => r.entries()[0].0,
            })
            .collect()
    }
}

fn choose(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    (0..k).fold(1u64, |acc, i| acc * (n - i) as u64 / (i + 1) as u64)
}

// -------------------------
// Shared plumbing
// -------------------------

struct Stop<'a> {
    cancel: Option<&'a AtomicBool>,
    deadline: Option<Instant>,
}

impl Stop<'_> {
    fn armed(&self) -> bool {
        self.cancel.is_some() || self.deadline.is_some()
    }

    #[inline]
    fn check(&self) -> Option<Status> {
        if self.cancel.is_some_and(|c| c.load(Ordering::Relaxed)) {
            return Some(Status::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Some(Status::Partial);
        }
        None
    }
}

/// `[start, start + len)` of chunk `idx` when `total` units are split into
/// `parts`; the first `total % parts` chunks take one extra unit.
fn chunk(total: u64, parts: usize, idx: usize) -> (u64, u64) {
    let parts = parts as u64;
    let idx = idx as u64;
    let base = total / parts;
    let extra = total % parts;
    let start = idx * base + idx.min(extra);
    let len = base + u64::from(idx < extra);
    (start, len)
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

fn worker_seed(master: u64, idx: usize) -> u64 {
    splitmix64(master ^ splitmix64(idx as u64 + 1))
}

/// Run `work` for every chunk index, results in chunk order.
fn run_chunks<T, F>(chunks: usize, work: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        (0..chunks).into_par_iter().map(work).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        (0..chunks).map(work).collect()
    }
}

type ChunkOutcome = Result<(Tally, Option<Status>)>;

fn merge_chunks(players: usize, outcomes: Vec<ChunkOutcome>) -> Result<(Tally, Status)> {
    let mut tally = Tally::new(players);
    let mut status = Status::Complete;
    for outcome in outcomes {
        let (t, stopped) = outcome?;
        tally.merge(&t);
        if let Some(s) = stopped {
            status = status.max(s);
        }
    }
    Ok((tally, status))
}

#[inline]
fn score_into(holes: &[Combo], board: &[Card; 5], scores: &mut [HandStrength]) {
    let board_set: CardSet = board.iter().copied().collect();
    for (score, hole) in scores.iter_mut().zip(holes) {
        *score = evaluate_masks(&SuitMasks::from_set(board_set.union(hole.mask())));
    }
}

// -------------------------
// Exact enumeration
// -------------------------

/// Every disjoint hole-card assignment of the unresolved ranges, flattened
/// with stride `seats.len()`, and its weight (product of range weights).
struct Assignments {
    seats: Vec<usize>,
    combos: Vec<Combo>,
    weights: Vec<f64>,
}

impl Assignments {
    fn collect(table: &Table) -> Result<Self> {
        let unresolved = table.unresolved();
        let mut out = Self {
            seats: unresolved.iter().map(|&(i, _)| i).collect(),
            combos: Vec::new(),
            weights: Vec::new(),
        };
        let mut stack = Vec::with_capacity(unresolved.len());
        Self::walk(&unresolved, table.dead, 1.0, &mut stack, &mut out);
        if out.weights.is_empty() {
            let player = out.seats.last().copied().unwrap_or(0);
            return Err(Error::Simulation {
                attempts: 0,
                player,
            });
        }
        Ok(out)
    }

    fn walk(
        ranges: &[(usize, &Range)],
        dead: CardSet,
        weight: f64,
        stack: &mut Vec<Combo>,
        out: &mut Self,
    ) {
        let Some(((_, range), rest)) = ranges.split_first() else {
            out.combos.extend_from_slice(stack);
            out.weights.push(weight);
            return;
        };
        for &(combo, w) in range.entries() {
            if combo.mask().intersects(dead) {
                continue;
            }
            stack.push(combo);
            Self::walk(rest, dead.union(combo.mask()), weight * w, stack, out);
            stack.pop();
        }
    }

    fn len(&self) -> usize {
        self.weights.len()
    }

    /// Seat assignment `idx` into `holes`, refill `pool` with the cards
    /// left for the runout and return the assignment's weight.
    fn load(&self, idx: usize, dead: CardSet, holes: &mut [Combo], pool: &mut Vec<Card>) -> f64 {
        let stride = self.seats.len();
        let mut used = dead;
        for (j, &seat) in self.seats.iter().enumerate() {
            let c = self.combos[idx * stride + j];
            holes[seat] = c;
            used = used.union(c.mask());
        }
        pool.clear();
        pool.extend(Deck::without(used).cards());
        self.weights[idx]
    }
}

/// Call `f` for every way of filling `board[from..5]` from `rem`.
#[inline]
fn for_each_runout(rem: &[Card], board: &mut [Card; 5], from: usize, mut f: impl FnMut(&[Card; 5])) {
    let m = rem.len();
    match 5 - from {
        0 => f(board),
        1 => {
            for &a in rem {
                board[from] = a;
                f(board);
            }
        }
        2 => {
            for i in 0..m {
                board[from] = rem[i];
                for j in (i + 1)..m {
                    board[from + 1] = rem[j];
                    f(board);
                }
            }
        }
        3 => {
            for i in 0..m {
                board[from] = rem[i];
                for j in (i + 1)..m {
                    board[from + 1] = rem[j];
                    for k in (j + 1)..m {
                        board[from + 2] = rem[k];
                        f(board);
                    }
                }
            }
        }
        4 => {
            for i in 0..m {
                board[from] = rem[i];
                for j in (i + 1)..m {
                    board[from + 1] = rem[j];
                    for k in (j + 1)..m {
                        board[from + 2] = rem[k];
                        for l in (k + 1)..m {
                            board[from + 3] = rem[l];
                            f(board);
                        }
                    }
                }
            }
        }
        _ => {
            // first runout card is always fixed by the caller
        }
    }
}

fn run_exact(table: &Table, workers: usize, stop: &Stop<'_>) -> Result<(Tally, Status)> {
    let assignments = Assignments::collect(table)?;
    if stop.armed() {
        let order = Showdowns::new(table, &assignments);
        log::debug!(
            "exact: {} showdowns in stride order ({}) over {} chunks",
            order.total,
            order.step,
            workers
        );
        let outcomes = run_chunks(workers, |w| -> ChunkOutcome {
            let (start, len) = chunk(order.total, workers, w);
            Ok(order.tally(start..start + len, stop))
        });
        return merge_chunks(table.players(), outcomes);
    }
    Ok((run_exact_nested(table, &assignments, workers), Status::Complete))
}

/// Work unit = (assignment, index of the first runout card), so a preflop
/// heads-up query with fixed hands still splits across chunks.
fn run_exact_nested(table: &Table, assignments: &Assignments, workers: usize) -> Tally {
    let missing = table.missing();
    let span = if missing == 0 { 1 } else { table.runout_pool() };
    let units = assignments.len() as u64 * span as u64;
    let players = table.players();
    log::debug!(
        "exact: {} assignments x {} runout roots over {} chunks",
        assignments.len(),
        span,
        workers
    );

    let tallies = run_chunks(workers, |w| {
        let (start, len) = chunk(units, workers, w);
        let mut tally = Tally::new(players);
        let mut holes = table.initial_holes();
        let mut scores = vec![HandStrength::default(); players];
        let mut pool: Vec<Card> = Vec::with_capacity(52);
        let mut current = usize::MAX;
        let mut weight = 0.0;

        for unit in start..start + len {
            let a = (unit / span as u64) as usize;
            let first = (unit % span as u64) as usize;
            if a != current {
                weight = assignments.load(a, table.dead, &mut holes, &mut pool);
                current = a;
            }
            let mut board = table.board;
            if missing == 0 {
                score_into(&holes, &board, &mut scores);
                tally.record(&scores, weight);
                continue;
            }
            board[table.board_len] = pool[first];
            for_each_runout(&pool[first + 1..], &mut board, table.board_len + 1, |b| {
                score_into(&holes, b, &mut scores);
                tally.record(&scores, weight);
            });
        }
        tally
    });
    let mut total = Tally::new(players);
    for t in &tallies {
        total.merge(t);
    }
    total
}

/// The exact showdown space as flat indices: `g / runouts` picks the
/// assignment, `g % runouts` the runout in lexicographic order. Indices are
/// visited as `k * step mod total` with `step` coprime to `total`, so every
/// showdown is seen once and any prefix is spread over the whole space.
struct Showdowns<'a> {
    table: &'a Table,
    assignments: &'a Assignments,
    runouts: u64,
    total: u64,
    step: u64,
}

impl<'a> Showdowns<'a> {
    fn new(table: &'a Table, assignments: &'a Assignments) -> Self {
        let runouts = choose(table.runout_pool(), table.missing());
        let total = assignments.len() as u64 * runouts;
        Self {
            table,
            assignments,
            runouts,
            total,
            step: coprime_stride(total),
        }
    }

    #[inline]
    fn nth(&self, k: u64) -> u64 {
        ((k as u128 * self.step as u128) % self.total as u128) as u64
    }

    fn tally(&self, ks: std::ops::Range<u64>, stop: &Stop<'_>) -> (Tally, Option<Status>) {
        let table = self.table;
        let players = table.players();
        let missing = table.missing();
        let mut tally = Tally::new(players);
        let mut holes = table.initial_holes();
        let mut scores = vec![HandStrength::default(); players];
        let mut pool: Vec<Card> = Vec::with_capacity(52);
        let mut picks = [0usize; 5];
        let mut current = usize::MAX;
        let mut weight = 0.0;

        for k in ks {
            if let Some(s) = stop.check() {
                return (tally, Some(s));
            }
            let g = self.nth(k);
            let a = (g / self.runouts) as usize;
            if a != current {
                weight = self.assignments.load(a, table.dead, &mut holes, &mut pool);
                current = a;
            }
            unrank(g % self.runouts, pool.len(), &mut picks[..missing]);
            let mut board = table.board;
            for (slot, &p) in board[table.board_len..].iter_mut().zip(&picks[..missing]) {
                *slot = pool[p];
            }
            score_into(&holes, &board, &mut scores);
            tally.record(&scores, weight);
        }
        (tally, None)
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// A stride near `n / φ` that is coprime to `n`.
fn coprime_stride(n: u64) -> u64 {
    let mut step = ((n as f64 * 0.618_033_988_749_895) as u64).max(1);
    while gcd(step, n) != 1 {
        step += 1;
    }
    step
}

/// Write the `rank`-th (lexicographic) `out.len()`-subset of `0..n` into `out`.
fn unrank(mut rank: u64, n: usize, out: &mut [usize]) {
    let t = out.len();
    let mut c = 0;
    for (p, slot) in out.iter_mut().enumerate() {
        loop {
            let rest = choose(n - c - 1, t - p - 1);
            if rank < rest {
                break;
            }
            rank -= rest;
            c += 1;
        }
        *slot = c;
        c += 1;
    }
}

// -------------------------
// Monte Carlo
// -------------------------

/// Deal one trial's hole cards from the same joint distribution the exact
/// enumerator weights. Ranged seats draw independently and the whole draw is
/// rejected on any shared card; `from_deck` seats are then dealt from what
/// is left of `deck`, which also loses every dealt card.
fn deal_holes<R: Rng + ?Sized>(
    table: &Table,
    deck: &mut Deck,
    holes: &mut [Combo],
    rng: &mut R,
    max_retries: u32,
) -> Result<()> {
    let mut attempts = 0u32;
    'trial: loop {
        let mut dead = table.dead;
        for (i, h) in table.holdings.iter().enumerate() {
            if table.from_deck[i] || matches!(h, Holding::Fixed(_)) {
                continue;
            }
            let c = h.sample(rng)?;
            if c.mask().intersects(dead) {
                attempts += 1;
                if attempts > max_retries {
                    return Err(Error::Simulation {
                        attempts,
                        player: i,
                    });
                }
                log::trace!("player {i} collided, re-dealing trial (attempt {attempts})");
                continue 'trial;
            }
            dead = dead.union(c.mask());
            holes[i] = c;
        }
        deck.remove_all(dead);
        let mut pair = [Card::from_id(0); 2];
        for (i, _) in table.from_deck.iter().enumerate().filter(|&(_, &d)| d) {
            deck.draw_into(&mut pair, rng)?;
            holes[i] = Combo::new(pair[0], pair[1])?;
        }
        return Ok(());
    }
}

fn run_sampled(
    table: &Table,
    config: &EquityConfig,
    seed: u64,
    stop: &Stop<'_>,
) -> Result<(Tally, Status)> {
    let players = table.players();
    let missing = table.missing();
    let base = Deck::without(table.dead);
    log::debug!(
        "sampled: {} trials over {} chunks, seed {}",
        config.trials,
        config.workers,
        seed
    );

    let outcomes = run_chunks(config.workers, |w| -> ChunkOutcome {
        let (_, trials) = chunk(config.trials, config.workers, w);
        let mut rng = SmallRng::seed_from_u64(worker_seed(seed, w));
        let mut tally = Tally::new(players);
        let mut holes = table.initial_holes();
        let mut scores = vec![HandStrength::default(); players];
        let mut fill = [Card::from_id(0); 5];

        for _ in 0..trials {
            if let Some(s) = stop.check() {
                return Ok((tally, Some(s)));
            }
            let mut deck = base;
            deal_holes(table, &mut deck, &mut holes, &mut rng, config.max_retries)?;
            deck.draw_into(&mut fill[..missing], &mut rng)?;
            let mut board = table.board;
            board[table.board_len..].copy_from_slice(&fill[..missing]);
            score_into(&holes, &board, &mut scores);
            tally.record(&scores, 1.0);
        }
        Ok((tally, None))
    });
    merge_chunks(players, outcomes)
}

// -------------------------
// Entry points
// -------------------------

/// Equity of `hero` against `opponents` on a board of 0, 3, 4 or 5 cards.
///
/// Enumerates exactly when the showdown count fits under
/// `config.enumeration_ceiling`, otherwise samples `config.trials` deals.
pub fn compute_equity(
    hero: &Holding,
    opponents: &[Holding],
    board: &[Card],
    config: &EquityConfig,
) -> Result<EquityResult> {
    run(hero, opponents, board, config, None)
}

/// As [`compute_equity`], stopping between trials once `cancel` is set.
/// A cancelled run returns what it has with [`Status::Cancelled`].
pub fn compute_equity_cancellable(
    hero: &Holding,
    opponents: &[Holding],
    board: &[Card],
    config: &EquityConfig,
    cancel: &AtomicBool,
) -> Result<EquityResult> {
    run(hero, opponents, board, config, Some(cancel))
}

fn run(
    hero: &Holding,
    opponents: &[Holding],
    board: &[Card],
    config: &EquityConfig,
    cancel: Option<&AtomicBool>,
) -> Result<EquityResult> {
    config.validate()?;
    let started = Instant::now();
    let table = Table::prepare(hero, opponents, board)?;
    let stop = Stop {
        cancel,
        deadline: config.timeout.map(|t| started + t),
    };

    let showdowns = table.showdown_count();
    let mode = if showdowns <= config.enumeration_ceiling {
        Mode::Exact
    } else {
        Mode::Sampled
    };
    log::debug!(
        "{} players, {} board cards: {} showdowns vs ceiling {} -> {:?}",
        table.players(),
        table.board_len,
        showdowns,
        config.enumeration_ceiling,
        mode
    );

    let (tally, status, seed) = match mode {
        Mode::Exact => {
            let (t, s) = run_exact(&table, config.workers, &stop)?;
            (t, s, None)
        }
        Mode::Sampled => {
            let seed = config.seed.unwrap_or_else(|| rand::rng().random());
            let (t, s) = run_sampled(&table, config, seed, &stop)?;
            (t, s, Some(seed))
        }
    };

    let elapsed = started.elapsed();
    match status {
        Status::Partial if tally.trials == 0 => return Err(Error::Timeout),
        Status::Partial => log::warn!(
            "timed out after {:?}: returning partial result of {} trials",
            elapsed,
            tally.trials
        ),
        Status::Cancelled => log::warn!("cancelled after {} trials", tally.trials),
        Status::Complete => {}
    }

    let result = EquityResult {
        players: tally.finish(mode == Mode::Sampled || status != Status::Complete),
        mode,
        status,
        trials: tally.trials,
        seed,
        workers: config.workers,
        elapsed,
    };
    log::info!(
        "{:?} equity over {} showdowns in {:?}: hero {:.4}",
        mode,
        result.trials,
        elapsed,
        result.hero().equity
    );
    Ok(result)
}

/// Indices of the winning hand(s) on a complete board.
pub fn showdown(hands: &[Combo], board: &[Card]) -> Result<Vec<usize>> {
    let board: [Card; 5] = board
        .try_into()
        .map_err(|_| Error::InvalidBoard(board.len()))?;
    let mut used = CardSet::from_distinct(&board)?;
    for h in hands {
        for c in h.cards() {
            used.insert_distinct(c)?;
        }
    }
    let mut scores = vec![HandStrength::default(); hands.len()];
    score_into(hands, &board, &mut scores);
    let best = scores.iter().max().copied();
    Ok(scores
        .iter()
        .enumerate()
        .filter(|&(_, s)| Some(*s) == best)
        .map(|(i, _)| i)
        .collect())
}
