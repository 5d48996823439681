//! Evaluator throughput on random 5/6/7-card hands.
//!
//! Run with: cargo bench --bench evaluator

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use holdem_equity::{evaluate, evaluate_masks, Card, Deck, SuitMasks};
use rand::rngs::SmallRng;
use rand::SeedableRng;

const HANDS: usize = 4096;

fn random_hands(n: usize) -> Vec<Vec<Card>> {
    let mut rng = SmallRng::seed_from_u64(0xC0FFEE);
    (0..HANDS)
        .map(|_| {
            let mut deck = Deck::full();
            deck.draw_random(n, &mut rng).unwrap_or_default()
        })
        .collect()
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    group.throughput(Throughput::Elements(HANDS as u64));
    for n in [5, 6, 7] {
        let hands = random_hands(n);
        group.bench_with_input(BenchmarkId::new("checked", n), &hands, |b, hands| {
            b.iter(|| {
                for h in hands {
                    black_box(evaluate(black_box(h)).ok());
                }
            });
        });
        let masks: Vec<SuitMasks> = hands
            .iter()
            .map(|h| SuitMasks::from_cards(h.iter().copied()))
            .collect();
        group.bench_with_input(BenchmarkId::new("masks", n), &masks, |b, masks| {
            b.iter(|| {
                for m in masks {
                    black_box(evaluate_masks(black_box(m)));
                }
            });
        });
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .without_plots()
        .sample_size(20)
        .measurement_time(std::time::Duration::from_secs(2));
    targets = bench_evaluate
}
criterion_main!(benches);
