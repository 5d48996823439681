//! End-to-end equity scenarios with known answers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use holdem_equity::{
    compute_equity, compute_equity_cancellable, decide, parse_cards, Card, Decision,
    EquityConfig, Error, Holding, Mode, Status,
};

fn holding(s: &str) -> Holding {
    Holding::parse(s).unwrap()
}

fn cards(s: &str) -> Vec<Card> {
    parse_cards(s).unwrap()
}

fn sampled(trials: u64, seed: u64) -> EquityConfig {
    EquityConfig::default()
        .with_trials(trials)
        .with_seed(seed)
        .with_enumeration_ceiling(0)
}

#[test]
fn aces_vs_kings_preflop_exact() {
    let r = compute_equity(
        &holding("AsAh"),
        &[holding("KsKh")],
        &[],
        &EquityConfig::default(),
    )
    .unwrap();
    assert_eq!(r.mode, Mode::Exact);
    assert!(r.is_exact());
    assert_eq!(r.trials, 1_712_304);
    assert_eq!(r.hero().wins, 1_410_336);
    assert_eq!(r.hero().ties[2], 9_308);
    let eq = r.hero().equity;
    assert!((eq - 0.826_366_112_559).abs() < 1e-9, "AA vs KK: {eq}");
    assert!((r.equities().iter().sum::<f64>() - 1.0).abs() < 1e-9);
}

#[test]
fn flush_draw_vs_overpair_on_the_flop() {
    let board = cards("2s7s9d");
    let r = compute_equity(
        &holding("AsKs"),
        &[holding("QdQc")],
        &board,
        &EquityConfig::default(),
    )
    .unwrap();
    assert_eq!(r.mode, Mode::Exact);
    assert_eq!(r.trials, 990);
    // pot shares total 536 of 990 runouts
    assert!((r.hero().equity - 0.541_414_141_414).abs() < 1e-9, "{}", r.hero().equity);
}

#[test]
fn sampling_converges_on_the_exact_answer() {
    let hero = holding("AsKs");
    let villain = [holding("QdQc")];
    let board = cards("2s7s9d");
    let exact = compute_equity(&hero, &villain, &board, &EquityConfig::default())
        .unwrap()
        .hero()
        .equity;

    let a = compute_equity(&hero, &villain, &board, &sampled(100_000, 11)).unwrap();
    let b = compute_equity(&hero, &villain, &board, &sampled(100_000, 12)).unwrap();
    assert_eq!(a.mode, Mode::Sampled);
    let (ea, eb) = (a.hero().equity, b.hero().equity);
    assert!((ea - eb).abs() < 0.015, "{ea} vs {eb}");
    assert!((ea - exact).abs() < 0.015, "{ea} vs exact {exact}");
    assert!((eb - exact).abs() < 0.015, "{eb} vs exact {exact}");
    assert!(a.hero().std_error.unwrap() < 0.002);
}

#[test]
fn fixed_seed_is_reproducible() {
    let hero = holding("JhTh");
    let villains = [holding("random"), holding("22+,A2s+,KTo+")];
    let cfg = sampled(30_000, 2024);
    let a = compute_equity(&hero, &villains, &[], &cfg).unwrap();
    let b = compute_equity(&hero, &villains, &[], &cfg).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.seed, Some(2024));
    assert_eq!(a.trials, 30_000);
}

#[test]
fn unseeded_run_reports_its_seed() {
    let hero = holding("9c9d");
    let villain = [holding("AKs,AKo")];
    let cfg = EquityConfig::default().with_trials(4_000).with_enumeration_ceiling(0);
    let first = compute_equity(&hero, &villain, &[], &cfg).unwrap();
    let seed = first.seed.unwrap();
    let replay = compute_equity(&hero, &villain, &[], &cfg.clone().with_seed(seed)).unwrap();
    assert_eq!(first.players, replay.players);
}

#[test]
fn equity_sums_to_one_multiway() {
    let hero = holding("QsQh");
    let villains = [holding("random"), holding("random"), holding("AK,AQs")];
    let board = cards("Qc8d3s");
    let r = compute_equity(&hero, &villains, &board, &sampled(20_000, 3)).unwrap();
    let total: f64 = r.equities().iter().sum();
    assert!((total - 1.0).abs() < 1e-9, "{total}");
    for p in &r.players {
        assert_eq!(p.showdowns(), 20_000);
        let (w, t, l) = p.probabilities();
        assert!((w + t + l - 1.0).abs() < 1e-9);
    }
}

#[test]
fn complete_board_needs_no_sampling() {
    let r = compute_equity(
        &holding("AhKh"),
        &[holding("random")],
        &cards("2h5h9hJcQd"),
        &EquityConfig::default(),
    )
    .unwrap();
    assert_eq!(r.mode, Mode::Exact);
    // every live two-card combo for the opponent
    assert_eq!(r.trials, 990);
    assert!((r.equities().iter().sum::<f64>() - 1.0).abs() < 1e-9);
}

#[test]
fn blockers_shrink_the_opponent_range() {
    // only KsKc survives for kings; aces keep all six combos
    let hero = holding("KhKd");
    let villain = [holding("AA,KK")];
    let r = compute_equity(&hero, &villain, &cards("2c3d7h8s9c"), &EquityConfig::default())
        .unwrap();
    assert_eq!(r.trials, 7);
    assert_eq!(r.hero().ties[2], 1);
    assert_eq!(r.hero().losses, 6);
    assert!((r.hero().equity - 1.0 / 14.0).abs() < 1e-12);
}

#[test]
fn shared_rank_leaves_one_combo() {
    // with As and Ah gone the villain can only hold AdAc, and no flush is
    // reachable on this flop, so every runout splits
    let r = compute_equity(
        &holding("AsAh"),
        &[holding("AA")],
        &cards("2c7d9h"),
        &EquityConfig::default(),
    )
    .unwrap();
    assert_eq!(r.trials, 990);
    assert_eq!(r.hero().ties[2], 990);
    assert_eq!(r.equities(), vec![0.5, 0.5]);
}

#[test]
fn exhausted_range_reports_the_player() {
    let err = compute_equity(
        &holding("AsKd"),
        &[holding("QQ"), holding("AsKs,AsQs")],
        &[],
        &EquityConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err, Error::RangeExhausted { player: Some(2) });
}

#[test]
fn duplicate_cards_are_rejected() {
    let err = compute_equity(
        &holding("AsKs"),
        &[holding("QdQc")],
        &cards("Qd7s9d"),
        &EquityConfig::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidCard(_)), "{err:?}");
}

#[test]
fn cancellation_from_another_thread() {
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    let stopper = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        flag.store(true, Ordering::Relaxed);
    });
    let r = compute_equity_cancellable(
        &holding("AsAh"),
        &[holding("random")],
        &[],
        &sampled(u64::MAX / 2, 1),
        &cancel,
    )
    .unwrap();
    stopper.join().unwrap();
    assert_eq!(r.status, Status::Cancelled);
    assert!(r.trials < u64::MAX / 2);
}

#[test]
fn timeout_returns_partial_result() {
    let cfg = sampled(u64::MAX / 2, 1).with_timeout(Duration::from_millis(100));
    let r = compute_equity(&holding("AsAh"), &[holding("random")], &[], &cfg).unwrap();
    assert_eq!(r.status, Status::Partial);
    assert!(r.trials > 0);
    assert!(!r.is_exact());
    assert!((r.equities().iter().sum::<f64>() - 1.0).abs() < 1e-9);
    assert!(r.trials_per_second() > 0.0);
}

#[test]
fn overlapping_ranges_agree_across_modes() {
    // AsAh cannot meet AsKs; of the three remaining matchups hero only wins
    // 2c2d vs AsKs, since 7h8h makes the straight
    let hero = holding("AsAh,2c2d");
    let villain = [holding("AsKs,7h8h")];
    let board = cards("6c9dTh3s4c");
    let exact = compute_equity(&hero, &villain, &board, &EquityConfig::default()).unwrap();
    assert_eq!(exact.mode, Mode::Exact);
    assert_eq!(exact.trials, 3);
    assert!((exact.hero().equity - 1.0 / 3.0).abs() < 1e-12);

    let r = compute_equity(&hero, &villain, &board, &sampled(60_000, 1)).unwrap();
    assert_eq!(r.mode, Mode::Sampled);
    let se = r.hero().std_error.unwrap();
    let eq = r.hero().equity;
    assert!((eq - 1.0 / 3.0).abs() < 5.0 * se, "{eq} ± {se}");
}

#[test]
fn random_seat_beside_overlapping_ranges() {
    let hero = holding("AA");
    let villains = [holding("random"), holding("AK")];
    let board = cards("Qc7c2dJd9h");
    let exact = compute_equity(&hero, &villains, &board, &EquityConfig::default()).unwrap();
    assert_eq!(exact.mode, Mode::Exact);
    // 48 disjoint AA/AK pairs, each with C(43, 2) hands for the random seat
    assert_eq!(exact.trials, 48 * 903);

    let r = compute_equity(&hero, &villains, &board, &sampled(60_000, 8)).unwrap();
    for (s, e) in r.players.iter().zip(&exact.players) {
        let se = s.std_error.unwrap();
        assert!(
            (s.equity - e.equity).abs() < 5.0 * se + 1e-3,
            "{} vs exact {} ± {se}",
            s.equity,
            e.equity
        );
    }
}

#[test]
fn timed_out_enumeration_estimates_the_full_answer() {
    let cfg = EquityConfig::default().with_timeout(Duration::from_millis(20));
    match compute_equity(&holding("AsAh"), &[holding("KsKh")], &[], &cfg) {
        Ok(r) if r.status == Status::Partial => {
            assert_eq!(r.mode, Mode::Exact);
            assert!(!r.is_exact());
            let se = r.hero().std_error.unwrap();
            let eq = r.hero().equity;
            assert!((eq - 0.826_366_112_559).abs() < 5.0 * se + 0.005, "{eq} ± {se}");
        }
        Ok(r) => {
            assert_eq!(r.status, Status::Complete);
            assert_eq!(r.hero().std_error, None);
            assert!((r.hero().equity - 0.826_366_112_559).abs() < 1e-9);
        }
        Err(e) => assert_eq!(e, Error::Timeout),
    }
}

#[test]
fn equity_feeds_the_call_decision() {
    let r = compute_equity(
        &holding("AsKs"),
        &[holding("QdQc")],
        &cards("2s7s9d"),
        &EquityConfig::default(),
    )
    .unwrap();
    let eq = r.hero().equity;
    assert_eq!(decide(eq, 100.0, 50.0), Decision::Call);
    assert_eq!(decide(0.2, 100.0, 50.0), Decision::Fold);
    assert_eq!(decide(eq, 100.0, 0.0), Decision::Check);
}
