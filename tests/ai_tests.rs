use std::collections::HashSet;

use proptest::prelude::*;
use rand::{rngs::SmallRng, SeedableRng};
use sinkships::{AiMode, Coordinate, TargetingAi, BOARD_SIZE};

#[test]
fn hundred_picks_cover_the_board_without_repeats() {
    let mut rng = SmallRng::seed_from_u64(3);
    let mut ai = TargetingAi::new();
    let mut seen = HashSet::new();
    for _ in 0..(BOARD_SIZE as usize * BOARD_SIZE as usize) {
        let c = ai.pick(&mut rng);
        assert!(c.in_bounds());
        assert!(seen.insert(c), "repeated {}", c);
        ai.mark(c, false);
    }
    assert_eq!(seen.len(), 100);
}

#[test]
fn exhausted_board_falls_back_to_origin() {
    let mut rng = SmallRng::seed_from_u64(4);
    let mut ai = TargetingAi::new();
    for r in 0..BOARD_SIZE {
        for c in 0..BOARD_SIZE {
            ai.mark(Coordinate::new(r, c), false);
        }
    }
    assert_eq!(ai.pick(&mut rng), Coordinate::new(0, 0));
}

#[test]
fn hit_switches_to_target_mode_and_queues_neighbours() {
    let mut rng = SmallRng::seed_from_u64(5);
    let mut ai = TargetingAi::new();
    assert_eq!(ai.mode(), AiMode::Hunt);
    ai.mark(Coordinate::new(5, 5), true);
    assert_eq!(ai.mode(), AiMode::Target);

    let expected = [
        Coordinate::new(6, 5),
        Coordinate::new(4, 5),
        Coordinate::new(5, 6),
        Coordinate::new(5, 4),
    ];
    for want in expected {
        let got = ai.pick(&mut rng);
        assert_eq!(got, want);
        ai.mark(got, false);
    }
    assert_eq!(ai.mode(), AiMode::Hunt);
}

#[test]
fn corner_hit_only_queues_in_bounds_neighbours() {
    let mut rng = SmallRng::seed_from_u64(6);
    let mut ai = TargetingAi::new();
    ai.mark(Coordinate::new(0, 0), true);
    let first = ai.pick(&mut rng);
    ai.mark(first, false);
    let second = ai.pick(&mut rng);
    assert_eq!(first, Coordinate::new(1, 0));
    assert_eq!(second, Coordinate::new(0, 1));
}

#[test]
fn hunt_prefers_even_parity() {
    let mut rng = SmallRng::seed_from_u64(8);
    let mut ai = TargetingAi::new();
    for _ in 0..20 {
        let c = ai.pick(&mut rng);
        assert!(c.is_even(), "{} is odd", c);
        ai.mark(c, false);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn never_picks_a_visited_cell(seed in any::<u64>(), hits in proptest::collection::vec(any::<bool>(), 100)) {
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut ai = TargetingAi::new();
        for hit in hits {
            let c = ai.pick(&mut rng);
            prop_assert!(!ai.visited().contains(c));
            ai.mark(c, hit);
        }
        prop_assert_eq!(ai.visited().len(), 100);
    }
}
