//! Property tests for the epoch/step rescaling timeline
//!
//! Ensures the global-step mapping satisfies its invariants:
//! - Epoch boundaries land exactly on multiples of 1000
//! - Tracker state matches the closed-form formula after every advance
//! - Global steps never decrease over legal advance sequences
//! - Step advances are idempotent
//! - The number of reported fresh steps equals the number of distinct buckets

use milpasos::StepTracker;
use proptest::collection::vec;
use proptest::prelude::*;

// =============================================================================
// Strategy Helpers
// =============================================================================

/// Generate an epoch length together with a sorted list of legal step indices
fn epoch_walk(max_len: u64) -> impl Strategy<Value = (u64, Vec<u64>)> {
    (1..max_len).prop_flat_map(|len| {
        let steps = vec(0..len, 0..32).prop_map(|mut steps| {
            steps.sort_unstable();
            steps
        });
        (Just(len), steps)
    })
}

/// Generate an epoch length and a strictly increasing multi-epoch schedule,
/// each epoch paired with a sorted list of legal step indices
fn multi_epoch_walk() -> impl Strategy<Value = (u64, Vec<(u64, Vec<u64>)>)> {
    (1u64..256).prop_flat_map(|len| {
        let steps = vec(0..len, 0..8).prop_map(|mut steps| {
            steps.sort_unstable();
            steps
        });
        let epochs = vec((1u64..4, steps), 1..6).prop_map(|deltas| {
            let mut epoch = 0;
            deltas
                .into_iter()
                .map(|(delta, steps)| {
                    epoch += delta;
                    (epoch - 1, steps)
                })
                .collect::<Vec<_>>()
        });
        (Just(len), epochs)
    })
}

fn closed_form(epoch: u64, step: u64, len: u64) -> u64 {
    ((epoch as f64 + (step + 1) as f64 / len as f64) * 1000.0) as u64
}

// =============================================================================
// Global-Step Mapping Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(10_000))]

    #[test]
    fn prop_epoch_boundary_is_exact(len in 1u64..10_000, epoch in 0u64..5_000) {
        let mut tracker = StepTracker::detached(len).unwrap();
        tracker.advance_epoch(epoch).unwrap();
        prop_assert_eq!(tracker.global_step().unwrap(), epoch * 1000);
    }

    #[test]
    fn prop_single_epoch_walk_matches_formula(
        (len, steps) in epoch_walk(5_000),
        epoch in 0u64..1_000,
    ) {
        let mut tracker = StepTracker::detached(len).unwrap();
        tracker.advance_epoch(epoch).unwrap();

        let mut last_global: Option<u64> = None;
        let mut last_step: Option<u64> = None;
        let mut last_changed = true;
        let mut floor = epoch * 1000;

        for step in steps {
            let changed = tracker.advance_step(step).unwrap();
            let global = tracker.global_step().unwrap();

            prop_assert_eq!(global, closed_form(epoch, step, len));
            prop_assert!(global >= floor);
            prop_assert!(global <= (epoch + 1) * 1000);
            floor = global;

            if last_step == Some(step) {
                // Re-advancing the same step replays the cached answer.
                prop_assert_eq!(changed, last_changed);
            } else {
                // A fresh step reports `true` iff it reached a bucket the
                // previous advance had not; the very first advance of the
                // epoch always does.
                prop_assert_eq!(changed, last_global != Some(global));
            }

            last_global = Some(global);
            last_step = Some(step);
            last_changed = changed;
        }
    }

    #[test]
    fn prop_multi_epoch_walk_is_monotone((len, epochs) in multi_epoch_walk()) {
        let mut tracker = StepTracker::detached(len).unwrap();
        let mut previous = 0;

        for (epoch, steps) in epochs {
            tracker.advance_epoch(epoch).unwrap();
            let boundary = tracker.global_step().unwrap();
            prop_assert_eq!(boundary, epoch * 1000);
            prop_assert!(boundary >= previous);
            previous = boundary;

            for step in steps {
                tracker.advance_step(step).unwrap();
                let global = tracker.global_step().unwrap();
                prop_assert!(global >= previous);
                previous = global;
            }
        }
    }

    #[test]
    fn prop_advance_step_is_idempotent((len, steps) in epoch_walk(5_000)) {
        let mut tracker = StepTracker::detached(len).unwrap();
        tracker.advance_epoch(0).unwrap();

        for step in steps {
            let first = tracker.advance_step(step).unwrap();
            let global = tracker.global_step().unwrap();
            let replayed = tracker.advance_step(step).unwrap();
            prop_assert_eq!(first, replayed);
            prop_assert_eq!(tracker.global_step().unwrap(), global);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_fresh_count_equals_distinct_buckets(len in 1u64..512, epoch in 0u64..100) {
        let mut tracker = StepTracker::detached(len).unwrap();
        tracker.advance_epoch(epoch).unwrap();

        let mut fresh = 0;
        let mut buckets = std::collections::BTreeSet::new();
        for step in 0..len {
            if tracker.advance_step(step).unwrap() {
                fresh += 1;
            }
            buckets.insert(tracker.global_step().unwrap());
        }

        prop_assert_eq!(fresh, buckets.len());
        // Completing the epoch lands exactly on the next boundary.
        prop_assert_eq!(tracker.global_step().unwrap(), (epoch + 1) * 1000);
    }
}
