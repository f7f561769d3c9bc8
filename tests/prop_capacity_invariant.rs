// Property: capacity and uniqueness invariants
//
// After any sequence of admissions and completions the pending set never
// exceeds the configured capacity, a full pool rejects admissions with
// CapacityExceeded (never silently dropping or overwriting), and a given
// LBA is pending at most once.

use drum_reorder::{EngineConfig, GeometryConfig, ReorderEngine, ReorderError};
use proptest::prelude::*;
use std::collections::BTreeSet;

const CAPACITY: usize = 12;

fn tiny_engine() -> ReorderEngine {
    let config = EngineConfig {
        geometry: GeometryConfig {
            num_service_groups: 6,
            num_tracks: 10,
            blocks_per_sg: 2,
            track_skew: 0,
        },
        ..EngineConfig::default()
    };
    ReorderEngine::with_config(CAPACITY, config).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn prop_pending_never_exceeds_capacity(
        ops in proptest::collection::vec((any::<bool>(), 0u64..120), 1..300),
    ) {
        let mut engine = tiny_engine();
        let mut pending: BTreeSet<u64> = BTreeSet::new();

        for (is_add, lba) in ops {
            if is_add {
                let outcome = engine.add_request(lba, 1);
                if pending.contains(&lba) {
                    prop_assert_eq!(outcome, Err(ReorderError::DuplicateKey { lba }));
                } else if pending.len() == CAPACITY {
                    prop_assert_eq!(
                        outcome,
                        Err(ReorderError::CapacityExceeded { capacity: CAPACITY })
                    );
                } else {
                    prop_assert_eq!(outcome, Ok(()));
                    pending.insert(lba);
                }
            } else {
                let outcome = engine.complete_target(lba);
                if pending.remove(&lba) {
                    prop_assert_eq!(outcome, Ok(()));
                } else {
                    prop_assert_eq!(outcome, Err(ReorderError::NotFound { lba }));
                }
            }

            prop_assert!(engine.pending() <= CAPACITY);
            prop_assert_eq!(engine.pending(), pending.len());
        }

        // Drain what is left; each pending LBA completes exactly once.
        for lba in pending.iter().copied().collect::<Vec<_>>() {
            prop_assert_eq!(engine.complete_target(lba), Ok(()));
            prop_assert_eq!(
                engine.complete_target(lba),
                Err(ReorderError::NotFound { lba })
            );
        }
        prop_assert!(engine.is_empty());
        prop_assert_eq!(engine.select_target(), Err(ReorderError::EmptyQueue));
    }
}
