//! Property-based tests for block sequence generation.

use nback_experiment::config::injection_target;
use nback_experiment::{ConfigError, NBackConfig, generate_block, generate_sequence};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

const CELLS: [usize; 9] = [0, 1, 2, 3, 4, 5, 6, 7, 8];

proptest! {
    // 1. Every injected index is a realized match, and the count is exact
    #[test]
    fn injected_matches_survive(
        seed in any::<u64>(),
        n in 1usize..6,
        extra in 1usize..60,
        percent in 0u8..=100,
    ) {
        let trials = n + extra;
        let mut rng = StdRng::seed_from_u64(seed);
        let seq = generate_sequence(&mut rng, trials, n, &CELLS, percent).unwrap();
        let target = injection_target(trials, n, percent);

        prop_assert_eq!(seq.len(), trials);
        prop_assert_eq!(seq.injected().len(), target);
        for &i in seq.injected() {
            prop_assert!(i >= n && i < trials);
            prop_assert!(seq.is_match(i, n), "index {} of {:?}", i, seq.values());
        }
        prop_assert!(seq.match_count(n) >= target);
    }

    // 2. Generation fails exactly when there is no room for a match
    #[test]
    fn error_iff_trials_not_above_n(
        seed in any::<u64>(),
        n in 1usize..10,
        trials in 0usize..20,
    ) {
        let mut rng = StdRng::seed_from_u64(seed);
        let result = generate_sequence(&mut rng, trials, n, &['A', 'B', 'C'], 30);
        if trials <= n {
            prop_assert_eq!(result, Err(ConfigError::TrialsNotAboveN { n, trials }));
        } else {
            prop_assert!(result.is_ok());
        }
    }

    // 3. Values stay inside their alphabets
    #[test]
    fn block_values_in_range(seed in any::<u64>(), cells in 1usize..16) {
        let mut config = NBackConfig::default();
        config.grid_cells = cells;
        let mut rng = StdRng::seed_from_u64(seed);
        let block = generate_block(&mut rng, &config).unwrap();
        prop_assert!(block.positions.values().iter().all(|&p| p < cells));
        prop_assert!(block.letters.values().iter().all(|l| config.letters.contains(l)));
    }
}
