//! Stimulus sequence generation with a controlled number of n-back matches.

use crate::config::{NBackConfig, injection_target};
use crate::error::ConfigError;
use nback_core::{Modality, Stimulus};
use rand::Rng;
use rand::seq::index;

/// One modality's values for a block, plus where matches were planted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialSequence<T> {
    values: Vec<T>,
    injected: Vec<usize>,
}

impl<T: Copy + PartialEq> TrialSequence<T> {
    /// Wraps prepared values; nothing counts as injected
    pub fn from_values(values: Vec<T>) -> Self {
        Self {
            values,
            injected: Vec::new(),
        }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Sorted indices overwritten with their n-back value
    pub fn injected(&self) -> &[usize] {
        &self.injected
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.values.get(index).copied()
    }

    pub fn is_match(&self, index: usize, n: usize) -> bool {
        index >= n
            && index < self.values.len()
            && self.values[index] == self.values[index - n]
    }

    /// Matches actually present, injected or by chance
    pub fn match_count(&self, n: usize) -> usize {
        (n..self.values.len()).filter(|&i| self.is_match(i, n)).count()
    }
}

/// Fill with uniform draws, then copy `seq[i - n]` into a distinct random
/// set of indices. Injection runs in ascending index order: overwriting `i`
/// only changes the comparison at `i + n`, which is either re-injected later
/// or was never promised, so every injected index ends up a match.
pub fn generate_sequence<T, R>(
    rng: &mut R,
    trials: usize,
    n: usize,
    alphabet: &[T],
    match_percent: u8,
) -> Result<TrialSequence<T>, ConfigError>
where
    T: Copy + PartialEq,
    R: Rng + ?Sized,
{
    if trials <= n {
        return Err(ConfigError::TrialsNotAboveN { n, trials });
    }
    if alphabet.is_empty() {
        return Err(ConfigError::EmptyAlphabet);
    }

    let mut values: Vec<T> = (0..trials)
        .map(|_| alphabet[rng.random_range(0..alphabet.len())])
        .collect();

    let target = injection_target(trials, n, match_percent);
    let mut injected: Vec<usize> = index::sample(rng, trials - n, target)
        .into_iter()
        .map(|offset| offset + n)
        .collect();
    injected.sort_unstable();

    for &idx in &injected {
        values[idx] = values[idx - n];
    }

    Ok(TrialSequence { values, injected })
}

/// Both modalities of one block, generated independently
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSequences {
    pub positions: TrialSequence<usize>,
    pub letters: TrialSequence<char>,
}

impl BlockSequences {
    pub fn from_values(positions: Vec<usize>, letters: Vec<char>) -> Self {
        Self {
            positions: TrialSequence::from_values(positions),
            letters: TrialSequence::from_values(letters),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len().min(self.letters.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stimulus(&self, index: usize) -> Option<Stimulus> {
        Some(Stimulus {
            position: self.positions.get(index)?,
            letter: self.letters.get(index)?,
        })
    }

    pub fn is_match(&self, modality: Modality, index: usize, n: usize) -> bool {
        match modality {
            Modality::Position => self.positions.is_match(index, n),
            Modality::Audio => self.letters.is_match(index, n),
        }
    }
}

pub fn generate_block<R: Rng + ?Sized>(
    rng: &mut R,
    config: &NBackConfig,
) -> Result<BlockSequences, ConfigError> {
    if config.grid_cells == 0 {
        return Err(ConfigError::EmptyGrid);
    }
    let cells: Vec<usize> = (0..config.grid_cells).collect();
    let positions = generate_sequence(
        rng,
        config.trials_per_block,
        config.n_back,
        &cells,
        config.match_percent,
    )?;
    let letters = generate_sequence(
        rng,
        config.trials_per_block,
        config.n_back,
        &config.letters,
        config.match_percent,
    )?;
    Ok(BlockSequences { positions, letters })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn injects_exact_distinct_count() {
        let mut rng = StdRng::seed_from_u64(7);
        let seq = generate_sequence(&mut rng, 25, 2, &[0usize, 1, 2, 3, 4, 5, 6, 7, 8], 30).unwrap();
        assert_eq!(seq.len(), 25);
        assert_eq!(seq.injected().len(), 7);
        assert!(seq.injected().windows(2).all(|w| w[0] < w[1]));
        assert!(seq.injected().iter().all(|&i| (2..25).contains(&i)));
        for &i in seq.injected() {
            assert!(seq.is_match(i, 2), "injected index {i} lost its match");
        }
        assert!(seq.match_count(2) >= 7);
    }

    #[test]
    fn fails_fast_when_no_match_is_possible() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(
            generate_sequence(&mut rng, 3, 3, &['A', 'B'], 30),
            Err(ConfigError::TrialsNotAboveN { n: 3, trials: 3 })
        );
        assert_eq!(
            generate_sequence::<char, _>(&mut rng, 5, 1, &[], 30),
            Err(ConfigError::EmptyAlphabet)
        );
    }

    #[test]
    fn single_symbol_alphabet_matches_everywhere() {
        let mut rng = StdRng::seed_from_u64(3);
        let seq = generate_sequence(&mut rng, 10, 1, &['X'], 30).unwrap();
        assert_eq!(seq.match_count(1), 9);
        assert_eq!(seq.injected().len(), 3);
    }

    #[test]
    fn is_match_respects_bounds() {
        let seq = TrialSequence::from_values(vec![3, 5, 3, 1, 3, 2]);
        assert!(!seq.is_match(0, 2));
        assert!(!seq.is_match(1, 2));
        assert!(seq.is_match(2, 2));
        assert!(!seq.is_match(3, 2));
        assert!(seq.is_match(4, 2));
        assert!(!seq.is_match(9, 2));
        assert_eq!(seq.match_count(2), 2);
    }

    #[test]
    fn block_modalities_are_independent() {
        let mut rng = StdRng::seed_from_u64(11);
        let config = NBackConfig::default();
        let differs = (0..20).any(|_| {
            let block = generate_block(&mut rng, &config).unwrap();
            block.positions.injected() != block.letters.injected()
        });
        assert!(differs);

        let block = generate_block(&mut rng, &config).unwrap();
        assert_eq!(block.len(), config.trials_per_block);
        assert!(block.positions.values().iter().all(|&p| p < config.grid_cells));
        assert!(block.letters.values().iter().all(|l| config.letters.contains(l)));
    }
}
