use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Smallest and largest n offered by the level picker
pub const MIN_N: usize = 1;
pub const MAX_N: usize = 5;

/// Upper bound for every configured duration
pub const MAX_DURATION_MS: u64 = 60 * 60 * 1000;

pub const DEFAULT_LETTERS: [char; 8] = ['C', 'H', 'K', 'L', 'Q', 'R', 'S', 'T'];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NBackConfig {
    pub n_back: usize,
    pub trials_per_block: usize,
    pub blocks: usize,
    pub grid_cells: usize,
    pub letters: Vec<char>,
    /// Share of trials that get an injected match, in percent
    pub match_percent: u8,
    pub stimulus_duration_ms: u64,
    pub trial_cycle_ms: u64,
    pub feedback_duration_ms: u64,
    pub countdown_secs: u8,
    pub countdown_tick_ms: u64,
}

impl Default for NBackConfig {
    fn default() -> Self {
        Self {
            n_back: 2,
            trials_per_block: 25,
            blocks: 3,
            grid_cells: 9,
            letters: DEFAULT_LETTERS.to_vec(),
            match_percent: 30,
            stimulus_duration_ms: 760,
            trial_cycle_ms: 2760,
            feedback_duration_ms: 500,
            countdown_secs: 3,
            countdown_tick_ms: 1000,
        }
    }
}

impl NBackConfig {
    pub fn with_n_back(mut self, n: usize) -> Self {
        self.n_back = n;
        self
    }

    pub fn with_trials(mut self, trials: usize) -> Self {
        self.trials_per_block = trials;
        self
    }

    pub fn with_blocks(mut self, blocks: usize) -> Self {
        self.blocks = blocks;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.n_back == 0 {
            return Err(ConfigError::ZeroN);
        }
        if self.trials_per_block <= self.n_back {
            return Err(ConfigError::TrialsNotAboveN {
                n: self.n_back,
                trials: self.trials_per_block,
            });
        }
        if self.blocks == 0 {
            return Err(ConfigError::ZeroBlocks);
        }
        if self.grid_cells == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if self.letters.is_empty() {
            return Err(ConfigError::EmptyAlphabet);
        }
        if self.match_percent > 100 {
            return Err(ConfigError::MatchPercentOutOfRange(self.match_percent));
        }
        for (field, ms) in [
            ("stimulus_duration_ms", self.stimulus_duration_ms),
            ("trial_cycle_ms", self.trial_cycle_ms),
            ("feedback_duration_ms", self.feedback_duration_ms),
            ("countdown_tick_ms", self.countdown_tick_ms),
        ] {
            if ms > MAX_DURATION_MS {
                return Err(ConfigError::DurationTooLong { field, ms });
            }
        }
        if self.trial_cycle_ms <= self.stimulus_duration_ms {
            return Err(ConfigError::CycleNotAboveStimulus {
                stimulus_ms: self.stimulus_duration_ms,
                cycle_ms: self.trial_cycle_ms,
            });
        }
        Ok(())
    }

    /// Injected matches per modality per block
    pub fn target_matches(&self) -> usize {
        injection_target(self.trials_per_block, self.n_back, self.match_percent)
    }
}

/// `floor(trials * percent / 100)`, capped by the number of eligible indices
pub fn injection_target(trials: usize, n: usize, match_percent: u8) -> usize {
    let wanted = trials * usize::from(match_percent) / 100;
    wanted.min(trials.saturating_sub(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = NBackConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.target_matches(), 7);
    }

    #[test]
    fn trials_must_exceed_n() {
        for n in 1..8 {
            for trials in 1..20 {
                let result = NBackConfig::default()
                    .with_n_back(n)
                    .with_trials(trials)
                    .validate();
                assert_eq!(
                    result.is_err(),
                    trials <= n,
                    "n={n} trials={trials} -> {result:?}"
                );
            }
        }
    }

    #[test]
    fn rejects_degenerate_settings() {
        assert_eq!(
            NBackConfig::default().with_n_back(0).validate(),
            Err(ConfigError::ZeroN)
        );
        assert_eq!(
            NBackConfig::default().with_blocks(0).validate(),
            Err(ConfigError::ZeroBlocks)
        );
        let mut config = NBackConfig::default();
        config.trial_cycle_ms = config.stimulus_duration_ms;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CycleNotAboveStimulus { .. })
        ));
        let mut config = NBackConfig::default();
        config.letters.clear();
        assert_eq!(config.validate(), Err(ConfigError::EmptyAlphabet));
    }

    #[test]
    fn rejects_durations_above_an_hour() {
        let mut config = NBackConfig::default();
        config.stimulus_duration_ms = u64::MAX - 1;
        config.trial_cycle_ms = u64::MAX;
        assert_eq!(
            config.validate(),
            Err(ConfigError::DurationTooLong {
                field: "stimulus_duration_ms",
                ms: u64::MAX - 1
            })
        );

        let mut config = NBackConfig::default();
        config.feedback_duration_ms = MAX_DURATION_MS + 1;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::DurationTooLong {
                field: "feedback_duration_ms",
                ..
            })
        ));

        let mut config = NBackConfig::default();
        config.trial_cycle_ms = MAX_DURATION_MS;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn target_is_capped_by_eligible_slots() {
        assert_eq!(injection_target(25, 2, 30), 7);
        assert_eq!(injection_target(6, 2, 30), 1);
        assert_eq!(injection_target(10, 8, 30), 2);
        assert_eq!(injection_target(10, 10, 30), 0);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let config: NBackConfig = serde_json::from_str(r#"{"n_back": 3, "blocks": 1}"#).unwrap();
        assert_eq!(config.n_back, 3);
        assert_eq!(config.blocks, 1);
        assert_eq!(config.trials_per_block, 25);
        assert_eq!(config.letters, DEFAULT_LETTERS.to_vec());
    }
}
