use nback_core::{GamePhase, PhaseEvent};
use thiserror::Error;

/// Settings that can never produce a playable block
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("n-back distance must be at least 1")]
    ZeroN,

    #[error("trials per block ({trials}) must exceed the n-back distance ({n})")]
    TrialsNotAboveN { n: usize, trials: usize },

    #[error("a session needs at least one block")]
    ZeroBlocks,

    #[error("the position grid has no cells")]
    EmptyGrid,

    #[error("stimulus alphabet is empty")]
    EmptyAlphabet,

    #[error("match percentage {0} is above 100")]
    MatchPercentOutOfRange(u8),

    #[error("{field} of {ms} ms exceeds the one hour limit")]
    DurationTooLong { field: &'static str, ms: u64 },

    #[error("trial cycle ({cycle_ms} ms) must be longer than the stimulus ({stimulus_ms} ms)")]
    CycleNotAboveStimulus { stimulus_ms: u64, cycle_ms: u64 },

    #[error("prepared sequence has {actual} trials, expected {expected}")]
    SequenceLength { expected: usize, actual: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("cannot apply {event:?} while {phase:?}")]
    IllegalTransition { phase: GamePhase, event: PhaseEvent },

    #[error("settings can only change while idle, session is {phase:?}")]
    ConfigLocked { phase: GamePhase },
}

pub type Result<T> = std::result::Result<T, EngineError>;
