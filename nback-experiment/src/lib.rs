pub mod config;
pub mod error;
pub mod sequence;
pub mod state;
pub mod summary;
pub mod trial;

pub use config::{MAX_DURATION_MS, MAX_N, MIN_N, NBackConfig};
pub use error::{ConfigError, EngineError};
pub use sequence::{BlockSequences, TrialSequence, generate_block, generate_sequence};
pub use state::{NBackSession, SessionEvent};
pub use summary::SessionSummary;
pub use trial::ActiveTrial;
