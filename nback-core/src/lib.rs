pub mod phase;
pub mod presenter;
pub mod stimulus;
pub mod trial;

pub use phase::{GamePhase, PhaseEvent};
pub use presenter::{Cue, PresentationError, Presenter};
pub use stimulus::{Feedback, Modality, Outcome, Stimulus};
pub use trial::{ModalityTally, Score, TrialRecord};
