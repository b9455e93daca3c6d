//! Outbound boundary to whatever draws the grid and speaks the letters.

use crate::phase::GamePhase;
use crate::stimulus::{Feedback, Modality};
use crate::trial::Score;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("could not announce letter {letter:?}: {reason}")]
pub struct PresentationError {
    pub letter: char,
    pub reason: String,
}

/// Presentation surface driven by the engine. Every call is fire-and-forget.
pub trait Presenter {
    fn highlight_cell(&mut self, _cell: Option<usize>) {}

    /// Speak or play a tone for the letter. Completion is never awaited.
    fn announce_letter(&mut self, _letter: char) -> Result<(), PresentationError> {
        Ok(())
    }

    /// `None` clears the modality's feedback
    fn show_feedback(&mut self, _modality: Modality, _feedback: Option<Feedback>) {}

    fn score_changed(&mut self, _score: &Score) {}

    fn phase_changed(&mut self, _phase: GamePhase) {}

    /// Stop any in-flight audio
    fn silence(&mut self) {}
}

impl Presenter for () {}

/// Everything a presenter was asked to do, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Cue {
    Highlight(Option<usize>),
    Announce(char),
    Feedback(Modality, Option<Feedback>),
    Score(Score),
    Phase(GamePhase),
    Silence,
}

impl Presenter for Vec<Cue> {
    fn highlight_cell(&mut self, cell: Option<usize>) {
        self.push(Cue::Highlight(cell));
    }

    fn announce_letter(&mut self, letter: char) -> Result<(), PresentationError> {
        self.push(Cue::Announce(letter));
        Ok(())
    }

    fn show_feedback(&mut self, modality: Modality, feedback: Option<Feedback>) {
        self.push(Cue::Feedback(modality, feedback));
    }

    fn score_changed(&mut self, score: &Score) {
        self.push(Cue::Score(*score));
    }

    fn phase_changed(&mut self, phase: GamePhase) {
        self.push(Cue::Phase(phase));
    }

    fn silence(&mut self) {
        self.push(Cue::Silence);
    }
}
