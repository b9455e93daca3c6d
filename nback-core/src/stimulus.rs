use serde::{Deserialize, Serialize};
use std::fmt;

/// The two stimulus channels of a dual n-back trial
#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Modality {
    Position,
    Audio,
}

impl Modality {
    pub const ALL: [Modality; 2] = [Modality::Position, Modality::Audio];

    pub fn index(self) -> usize {
        match self {
            Modality::Position => 0,
            Modality::Audio => 1,
        }
    }
}

impl fmt::Display for Modality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modality::Position => f.write_str("position"),
            Modality::Audio => f.write_str("audio"),
        }
    }
}

/// One trial's stimulus pair: a lit grid cell and a spoken letter
#[derive(Copy, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stimulus {
    pub position: usize,
    pub letter: char,
}

/// Transient feedback shown next to a modality's response control
#[derive(Copy, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feedback {
    Correct,
    Wrong,
    Missed,
}

/// Signal-detection outcome of one modality in one trial
#[derive(Copy, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Hit,
    FalseAlarm,
    Miss,
    CorrectRejection,
}

impl Outcome {
    pub fn judge(is_match: bool, responded: bool) -> Self {
        match (is_match, responded) {
            (true, true) => Outcome::Hit,
            (false, true) => Outcome::FalseAlarm,
            (true, false) => Outcome::Miss,
            (false, false) => Outcome::CorrectRejection,
        }
    }

    /// Feedback surfaced for this outcome, if any
    pub fn feedback(self) -> Option<Feedback> {
        match self {
            Outcome::Hit => Some(Feedback::Correct),
            Outcome::FalseAlarm => Some(Feedback::Wrong),
            Outcome::Miss => Some(Feedback::Missed),
            Outcome::CorrectRejection => None,
        }
    }
}
