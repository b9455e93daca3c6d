use crate::stimulus::{Modality, Outcome, Stimulus};
use serde::{Deserialize, Serialize};

/// Running counts for one modality
#[derive(Copy, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalityTally {
    pub hits: u32,
    pub misses: u32,
    pub false_alarms: u32,
}

impl ModalityTally {
    /// False alarms and missed matches together
    pub fn mistakes(&self) -> u32 {
        self.misses + self.false_alarms
    }

    pub fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Hit => self.hits += 1,
            Outcome::Miss => self.misses += 1,
            Outcome::FalseAlarm => self.false_alarms += 1,
            Outcome::CorrectRejection => {}
        }
    }

    /// Share of scored events that were hits, `None` before any were scored
    pub fn accuracy(&self) -> Option<f64> {
        let scored = self.hits + self.mistakes();
        (scored > 0).then(|| self.hits as f64 / scored as f64)
    }

    fn merge(&mut self, other: &ModalityTally) {
        self.hits += other.hits;
        self.misses += other.misses;
        self.false_alarms += other.false_alarms;
    }
}

/// Per-block score for both modalities
#[derive(Copy, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub position: ModalityTally,
    pub audio: ModalityTally,
}

impl Score {
    pub fn tally(&self, modality: Modality) -> &ModalityTally {
        match modality {
            Modality::Position => &self.position,
            Modality::Audio => &self.audio,
        }
    }

    pub fn tally_mut(&mut self, modality: Modality) -> &mut ModalityTally {
        match modality {
            Modality::Position => &mut self.position,
            Modality::Audio => &mut self.audio,
        }
    }

    pub fn total_hits(&self) -> u32 {
        self.position.hits + self.audio.hits
    }

    pub fn total_mistakes(&self) -> u32 {
        self.position.mistakes() + self.audio.mistakes()
    }

    /// Sum of several block scores
    pub fn cumulative<'a>(scores: impl IntoIterator<Item = &'a Score>) -> Score {
        let mut total = Score::default();
        for s in scores {
            total.position.merge(&s.position);
            total.audio.merge(&s.audio);
        }
        total
    }
}

/// History entry written at the end of every trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub block: usize,
    pub trial: usize,
    pub stimulus: Stimulus,
    pub position_match: bool,
    pub audio_match: bool,
    pub position_outcome: Outcome,
    pub audio_outcome: Outcome,
    /// Offset from trial start to each response, in milliseconds
    pub position_rt_ms: Option<u64>,
    pub audio_rt_ms: Option<u64>,
}

impl TrialRecord {
    pub fn outcome(&self, modality: Modality) -> Outcome {
        match modality {
            Modality::Position => self.position_outcome,
            Modality::Audio => self.audio_outcome,
        }
    }
}
