use nback_core::{Modality, Outcome, Score, TrialRecord};
use serde::Serialize;

/// End-of-session report, serialized by the runner
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub n_back: usize,
    pub blocks_planned: usize,
    pub block_scores: Vec<Score>,
    pub total: Score,
    pub records: Vec<TrialRecord>,
}

impl SessionSummary {
    pub fn blocks_completed(&self) -> usize {
        self.block_scores.len()
    }

    /// Hits over true matches shown, for one modality
    pub fn hit_rate(&self, modality: Modality) -> Option<f64> {
        let matches = self
            .records
            .iter()
            .filter(|r| matches!(r.outcome(modality), Outcome::Hit | Outcome::Miss))
            .count();
        let hits = self
            .records
            .iter()
            .filter(|r| r.outcome(modality) == Outcome::Hit)
            .count();
        (matches > 0).then(|| hits as f64 / matches as f64)
    }

    pub fn accuracy(&self, modality: Modality) -> Option<f64> {
        self.total.tally(modality).accuracy()
    }
}
