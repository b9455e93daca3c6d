use nback_core::{Modality, Stimulus};

/// The trial currently on screen
#[derive(Debug, Clone)]
pub struct ActiveTrial {
    pub index: usize,
    pub stimulus: Stimulus,
    pub started_at: u64,
    /// Timestamp of the first response per modality; later ones are ignored
    pub responses: [Option<u64>; 2],
}

impl ActiveTrial {
    pub fn new(index: usize, stimulus: Stimulus, started_at: u64) -> Self {
        Self {
            index,
            stimulus,
            started_at,
            responses: [None; 2],
        }
    }

    pub fn has_responded(&self, modality: Modality) -> bool {
        self.responses[modality.index()].is_some()
    }

    /// Milliseconds from stimulus onset to the response, if one was given
    pub fn reaction_ms(&self, modality: Modality) -> Option<u64> {
        self.responses[modality.index()]
            .map(|ts| ts.saturating_sub(self.started_at) / 1_000_000)
    }
}
