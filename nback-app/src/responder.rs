use anyhow::{Result, ensure};
use nback_core::Modality;
use nback_timing::ms_to_ns;
use rand::Rng;
use rand::rngs::StdRng;

/// How the simulated participant behaves
#[derive(Debug, Clone, Copy)]
pub struct ResponderProfile {
    pub hit_rate: f64,
    pub false_alarm_rate: f64,
    /// Inclusive reaction time range in milliseconds
    pub reaction_ms: (u64, u64),
}

impl Default for ResponderProfile {
    fn default() -> Self {
        Self {
            hit_rate: 0.8,
            false_alarm_rate: 0.1,
            reaction_ms: (350, 900),
        }
    }
}

/// Stand-in participant that presses match buttons with fixed odds
pub struct SimulatedResponder {
    profile: ResponderProfile,
    rng: StdRng,
    pending: Vec<(u64, Modality)>,
}

impl SimulatedResponder {
    pub fn new(profile: ResponderProfile, rng: StdRng) -> Result<Self> {
        ensure!(
            (0.0..=1.0).contains(&profile.hit_rate),
            "hit rate {} is not a probability",
            profile.hit_rate
        );
        ensure!(
            (0.0..=1.0).contains(&profile.false_alarm_rate),
            "false alarm rate {} is not a probability",
            profile.false_alarm_rate
        );
        ensure!(
            profile.reaction_ms.0 <= profile.reaction_ms.1,
            "empty reaction time range"
        );
        Ok(Self {
            profile,
            rng,
            pending: Vec::new(),
        })
    }

    /// Decides this trial's presses. `matches` is indexed by `Modality::index`.
    pub fn plan(&mut self, trial_start: u64, matches: [bool; 2]) {
        self.pending.clear();
        for modality in Modality::ALL {
            let p = if matches[modality.index()] {
                self.profile.hit_rate
            } else {
                self.profile.false_alarm_rate
            };
            if self.rng.random_bool(p) {
                let (lo, hi) = self.profile.reaction_ms;
                let rt = self.rng.random_range(lo..=hi);
                self.pending.push((trial_start + ms_to_ns(rt), modality));
            }
        }
        self.pending.sort_by_key(|&(at, _)| at);
    }

    pub fn next_due(&self) -> Option<u64> {
        self.pending.first().map(|&(at, _)| at)
    }

    pub fn take_due(&mut self, now: u64) -> Vec<Modality> {
        let split = self.pending.partition_point(|&(at, _)| at <= now);
        self.pending.drain(..split).map(|(_, m)| m).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn profile(hit_rate: f64, false_alarm_rate: f64) -> ResponderProfile {
        ResponderProfile {
            hit_rate,
            false_alarm_rate,
            reaction_ms: (400, 400),
        }
    }

    #[test]
    fn perfect_participant_answers_only_matches() {
        let mut r = SimulatedResponder::new(profile(1.0, 0.0), StdRng::seed_from_u64(1)).unwrap();
        r.plan(1_000, [false, true]);
        assert_eq!(r.next_due(), Some(1_000 + ms_to_ns(400)));
        assert!(r.take_due(1_000).is_empty());
        assert_eq!(r.take_due(u64::MAX), vec![Modality::Audio]);
        assert_eq!(r.next_due(), None);
    }

    #[test]
    fn rejects_rates_outside_unit_interval() {
        assert!(SimulatedResponder::new(profile(1.5, 0.0), StdRng::seed_from_u64(1)).is_err());
        assert!(SimulatedResponder::new(profile(0.5, -0.1), StdRng::seed_from_u64(1)).is_err());
    }
}
