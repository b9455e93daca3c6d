use serde::{Deserialize, Serialize};

/// Session phases of a dual n-back run
#[derive(Copy, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Idle,
    Countdown { remaining: u8 },
    Playing,
    BlockBreak,
    Finished,
}

impl Default for GamePhase {
    fn default() -> Self {
        GamePhase::Idle
    }
}

/// Inputs that move a session between phases
#[derive(Copy, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseEvent {
    /// Operator starts the next block, `countdown` seconds of lead-in.
    StartBlock { countdown: u8 },
    CountdownTick,
    BlockComplete { remaining_blocks: usize },
    Reset,
}

impl GamePhase {
    /// Transition function. `None` means the event is illegal in this phase.
    pub fn reduce(self, event: PhaseEvent) -> Option<GamePhase> {
        use GamePhase::*;
        use PhaseEvent::*;
        Some(match (self, event) {
            (_, Reset) => Idle,
            (Idle | BlockBreak, StartBlock { countdown: 0 }) => Playing,
            (Idle | BlockBreak, StartBlock { countdown }) => Countdown {
                remaining: countdown,
            },
            (Countdown { remaining }, CountdownTick) if remaining > 1 => Countdown {
                remaining: remaining - 1,
            },
            (Countdown { .. }, CountdownTick) => Playing,
            (Playing, BlockComplete { remaining_blocks: 0 }) => Finished,
            (Playing, BlockComplete { .. }) => BlockBreak,
            _ => return None,
        })
    }

    pub fn allows_input(&self) -> bool {
        matches!(self, GamePhase::Playing)
    }

    pub fn is_countdown(&self) -> bool {
        matches!(self, GamePhase::Countdown { .. })
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, GamePhase::Finished)
    }

    /// Phases where the operator may start a block
    pub fn accepts_start(&self) -> bool {
        matches!(self, GamePhase::Idle | GamePhase::BlockBreak)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_session_walk() {
        let mut phase = GamePhase::default();
        phase = phase.reduce(PhaseEvent::StartBlock { countdown: 3 }).unwrap();
        assert_eq!(phase, GamePhase::Countdown { remaining: 3 });
        phase = phase.reduce(PhaseEvent::CountdownTick).unwrap();
        phase = phase.reduce(PhaseEvent::CountdownTick).unwrap();
        assert_eq!(phase, GamePhase::Countdown { remaining: 1 });
        phase = phase.reduce(PhaseEvent::CountdownTick).unwrap();
        assert_eq!(phase, GamePhase::Playing);

        phase = phase
            .reduce(PhaseEvent::BlockComplete { remaining_blocks: 1 })
            .unwrap();
        assert_eq!(phase, GamePhase::BlockBreak);
        phase = phase.reduce(PhaseEvent::StartBlock { countdown: 0 }).unwrap();
        assert_eq!(phase, GamePhase::Playing);
        phase = phase
            .reduce(PhaseEvent::BlockComplete { remaining_blocks: 0 })
            .unwrap();
        assert!(phase.is_finished());
        assert_eq!(phase.reduce(PhaseEvent::Reset), Some(GamePhase::Idle));
    }

    #[test]
    fn illegal_events_are_rejected() {
        assert_eq!(
            GamePhase::Playing.reduce(PhaseEvent::StartBlock { countdown: 3 }),
            None
        );
        assert_eq!(
            GamePhase::Finished.reduce(PhaseEvent::StartBlock { countdown: 3 }),
            None
        );
        assert_eq!(GamePhase::Idle.reduce(PhaseEvent::CountdownTick), None);
        assert_eq!(
            GamePhase::Countdown { remaining: 2 }
                .reduce(PhaseEvent::BlockComplete { remaining_blocks: 0 }),
            None
        );
    }

    #[test]
    fn only_playing_accepts_responses() {
        assert!(GamePhase::Playing.allows_input());
        assert!(!GamePhase::Countdown { remaining: 1 }.allows_input());
        assert!(!GamePhase::BlockBreak.allows_input());
    }

    #[test]
    fn start_is_accepted_only_between_blocks() {
        assert!(GamePhase::Idle.accepts_start());
        assert!(GamePhase::BlockBreak.accepts_start());
        assert!(!GamePhase::Playing.accepts_start());
        assert!(!GamePhase::Countdown { remaining: 2 }.accepts_start());
        assert!(!GamePhase::Finished.accepts_start());
    }
}
