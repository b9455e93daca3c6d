use super::config::NBackConfig;
use super::error::{ConfigError, EngineError, Result};
use super::sequence::{BlockSequences, generate_block};
use super::summary::SessionSummary;
use super::trial::ActiveTrial;
use nback_core::{
    Feedback, GamePhase, Modality, Outcome, PhaseEvent, Presenter, Score, Stimulus, TrialRecord,
};
use nback_timing::{Scheduler, TaskHandle, Timer, ms_to_ns};
use rand::Rng;
use tracing::{debug, info, warn};

/// Work the session schedules for itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Task {
    CountdownTick,
    HideStimulus,
    EndTrial,
    ClearFeedback(Modality),
}

/// Notable things that happened since the last `update`
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    CountdownTick { remaining: u8 },
    TrialStarted { block: usize, trial: usize, stimulus: Stimulus },
    TrialCompleted(TrialRecord),
    BlockCompleted { block: usize, score: Score },
    SessionFinished,
}

/// One dual n-back session: configuration in, operator and participant
/// events in, presentation cues out.
pub struct NBackSession<T, R, P>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
    P: Presenter,
{
    config: NBackConfig,
    timer: T,
    rng: R,
    presenter: P,
    phase: GamePhase,
    block: usize,
    sequences: Option<BlockSequences>,
    current: Option<ActiveTrial>,
    score: Score,
    block_scores: Vec<Score>,
    records: Vec<TrialRecord>,
    scheduler: Scheduler<Task>,
    feedback_clear: [Option<TaskHandle>; 2],
    events: Vec<SessionEvent>,
}

impl<T, R, P> NBackSession<T, R, P>
where
    T: Timer<Timestamp = u64>,
    R: Rng,
    P: Presenter,
{
    pub fn new(
        config: NBackConfig,
        timer: T,
        rng: R,
        presenter: P,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            timer,
            rng,
            presenter,
            phase: GamePhase::default(),
            block: 0,
            sequences: None,
            current: None,
            score: Score::default(),
            block_scores: Vec::new(),
            records: Vec::new(),
            scheduler: Scheduler::new(),
            feedback_clear: [None; 2],
            events: Vec::new(),
        })
    }

    /// Changes the back distance. Only allowed while idle.
    pub fn set_n_back(&mut self, n: usize) -> Result<()> {
        if self.phase != GamePhase::Idle {
            return Err(EngineError::ConfigLocked { phase: self.phase });
        }
        let candidate = self.config.clone().with_n_back(n);
        candidate.validate()?;
        info!(n_back = n, "n-back level changed");
        self.config = candidate;
        Ok(())
    }

    /// Generates fresh sequences and starts the countdown of the next block
    pub fn start_block(&mut self) -> Result<()> {
        self.check(self.start_event())?;
        let sequences = generate_block(&mut self.rng, &self.config)?;
        self.begin_block(sequences)
    }

    /// Like [`start_block`](Self::start_block) with prepared sequences
    pub fn start_block_with(&mut self, sequences: BlockSequences) -> Result<()> {
        self.check(self.start_event())?;
        if sequences.len() != self.config.trials_per_block
            || sequences.positions.len() != sequences.letters.len()
        {
            return Err(ConfigError::SequenceLength {
                expected: self.config.trials_per_block,
                actual: sequences.positions.len().max(sequences.letters.len()),
            }
            .into());
        }
        self.begin_block(sequences)
    }

    fn start_event(&self) -> PhaseEvent {
        PhaseEvent::StartBlock {
            countdown: self.config.countdown_secs,
        }
    }

    fn begin_block(&mut self, sequences: BlockSequences) -> Result<()> {
        self.scheduler.cancel_all();
        self.feedback_clear = [None; 2];
        let now = self.timer.now();

        self.block += 1;
        self.sequences = Some(sequences);
        self.current = None;
        self.score = Score::default();
        self.presenter.score_changed(&self.score);
        info!(
            block = self.block,
            blocks = self.config.blocks,
            n_back = self.config.n_back,
            "block starting"
        );

        self.transition(self.start_event())?;
        if self.phase.allows_input() {
            self.start_trial(0, now);
        } else {
            self.scheduler.schedule_at(
                now.saturating_add(ms_to_ns(self.config.countdown_tick_ms)),
                Task::CountdownTick,
            );
        }
        Ok(())
    }

    /// Fires every task that is due and returns what happened
    pub fn update(&mut self) -> Vec<SessionEvent> {
        self.fire_due();
        std::mem::take(&mut self.events)
    }

    fn fire_due(&mut self) {
        let now = self.timer.now();
        while let Some((deadline, task)) = self.scheduler.pop_due(now) {
            self.run_task(deadline, task);
        }
    }

    fn run_task(&mut self, at: u64, task: Task) {
        match task {
            Task::CountdownTick => {
                if let Err(e) = self.transition(PhaseEvent::CountdownTick) {
                    warn!(error = %e, "stray countdown tick");
                    return;
                }
                match self.phase {
                    GamePhase::Countdown { remaining } => {
                        self.events.push(SessionEvent::CountdownTick { remaining });
                        self.scheduler.schedule_at(
                            at.saturating_add(ms_to_ns(self.config.countdown_tick_ms)),
                            Task::CountdownTick,
                        );
                    }
                    GamePhase::Playing => self.start_trial(0, at),
                    _ => {}
                }
            }
            Task::HideStimulus => self.presenter.highlight_cell(None),
            Task::EndTrial => self.end_trial(at),
            Task::ClearFeedback(modality) => {
                self.feedback_clear[modality.index()] = None;
                self.presenter.show_feedback(modality, None);
            }
        }
    }

    fn start_trial(&mut self, index: usize, at: u64) {
        let Some(stimulus) = self.sequences.as_ref().and_then(|s| s.stimulus(index)) else {
            warn!(trial = index, "no stimulus for trial");
            return;
        };

        // Feedback from the previous trial with a clear still pending stays
        // up until that clear fires.
        for modality in Modality::ALL {
            if self.feedback_clear[modality.index()].is_none() {
                self.presenter.show_feedback(modality, None);
            }
        }

        self.presenter.highlight_cell(Some(stimulus.position));
        if let Err(e) = self.presenter.announce_letter(stimulus.letter) {
            warn!(error = %e, trial = index, "letter announcement failed");
        }

        self.scheduler.schedule_at(
            at.saturating_add(ms_to_ns(self.config.stimulus_duration_ms)),
            Task::HideStimulus,
        );
        self.scheduler.schedule_at(
            at.saturating_add(ms_to_ns(self.config.trial_cycle_ms)),
            Task::EndTrial,
        );

        self.current = Some(ActiveTrial::new(index, stimulus, at));
        debug!(
            block = self.block,
            trial = index,
            position = stimulus.position,
            letter = %stimulus.letter,
            "trial started"
        );
        self.events.push(SessionEvent::TrialStarted {
            block: self.block,
            trial: index,
            stimulus,
        });
    }

    fn end_trial(&mut self, at: u64) {
        let Some(trial) = self.current.take() else {
            return;
        };

        let mut outcomes = [Outcome::CorrectRejection; 2];
        let mut missed = false;
        for modality in Modality::ALL {
            let is_match = self.is_match_at(modality, trial.index);
            let outcome = Outcome::judge(is_match, trial.has_responded(modality));
            if outcome == Outcome::Miss {
                self.score.tally_mut(modality).record(Outcome::Miss);
                self.show_feedback(modality, Feedback::Missed, at);
                missed = true;
            }
            outcomes[modality.index()] = outcome;
        }
        if missed {
            self.presenter.score_changed(&self.score);
        }

        let record = TrialRecord {
            block: self.block,
            trial: trial.index,
            stimulus: trial.stimulus,
            position_match: self.is_match_at(Modality::Position, trial.index),
            audio_match: self.is_match_at(Modality::Audio, trial.index),
            position_outcome: outcomes[Modality::Position.index()],
            audio_outcome: outcomes[Modality::Audio.index()],
            position_rt_ms: trial.reaction_ms(Modality::Position),
            audio_rt_ms: trial.reaction_ms(Modality::Audio),
        };
        debug!(
            block = self.block,
            trial = trial.index,
            position = ?record.position_outcome,
            audio = ?record.audio_outcome,
            "trial completed"
        );
        self.records.push(record.clone());
        self.events.push(SessionEvent::TrialCompleted(record));

        if trial.index + 1 < self.config.trials_per_block {
            self.start_trial(trial.index + 1, at);
        } else {
            self.finish_block();
        }
    }

    fn finish_block(&mut self) {
        self.halt_presentation();
        self.block_scores.push(self.score);

        let remaining_blocks = self.config.blocks.saturating_sub(self.block);
        if let Err(e) = self.transition(PhaseEvent::BlockComplete { remaining_blocks }) {
            warn!(error = %e, "block ended outside of play");
            return;
        }
        info!(
            block = self.block,
            position_hits = self.score.position.hits,
            position_mistakes = self.score.position.mistakes(),
            audio_hits = self.score.audio.hits,
            audio_mistakes = self.score.audio.mistakes(),
            "block completed"
        );
        self.events.push(SessionEvent::BlockCompleted {
            block: self.block,
            score: self.score,
        });
        if self.phase.is_finished() {
            self.events.push(SessionEvent::SessionFinished);
        }
    }

    pub fn respond_position(&mut self) -> Option<Outcome> {
        self.respond(Modality::Position)
    }

    pub fn respond_audio(&mut self) -> Option<Outcome> {
        self.respond(Modality::Audio)
    }

    /// Scores a "match" judgment for the current trial. First response per
    /// modality and trial wins; anything else is a no-op returning `None`.
    pub fn respond(&mut self, modality: Modality) -> Option<Outcome> {
        // Settle due timers first so the response lands in the right trial.
        self.fire_due();
        if !self.phase.allows_input() {
            return None;
        }

        let now = self.timer.now();
        let trial = self.current.as_mut()?;
        if trial.has_responded(modality) {
            debug!(%modality, trial = trial.index, "duplicate response ignored");
            return None;
        }
        trial.responses[modality.index()] = Some(now);
        let index = trial.index;

        let outcome = if self.is_match_at(modality, index) {
            Outcome::Hit
        } else {
            Outcome::FalseAlarm
        };
        self.score.tally_mut(modality).record(outcome);
        self.presenter.score_changed(&self.score);
        if let Some(feedback) = outcome.feedback() {
            self.show_feedback(modality, feedback, now);
        }
        debug!(%modality, trial = index, ?outcome, "response recorded");
        Some(outcome)
    }

    fn show_feedback(&mut self, modality: Modality, feedback: Feedback, at: u64) {
        if let Some(handle) = self.feedback_clear[modality.index()].take() {
            self.scheduler.cancel(handle);
        }
        self.presenter.show_feedback(modality, Some(feedback));
        let handle = self.scheduler.schedule_at(
            at.saturating_add(ms_to_ns(self.config.feedback_duration_ms)),
            Task::ClearFeedback(modality),
        );
        self.feedback_clear[modality.index()] = Some(handle);
    }

    /// Cancels everything in flight and returns to idle with empty state
    pub fn reset(&mut self) {
        self.halt_presentation();
        self.current = None;
        self.sequences = None;
        self.block = 0;
        self.score = Score::default();
        self.block_scores.clear();
        self.records.clear();
        self.events.clear();
        // Reset is legal from every phase.
        let _ = self.transition(PhaseEvent::Reset);
        info!("session reset");
    }

    fn halt_presentation(&mut self) {
        self.scheduler.cancel_all();
        self.feedback_clear = [None; 2];
        self.current = None;
        self.presenter.highlight_cell(None);
        for modality in Modality::ALL {
            self.presenter.show_feedback(modality, None);
        }
        self.presenter.silence();
    }

    fn check(&self, event: PhaseEvent) -> Result<GamePhase> {
        self.phase
            .reduce(event)
            .ok_or(EngineError::IllegalTransition {
                phase: self.phase,
                event,
            })
    }

    fn transition(&mut self, event: PhaseEvent) -> Result<()> {
        let next = self.check(event)?;
        if next != self.phase {
            debug!(from = ?self.phase, to = ?next, "phase changed");
            self.phase = next;
            self.presenter.phase_changed(next);
        }
        Ok(())
    }

    fn is_match_at(&self, modality: Modality, index: usize) -> bool {
        self.sequences
            .as_ref()
            .is_some_and(|s| s.is_match(modality, index, self.config.n_back))
    }

    pub fn config(&self) -> &NBackConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// 1-based number of the current or last block, 0 before the first
    pub fn block(&self) -> usize {
        self.block
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn block_scores(&self) -> &[Score] {
        &self.block_scores
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn sequences(&self) -> Option<&BlockSequences> {
        self.sequences.as_ref()
    }

    pub fn current_trial(&self) -> Option<&ActiveTrial> {
        self.current.as_ref()
    }

    pub fn current_stimulus(&self) -> Option<Stimulus> {
        self.current.as_ref().map(|t| t.stimulus)
    }

    /// Whether the current trial is a true match for `modality`
    pub fn is_match(&self, modality: Modality) -> Option<bool> {
        self.current
            .as_ref()
            .map(|t| self.is_match_at(modality, t.index))
    }

    pub fn trial_progress(&self) -> Option<(usize, usize)> {
        self.current
            .as_ref()
            .map(|t| (t.index + 1, self.config.trials_per_block))
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.scheduler.next_deadline()
    }

    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            n_back: self.config.n_back,
            blocks_planned: self.config.blocks,
            block_scores: self.block_scores.clone(),
            total: Score::cumulative(&self.block_scores),
            records: self.records.clone(),
        }
    }
}
