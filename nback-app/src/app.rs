use crate::input::{Command, parse_line};
use crate::presenter::TerminalPresenter;
use crate::responder::SimulatedResponder;
use anyhow::{Context, Result};
use nback_core::{GamePhase, Modality};
use nback_experiment::{MAX_N, MIN_N, NBackConfig, NBackSession, SessionEvent, SessionSummary};
use nback_timing::Timer;
use rand::rngs::StdRng;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Longest wait between input polls in keyboard mode
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Where match presses come from
pub enum Driver {
    Simulated(SimulatedResponder),
    Keyboard(Receiver<String>),
}

impl Driver {
    /// Reads stdin lines on a helper thread; the session itself stays on the
    /// main thread and only sees the lines through the channel.
    pub fn keyboard() -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            for line in std::io::stdin().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Driver::Keyboard(rx)
    }

    fn is_simulated(&self) -> bool {
        matches!(self, Driver::Simulated(_))
    }
}

pub struct App<T: Timer<Timestamp = u64>> {
    session: NBackSession<T, StdRng, TerminalPresenter>,
    timer: T,
    driver: Driver,
    finished: Option<SessionSummary>,
    should_exit: bool,
}

impl<T: Timer<Timestamp = u64>> App<T> {
    pub fn new(
        config: NBackConfig,
        timer: T,
        rng: StdRng,
        presenter: TerminalPresenter,
        driver: Driver,
    ) -> Result<Self> {
        let session = NBackSession::new(config, timer.clone(), rng, presenter)?;
        Ok(Self {
            session,
            timer,
            driver,
            finished: None,
            should_exit: false,
        })
    }

    /// Runs until the session finishes (simulated) or the player quits.
    /// Returns the last finished session, if any.
    pub fn run(mut self) -> Result<Option<SessionSummary>> {
        if self.driver.is_simulated() {
            self.session.start_block()?;
        } else {
            let config = self.session.config();
            println!(
                "=== DUAL {}-BACK: {} blocks x {} trials ===",
                config.n_back, config.blocks, config.trials_per_block
            );
            println!("L = position match, A = audio match (then Enter)");
            println!("+/- = change n, Enter = start, R = reset, Q = quit\n");
        }

        while !self.should_exit {
            self.wait_for_next_event();
            for event in self.session.update() {
                self.handle_event(event)?;
            }
            self.poll_driver();
        }

        Ok(self.finished.take())
    }

    fn wait_for_next_event(&mut self) {
        let now = self.timer.now();
        let mut wake = self.session.next_deadline();
        if let Driver::Simulated(responder) = &self.driver {
            wake = match (wake, responder.next_due()) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            };
        }

        match (&self.driver, wake) {
            (Driver::Simulated(_), Some(at)) => {
                if at > now {
                    self.timer.sleep(Duration::from_nanos(at - now));
                }
            }
            (Driver::Simulated(_), None) => {
                warn!(phase = ?self.session.phase(), "nothing left to wait for");
                self.should_exit = true;
            }
            (Driver::Keyboard(_), at) => {
                let wait = at
                    .map(|at| Duration::from_nanos(at.saturating_sub(now)))
                    .map_or(POLL_INTERVAL, |d| d.min(POLL_INTERVAL));
                if !wait.is_zero() {
                    self.timer.sleep(wait);
                }
            }
        }
    }

    fn handle_event(&mut self, event: SessionEvent) -> Result<()> {
        match event {
            SessionEvent::CountdownTick { remaining } => debug!(remaining, "countdown"),
            SessionEvent::TrialStarted { trial, .. } => {
                let Some(started_at) = self
                    .session
                    .current_trial()
                    .filter(|t| t.index == trial)
                    .map(|t| t.started_at)
                else {
                    return Ok(());
                };
                let n = self.session.config().n_back;
                let matches = self.session.sequences().map_or([false; 2], |s| {
                    Modality::ALL.map(|m| s.is_match(m, trial, n))
                });
                if let Driver::Simulated(responder) = &mut self.driver {
                    responder.plan(started_at, matches);
                }
            }
            SessionEvent::TrialCompleted(record) => {
                debug!(
                    block = record.block,
                    trial = record.trial,
                    position = ?record.position_outcome,
                    audio = ?record.audio_outcome,
                    "trial logged"
                );
            }
            SessionEvent::BlockCompleted { block, score } => {
                info!(
                    block,
                    hits = score.total_hits(),
                    mistakes = score.total_mistakes(),
                    "block done"
                );
                if self.session.phase() == GamePhase::BlockBreak {
                    if self.driver.is_simulated() {
                        self.session.start_block()?;
                    } else {
                        println!(
                            "Block {block} done: {} correct, {} mistakes. Enter for the next block.",
                            score.total_hits(),
                            score.total_mistakes()
                        );
                    }
                }
            }
            SessionEvent::SessionFinished => {
                self.finished = Some(self.session.summary());
                if self.driver.is_simulated() {
                    self.should_exit = true;
                } else if let Some(summary) = &self.finished {
                    print_summary(summary);
                    println!("Enter to play again, Q to quit.");
                }
            }
        }
        Ok(())
    }

    fn poll_driver(&mut self) {
        let commands = match &mut self.driver {
            Driver::Simulated(responder) => {
                let now = self.timer.now();
                responder
                    .take_due(now)
                    .into_iter()
                    .map(|m| match m {
                        Modality::Position => Command::RespondPosition,
                        Modality::Audio => Command::RespondAudio,
                    })
                    .collect()
            }
            Driver::Keyboard(rx) => {
                let mut commands = Vec::new();
                loop {
                    match rx.try_recv() {
                        Ok(line) => commands.extend(parse_line(&line)),
                        Err(TryRecvError::Empty) => break,
                        Err(TryRecvError::Disconnected) => {
                            info!("input closed");
                            commands.push(Command::Quit);
                            break;
                        }
                    }
                }
                commands
            }
        };

        for command in commands {
            self.apply(command);
        }
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::RespondPosition => {
                self.session.respond_position();
            }
            Command::RespondAudio => {
                self.session.respond_audio();
            }
            Command::Continue => match self.session.phase() {
                phase if phase.accepts_start() => {
                    if let Err(e) = self.session.start_block() {
                        warn!(error = %e, "could not start block");
                    }
                }
                GamePhase::Finished => self.session.reset(),
                _ => {}
            },
            Command::Reset => self.session.reset(),
            Command::LevelUp | Command::LevelDown => self.change_level(command),
            Command::Quit => self.should_exit = true,
        }
    }

    fn change_level(&mut self, command: Command) {
        let n = self.session.config().n_back;
        let wanted = if command == Command::LevelUp {
            (n + 1).min(MAX_N)
        } else {
            n.saturating_sub(1).max(MIN_N)
        };
        if wanted == n {
            return;
        }
        match self.session.set_n_back(wanted) {
            Ok(()) => println!("Level: {wanted}-back"),
            Err(e) => warn!(error = %e, "level unchanged"),
        }
    }
}

pub fn print_summary(summary: &SessionSummary) {
    println!("Session Results ({}-back):", summary.n_back);
    for (i, score) in summary.block_scores.iter().enumerate() {
        println!(
            "  block {}: position {} hits / {} mistakes, audio {} hits / {} mistakes",
            i + 1,
            score.position.hits,
            score.position.mistakes(),
            score.audio.hits,
            score.audio.mistakes(),
        );
    }
    for modality in Modality::ALL {
        let tally = summary.total.tally(modality);
        println!(
            "  {modality}: {} hits, {} misses, {} false alarms, hit rate {}, accuracy {}",
            tally.hits,
            tally.misses,
            tally.false_alarms,
            percent(summary.hit_rate(modality)),
            percent(summary.accuracy(modality)),
        );
    }
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.1}%", v * 100.0))
}

pub fn write_summary(path: &Path, summary: &SessionSummary) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create result file {}", path.display()))?;
    serde_json::to_writer_pretty(file, summary).context("failed to write results")?;
    info!(path = %path.display(), "results saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::ResponderProfile;
    use nback_timing::ManualTimer;
    use rand::SeedableRng;

    fn simulated(hit_rate: f64, false_alarm_rate: f64) -> App<ManualTimer> {
        let config = NBackConfig::default().with_trials(12).with_blocks(2);
        let responder = SimulatedResponder::new(
            ResponderProfile {
                hit_rate,
                false_alarm_rate,
                ..ResponderProfile::default()
            },
            StdRng::seed_from_u64(2),
        )
        .unwrap();
        App::new(
            config,
            ManualTimer::new(),
            StdRng::seed_from_u64(1),
            TerminalPresenter::quiet(),
            Driver::Simulated(responder),
        )
        .unwrap()
    }

    #[test]
    fn continue_starts_a_block_only_when_one_can_start() {
        let (_tx, rx) = mpsc::channel();
        let mut app = App::new(
            NBackConfig::default().with_trials(4).with_blocks(1),
            ManualTimer::new(),
            StdRng::seed_from_u64(3),
            TerminalPresenter::quiet(),
            Driver::Keyboard(rx),
        )
        .unwrap();

        app.apply(Command::Continue);
        assert_eq!(app.session.phase(), GamePhase::Countdown { remaining: 3 });
        app.apply(Command::Continue);
        assert_eq!(app.session.phase(), GamePhase::Countdown { remaining: 3 });

        app.apply(Command::Reset);
        assert_eq!(app.session.phase(), GamePhase::Idle);
    }

    #[test]
    fn perfect_participant_makes_no_mistakes() {
        let summary = simulated(1.0, 0.0).run().unwrap().unwrap();
        assert_eq!(summary.blocks_completed(), 2);
        assert_eq!(summary.records.len(), 24);
        assert_eq!(summary.total.total_mistakes(), 0);

        let matches = summary
            .records
            .iter()
            .map(|r| r.position_match as u32 + r.audio_match as u32)
            .sum::<u32>();
        assert!(matches > 0);
        assert_eq!(summary.total.total_hits(), matches);
        assert_eq!(summary.hit_rate(Modality::Position), Some(1.0));
    }

    #[test]
    fn idle_participant_misses_every_match() {
        let summary = simulated(0.0, 0.0).run().unwrap().unwrap();
        assert_eq!(summary.total.total_hits(), 0);
        assert_eq!(summary.total.position.false_alarms, 0);
        let position_matches = summary.records.iter().filter(|r| r.position_match).count();
        assert_eq!(summary.total.position.misses as usize, position_matches);
    }

    #[test]
    fn summary_round_trips_to_disk() {
        let summary = simulated(0.8, 0.1).run().unwrap().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        write_summary(&path, &summary).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["n_back"], 2);
        assert_eq!(value["records"].as_array().map(Vec::len), Some(24));
        assert!(value["records"][0]["position_outcome"].is_string());
    }
}
