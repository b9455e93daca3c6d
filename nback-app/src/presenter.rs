use nback_core::{Feedback, GamePhase, Modality, PresentationError, Presenter, Score};
use tracing::{debug, info};

const GRID_SIDE: usize = 3;

/// Prints the grid and cues to stdout, or only logs them when quiet
pub struct TerminalPresenter {
    echo: bool,
    cell: Option<usize>,
}

impl TerminalPresenter {
    pub fn echo() -> Self {
        Self {
            echo: true,
            cell: None,
        }
    }

    pub fn quiet() -> Self {
        Self {
            echo: false,
            cell: None,
        }
    }
}

fn render_grid(cell: Option<usize>) -> String {
    let mut out = String::new();
    for row in 0..GRID_SIDE {
        for col in 0..GRID_SIDE {
            let idx = row * GRID_SIDE + col;
            out.push_str(if cell == Some(idx) { "[#]" } else { "[ ]" });
        }
        out.push('\n');
    }
    out
}

impl Presenter for TerminalPresenter {
    fn highlight_cell(&mut self, cell: Option<usize>) {
        self.cell = cell;
        debug!(?cell, "highlight");
    }

    fn announce_letter(&mut self, letter: char) -> Result<(), PresentationError> {
        debug!(%letter, "announce");
        if self.echo {
            print!("{}", render_grid(self.cell));
            println!("      \"{letter}\"\n");
        }
        Ok(())
    }

    fn show_feedback(&mut self, modality: Modality, feedback: Option<Feedback>) {
        if let Some(feedback) = feedback {
            debug!(%modality, ?feedback, "feedback");
            if self.echo {
                let label = match feedback {
                    Feedback::Correct => "MATCH!",
                    Feedback::Wrong => "WRONG!",
                    Feedback::Missed => "Missed match!",
                };
                println!("  {modality}: {label}");
            }
        }
    }

    fn score_changed(&mut self, score: &Score) {
        debug!(
            position_hits = score.position.hits,
            position_mistakes = score.position.mistakes(),
            audio_hits = score.audio.hits,
            audio_mistakes = score.audio.mistakes(),
            "score"
        );
    }

    fn phase_changed(&mut self, phase: GamePhase) {
        info!(?phase, "phase");
        if self.echo {
            if let GamePhase::Countdown { remaining } = phase {
                println!("{remaining}...");
            }
        }
    }
}
