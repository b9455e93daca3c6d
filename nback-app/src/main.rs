mod app;
mod cli;
mod input;
mod presenter;
mod responder;

use anyhow::Result;
use app::{App, Driver};
use clap::Parser;
use cli::{Args, Mode};
use nback_timing::{HighPrecisionTimer, ManualTimer};
use presenter::TerminalPresenter;
use rand::SeedableRng;
use rand::rngs::StdRng;
use responder::SimulatedResponder;

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.as_str().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = args.load_config()?;
    let seed = args.seed.unwrap_or_else(rand::random);
    tracing::info!(seed, mode = ?args.mode, "starting session");
    let rng = StdRng::seed_from_u64(seed);
    let responder_rng = StdRng::seed_from_u64(seed.wrapping_add(1));

    let summary = match args.mode {
        Mode::Simulate => {
            let responder = SimulatedResponder::new(args.responder_profile(), responder_rng)?;
            App::new(
                config,
                ManualTimer::new(),
                rng,
                TerminalPresenter::quiet(),
                Driver::Simulated(responder),
            )?
            .run()?
        }
        Mode::Realtime => {
            let responder = SimulatedResponder::new(args.responder_profile(), responder_rng)?;
            App::new(
                config,
                HighPrecisionTimer::new(),
                rng,
                TerminalPresenter::echo(),
                Driver::Simulated(responder),
            )?
            .run()?
        }
        Mode::Interactive => App::new(
            config,
            HighPrecisionTimer::new(),
            rng,
            TerminalPresenter::echo(),
            Driver::keyboard(),
        )?
        .run()?,
    };

    if let Some(summary) = summary {
        if args.mode != Mode::Interactive {
            app::print_summary(&summary);
        }
        if let Some(path) = &args.output {
            app::write_summary(path, &summary)?;
        }
    }

    Ok(())
}
