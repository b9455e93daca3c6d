use crate::responder::ResponderProfile;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use nback_experiment::NBackConfig;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Simulated participant on a virtual clock, finishes instantly
    Simulate,
    /// Simulated participant paced by the wall clock
    Realtime,
    /// You play: L = position match, A = audio match, Enter = start/continue
    Interactive,
}

#[derive(Parser, Debug)]
#[command(name = "nback", about = "Dual n-back working memory session runner")]
pub struct Args {
    #[arg(long, value_enum, default_value_t = Mode::Simulate)]
    pub mode: Mode,

    /// JSON file with session settings; missing fields use defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Back distance
    #[arg(short, long)]
    pub n: Option<usize>,

    /// Trials per block
    #[arg(long)]
    pub trials: Option<usize>,

    #[arg(long)]
    pub blocks: Option<usize>,

    /// Seed for sequence generation and the simulated participant
    #[arg(long)]
    pub seed: Option<u64>,

    /// Probability the simulated participant answers a true match
    #[arg(long, default_value_t = 0.8)]
    pub hit_rate: f64,

    /// Probability the simulated participant answers a non-match
    #[arg(long, default_value_t = 0.1)]
    pub false_alarm_rate: f64,

    /// Write the session summary and trial log as JSON
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn load_config(&self) -> Result<NBackConfig> {
        let mut config = match &self.config {
            Some(path) => read_config(path)?,
            None => NBackConfig::default(),
        };
        if let Some(n) = self.n {
            config.n_back = n;
        }
        if let Some(trials) = self.trials {
            config.trials_per_block = trials;
        }
        if let Some(blocks) = self.blocks {
            config.blocks = blocks;
        }
        config.validate().context("invalid session settings")?;
        Ok(config)
    }

    pub fn responder_profile(&self) -> ResponderProfile {
        ResponderProfile {
            hit_rate: self.hit_rate,
            false_alarm_rate: self.false_alarm_rate,
            ..ResponderProfile::default()
        }
    }
}

fn read_config(path: &Path) -> Result<NBackConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("cannot parse config file {}", path.display()))
}
