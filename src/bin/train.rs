use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use ml_peg_solitaire::ai::critics::{build_critic, CriticKind};
use ml_peg_solitaire::ai::Actor;
use ml_peg_solitaire::config::AppConfig;
use ml_peg_solitaire::game::Board;
use ml_peg_solitaire::training::Trainer;

/// Train an actor-critic agent to solve peg solitaire.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override the number of training episodes.
    #[arg(short, long)]
    episodes: Option<usize>,

    /// Override the critic variant (tabular or approximate).
    #[arg(long, value_enum)]
    critic: Option<CriticArg>,

    /// Override the critic learning rate.
    #[arg(long)]
    learning_rate: Option<f64>,

    /// Write the training report as JSON to this path.
    #[arg(short, long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CriticArg {
    Tabular,
    Approximate,
}

impl From<CriticArg> for CriticKind {
    fn from(arg: CriticArg) -> Self {
        match arg {
            CriticArg::Tabular => CriticKind::Tabular,
            CriticArg::Approximate => CriticKind::Approximate,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    if let Some(episodes) = cli.episodes {
        config.training.num_episodes = episodes;
    }
    if let Some(critic) = cli.critic {
        config.critic.kind = critic.into();
    }
    if let Some(learning_rate) = cli.learning_rate {
        config.critic.learning_rate = learning_rate;
    }
    config.validate().context("validating config overrides")?;

    let mut board = Board::build(config.board.shape, config.board.size, &config.board.holes)
        .context("building board")?;
    let mut actor = Actor::new(&config.actor);
    let mut critic = build_critic(&config.critic, board.num_cells());

    log::info!(
        "training {:?} board of size {} with {:?} critic for {} episodes",
        config.board.shape,
        config.board.size,
        config.critic.kind,
        config.training.num_episodes,
    );

    let report = Trainer::new(&config.training)
        .train(&mut board, &mut actor, critic.as_mut())
        .context("training run failed")?;

    println!(
        "finished: {} wins / {} episodes; greedy run ended with {} pegs ({} moves)",
        report.total_wins,
        report.episodes,
        report.final_trace.pegs_remaining,
        report.final_trace.steps.len(),
    );

    if let Some(path) = cli.report {
        let json = serde_json::to_string_pretty(&report).context("serializing report")?;
        std::fs::write(&path, json)
            .with_context(|| format!("writing report to {}", path.display()))?;
        log::info!("report written to {}", path.display());
    }

    Ok(())
}
