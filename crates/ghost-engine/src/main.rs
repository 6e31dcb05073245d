//! `ghostline`: records a session, writes its action log, replays it and
//! verifies the replay.

use anyhow::{bail, Context, Result};
use clap::Parser;
use ghost_engine::{GameChoice, HarnessConfig, InputChoice};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "ghostline",
    version,
    about = "Record a deterministic session and verify its ghost replay"
)]
struct Args {
    /// Harness configuration file
    #[arg(long, default_value = ghost_engine::config::CONFIG_FILE)]
    config: PathBuf,

    /// Game to play, overriding the config file
    #[arg(long, value_enum)]
    game: Option<GameChoice>,

    /// Session seed, overriding the config file
    #[arg(long)]
    seed: Option<u64>,

    /// Live input source, overriding the config file
    #[arg(long, value_enum)]
    input: Option<InputChoice>,

    /// Tick limit, overriding the config file
    #[arg(long)]
    ticks: Option<u64>,

    /// Where to write the action log, overriding the config file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Pace ticks against the wall clock
    #[arg(long)]
    realtime: bool,

    /// Write the loaded configuration (with overrides) back to `--config`
    #[arg(long)]
    save_config: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn apply(&self, config: &mut HarnessConfig) {
        if let Some(game) = self.game {
            config.game = game;
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(input) = self.input {
            config.input = input;
        }
        if let Some(ticks) = self.ticks {
            config.max_ticks = ticks;
        }
        if let Some(log) = &self.log {
            config.log_path.clone_from(log);
        }
        config.realtime |= self.realtime;
        config.validate();
    }
}

/// Main entry point.
fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("ghostline=info".parse()?)
                .add_directive("ghost_engine=info".parse()?)
                .add_directive("ghost_gameplay=info".parse()?)
                .add_directive("ghost_replay=info".parse()?),
        )
        .init();

    info!("Ghostline starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let mut config = HarnessConfig::load_from(&args.config);
    args.apply(&mut config);

    if args.save_config {
        config
            .save_to(&args.config)
            .with_context(|| format!("saving {}", args.config.display()))?;
    }

    let report = ghost_engine::run(&config).context("harness run failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    info!(
        game = report.game,
        seed = report.seed,
        ticks = report.ticks,
        events = report.events,
        outcome = ?report.outcome,
        log = %report.log_path.display(),
        "Run complete"
    );

    if !report.verified() {
        bail!(
            "replay diverged (first divergent tick: {:?}, snapshots match: {})",
            report.first_divergence,
            report.snapshots_match
        );
    }

    info!("Replay verified");
    Ok(())
}
