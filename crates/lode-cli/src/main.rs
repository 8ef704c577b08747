use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use lode_cli::logging::init_logging;
use lode_cli::run::run_match;
use lode_cli::sim::{SimConfig, run_sim};

/// Decision agent for grid resource-collection contests.
#[derive(Debug, Parser)]
#[command(
    name = "lodebot",
    author,
    version,
    about = "Hidden-information mining bot"
)]
struct Cli {
    /// Log level for stderr diagnostics (stdout carries commands).
    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Play a live match over stdin/stdout (the default).
    Run,
    /// Run a seeded offline self-play simulation.
    Sim {
        /// RNG seed for the hidden ore field.
        #[arg(long, default_value_t = 1)]
        seed: u64,

        /// Number of turns to simulate.
        #[arg(long, default_value_t = 200)]
        turns: u32,

        /// Board width.
        #[arg(long, default_value_t = 30)]
        width: u32,

        /// Board height.
        #[arg(long, default_value_t = 15)]
        height: u32,

        /// Write a JSONL replay of every turn to this file.
        #[arg(long, value_name = "FILE")]
        replay: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match cli.command.unwrap_or(CliCommand::Run) {
        CliCommand::Run => {
            let stdin = io::stdin();
            let stdout = io::stdout();
            run_match(stdin.lock(), stdout.lock())
        }
        CliCommand::Sim {
            seed,
            turns,
            width,
            height,
            replay,
        } => {
            let config = SimConfig {
                seed,
                turns,
                width,
                height,
                ..SimConfig::default()
            };

            let report = match replay {
                Some(path) => {
                    let file = File::create(&path)
                        .with_context(|| format!("creating replay file at {}", path.display()))?;
                    let mut writer = BufWriter::new(file);
                    let report = run_sim(&config, Some(&mut writer))?;
                    writer.flush().context("flushing the replay file")?;
                    report
                }
                None => run_sim(&config, None)?,
            };

            println!(
                "Simulated {} turns on seed {}: {} crystals banked, {} holes dug, {} radars placed",
                report.turns_played,
                config.seed,
                report.crystals_delivered,
                report.holes_dug,
                report.radars_placed
            );
            Ok(())
        }
    }
}
