//! Random self-play CLI.
//!
//! Plays matches with random decisions and writes one JSON summary per
//! match.
//!
//! Usage:
//!   cargo run --release --bin simulate -- [OPTIONS]
//!
//! Options:
//!   --games N       Number of games to play (default: 10)
//!   --players N     Piece holders per game, 2-8 (default: 4)
//!   --max-turns N   Abandon games after this many turns (default: 2000)
//!   --threads N     Number of parallel threads (default: 1)
//!   --seed N        Random seed, 0 for entropy (default: 0)
//!   --config FILE   Rules configuration JSON
//!   --output FILE   Output file path (default: stdout)
//!   --quiet         Suppress progress and summary output

use std::env;
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;
use std::process::ExitCode;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use communistopoly::config::RulesConfig;
use communistopoly::simulate::{self, SimulationConfig};

fn value<T: FromStr>(args: &[String], i: usize, flag: &str) -> Result<T, String> {
    args.get(i)
        .and_then(|v| v.parse().ok())
        .ok_or_else(|| format!("invalid {flag} value"))
}

fn parse_args(args: &[String]) -> Result<Option<(SimulationConfig, Option<String>)>, String> {
    let mut config = SimulationConfig::default();
    let mut output_path = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--games" => {
                i += 1;
                config.num_games = value(args, i, "--games")?;
            }
            "--players" => {
                i += 1;
                config.players = value(args, i, "--players")?;
            }
            "--max-turns" => {
                i += 1;
                config.max_turns = value(args, i, "--max-turns")?;
            }
            "--threads" => {
                i += 1;
                config.threads = value(args, i, "--threads")?;
            }
            "--seed" => {
                i += 1;
                config.seed = value(args, i, "--seed")?;
            }
            "--config" => {
                i += 1;
                let path: String = value(args, i, "--config")?;
                config.rules = RulesConfig::load(Path::new(&path)).map_err(|e| e.to_string())?;
            }
            "--output" => {
                i += 1;
                output_path = Some(value(args, i, "--output")?);
            }
            "--quiet" => config.quiet = true,
            "--help" | "-h" => return Ok(None),
            other => return Err(format!("Unknown argument: {other}")),
        }
        i += 1;
    }
    Ok(Some((config, output_path)))
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    let (config, output_path) = match parse_args(&args) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            eprintln!("{e}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let games = match simulate::run_simulation(&config) {
        Ok(games) => games,
        Err(e) => {
            tracing::error!("simulation failed: {e}");
            return ExitCode::FAILURE;
        }
    };
    if !config.quiet {
        simulate::print_summary(&games);
    }

    let written = match output_path {
        Some(path) => File::create(&path).and_then(|file| simulate::write_jsonl(&games, &mut BufWriter::new(file))),
        None => simulate::write_jsonl(&games, &mut BufWriter::new(io::stdout().lock())),
    };
    if let Err(e) = written {
        tracing::error!("failed to write output: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn print_usage() {
    eprintln!("Usage: simulate [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --games N        Number of games to play (default: 10)");
    eprintln!("  --players N      Piece holders per game, 2-8 (default: 4)");
    eprintln!("  --max-turns N    Abandon games after this many turns (default: 2000)");
    eprintln!("  --threads N      Number of parallel threads (default: 1)");
    eprintln!("  --seed N         Random seed, 0 for entropy (default: 0)");
    eprintln!("  --config FILE    Rules configuration JSON");
    eprintln!("  --output FILE    Output file path (default: stdout)");
    eprintln!("  --quiet          Suppress progress and summary output");
    eprintln!("  --help           Show this help");
}
