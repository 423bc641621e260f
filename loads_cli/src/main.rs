//! # LoadSet CLI
//!
//! Command-line front end over `loads_core`. Every command reads LoadSet
//! JSON files, runs one engine operation and prints the JSON result, or
//! writes it to `--output`.
//!
//! ```text
//! loads_cli summary loads.json
//! loads_cli convert loads.json --forces kN -o loads_kn.json
//! loads_cli scale loads.json --factor 1.5 --ultimate
//! loads_cli compare old.json new.json --summary
//! loads_cli envelope loads.json -o envelope.json
//! loads_cli --config loads.toml export loads.json solver/ --prefix wing --envelope
//! loads_cli balance mounts.json --cases 20 --seed 7 -o balanced.json
//! ```
//!
//! Logging goes to stderr and follows `RUST_LOG`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use loads_core::export::export_with_settings;
use loads_core::units::{ForceUnit, MomentUnit, Units};
use loads_core::{
    generate_balanced_loadset, read_loadset, to_json, write_json, BalanceRequest, LoadError, LoadResult, Settings,
};

const DEFAULT_LOG_FILTER: &str = "loads_core=info,loads_cli=info";

/// LoadSet processing - convert, scale, compare, envelope and export load data
#[derive(Parser, Debug)]
#[command(name = "loads_cli", version)]
struct Cli {
    /// TOML settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Describe a LoadSet and its load cases
    Summary {
        input: PathBuf,
    },

    /// Convert a LoadSet to other units
    Convert {
        input: PathBuf,

        /// Target force unit: N, kN, lbf, klbf
        #[arg(long)]
        forces: String,

        /// Target moment unit: Nm, kNm, lbf-ft (defaults to the force unit's pair)
        #[arg(long)]
        moments: Option<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Multiply every component by a factor
    Scale {
        input: PathBuf,

        #[arg(long, allow_negative_numbers = true)]
        factor: f64,

        /// Treat the factor as a safety factor and mark the result ultimate
        #[arg(long)]
        ultimate: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare a new LoadSet against an old baseline
    Compare {
        old: PathBuf,
        new: PathBuf,

        /// Print headline statistics instead of every row
        #[arg(long)]
        summary: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Keep only the load cases holding a global extreme
    Envelope {
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write one solver command file per load case
    Export {
        input: PathBuf,
        destination: PathBuf,

        /// File name prefix for every exported case
        #[arg(long, default_value = "loads")]
        prefix: String,

        /// Envelope the LoadSet before exporting
        #[arg(long)]
        envelope: bool,
    },

    /// Generate load cases in static equilibrium from an interface request
    Balance {
        /// JSON request with interfaces and component ranges
        request: PathBuf,

        /// Override the request's case count
        #[arg(long)]
        cases: Option<usize>,

        /// Override the request's seed
        #[arg(long)]
        seed: Option<u64>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!();
                eprintln!("Error JSON:");
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> LoadResult<()> {
    let settings = match &cli.config {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    match cli.command {
        Command::Summary { input } => {
            let loadset = read_loadset(&input)?;
            emit(&loadset.summary(), None)
        }
        Command::Convert { input, forces, moments, output } => {
            let loadset = read_loadset(&input)?;
            let target = target_units(&forces, moments.as_deref())?;
            emit(&loadset.convert_to(target), output.as_deref())
        }
        Command::Scale { input, factor, ultimate, output } => {
            let loadset = read_loadset(&input)?;
            let scaled = if ultimate {
                loadset.to_ultimate(factor)?
            } else {
                loadset.scale(factor)?
            };
            emit(&scaled, output.as_deref())
        }
        Command::Compare { old, new, summary, output } => {
            let old = read_loadset(&old)?;
            let new = read_loadset(&new)?;
            let comparison = old.compare_to(&new)?;
            if summary {
                emit(&comparison.summary(), output.as_deref())
            } else {
                emit(&comparison, output.as_deref())
            }
        }
        Command::Envelope { input, output } => {
            let loadset = read_loadset(&input)?;
            emit(&loadset.envelope(), output.as_deref())
        }
        Command::Export { input, destination, prefix, envelope } => {
            let loadset = read_loadset(&input)?;
            let loadset = if envelope { loadset.envelope() } else { loadset };
            let written = export_with_settings(&loadset, &destination, &prefix, &settings.export)?;
            emit(&written, None)
        }
        Command::Balance { request, cases, seed, output } => {
            let mut request = read_balance_request(&request)?;
            if let Some(cases) = cases {
                request.num_cases = cases;
            }
            if seed.is_some() {
                request.seed = seed;
            }
            emit(&generate_balanced_loadset(&request)?, output.as_deref())
        }
    }
}

/// Parse the target unit pair, pairing the moment unit when omitted
fn target_units(forces: &str, moments: Option<&str>) -> LoadResult<Units> {
    let forces: ForceUnit = forces.parse()?;
    let moments: MomentUnit = match moments {
        Some(moments) => moments.parse()?,
        None => forces.paired_moment(),
    };
    Ok(Units::new(forces, moments))
}

fn read_balance_request(path: &Path) -> LoadResult<BalanceRequest> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| LoadError::io_failure("read", path.display().to_string(), e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| {
        LoadError::validation("request", path.display().to_string(), format!("Invalid balance request: {e}"))
    })
}

/// Print `value` as JSON, or write it to `output`
fn emit<T: Serialize>(value: &T, output: Option<&Path>) -> LoadResult<()> {
    match output {
        Some(path) => {
            write_json(value, path)?;
            tracing::info!(path = %path.display(), "wrote result");
        }
        None => println!("{}", to_json(value)?),
    }
    Ok(())
}
