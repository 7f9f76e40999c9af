//! airsat CLI binary.

use std::io::Write;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use env_logger::Builder;
use log::LevelFilter;

use airsat::app::commands::{self, Command};
use airsat::app::{ModelChoice, OutputFormat, Repl, Session, SessionConfig};
use airsat::explain::LimeConfig;

/// airsat - interactive flight-satisfaction prediction
#[derive(Parser, Debug, Clone)]
#[command(name = "airsat")]
#[command(about = "Interactive flight-satisfaction prediction with explainable tree models")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct AirsatArgs {
    /// Boosted model artifact
    #[arg(long, value_name = "FILE", env = "AIRSAT_BOOSTED_MODEL",
        default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/models/boosted.json"))]
    boosted_model: PathBuf,

    /// Single-tree model artifact
    #[arg(long, value_name = "FILE", env = "AIRSAT_TREE_MODEL",
        default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/models/tree.json"))]
    tree_model: PathBuf,

    /// Reference dataset CSV driving encoding and sampling statistics
    #[arg(long, value_name = "FILE", env = "AIRSAT_DATA",
        default_value = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/data/flight_sample.csv"))]
    data: PathBuf,

    /// Model used for scoring
    #[arg(short, long, default_value = "boosted")]
    model: ModelArg,

    /// Output format for prediction reports
    #[arg(short = 'f', long = "format", default_value = "human")]
    output_format: FormatArg,

    /// Neighborhood size for the surrogate explainer
    #[arg(long, default_value = "1000")]
    lime_samples: usize,

    /// How many surrogate weights to report
    #[arg(long, default_value = "5")]
    lime_features: usize,

    /// Seed for surrogate neighborhood sampling
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Set a field before scoring (repeatable)
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    set: Vec<String>,

    /// Score once and exit instead of starting the shell
    #[arg(long)]
    once: bool,

    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    quiet: bool,
}

impl AirsatArgs {
    /// Get the effective verbosity level
    fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Model selection on the command line.
#[derive(ValueEnum, Debug, Clone, Copy)]
enum ModelArg {
    /// Gradient-boosted forest
    Boosted,
    /// Single deep tree
    Tree,
}

impl From<ModelArg> for ModelChoice {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Boosted => ModelChoice::Boosted,
            ModelArg::Tree => ModelChoice::SingleTree,
        }
    }
}

/// Output formats on the command line.
#[derive(ValueEnum, Debug, Clone, Copy)]
enum FormatArg {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Human => OutputFormat::Human,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn main() {
    let args = AirsatArgs::parse();

    let log_level = match args.verbosity() {
        0 => LevelFilter::Error, // Quiet mode
        1 => LevelFilter::Warn,  // Default
        2 => LevelFilter::Info,  // Verbose
        _ => LevelFilter::Debug, // Very verbose (3+)
    };

    Builder::new()
        .filter_level(log_level)
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    if let Err(e) = run(args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(args: AirsatArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = SessionConfig {
        boosted_path: args.boosted_model,
        tree_path: args.tree_model,
        data_path: args.data,
        lime: LimeConfig {
            n_samples: args.lime_samples,
            num_features: args.lime_features,
            seed: args.seed,
            ..LimeConfig::default()
        },
        format: args.output_format.into(),
    };

    let mut session = Session::open(config)?;
    session.set_active(args.model.into());

    for pair in &args.set {
        let Some((key, value)) = pair.split_once('=') else {
            return Err(format!("invalid --set '{pair}', expected FIELD=VALUE").into());
        };
        session.record_mut().set(key.trim(), value.trim())?;
    }

    if args.once {
        let output = commands::execute(&Command::Predict, &mut session)?;
        println!("{output}");
        return Ok(());
    }

    Repl::new(session)?.run()?;
    Ok(())
}
