use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tempora_core::config::Config;
use tempora_core::{AppError, AppResult};

mod analyze;
mod generate;
mod import;
mod validate;

#[derive(Parser)]
#[command(name = "tempora")]
#[command(
    about = "Temporal robustness of windowed spoofing classifiers: FAR/FRR/HTER over observation time."
)]
struct Cli {
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[arg(long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    #[arg(long, value_name = "FORMAT", default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the time analysis and writes table, misclassified list, plot and JSON into RUN_DIR.
    Analyze {
        #[arg(value_name = "RUN_DIR")]
        run_dir: PathBuf,
        #[arg(long, value_name = "DIR")]
        scores: Option<PathBuf>,
        #[arg(long, value_name = "PROTOCOL")]
        protocol: Option<String>,
        #[arg(long, value_name = "SUPPORT")]
        support: Option<String>,
        #[arg(long, value_name = "N", allow_negative_numbers = true)]
        window_size: Option<i64>,
        #[arg(long, value_name = "N", allow_negative_numbers = true)]
        overlap: Option<i64>,
        #[arg(long)]
        min_hter: bool,
        #[arg(long)]
        average_votes: bool,
        #[arg(long, value_name = "MODE")]
        dev_reduction: Option<String>,
        #[arg(long, value_name = "WINDOWS")]
        horizon: Option<usize>,
        #[arg(long)]
        overwrite: bool,
        #[arg(long)]
        stdout: bool,
    },
    /// Turns a scores.jsonl file into a finalized score directory.
    Import {
        #[arg(long, value_name = "PATH")]
        from: PathBuf,
        #[arg(long, value_name = "DIR")]
        out: PathBuf,
        #[arg(long, value_name = "N", allow_negative_numbers = true)]
        window_size: Option<i64>,
        #[arg(long, value_name = "N", allow_negative_numbers = true)]
        overlap: Option<i64>,
        #[arg(long, value_name = "PROTOCOL")]
        protocol: Option<String>,
        #[arg(long, value_name = "SUPPORT")]
        support: Option<String>,
        #[arg(long)]
        overwrite: bool,
    },
    /// Writes a deterministic synthetic score directory.
    Generate {
        #[arg(long, value_name = "DIR")]
        out: PathBuf,
        #[arg(long, value_name = "SEED", default_value_t = 1)]
        seed: u64,
        #[arg(long, value_name = "N", default_value_t = 10)]
        samples: u32,
        #[arg(long, value_name = "N", default_value_t = 5)]
        min_windows: u32,
        #[arg(long, value_name = "N", default_value_t = 40)]
        max_windows: u32,
        #[arg(long, value_name = "N", default_value_t = 20)]
        window_size: u32,
        #[arg(long, value_name = "N", default_value_t = 10)]
        overlap: u32,
        #[arg(long)]
        overwrite: bool,
    },
    /// Verifies checksums, manifest and records of a score directory.
    Validate {
        #[arg(value_name = "SCORE_DIR")]
        score_dir: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("{}", err.message());
        process::exit(err.exit_code());
    }
}

fn run(cli: Cli) -> AppResult<()> {
    validate_log_level(&cli.log_level)?;
    validate_log_format(&cli.log_format)?;
    init_logging(&cli.log_level, &cli.log_format)?;

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            run_dir,
            scores,
            protocol,
            support,
            window_size,
            overlap,
            min_hter,
            average_votes,
            dev_reduction,
            horizon,
            overwrite,
            stdout,
        } => analyze::analyze_command(
            analyze::AnalyzeArgs {
                run_dir,
                scores,
                protocol,
                support,
                window_size,
                overlap,
                min_hter,
                average_votes,
                dev_reduction,
                horizon,
                overwrite,
                stdout,
            },
            &config,
        ),
        Commands::Import {
            from,
            out,
            window_size,
            overlap,
            protocol,
            support,
            overwrite,
        } => import::import_command(
            &from,
            &out,
            window_size,
            overlap,
            protocol,
            support,
            overwrite,
        ),
        Commands::Generate {
            out,
            seed,
            samples,
            min_windows,
            max_windows,
            window_size,
            overlap,
            overwrite,
        } => generate::generate_command(
            &out,
            tempora_eval::SyntheticSpec {
                seed,
                samples_per_class: samples,
                min_windows,
                max_windows,
                window_size,
                overlap,
                ..tempora_eval::SyntheticSpec::default()
            },
            overwrite,
        ),
        Commands::Validate { score_dir } => validate::validate_command(&score_dir),
    }
}

fn validate_log_level(value: &str) -> AppResult<()> {
    match value {
        "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
        _ => Err(AppError::usage(format!(
            "invalid --log-level '{value}'; expected error|warn|info|debug|trace"
        ))),
    }
}

fn validate_log_format(value: &str) -> AppResult<()> {
    match value {
        "text" | "json" => Ok(()),
        _ => Err(AppError::usage(format!(
            "invalid --log-format '{value}'; expected text|json"
        ))),
    }
}

fn init_logging(level: &str, format: &str) -> AppResult<()> {
    let filter = tracing_subscriber::EnvFilter::try_new(level)
        .map_err(|e| AppError::usage(format!("invalid log filter: {e}")))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    let result = match format {
        "json" => builder.json().try_init(),
        _ => builder.try_init(),
    };
    result.map_err(|e| AppError::internal(format!("failed to initialise logging: {e}")))
}
