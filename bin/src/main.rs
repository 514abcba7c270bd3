//! candela CLI - Streaming trade-to-OHLCV candle aggregator.

use anyhow::Result;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

mod commands;
mod display;

use candela_lib::Interval;
use display::Format;

#[derive(Parser)]
#[command(name = "candela")]
#[command(about = "Aggregate live trade feeds into OHLCV candles", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate a live trade feed, emitting candles on a timer
    Run(RunArgs),

    /// Aggregate a recorded trade file using the trades' own clock
    Replay(ReplayArgs),

    /// Inspect or delete the saved checkpoint
    Checkpoint {
        #[command(subcommand)]
        action: CheckpointAction,
    },
}

/// Input, interval and output shared by `run` and `replay`.
#[derive(Args)]
struct StreamArgs {
    /// NDJSON trade input file, or - for stdin
    #[arg(short, long, default_value = "-")]
    input: PathBuf,

    /// Candle interval (e.g., 1s, 5m, 1h, 1d)
    #[arg(short = 'I', long, default_value = "1m", env = "CANDELA_INTERVAL")]
    interval: Interval,

    /// Output format
    #[arg(short, long, value_enum, default_value = "ndjson")]
    format: Format,

    /// Output file path, or - for stdout
    #[arg(short, long, default_value = "-")]
    output: PathBuf,
}

#[derive(Args)]
struct RunArgs {
    #[command(flatten)]
    stream: StreamArgs,

    /// Seconds between drains. Defaults to the interval length.
    #[arg(long)]
    cadence: Option<u64>,

    /// Emit in-progress candles when the feed ends or on Ctrl-C
    #[arg(long)]
    flush_on_exit: bool,

    /// Restore from and save to a checkpoint
    #[arg(long)]
    checkpoint: bool,

    /// Directory for checkpoint state
    #[arg(long, env = "CANDELA_STATE_DIR")]
    state_dir: Option<PathBuf>,
}

#[derive(Args)]
struct ReplayArgs {
    #[command(flatten)]
    stream: StreamArgs,

    /// Skip malformed lines instead of aborting
    #[arg(long)]
    skip_invalid: bool,
}

/// Actions for the saved checkpoint.
#[derive(Subcommand)]
enum CheckpointAction {
    /// Show what the checkpoint holds
    Show {
        /// Directory for checkpoint state
        #[arg(long, env = "CANDELA_STATE_DIR")]
        state_dir: Option<PathBuf>,
    },

    /// Delete the checkpoint
    Clear {
        /// Directory for checkpoint state
        #[arg(long, env = "CANDELA_STATE_DIR")]
        state_dir: Option<PathBuf>,
    },
}

/// Installs the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` overrides the level picked from the flags.
fn init_logging(verbose: u8, quiet: bool, json: bool) {
    let level = if quiet {
        LevelFilter::ERROR
    } else {
        match verbose {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.with_ansi(std::io::stderr().is_terminal()).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    init_logging(cli.verbose, cli.quiet, cli.log_json);

    match command {
        Commands::Run(args) => {
            commands::run::run(
                &args.stream.input,
                args.stream.interval,
                args.stream.format,
                &args.stream.output,
                args.cadence,
                args.flush_on_exit,
                args.checkpoint.then_some(args.state_dir),
            )
            .await
        }
        Commands::Replay(args) => {
            commands::replay::replay(
                &args.stream.input,
                args.stream.interval,
                args.stream.format,
                &args.stream.output,
                args.skip_invalid,
            )
            .await
        }
        Commands::Checkpoint { action } => match action {
            CheckpointAction::Show { state_dir } => commands::checkpoint::show(state_dir),
            CheckpointAction::Clear { state_dir } => commands::checkpoint::clear(state_dir),
        },
    }
}
