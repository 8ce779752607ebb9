mod test_mode;

use clap::{Args, Parser, Subcommand};
use light52_config::{BoardConfig, BuildTarget, StopReason};
use light52_sim::metrics::TxMetrics;
use light52_sim::Session;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;

pub const DEFAULT_BUILD_TAG: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Light52 Hello World demo on a simulated UART",
    long_about = None,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a YAML test script and report the outcome
    Test(test_mode::TestArgs),
}

#[derive(Args, Debug)]
struct RunArgs {
    /// Build flavour to run: `sim` ignores TXRDY, `hw` polls it
    #[arg(long, default_value = "sim", value_parser = parse_target)]
    target: BuildTarget,

    /// Path to the board description (YAML)
    #[arg(short, long)]
    board: Option<PathBuf>,

    /// Text shown in the banner line in place of the build date
    #[arg(long, default_value = DEFAULT_BUILD_TAG)]
    build_tag: String,

    /// Enable debug-level tracing
    #[arg(short, long)]
    trace: bool,

    /// Don't mirror UART output to stdout
    #[arg(long)]
    no_uart_stdout: bool,

    /// Maximum number of TXRDY polls before the run is cut short
    #[arg(long, default_value_t = light52_sim::session::DEFAULT_MAX_POLLS)]
    max_polls: u64,
}

pub(crate) fn parse_target(s: &str) -> Result<BuildTarget, String> {
    s.parse::<BuildTarget>().map_err(|e| e.to_string())
}

pub(crate) fn init_tracing(trace: bool) {
    let level = if trace {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    // UART output owns stdout.
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Test(args)) => {
            init_tracing(args.trace);
            test_mode::run(&args)
        }
        None => {
            init_tracing(cli.run.trace);
            match run(&cli.run) {
                Ok(StopReason::EndOfTransmission) => ExitCode::SUCCESS,
                Ok(reason) => {
                    tracing::error!("Program did not end with EOT (stopped with {})", reason);
                    ExitCode::FAILURE
                }
                Err(e) => {
                    tracing::error!("{:#}", e);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

fn run(args: &RunArgs) -> anyhow::Result<StopReason> {
    info!("Starting Light52 demo ({} target)", args.target);

    let board = if let Some(path) = &args.board {
        info!("Loading board config: {:?}", path);
        BoardConfig::from_file(path)?
    } else {
        info!("Using default board configuration");
        BoardConfig::default()
    };
    info!(
        "UART {} at {:#x}, {} Hz clock",
        board.uart.framing, board.uart.base_address, board.clock_hz
    );

    let metrics = Arc::new(TxMetrics::new());
    let mut session = Session::new(board, args.target)?
        .with_max_polls(args.max_polls)
        .with_echo(!args.no_uart_stdout);
    session.add_observer(metrics.clone());

    let report = session.run_hello(&args.build_tag);

    info!("Simulation stopped: {}", report.stop_reason);
    info!(
        "{} bytes ({} lines), {} overruns, {} polls, {} cycles",
        metrics.get_bytes(),
        metrics.get_lines(),
        report.overruns,
        report.polls,
        report.cycles
    );

    Ok(report.stop_reason)
}
