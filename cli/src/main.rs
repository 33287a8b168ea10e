//! fcp - Command-line interface for the transfer engine.
//!
//! Copies (or, with `--move`, moves) files and directories with progress
//! reporting. Argument parsing, terminal rendering and exit codes live here;
//! the transfer itself is done by the engine.

mod progress;
mod prompt;

use clap::Parser;
use engine::{
    execute, plan, EngineError, FixedAnswer, Mode, OverwritePolicy, StdinConfirm, TransferOptions,
    TransferOutcome, TransferPlan,
};
use std::path::PathBuf;
use tracing::Level;

use progress::{GlobalIndicator, Indicator, OneFileIndicator};
use prompt::TerminalConfirm;

/// fcp - copy or move files and directories with a progress bar
#[derive(Parser, Debug)]
#[command(name = "fcp")]
#[command(version)]
#[command(about = "Copy or move files and directories with progress tracking")]
struct Args {
    /// Source files or directories, followed by the destination
    #[arg(value_name = "PATH", required = true, num_args = 2..)]
    paths: Vec<PathBuf>,

    /// Move instead of copy: remove sources once transferred
    #[arg(short, long = "move")]
    move_files: bool,

    /// Ask before overwriting existing files
    #[arg(short, long)]
    interactive: bool,

    /// Never overwrite existing files (takes precedence over --interactive)
    #[arg(short, long)]
    safe: bool,

    /// Transfer hidden files when recursing into directories
    #[arg(short, long)]
    all: bool,

    /// Show one progress bar for the whole transfer
    #[arg(short, long)]
    global: bool,

    /// Preserve timestamps and ownership
    #[arg(short, long)]
    preserve: bool,

    /// Keep going when a file fails, and report failures at the end
    #[arg(long)]
    ignore_errors: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn options(&self) -> TransferOptions {
        let overwrite_policy = if self.safe {
            OverwritePolicy::Skip
        } else if self.interactive {
            OverwritePolicy::Ask
        } else {
            OverwritePolicy::Overwrite
        };

        TransferOptions {
            mode: if self.move_files { Mode::Move } else { Mode::Copy },
            overwrite_policy,
            ignore_errors: self.ignore_errors,
            all_files: self.all,
            preserve: self.preserve,
        }
    }

    /// Split the positional paths into sources and destination.
    fn sources_and_destination(&self) -> Result<(&[PathBuf], &PathBuf), String> {
        match self.paths.split_last() {
            Some((destination, sources)) if !sources.is_empty() => Ok((sources, destination)),
            _ => Err("Expected at least one source and a destination".to_string()),
        }
    }
}

fn init_logging(verbose: u8) {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        })
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: could not initialize logging: {}", e);
    }
}

/// Parse command-line arguments, run the transfer, map the exit code
fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let exit_code = match run_cli(&args, true) {
        Ok(outcome) => report_outcome(&outcome),
        Err(msg) => {
            eprintln!("Error: {}", msg);
            2
        }
    };

    std::process::exit(exit_code);
}

/// Print warnings and tolerated failures; return the exit code.
fn report_outcome(outcome: &TransferOutcome) -> i32 {
    for skipped in &outcome.skipped {
        eprintln!("Skipped: {}", skipped.display());
    }
    for warning in &outcome.warnings {
        eprintln!("Warning: {}", warning);
    }

    if outcome.is_success() {
        return 0;
    }

    eprintln!();
    eprintln!("Error: {} file(s) could not be transferred:", outcome.errors.len());
    for (source, error) in &outcome.errors {
        eprintln!("  {}: {}", source.display(), error);
    }
    1
}

/// Main CLI logic - separated for testability
fn run_cli(args: &Args, draw_progress: bool) -> Result<TransferOutcome, String> {
    let (sources, destination) = args.sources_and_destination()?;
    let options = args.options();

    let plan = plan(sources, destination, options.all_files).map_err(|e| e.to_string())?;
    tracing::info!(
        "{} {} files ({} bytes) to {}",
        options.mode,
        plan.len(),
        plan.total_size,
        destination.display()
    );

    let result = if args.global {
        let indicator = if draw_progress {
            GlobalIndicator::new(plan.len(), plan.total_size)
        } else {
            GlobalIndicator::hidden(plan.len(), plan.total_size)
        };
        let result = execute_with(plan, &options, &indicator);
        indicator.finish();
        result
    } else {
        let indicator = if draw_progress {
            OneFileIndicator::new(plan.len())
        } else {
            OneFileIndicator::hidden(plan.len())
        };
        execute_with(plan, &options, &indicator)
    };

    result.map_err(|e| match e {
        EngineError::Transfer(e) => format!("{}\nTransfer aborted", e),
        other => other.to_string(),
    })
}

/// Execute `plan`, asking on stdin (with the bars cleared) when the policy says so.
fn execute_with<I: Indicator>(
    plan: TransferPlan,
    options: &TransferOptions,
    indicator: &I,
) -> Result<TransferOutcome, EngineError> {
    if options.overwrite_policy == OverwritePolicy::Ask {
        let mut confirm = TerminalConfirm::new(indicator, StdinConfirm::new());
        execute(plan, options, &mut confirm, indicator)
    } else {
        execute(plan, options, &mut FixedAnswer(false), indicator)
    }
}
