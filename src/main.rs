#![forbid(unsafe_code)]

//! fitsession: group timestamped FIT recordings into session directories.
//!
//! CLI entry point: parses arguments, runs the grouping pipeline, renders output.

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use fitsession::confirm::confirm;
use fitsession::error::GrouperError;
use fitsession::model::{
    DEFAULT_EXTENSION, DEFAULT_MAX_GAP_SECS, DEFAULT_MIN_GAP_SECS, GroupingConfig, ToleranceWindow,
    ZonePolicy,
};
use fitsession::pipeline::{PostStep, RunOptions, RunOutcome, SessionGrouper};
use fitsession::relocate::RealFs;
use fitsession::report;

/// Group timestamped FIT recordings into session directories.
///
/// Files named YYYY-MM-DD-HH-MM-SS.fit are grouped into sessions when
/// consecutive recordings are a fixed interval apart, then moved into one
/// directory per session, named after its first recording.
#[derive(Parser, Debug)]
#[command(name = "fitsession", version, about, long_about = None)]
struct Cli {
    /// Directory containing the recordings.
    directory: PathBuf,

    /// Smallest accepted gap between consecutive recordings, in seconds.
    #[arg(long, env = "FITSESSION_MIN_GAP", default_value_t = DEFAULT_MIN_GAP_SECS)]
    min_gap: i64,

    /// Largest accepted gap between consecutive recordings, in seconds.
    #[arg(long, env = "FITSESSION_MAX_GAP", default_value_t = DEFAULT_MAX_GAP_SECS)]
    max_gap: i64,

    /// Recording file extension.
    #[arg(long, env = "FITSESSION_EXT", default_value = DEFAULT_EXTENSION)]
    ext: String,

    /// Time zone the embedded timestamps are written in.
    #[arg(long, env = "FITSESSION_TZ", value_enum, default_value_t = ZonePolicy::Local)]
    tz: ZonePolicy,

    /// Show the grouping without moving anything.
    #[arg(long)]
    dry_run: bool,

    /// Move without asking for confirmation.
    #[arg(short, long)]
    yes: bool,

    /// Program to run on every session directory after grouping (repeatable).
    #[arg(long = "then", value_name = "COMMAND", value_parser = parse_post_step)]
    then: Vec<PostStep>,

    /// Show detailed progress.
    #[arg(long)]
    verbose: bool,

    /// Show everything including per-file decisions.
    #[arg(long)]
    trace: bool,

    /// Output as JSON for machine consumption.
    #[arg(long)]
    json: bool,
}

/// Parse a `--then` value, rejecting blank commands.
fn parse_post_step(value: &str) -> Result<PostStep, String> {
    PostStep::parse(value).ok_or_else(|| "step command must not be empty".to_string())
}

/// Initialize the tracing subscriber based on CLI flags.
///
/// Priority: `--trace` > `--verbose` > `RUST_LOG` env var > default (warn).
fn init_tracing(cli: &Cli) {
    let filter = if cli.trace {
        EnvFilter::new("fitsession=trace")
    } else if cli.verbose {
        EnvFilter::new("fitsession=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<GrouperError>() {
                Some(e) if cli.json => println!("{}", report::error_json(e)),
                Some(e) => {
                    eprintln!("{} {err:#}", "error:".red().bold());
                    for dir in e.relocated_dirs() {
                        eprintln!("  kept {}", dir.display());
                    }
                }
                None => eprintln!("{} {err:#}", "error:".red().bold()),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let window = ToleranceWindow::new(cli.min_gap, cli.max_gap)?;
    let config = GroupingConfig::new(&cli.ext, window, cli.tz);
    let opts = RunOptions {
        dry_run: cli.dry_run,
        assume_yes: cli.yes,
        steps: cli.then.clone(),
    };

    let mut grouper = SessionGrouper::new(config.clone(), RealFs);
    let plan = grouper.plan(&cli.directory)?;

    if !cli.json {
        print!("{}", report::render_plan(&plan, &config));
    }

    let json = cli.json;
    let outcome = grouper.run(&plan, &opts, |pending| {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        if json {
            // stdout is reserved for the final JSON document.
            let mut stderr = std::io::stderr();
            let plan_text = serde_json::to_string_pretty(&report::plan_json(pending, &config))
                .map_err(|e| GrouperError::PromptFailed {
                    detail: e.to_string(),
                })?;
            writeln!(stderr, "{plan_text}").map_err(|e| GrouperError::PromptFailed {
                detail: e.to_string(),
            })?;
            confirm(&mut input, &mut stderr, "Move files into session directories?")
        } else {
            let mut stdout = std::io::stdout();
            confirm(&mut input, &mut stdout, "Move files into session directories?")
        }
    })?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report::outcome_json(&plan, &config, &outcome))?
        );
        return Ok(());
    }

    match &outcome {
        RunOutcome::DryRun => println!("Dry run: no files were moved."),
        RunOutcome::Cancelled => println!("Cancelled. No files were moved."),
        RunOutcome::Completed {
            relocation,
            steps_run,
        } => {
            print!("{}", report::render_relocation(relocation));
            for step in steps_run {
                println!("{} {step}", "Ran".green());
            }
        }
    }
    std::io::stdout().flush()?;
    Ok(())
}
