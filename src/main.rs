//! # chatminutes CLI
//!
//! Command-line interface for the chatminutes library.

use std::path::Path;
use std::process;
use std::time::Instant;

use clap::Parser as ClapParser;
use tracing_subscriber::EnvFilter;

use chatminutes::ChatminutesError;
use chatminutes::cli::{Args, Command, LedgerCommand, SplitArgs, resume_mode};
use chatminutes::core::{ResumeLedger, discover_day_files, split_file_by_day};

fn main() {
    let args = <Args as ClapParser>::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            process::exit(1);
        }
    }
}

/// Logs go to stderr; `RUST_LOG` takes precedence over `-v`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Returns `Ok(false)` when the run finished but some day failed.
fn run(args: Args) -> Result<bool, ChatminutesError> {
    match args.command {
        Command::Split(split) => run_split(&split),
        Command::Ledger(LedgerCommand::Show { ledger }) => {
            show_ledger(&ledger);
            Ok(true)
        }
        Command::Ledger(LedgerCommand::Plan {
            input_dir,
            ledger,
            retry_failed,
            ext,
        }) => {
            plan_ledger(&input_dir, &ledger, retry_failed, &ext)?;
            Ok(true)
        }
    }
}

fn run_split(args: &SplitArgs) -> Result<bool, ChatminutesError> {
    let start = Instant::now();
    let config = args.to_config();

    println!("📦 chatminutes v{}", env!("CARGO_PKG_VERSION"));
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Input:     {}", args.input.display());
    println!("💾 Output:    {}", config.output_dir.display());
    println!("🏷️  Prefix:    {}", config.prefix);
    println!("📅 Dates:     {} (tie-break {})", config.date_policy.order, config.date_policy.ambiguous);
    println!("🔤 Encoding:  {}", config.encoding);
    println!();

    let summary = split_file_by_day(&args.input, &config)?;
    let stats = &summary.stats;

    for day in &summary.report.written {
        println!(
            "   ✔ {}  {:>5} lines  {:>4} messages  {}",
            day.day.day_id,
            day.lines,
            day.messages,
            day.day.path.display()
        );
    }
    for failed in &summary.report.failed {
        println!("   ✘ {}  {}: {}", failed.date, failed.path.display(), failed.error);
    }

    println!();
    println!("📊 Summary:");
    println!("   Days:        {}", summary.day_count());
    println!("   Written:     {}", summary.report.written.len());
    println!("   Lines:       {}", stats.total_lines);
    println!("   Messages:    {}", stats.header_lines);
    println!("   Preamble:    {} discarded", stats.preamble_lines);
    println!(
        "   Orphaned:    {} discarded ({} unparsable headers)",
        stats.orphaned_lines, stats.unparsable_headers
    );
    println!("   Time:        {:.2}s", start.elapsed().as_secs_f64());

    println!();
    if summary.is_complete() {
        println!("✅ Done! {} day files in {}", summary.report.written.len(), config.output_dir.display());
        Ok(true)
    } else {
        println!("⚠️  {} of {} days failed to write", summary.report.failed.len(), summary.day_count());
        Ok(false)
    }
}

fn show_ledger(path: &Path) {
    let ledger = ResumeLedger::open_file(path);
    if ledger.is_empty() {
        println!("📒 {} has no records", path.display());
        return;
    }
    println!("📒 {} ({} days)", path.display(), ledger.len());
    for (day_id, record) in ledger.entries() {
        let error = record.error.as_deref().unwrap_or("");
        println!(
            "   {}  {:<7}  {}/{}  {}  {}",
            day_id,
            record.status.to_string(),
            record.provider,
            record.model,
            record.updated_at.to_rfc3339(),
            error
        );
    }
}

fn plan_ledger(
    input_dir: &Path,
    ledger_path: &Path,
    retry_failed: bool,
    ext: &str,
) -> Result<(), ChatminutesError> {
    let days = discover_day_files(input_dir, ext)?;
    let ledger = ResumeLedger::open_file(ledger_path);
    let mode = resume_mode(retry_failed);
    let planned = ledger.plan(&days, mode);

    println!("🗓️  {} of {} days to process", planned.len(), days.len());
    for day in planned {
        println!("   {}  {}", day.day_id, day.path.display());
    }
    Ok(())
}
