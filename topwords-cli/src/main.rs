use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::io::{self, Write};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process;
use topwords::{config::DEFAULT_TOP, Report, ScanConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Print the most frequent words across all .txt files under a directory
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory to scan (defaults to the current directory)
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Number of words to print
    #[arg(short = 'n', long, default_value_t = DEFAULT_TOP)]
    top: usize,

    /// Number of threads to use
    #[arg(short = 'j', long)]
    threads: Option<NonZeroUsize>,

    /// Log level for diagnostics on stderr (trace|debug|info|warn|error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Print a summary of the scan to stderr
    #[arg(short, long)]
    stats: bool,

    /// Print the full report as JSON instead of plain lines
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn scan_config(&self) -> ScanConfig {
        let config = ScanConfig::new(&self.path)
            .with_top(self.top)
            .with_log_level(&self.log_level);
        match self.threads {
            Some(threads) => config.with_thread_count(threads),
            None => config,
        }
    }
}

fn init_logging(level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .with_context(|| format!("invalid log level '{}'", level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.scan_config();
    init_logging(&config.log_level)?;

    debug!("Scan configuration: {:?}", config);

    let report = topwords::scan(&config)?;

    // A broken stdout is worth a diagnostic, but the scan itself succeeded.
    if let Err(e) = print_report(&report, cli.json) {
        eprintln!("{} failed to write output: {}", "warning:".yellow().bold(), e);
    }
    if cli.stats {
        print_stats(&report);
    }
    Ok(())
}

fn print_report(report: &Report, json: bool) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        writeln!(out, "{}", report.to_json()?)?;
    } else {
        out.write_all(report.render_plain().as_bytes())?;
    }
    out.flush()?;
    Ok(())
}

fn print_stats(report: &Report) {
    let stats = &report.stats;
    eprintln!(
        "Counted {} words ({} distinct) in {} files across {} directories",
        report.total_words.to_string().green(),
        report.distinct_words.to_string().green(),
        stats.files_scanned,
        stats.directories_walked
    );
    if report.is_partial() {
        eprintln!(
            "{} {} files and {} directories could not be read",
            "warning:".yellow().bold(),
            stats.files_failed,
            stats.directories_failed
        );
    }
}
