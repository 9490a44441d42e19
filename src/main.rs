//! foldercmp - compare pairs of directory trees by content.
//!
//! Usage:
//!   foldercmp                          Run every section of the discovered config
//!   foldercmp --config jobs.toml       Use an explicit configuration file
//!   foldercmp --section photos         Run only the named section(s)
//!   foldercmp --format json            Emit one JSON object per line
//!   foldercmp --help                   Show help

mod logging;
mod report;

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};

use foldercmp_analyze::{ComparisonEngine, ComparisonJob, HashAlgorithm};
use foldercmp_core::{CompareConfig, DEFAULT_BATCH_SIZE, DEFAULT_CHUNK_SIZE, JobFile};

use report::{JsonReport, ReportEmitter, TextReport};

#[derive(Parser)]
#[command(
    name = "foldercmp",
    version,
    about = "Compare pairs of directory trees by content",
    long_about = "foldercmp reads comparison jobs from a TOML file. Each top-level table \
                  names two roots with `folder_<name>` keys and may exclude paths with \
                  `ignore`, a `;`-separated list of regular expressions.\n\n\
                  Without --config, ./foldercmp.toml is tried first, then the user \
                  configuration directory."
)]
struct Cli {
    /// Configuration file (skips discovery)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only run the named section (repeatable)
    #[arg(short, long = "section", value_name = "NAME")]
    sections: Vec<String>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Digest algorithm
    #[arg(short, long, default_value_t = HashAlgorithm::Md5)]
    algorithm: HashAlgorithm,

    /// Bytes read per chunk while hashing
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Paths hashed per parallel batch
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Hashing threads (0 = one per core)
    #[arg(short = 'j', long, default_value_t = 0)]
    threads: usize,

    /// Descend into symlinked directories
    #[arg(long)]
    follow_symlinks: bool,

    /// Also list files that are identical on both sides
    #[arg(long)]
    show_identical: bool,

    /// Verbose logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = CompareConfig::builder()
        .algorithm(cli.algorithm)
        .chunk_size(cli.chunk_size)
        .batch_size(cli.batch_size)
        .threads(cli.threads)
        .follow_symlinks(cli.follow_symlinks)
        .build()
        .context("Invalid comparison settings")?;

    let candidates = match &cli.config {
        Some(path) => vec![path.clone()],
        None => JobFile::default_candidates(),
    };

    // A missing or unreadable configuration ends the run without a failure status
    let job_file = match JobFile::locate(&candidates).and_then(|path| JobFile::load(&path)) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("==== Error: {err} ====");
            return Ok(());
        }
    };
    eprintln!("Using configuration {}", job_file.path.display());

    for requested in &cli.sections {
        if !job_file.section_names().any(|name| name == requested) {
            tracing::warn!(section = %requested, "no such section in configuration");
            eprintln!("==== Error: no section named '{requested}', skipping ====");
        }
    }

    let engine = ComparisonEngine::with_config(config);
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let mut report: Box<dyn ReportEmitter + '_> = match cli.format {
        OutputFormat::Text => Box::new(TextReport::new(&mut out, cli.show_identical)),
        OutputFormat::Json => Box::new(JsonReport::new(&mut out)),
    };

    for section in job_file.section_names() {
        if !cli.sections.is_empty() && !cli.sections.iter().any(|s| s == section) {
            continue;
        }

        let job = match job_file.checked_job(section) {
            Some(Ok(job)) => job,
            Some(Err(err)) => {
                tracing::warn!(section, "skipping section");
                eprintln!("==== Error: {err}, skipping ====");
                continue;
            }
            None => continue,
        };

        run_job(&engine, &job, report.as_mut())
            .with_context(|| format!("Failed to write report for '{}'", job.label))?;
    }

    drop(report);
    out.flush().context("Failed to flush report")?;

    Ok(())
}

/// Compare one job and stream its results into `report`.
fn run_job(engine: &ComparisonEngine, job: &ComparisonJob, report: &mut dyn ReportEmitter) -> io::Result<()> {
    let mut comparison = match engine.compare(job) {
        Ok(comparison) => comparison,
        Err(err) => {
            eprintln!("==== Error: {}: {err}, skipping ====", job.label);
            return Ok(());
        }
    };

    report.begin_job(job)?;
    for result in comparison.by_ref() {
        report.result(job, &result)?;
    }

    if !comparison.warnings().is_empty() {
        eprintln!(
            "{} warning(s) while reading '{}'",
            comparison.warnings().len(),
            job.label
        );
    }

    report.end_job(job, comparison.summary(), comparison.was_cancelled())
}
