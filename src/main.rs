//! dataassert - Cell-level equality assertions for tabular datasets

use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use termcolor::ColorChoice;

use dataassert::config::{Config, FailureMode, OutputFormat, RowMatching};
use dataassert::diff::DiffEngine;
use dataassert::output::{render_to_stdout, ComparisonReport};
use dataassert::parser::ParserFactory;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Assert that an actual dataset equals an expected one, cell by cell
#[derive(Parser, Debug)]
#[command(name = "dataassert")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Expected dataset: a CSV file, a directory of CSV files, a JSON file or an Excel workbook
    expected: PathBuf,

    /// Actual dataset, in any supported format
    actual: PathBuf,

    /// Compare only this table
    #[arg(short, long)]
    table: Option<String>,

    /// Key column suffixes, tried in order (comma-separated)
    #[arg(long, value_delimiter = ',')]
    key_suffix: Vec<String>,

    /// Compare rows by position instead of by key
    #[arg(long)]
    positional: bool,

    /// Column(s) to ignore in comparison (comma-separated)
    #[arg(long, value_delimiter = ',')]
    ignore_column: Vec<String>,

    /// Do not compare cells that are null on both sides
    #[arg(long)]
    skip_both_null: bool,

    /// Do not report expected rows that have no matching actual row
    #[arg(long)]
    skip_absent: bool,

    /// Ignore case when comparing string values
    #[arg(long)]
    ignore_case: bool,

    /// Ignore leading/trailing whitespace in string values
    #[arg(long)]
    ignore_whitespace: bool,

    /// Tolerance for numeric comparisons (e.g., 0.001)
    #[arg(long)]
    numeric_tolerance: Option<f64>,

    /// Stop at the first difference
    #[arg(long)]
    fail_fast: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: CliOutputFormat,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::new(self.expected.clone(), self.actual.clone())
            .with_ignore_columns(self.ignore_column.clone())
            .with_skip_both_null(self.skip_both_null)
            .with_skip_absent_actual(self.skip_absent)
            .with_ignore_case(self.ignore_case)
            .with_ignore_whitespace(self.ignore_whitespace)
            .with_output_format(self.format.into());

        if let Some(table) = &self.table {
            config = config.with_table(table.clone());
        }
        if !self.key_suffix.is_empty() {
            config = config.with_key_suffixes(self.key_suffix.clone());
        }
        if self.positional {
            config = config.with_row_matching(RowMatching::Positional);
        }
        if let Some(tolerance) = self.numeric_tolerance {
            config = config.with_numeric_tolerance(tolerance);
        }
        if self.fail_fast {
            config = config.with_failure_mode(FailureMode::FailFast);
        }
        config
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    match run(&cli) {
        Ok(has_discrepancies) => {
            if has_discrepancies {
                ExitCode::from(1) // Differences found
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(cli: &Cli) -> Result<bool> {
    let config = cli.config();

    let factory = ParserFactory::new();

    let mut expected = factory
        .parse(&config.expected_path)
        .with_context(|| format!("Failed to load expected dataset: {}", config.expected_path.display()))?;

    let mut actual = factory
        .parse(&config.actual_path)
        .with_context(|| format!("Failed to load actual dataset: {}", config.actual_path.display()))?;

    if let Some(table) = &config.table {
        expected = expected.select(table)?;
        actual = actual.select(table)?;
    }
    info!(
        "comparing {} table(s) of {} with {}",
        expected.len(),
        config.expected_path.display(),
        config.actual_path.display()
    );

    let engine = DiffEngine::new(&config);
    let report = match config.failure_mode {
        FailureMode::Collect => match engine.collect_datasets(&expected, &actual) {
            Ok(outcomes) => {
                ComparisonReport::from_outcomes(&config.expected_path, &config.actual_path, outcomes)
            }
            Err(err) if err.is_discrepancy() => {
                ComparisonReport::failed(&config.expected_path, &config.actual_path, &err)
            }
            Err(err) => return Err(err.into()),
        },
        FailureMode::FailFast => ComparisonReport::from_fail_fast(
            &config.expected_path,
            &config.actual_path,
            &expected.sorted_table_names(),
            engine.assert_datasets_equal(&expected, &actual, None),
        )?,
    };
    debug!("{} difference(s) found", report.difference_count());

    let color_choice = if std::io::stdout().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    render_to_stdout(&report, config.output_format, color_choice)?;

    Ok(report.has_discrepancies())
}
