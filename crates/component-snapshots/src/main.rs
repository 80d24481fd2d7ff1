//! Component Snapshots
//!
//! Writes a placeholder `.template.html` beside every component template
//! under a directory. Run from the project root with no arguments to snapshot
//! `./components`.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use component_kit::snapshot::{SnapshotConfig, SnapshotGenerator, SnapshotReport};
use component_kit::{DEFAULT_COMPONENTS_DIR, TEMPLATE_EXTENSION};
use console::style;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "component-snapshots", version, about)]
struct Cli {
    /// Component directory to scan
    #[arg(default_value = DEFAULT_COMPONENTS_DIR)]
    root: PathBuf,

    /// Template file extension
    #[arg(long, default_value = TEMPLATE_EXTENSION)]
    extension: String,

    /// Exit with a failure status if any template fails to render
    #[arg(long)]
    strict: bool,

    /// Log every processed file (repeat for debug output)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    fn env_filter(&self) -> anyhow::Result<EnvFilter> {
        let level = self.log_level();
        Ok(EnvFilter::from_default_env()
            .add_directive(format!("component_kit={level}").parse()?)
            .add_directive(format!("component_snapshots={level}").parse()?))
    }

    fn config(&self) -> SnapshotConfig {
        SnapshotConfig::new(&self.root).with_extension(&self.extension)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(cli.env_filter()?)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(
        root = %cli.root.display(),
        extension = %cli.extension,
        "starting snapshot run"
    );

    let generator = SnapshotGenerator::new(cli.config())
        .with_context(|| format!("cannot open component directory {}", cli.root.display()))?;
    let report = generator.run().context("snapshot generation failed")?;

    print_summary(&report);

    if cli.strict && !report.is_success() {
        tracing::warn!(failed = report.failed_count(), "failing run in strict mode");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_summary(report: &SnapshotReport) {
    for entry in &report.entries {
        match &entry.error {
            None => println!("{} {}", style("wrote").green(), entry.output.display()),
            Some(err) => println!(
                "{} {}: {err}",
                style("failed").red().bold(),
                entry.source.display()
            ),
        }
    }
    println!(
        "{} written, {} failed",
        report.written_count(),
        report.failed_count()
    );
}
