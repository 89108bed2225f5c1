//! `pdfsort`: sort a folder of PDFs by language and topic.
//!
//! Exits non-zero only when the run cannot start (bad config, missing input,
//! unwritable output). Per-document failures end up in the run logs.

use anyhow::{Context, Result};
use clap::Parser;
use pdfsort_core::SorterConfig;
use pdfsort_pipeline::{Pipeline, RunReport};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod args;

use args::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.quiet { "warn" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = SorterConfig::load_with(args.config.as_deref()).context("Failed to load configuration")?;
    args.apply(&mut config);
    config.validate().context("Invalid configuration")?;

    tracing::info!(
        input = %config.input_dir().display(),
        output = %config.output_dir().display(),
        "pdfsort starting"
    );

    let report = match Pipeline::from_config(config.clone()).with_progress(!args.quiet).run() {
        Ok(report) => report,
        Err(e) if e.is_fatal() => {
            return Err(anyhow::Error::new(e).context(format!("Cannot start sort run over {}", config.input_dir().display())))
        }
        Err(e) => {
            return Err(anyhow::Error::new(e).context(format!("Sort run over {} aborted", config.input_dir().display())))
        }
    };

    if !args.quiet {
        print_summary(&config, &report);
    }
    Ok(())
}

fn print_summary(config: &SorterConfig, report: &RunReport) {
    if report.discovered == 0 {
        println!("No PDFs found in {}", config.input_dir().display());
        return;
    }
    println!("\nSorted {} of {} documents in {:.1}s", report.sorted, report.discovered, report.elapsed_ms as f64 / 1000.0);
    println!("  duplicates: {}", report.duplicates);
    println!("  unreadable: {}", report.unreadable);
    println!("  errors:     {}", report.errors);
    if let Some(reason) = &report.topic_fallback {
        println!("  topics:     single fallback topic ({reason})");
    } else if !report.topics.is_empty() {
        println!("  topics:");
        for topic in &report.topics {
            println!("    {:<24} {:>5} docs  [{}]", topic.label, topic.size, topic.keywords.join(", "));
        }
    }
    println!("\nIndex: {}", config.index_path().display());
    println!("Logs:  {}", config.log_dir().display());
}
