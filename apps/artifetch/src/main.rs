//! artifetch - fetch remote artifacts into local directories
//!
//! This is the CLI that turns a Fetchfile into a job list, runs it
//! through the worker pool and renders the consolidated report.

mod cli;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::events::run_with_events;
use crate::logging::init_tracing;
use artifetch_config::Config;
use artifetch_errors::UserFacingError;
use artifetch_install::{sanitize_message, AtomicInstaller, FetchReport, WorkerPool};
use artifetch_net::{display_source, DefaultTransport};
use artifetch_types::Job;
use clap::Parser;
use std::process;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        if json_mode {
            error!(code = e.code().unwrap_or_default(), "{e}");
        } else {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting artifetch v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration with proper precedence:
    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    match cli.command {
        Commands::Download { parallel, prefix } => {
            // 3. Apply CLI flags (highest precedence)
            config.apply_parallel_flag(parallel);
            download(&config, prefix.as_deref(), cli.global.json).await
        }
        Commands::List { prefix } => {
            let jobs = config.jobs(prefix.as_deref())?;
            render_jobs(&jobs, cli.global.json)
        }
    }
}

async fn download(config: &Config, prefix: Option<&str>, json: bool) -> Result<(), CliError> {
    let jobs = config.jobs(prefix)?;
    let pool_config = config.pool_config();

    let (event_sender, event_receiver) = artifetch_events::channel();
    let installer = AtomicInstaller::new(DefaultTransport::new()?);
    let pool = WorkerPool::new(installer).with_event_sender(event_sender);

    let report = run_with_events(
        async move {
            let report = pool.run(jobs, &pool_config).await;
            // Closes the event channel once the pool is gone
            drop(pool);
            report
        },
        event_receiver,
    )
    .await;

    render_report(&report, json)?;
    report.into_result()?;
    Ok(())
}

fn render_report(report: &FetchReport, json: bool) -> Result<(), CliError> {
    if json {
        let failures = report
            .failures()
            .filter_map(|outcome| outcome.error().map(|err| (outcome, err)))
            .map(|(outcome, err)| {
                Ok(serde_json::json!({
                    "destination": outcome.destination().display().to_string(),
                    "worker": outcome.worker(),
                    "stage": err.stage().as_str(),
                    "code": err.user_code(),
                    "message": sanitize_message(&err.to_string()),
                    "error": serde_json::to_value(err)?,
                }))
            })
            .collect::<Result<Vec<_>, serde_json::Error>>()?;

        let value = serde_json::json!({
            "total": report.total(),
            "succeeded": report.succeeded(),
            "failed": report.failed_count(),
            "failures": failures,
            "finished_at": chrono::Utc::now().to_rfc3339(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let failures = report.summary_lines();
    println!(
        "{} of {} artifacts fetched",
        report.succeeded(),
        report.total()
    );
    if !failures.is_empty() {
        println!("{} failed:", failures.len());
        for line in failures {
            println!("  {line}");
        }
    }
    Ok(())
}

fn render_jobs(jobs: &[Job], json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(jobs)?);
        return Ok(());
    }

    if jobs.is_empty() {
        println!("No artifacts configured");
        return Ok(());
    }

    for job in jobs {
        let strip = if job.strip_vcs() { ", strip vcs" } else { "" };
        println!(
            "{} -> {} ({}{strip})",
            display_source(job.source()),
            job.destination().display(),
            job.mode()
        );
    }
    Ok(())
}
