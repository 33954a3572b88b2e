//! Publish command implementation
//!
//! This module implements the `publish` command, which completes publishing
//! for a batch of release versions.

use crate::adapters::gateways::{create_postgresql_client, gateways_with_client};
use crate::config::load_config;
use crate::core::publish::{
    CompletionSummary, OrchestratorOptions, OutcomeKind, PublishRequest,
    PublishingCompletionOrchestrator,
};
use crate::domain::{PublisherError, ReleaseVersionId};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;

/// Arguments for the publish command
#[derive(Args, Debug)]
pub struct PublishArgs {
    /// Release version id(s) to publish (repeatable or comma-separated)
    #[arg(
        long = "release-version-id",
        value_name = "ID",
        value_delimiter = ',',
        required_unless_present = "input",
        conflicts_with = "input"
    )]
    pub release_version_ids: Vec<String>,

    /// JSON file holding the publish request
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Skip confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Dry run mode - read everything, write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl PublishArgs {
    /// Execute the publish command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting publish command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(2);
            }
        };

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2);
        }

        let request = match self.build_request() {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "Invalid publish request");
                eprintln!("Invalid publish request: {e}");
                return Ok(2);
            }
        };

        if request.release_version_ids.is_empty() {
            println!("No release versions to publish.");
            return Ok(0);
        }

        let dry_run = config.application.dry_run;
        if dry_run {
            tracing::info!("Dry run mode enabled - no data will be written");
            println!("🔍 DRY RUN MODE - Nothing will be written");
            println!();
        }

        if !self.yes && !dry_run {
            println!("Publish Request:");
            for id in &request.release_version_ids {
                println!("  - {id}");
            }
            println!();
            print!("Complete publishing for these release versions? [y/N]: ");
            use std::io::{self, Write};
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;

            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Publish cancelled.");
                return Ok(0);
            }
        }

        let shutdown_timeout = Duration::from_secs(config.publisher.shutdown_timeout_secs);

        let client = match create_postgresql_client(&config).await {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create database client");
                eprintln!("Failed to initialize publishing: {e}");
                return Ok(4);
            }
        };
        if let Err(e) = client.test_connection().await {
            tracing::error!(error = %e, "Database connection failed");
            eprintln!("Failed to connect to database: {e}");
            return Ok(4);
        }
        let gateways = match gateways_with_client(&config, client) {
            Ok(g) => g,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create gateways");
                eprintln!("Failed to initialize publishing: {e}");
                return Ok(4);
            }
        };

        let orchestrator = PublishingCompletionOrchestrator::new(
            &gateways,
            OrchestratorOptions::from_config(&config),
            shutdown_signal.clone(),
        );

        println!("🚀 Completing publishing...");
        println!();

        let run = orchestrator.complete_publishing(request);
        tokio::pin!(run);
        let mut signal = shutdown_signal;

        // Once a shutdown is requested, in-flight releases get a bounded grace period
        let result = tokio::select! {
            result = &mut run => result,
            _ = wait_for_shutdown(&mut signal) => {
                tracing::info!(
                    timeout_secs = shutdown_timeout.as_secs(),
                    "Waiting for in-flight releases"
                );
                match tokio::time::timeout(shutdown_timeout, &mut run).await {
                    Ok(result) => result,
                    Err(_) => {
                        tracing::warn!("Shutdown timeout elapsed before in-flight releases finished");
                        eprintln!("⚠️  Shutdown timeout elapsed; attempts left in progress");
                        return Ok(130);
                    }
                }
            }
        };

        let summary = match result {
            Ok(s) => s,
            Err(PublisherError::AllReleasesFailed { count }) => {
                tracing::error!(count, "Every release version failed");
                eprintln!("❌ Publishing failed for all {count} release version(s)");
                return Ok(5);
            }
            Err(e) => {
                tracing::error!(error = %e, "Publishing failed");
                eprintln!("Publishing failed: {e}");
                return Ok(5);
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_summary(&summary);
        }

        Ok(exit_code(&summary))
    }

    /// Build the request from `--input` or `--release-version-id`
    pub fn build_request(&self) -> Result<PublishRequest, String> {
        if let Some(path) = &self.input {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
            return serde_json::from_str(&contents)
                .map_err(|e| format!("Failed to parse {}: {e}", path.display()));
        }

        let ids = self
            .release_version_ids
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<ReleaseVersionId>())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PublishRequest::new(ids))
    }
}

async fn wait_for_shutdown(signal: &mut watch::Receiver<bool>) {
    while !*signal.borrow() {
        if signal.changed().await.is_err() {
            // Sender dropped without a shutdown request
            std::future::pending::<()>().await;
        }
    }
}

/// Exit code for a batch that returned a summary
pub fn exit_code(summary: &CompletionSummary) -> i32 {
    if summary.not_started_count() > 0 {
        130
    } else if summary.failed_count() > 0 {
        1
    } else {
        0
    }
}

fn print_summary(summary: &CompletionSummary) {
    println!("📊 Publishing Summary:");
    println!("  Release versions: {}", summary.outcomes.len());
    println!("  Complete: {}", summary.complete_count());
    println!("  Failed: {}", summary.failed_count());
    println!("  Already complete: {}", summary.skipped_count());
    println!("  Not started: {}", summary.not_started_count());
    println!("  Warnings: {}", summary.warning_count());
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    for outcome in &summary.outcomes {
        let label = match &outcome.kind {
            OutcomeKind::Complete => "✅ Complete".to_string(),
            OutcomeKind::Failed { step, .. } => format!("❌ Failed at {step}"),
            OutcomeKind::Skipped => "⏭️  Already complete".to_string(),
            OutcomeKind::NotStarted => "⏸️  Not started".to_string(),
        };
        println!("  {} {label}", outcome.release_version_id);
        if let OutcomeKind::Failed { message, .. } = &outcome.kind {
            println!("      Reason: {message}");
        }
        for warning in &outcome.warnings {
            println!("      Warning: {warning}");
        }
    }

    if !summary.batch_warnings.is_empty() {
        println!();
        println!("⚠️  Batch warnings:");
        for warning in &summary.batch_warnings {
            println!("  - {warning}");
        }
    }
    println!();

    if summary.not_started_count() > 0 {
        println!("⚠️  Publishing interrupted. Run the same command to publish the rest.");
    } else if summary.is_partial() {
        println!("⚠️  Publishing completed with failures");
    } else {
        println!("✅ Publishing completed successfully!");
    }
}
