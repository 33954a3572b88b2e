//! Status command implementation
//!
//! This module implements the `status` command, which lists the publishing
//! attempts recorded for release versions.

use crate::adapters::gateways::create_gateways;
use crate::config::load_config;
use crate::core::state::{OverallStage, PublishingStatusStore};
use crate::domain::ReleaseVersionId;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Release version id(s) to inspect (repeatable or comma-separated)
    #[arg(long = "release-version-id", value_name = "ID", value_delimiter = ',', required = true)]
    pub release_version_ids: Vec<String>,

    /// Only show attempts at this overall stage (e.g. Started, Complete, Failed)
    #[arg(long)]
    pub stage: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking publishing status");

        println!("📊 Publishing Status");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let (ids, stage) = match self.parse_filters() {
            Ok(f) => f,
            Err(e) => {
                println!("❌ {e}");
                return Ok(2);
            }
        };

        let gateways = match create_gateways(&config).await {
            Ok(g) => g,
            Err(e) => {
                println!("❌ Failed to connect to database");
                println!("   Error: {e}");
                return Ok(4);
            }
        };

        let store = PublishingStatusStore::new_with_storage(gateways.status_storage);

        let mut rows = Vec::new();
        for id in ids {
            let statuses = match stage {
                Some(stage) => store.get_all_by_overall_stage(id, &[stage]).await,
                None => store.get_all(id).await,
            };
            match statuses {
                Ok(s) => rows.extend(s),
                Err(e) => {
                    println!("❌ Failed to load publishing status for {id}");
                    println!("   Error: {e}");
                    return Ok(5);
                }
            }
        }

        if rows.is_empty() {
            println!("No publishing attempts match the specified filters.");
            return Ok(0);
        }

        println!("Found {} attempt(s):", rows.len());
        println!();
        println!(
            "{:<38} {:<38} {:<22} {:<20} {:<8}",
            "Release Version", "Attempt", "Stage", "Last Updated", "Warnings"
        );
        println!("{}", "-".repeat(130));

        for status in &rows {
            println!(
                "{:<38} {:<38} {:<22} {:<20} {:<8}",
                status.key.release_version_id.to_string(),
                status.key.attempt_id.to_string(),
                status.state.to_string(),
                status.last_updated.format("%Y-%m-%d %H:%M:%S").to_string(),
                status.warnings.len()
            );
            if let Some(message) = &status.log_message {
                println!("    {message}");
            }
        }

        println!();
        Ok(0)
    }

    fn parse_filters(&self) -> Result<(Vec<ReleaseVersionId>, Option<OverallStage>), String> {
        let ids = self
            .release_version_ids
            .iter()
            .map(|s| s.parse::<ReleaseVersionId>())
            .collect::<Result<Vec<_>, _>>()?;
        let stage = self
            .stage
            .as_deref()
            .map(str::parse::<OverallStage>)
            .transpose()?;
        Ok((ids, stage))
    }
}
