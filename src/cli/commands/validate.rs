//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the publisher configuration file.

use crate::adapters::gateways::create_postgresql_client;
use crate::config::load_config;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Also open a database connection
    #[arg(long)]
    pub check_connection: bool,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        if let Err(e) = config.validate() {
            println!("❌ Configuration validation failed");
            println!("   Error: {e}");
            println!();
            return Ok(2);
        }

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Environment: {:?}", config.environment);
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!(
            "  Max Concurrent Releases: {}",
            config.publisher.max_concurrent_releases
        );
        println!("  Step Timeout: {}s", config.publisher.step_timeout_seconds);
        println!("  PostgreSQL Max Connections: {}", config.postgresql.max_connections);
        println!("  Storage Endpoint: {}", config.storage.endpoint);
        println!(
            "  Containers: {} / {}",
            config.storage.public_content_container, config.storage.public_release_files_container
        );
        println!("  Notifier: {}", config.notifier.base_url);
        println!("  Event Topic: {}", config.event_bus.topic_endpoint);
        println!();

        if self.check_connection {
            let client = match create_postgresql_client(&config).await {
                Ok(c) => c,
                Err(e) => {
                    println!("❌ Failed to create database client");
                    println!("   Error: {e}");
                    return Ok(4);
                }
            };
            if let Err(e) = client.test_connection().await {
                println!("❌ Database connection failed");
                println!("   Error: {e}");
                return Ok(4);
            }
            println!("✅ Connected to {}", client.connection_string_safe());
            println!();
        }

        Ok(0)
    }
}
