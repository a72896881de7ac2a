//! Config command - show current configuration

use crate::cli::OutputFormat;
use crate::core::services::Services;
use clap::Args;
use serde::Serialize;
use std::sync::Arc;

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Also show where the config file is looked up
    #[arg(long, short = 'a')]
    pub all: bool,
}

/// Configuration response
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<String>,
    pub registry: RegistrySection,
    pub storage: StorageSection,
    pub logging: LoggingSection,
}

#[derive(Debug, Serialize)]
pub struct RegistrySection {
    pub negative_count_policy: String,
    pub retain_closed: bool,
}

#[derive(Debug, Serialize)]
pub struct StorageSection {
    pub index_dir: String,
}

#[derive(Debug, Serialize)]
pub struct LoggingSection {
    pub level: String,
    pub json: bool,
}

/// Execute the config command
pub async fn execute(
    args: ConfigArgs,
    services: &Arc<Services>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = &services.config;

    let config_file = args.all.then(|| {
        crate::core::xdg::XdgDirs::new()
            .config_file()
            .display()
            .to_string()
    });

    let response = ConfigResponse {
        config_file,
        registry: RegistrySection {
            negative_count_policy: config.registry.negative_count_policy.to_string(),
            retain_closed: config.registry.retain_closed,
        },
        storage: StorageSection {
            index_dir: config.storage.index_dir.display().to_string(),
        },
        logging: LoggingSection {
            level: config.logging.level.clone(),
            json: config.logging.json,
        },
    };

    match format {
        OutputFormat::Human => {
            println!("Configuration:");
            if let Some(path) = &response.config_file {
                println!("  config_file: {path}");
            }
            println!("  registry:");
            println!(
                "    negative_count_policy: {}",
                response.registry.negative_count_policy
            );
            println!("    retain_closed: {}", response.registry.retain_closed);
            println!("  storage:");
            println!("    index_dir: {}", response.storage.index_dir);
            println!("  logging:");
            println!("    level: {}", response.logging.level);
            println!("    json: {}", response.logging.json);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
