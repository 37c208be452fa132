use anyhow::{Context, Result};
use backup_coordinator::config::{self, Config};
use backup_coordinator::managers::logging::{self, LoggingConfig};
use backup_coordinator::workload::{compose_sidecar_spec, DefaultSpecFactory};
use backup_coordinator::{BackupCoordinator, Collaborators, RestoreAction};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "backup-coordinator")]
#[command(about = "Per-cluster backup storage and sidecar lifecycle", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "cluster.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate configuration file
    Validate,

    /// Print the composed backup sidecar spec as JSON
    Render,

    /// Show what setup would do, without touching the platform
    Plan {
        /// Treat the cluster as already existing (attach to prior storage)
        #[arg(long)]
        existing: bool,
    },

    /// Show what cleanup would do, without touching the platform
    Teardown,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load_config(&cli.config)
        .with_context(|| format!("Failed to load configuration from {:?}", cli.config))?;

    match cli.command {
        Commands::Validate => {
            logging::init_console_logging();
            handle_validate(&config);
        }
        Commands::Render => {
            logging::init_console_logging();
            handle_render(&config)?;
        }
        Commands::Plan { existing } => {
            let _log_guard = logging::init_logging(&LoggingConfig::from_config(&config.logging))?;
            handle_plan(&config, !existing)?;
        }
        Commands::Teardown => {
            let _log_guard = logging::init_logging(&LoggingConfig::from_config(&config.logging))?;
            handle_teardown(&config)?;
        }
    }

    Ok(())
}

fn handle_validate(config: &Config) {
    println!("✓ Configuration is valid");
    println!("  Cluster:  {} (namespace {})", config.cluster.name, config.cluster.namespace);
    println!("  Storage:  {}", config.backup.storage_type);
    if let Some(ref restore) = config.restore {
        println!("  Restore:  from '{}'", restore.backup_cluster_name);
    }
}

fn handle_render(config: &Config) -> Result<()> {
    let spec = compose_sidecar_spec(
        &DefaultSpecFactory::new(),
        &config.backup_policy(),
        &config.cluster_config(),
    )?;
    println!("{}", serde_json::to_string_pretty(&spec)?);
    Ok(())
}

fn build_coordinator(config: &Config, is_new_cluster: bool) -> Result<BackupCoordinator> {
    let coordinator = BackupCoordinator::new(
        Arc::new(config.cluster_config()),
        config.backup_policy(),
        config.restore_policy(),
        &Collaborators::dry_run(),
        is_new_cluster,
    )?;
    Ok(coordinator)
}

fn handle_plan(config: &Config, is_new_cluster: bool) -> Result<()> {
    let mut coordinator = build_coordinator(config, is_new_cluster)?;

    println!("=== Setup plan: {} ===\n", coordinator.cluster().name);

    match coordinator.storage_type() {
        Some(storage_type) => println!("Storage:  {}", storage_type),
        None => println!("Storage:  none (ephemeral scratch space)"),
    }

    match coordinator.restore_action() {
        RestoreAction::Skip => println!("Restore:  none"),
        RestoreAction::Demoted { source } => {
            println!("Restore:  ignored, no storage to restore '{}' into", source)
        }
        RestoreAction::ReuseOwnStorage => println!("Restore:  reuse own existing storage"),
        RestoreAction::Clone { source } => println!("Restore:  clone backups of '{}'", source),
    }

    let spec = coordinator.sidecar_spec()?;
    println!("\nSidecar spec:\n{}", serde_json::to_string_pretty(&spec)?);

    coordinator.setup()?;
    println!("\n✓ Setup plan completed");
    Ok(())
}

fn handle_teardown(config: &Config) -> Result<()> {
    let mut coordinator = build_coordinator(config, false)?;

    println!("=== Teardown plan: {} ===\n", coordinator.cluster().name);
    println!("Delete:   backup replica set and service");
    match coordinator.storage_type() {
        Some(storage_type) => println!("Delete:   {} storage", storage_type),
        None => println!("Delete:   no storage configured"),
    }

    coordinator.cleanup()?;
    println!("\n✓ Teardown plan completed");
    Ok(())
}
