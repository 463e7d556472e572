//! Command-line shell for Memora (see [`memora::commands`] for the full
//! subcommand surface). This binary is a thin convenience wrapper: it loads
//! config, builds one [`memora::service::MemoryService`], performs exactly
//! one operation, prints the result as JSON, and exits. It holds no
//! retained state and no business logic beyond mapping arguments onto
//! operation calls.

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use memora::commands::{Cli, Commands};
use memora::config::{self, Config};
use memora::models::{DateRange, MemoryFilters, MemoryLocator, NewMemory, Priority, SortColumn, SortOrder};
use memora::service::{self, MemoryService};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = load_config_or_default(cli.config.clone())?;
    initialize_tracing(&config.log_level);

    let service = service::build_service(&config)?;
    let output = dispatch(&service, cli.command)?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Loads the config at `path` (or the default location); if neither exists,
/// falls back to built-in defaults rather than failing the whole run — this
/// binary is a convenience shell, not a deployment artifact that should
/// refuse to start without an explicit file.
fn load_config_or_default(path: Option<PathBuf>) -> Result<Config, Box<dyn Error>> {
    let path = path.unwrap_or_else(config::default_config_path);
    if path.exists() {
        Ok(config::load_config(&path)?)
    } else {
        Ok(Config::default())
    }
}

fn initialize_tracing(log_level: &str) {
    let directive = match log_level.to_ascii_uppercase().as_str() {
        "DEBUG" => "debug",
        "WARNING" => "warn",
        "ERROR" => "error",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

fn dispatch(service: &MemoryService, command: Commands) -> Result<serde_json::Value, Box<dyn Error>> {
    match command {
        Commands::Store {
            content,
            tags,
            priority,
            category,
            source,
            project_id,
            usage_contexts,
        } => {
            let priority = Priority::parse(&priority)?;
            let result = service.store_memory(NewMemory {
                content,
                tags,
                priority,
                category,
                source,
                project_id,
                usage_contexts,
            })?;
            Ok(json!(result))
        }
        Commands::Search {
            query,
            limit,
            tags,
            priority,
            project_id,
        } => {
            let filters = MemoryFilters {
                priority: priority.map(|p| Priority::parse(&p)).transpose()?,
                project_id,
                tags,
                date_range: None,
            };
            let result = service.search_memory(&query, limit, &filters)?;
            Ok(json!(result))
        }
        Commands::List {
            tags,
            priority,
            project_id,
            sort_by,
            sort_order,
            limit,
            offset,
        } => {
            let filters = MemoryFilters {
                priority: priority.map(|p| Priority::parse(&p)).transpose()?,
                project_id,
                tags,
                date_range: None::<DateRange>,
            };
            let sort_by = SortColumn::parse(&sort_by)?;
            let order = match sort_order.to_ascii_uppercase().as_str() {
                "ASC" => SortOrder::Asc,
                _ => SortOrder::Desc,
            };
            let result = service.list_memories(&filters, sort_by, order, limit, offset)?;
            Ok(json!(result))
        }
        Commands::Delete { id, hash } => {
            let locator = match (id, hash) {
                (Some(id), None) => MemoryLocator::Id(id),
                (None, Some(hash)) => MemoryLocator::ContentHash(hash),
                _ => {
                    return Err("exactly one of --id or --hash is required".into());
                }
            };
            let result = service.delete_memory(locator)?;
            Ok(json!(result))
        }
        Commands::Get { id } => {
            let memory = service.get_memory(id)?;
            Ok(json!({ "success": memory.is_some(), "memory": memory }))
        }
    }
}
