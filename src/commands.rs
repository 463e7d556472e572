//! Declarative CLI for the bundled demonstration binary.
//!
//! This is the thin shell described in the crate's top-level docs: it maps
//! command-line arguments onto the five [`crate::service::MemoryService`]
//! operations and holds no state of its own between invocations.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "memora",
    author,
    version,
    about = "A local, privacy-preserving semantic memory store.",
    long_about = None,
    propagate_version = true,
    color = clap::ColorChoice::Always
)]
pub struct Cli {
    /// Path to the YAML config file. Defaults to `<home>/.memory/config.yaml`;
    /// if that file doesn't exist either, built-in defaults are used.
    #[arg(long, global = true)]
    pub config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store a new memory.
    Store {
        /// The text to remember.
        content: String,
        /// Tags, comma-separated (e.g. `-t auth,backend`).
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
        /// One of CORE, HIGH, NORMAL, LOW.
        #[arg(short, long, default_value = "NORMAL")]
        priority: String,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        project_id: Option<String>,
        /// Supplemental, passive usage-context annotations, comma-separated.
        #[arg(long, value_delimiter = ',')]
        usage_contexts: Vec<String>,
    },
    /// Search memories by meaning.
    Search {
        query: String,
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(short, long)]
        priority: Option<String>,
        #[arg(long)]
        project_id: Option<String>,
    },
    /// List memories with structured filters, sorted and paginated.
    List {
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(short, long)]
        priority: Option<String>,
        #[arg(long)]
        project_id: Option<String>,
        #[arg(long, default_value = "created_at")]
        sort_by: String,
        #[arg(long, default_value = "DESC")]
        sort_order: String,
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
        #[arg(short, long, default_value_t = 0)]
        offset: usize,
    },
    /// Delete a memory by id or by content hash.
    Delete {
        #[arg(long, conflicts_with = "hash")]
        id: Option<i64>,
        #[arg(long, conflicts_with = "id")]
        hash: Option<String>,
    },
    /// Get a single memory by id (bumps its access count).
    Get { id: i64 },
}
