//! # Report Vault CLI (`rpt`)
//!
//! The `rpt` binary is the operator interface for Report Vault. It manages
//! the on-disk report catalog and starts the public HTTP API.
//!
//! ## Usage
//!
//! ```bash
//! rpt --config ./config/rpt.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rpt init` | Create the store root directory |
//! | `rpt list` | List published reports, newest first |
//! | `rpt get <slug>` | Print one report's metadata and body |
//! | `rpt publish <path>` | Upload a local `.mdx` document into the store |
//! | `rpt delete <filename>` | Remove a stored document |
//! | `rpt serve` | Start the HTTP server |
//!
//! ## Examples
//!
//! ```bash
//! # Create the store root
//! rpt init --config ./config/rpt.toml
//!
//! # Publish a report (the filename is sanitized on the way in)
//! rpt publish "./Q3 2025 NVIDIA Report.mdx"
//!
//! # Inspect it
//! rpt get q3-2025-nvidia-report
//!
//! # Serve the catalog over HTTP
//! rpt serve
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use report_vault::auth::SharedSecretAuth;
use report_vault::{commands, config, server, store::ReportStore};

/// Report Vault — a filesystem-backed publishing service for MDX report
/// documents.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. See `config/rpt.example.toml` for a full example.
#[derive(Parser)]
#[command(
    name = "rpt",
    about = "Report Vault — a filesystem-backed publishing service for MDX report documents",
    version,
    long_about = "Report Vault maintains a flat directory of MDX report documents as a \
    publishing catalog: it derives slugs and metadata from the documents themselves, orders \
    them newest-first, and serves them over a JSON HTTP API with token-gated upload and delete."
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/rpt.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Create the store root directory.
    ///
    /// Idempotent — running it against an existing store is safe.
    Init,

    /// List published reports, newest first.
    List,

    /// Print one report's metadata and raw document body.
    Get {
        /// Report slug (the stored filename minus `.mdx`).
        slug: String,
    },

    /// Upload a local `.mdx` document into the store.
    ///
    /// The filename is sanitized on the way in; publishing a second document
    /// that sanitizes to the same name overwrites the first.
    Publish {
        /// Path to the document to publish.
        path: PathBuf,
    },

    /// Remove a stored document by filename.
    Delete {
        /// Stored filename (as shown by `rpt list`), including `.mdx`.
        filename: String,
    },

    /// Start the HTTP server.
    ///
    /// Binds to the address configured in `[server].bind` and serves the
    /// public catalog API plus the token-gated admin mutations.
    Serve,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    let store = ReportStore::new(&cfg.store.root, SharedSecretAuth::new(&cfg.auth.token));

    match cli.command {
        Commands::Init => {
            commands::run_init(&cfg.store.root)?;
        }
        Commands::List => {
            commands::run_list(&store)?;
        }
        Commands::Get { slug } => {
            commands::run_get(&store, &slug)?;
        }
        Commands::Publish { path } => {
            commands::run_publish(&store, &path, &cfg.auth.token)?;
        }
        Commands::Delete { filename } => {
            commands::run_delete(&store, &filename, &cfg.auth.token)?;
        }
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
    }

    Ok(())
}
