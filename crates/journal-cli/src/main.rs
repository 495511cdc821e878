mod render;
mod server;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use journal_core::{DEFAULT_LIST_LIMIT, DEFAULT_READ_ENTRIES, DEFAULT_TOC_DEPTH, SearchParams};
use journal_store::{Config, JournalService, JsonStorage};
use rmcp::{ServiceExt, transport::stdio};

#[derive(Parser)]
#[command(
    name = "journal",
    version,
    about = "Journal MCP server - a memory system that emerges from collaborative understanding"
)]
struct Cli {
    /// Path to the JSON data file [env: JOURNAL_DATA_FILE] (default: ./journal.json)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// Path to a TOML config file [env: JOURNAL_CONFIG]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start MCP server on stdio transport
    Serve,

    /// Show a section's overview, subsections and optionally recent entries
    Read {
        /// Section path, e.g. project-alpha/api-design
        path: String,

        #[arg(long)]
        include_entries: bool,

        #[arg(long, default_value_t = DEFAULT_READ_ENTRIES)]
        max_entries: usize,
    },

    /// Append an entry to a section, creating it if needed
    Write {
        path: String,

        /// What has changed or been learned
        entry: String,

        /// The broader kind of work being done
        #[arg(long)]
        work_context: String,

        /// Replace the section overview
        #[arg(long)]
        overview: Option<String>,
    },

    /// Search entries by work context and content
    Search {
        #[arg(long)]
        work_context: String,

        #[arg(long)]
        content: String,

        /// Minimum combined score (defaults to config, then 0.5)
        #[arg(long)]
        threshold: Option<f64>,

        #[arg(long)]
        max_results: Option<usize>,
    },

    /// Print the section tree with entry counts
    Toc {
        /// Root the tree at this section
        path: Option<String>,

        #[arg(long, default_value_t = DEFAULT_TOC_DEPTH)]
        max_depth: usize,
    },

    /// List a section's entries, newest first
    List {
        path: String,

        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT)]
        limit: usize,

        #[arg(long, default_value_t = 0)]
        offset: usize,
    },
}

fn load_config(cli: &Cli) -> Result<Config> {
    Config::discover(cli.config.as_deref()).context("failed to load config")
}

fn open_service(cli: &Cli, config: &Config) -> JournalService {
    let data_file = config.resolve_data_file(cli.data_file.as_deref());
    tracing::debug!(data_file = %data_file.display(), "using journal file");
    JournalService::from_config(config, JsonStorage::new(data_file))
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(&cli)?;

    match &cli.command {
        Commands::Serve => cmd_serve(&cli, &config).await,
        Commands::Read {
            path,
            include_entries,
            max_entries,
        } => cmd_read(&cli, &config, path, *include_entries, *max_entries),
        Commands::Write {
            path,
            entry,
            work_context,
            overview,
        } => cmd_write(&cli, &config, path, entry, work_context, overview.as_deref()),
        Commands::Search {
            work_context,
            content,
            threshold,
            max_results,
        } => {
            let defaults = config.search_params();
            let params = SearchParams {
                salience_threshold: threshold.unwrap_or(defaults.salience_threshold),
                max_results: max_results.unwrap_or(defaults.max_results),
            };
            cmd_search(&cli, &config, work_context, content, &params)
        }
        Commands::Toc { path, max_depth } => cmd_toc(&cli, &config, path.as_deref(), *max_depth),
        Commands::List {
            path,
            limit,
            offset,
        } => cmd_list(&cli, &config, path, *limit, *offset),
    }
}

async fn cmd_serve(cli: &Cli, config: &Config) -> Result<()> {
    let service = open_service(cli, config);
    tracing::info!(
        data_file = %service.storage().data_file().display(),
        "starting journal MCP server"
    );

    // Handlers are registered before the handshake so an early signal is not fatal.
    let shutdown = tokio::spawn(shutdown_signal());

    let server = server::JournalServer::new(service, config.search_params());
    let running = server
        .serve(stdio())
        .await
        .context("failed to start MCP server")?;

    tokio::select! {
        quit = running.waiting() => {
            let reason = quit.context("MCP server task failed")?;
            tracing::info!(?reason, "MCP server stopped");
        }
        _ = shutdown => {
            // The stdin reader thread cannot be cancelled, so runtime shutdown
            // would block on it. Every write is already on disk.
            std::process::exit(0);
        }
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => tracing::info!("received SIGINT, shutting down"),
                    _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
                }
            }
            Err(e) => {
                tracing::warn!("failed to install SIGTERM handler: {e}");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        tracing::info!("received Ctrl+C, shutting down");
    }
}

fn cmd_read(
    cli: &Cli,
    config: &Config,
    path: &str,
    include_entries: bool,
    max_entries: usize,
) -> Result<()> {
    let mut service = open_service(cli, config);
    let text = match service
        .read(path, include_entries, max_entries)
        .context("failed to read section")?
    {
        Some(view) => render::section(&view),
        None => render::not_found(path),
    };
    println!("{text}");
    Ok(())
}

fn cmd_write(
    cli: &Cli,
    config: &Config,
    path: &str,
    entry: &str,
    work_context: &str,
    overview: Option<&str>,
) -> Result<()> {
    let mut service = open_service(cli, config);
    let outcome = service
        .write(path, entry, work_context, overview)
        .context("failed to write entry")?;
    println!("{}", render::write_outcome(&outcome));
    Ok(())
}

fn cmd_search(
    cli: &Cli,
    config: &Config,
    work_context: &str,
    content: &str,
    params: &SearchParams,
) -> Result<()> {
    let mut service = open_service(cli, config);
    let results = service
        .search(work_context, content, params)
        .context("search failed")?;
    println!("{}", render::search_results(&results));
    Ok(())
}

fn cmd_toc(cli: &Cli, config: &Config, path: Option<&str>, max_depth: usize) -> Result<()> {
    let mut service = open_service(cli, config);
    let text = match service
        .toc(path, max_depth)
        .context("failed to build table of contents")?
    {
        Some(nodes) => render::toc(&nodes),
        None => render::not_found(path.unwrap_or_default()),
    };
    println!("{text}");
    Ok(())
}

fn cmd_list(cli: &Cli, config: &Config, path: &str, limit: usize, offset: usize) -> Result<()> {
    let mut service = open_service(cli, config);
    let text = match service
        .list_entries(path, limit, offset)
        .context("failed to list entries")?
    {
        Some(page) => render::entry_page(path, &page),
        None => render::not_found(path),
    };
    println!("{text}");
    Ok(())
}
