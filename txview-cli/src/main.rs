//! txview CLI
//!
//! Runs the caching proxy and exposes its lookups and cache administration
//! from the command line.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use txview_api::ApiServer;
use txview_cache::CacheBackend;
use txview_core::types::{FetchResult, Namespace, ServedFrom};
use txview_proxy::{CacheAsideResolver, ProxyConfig};

/// txview - caching proxy for block-explorer transaction lookups
#[derive(Parser)]
#[command(name = "txview")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Cache backend (redis, memory, off); overrides CACHE_BACKEND
    #[arg(long, global = true)]
    cache: Option<CacheBackend>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the API server and viewer
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5000", env = "PORT")]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0", env = "BIND")]
        bind: String,
    },

    /// Fetch transactions through the cache
    Lookup {
        #[command(subcommand)]
        target: LookupTarget,
    },

    /// Inspect or clear the cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Check upstream reachability and cache status
    Health,
}

#[derive(Subcommand)]
enum LookupTarget {
    /// Transactions of an address
    Address {
        /// Address to look up
        address: String,
        /// Skip the cache read
        #[arg(short, long)]
        refresh: bool,
    },
    /// Transactions of a block
    Block {
        /// 64-hex block hash
        hash: String,
        /// Skip the cache read
        #[arg(short, long)]
        refresh: bool,
    },
    /// A single transaction
    Tx {
        /// 64-hex transaction id
        txid: String,
        /// Skip the cache read
        #[arg(short, long)]
        refresh: bool,
    },
    /// Header summary of a block
    BlockInfo {
        /// 64-hex block hash
        hash: String,
        /// Skip the cache read
        #[arg(short, long)]
        refresh: bool,
    },
}

impl LookupTarget {
    fn into_parts(self) -> (Namespace, String, bool) {
        match self {
            Self::Address { address, refresh } => (Namespace::Address, address, refresh),
            Self::Block { hash, refresh } => (Namespace::Block, hash, refresh),
            Self::Tx { txid, refresh } => (Namespace::Tx, txid, refresh),
            Self::BlockInfo { hash, refresh } => (Namespace::BlockInfo, hash, refresh),
        }
    }
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show key count, memory use and hit rate
    Stats,
    /// Remove every cached lookup
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "txview=debug,info"
    } else {
        "txview=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = ProxyConfig::from_env().context("Invalid configuration")?;
    if let Some(backend) = cli.cache {
        config.cache.backend = backend;
    }

    match cli.command {
        Commands::Serve { port, bind } => cmd_serve(config, port, &bind).await,
        Commands::Lookup { target } => cmd_lookup(config, target).await,
        Commands::Cache { action } => cmd_cache(config, action).await,
        Commands::Health => cmd_health(config).await,
    }
}

async fn build_resolver(config: &ProxyConfig) -> Result<CacheAsideResolver> {
    CacheAsideResolver::from_config(config)
        .await
        .context("Failed to build resolver")
}

/// Run API server
async fn cmd_serve(config: ProxyConfig, port: u16, bind: &str) -> Result<()> {
    println!("{}", "Starting txview server...".cyan().bold());
    info!(
        address_api = %config.upstream.address_base_url,
        block_api = %config.upstream.block_base_url,
        tx_api = %config.upstream.tx_base_url,
        cache = %config.cache.backend,
        "Upstream configuration"
    );
    info!("Listening on http://{}:{}, health at /health", bind, port);

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;

    let server = ApiServer::from_config(config)
        .await
        .context("Failed to start server")?;
    server.run(addr).await?;

    Ok(())
}

/// Look up an address, block, transaction or block summary
async fn cmd_lookup(config: ProxyConfig, target: LookupTarget) -> Result<()> {
    let resolver = build_resolver(&config).await?;
    let (namespace, identifier, refresh) = target.into_parts();

    let started = std::time::Instant::now();
    let result = resolver
        .resolve(namespace, &identifier, refresh)
        .await
        .with_context(|| format!("Lookup of {} {} failed", namespace, identifier))?;

    print_result(&result, started.elapsed())?;
    Ok(())
}

fn print_result(result: &FetchResult, elapsed: std::time::Duration) -> Result<()> {
    let source = match result.served_from {
        ServedFrom::Cache => "cache".green(),
        ServedFrom::Upstream => "upstream".yellow(),
    };
    eprintln!("{} {} in {:?}", "Served from".dimmed(), source, elapsed);

    let value = result.payload.to_value()?;
    if let Some(txs) = value.as_array() {
        eprintln!("{} {}", "Transactions:".dimmed(), txs.len());
    }
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

/// Cache statistics and clearing
async fn cmd_cache(config: ProxyConfig, action: CacheAction) -> Result<()> {
    let resolver = build_resolver(&config).await?;

    match action {
        CacheAction::Stats => {
            let stats = resolver.cache_stats().await;
            if !stats.enabled {
                println!("{}", "Cache is disabled.".yellow());
                return Ok(());
            }
            println!("{}", "Cache statistics:".cyan().bold());
            println!("   {} {}", "Backend:".dimmed(), config.cache.backend);
            println!("   {} {}", "Keys:".dimmed(), stats.key_count);
            println!("   {} {} bytes", "Memory:".dimmed(), stats.memory_bytes);
            println!("   {} {:.1}%", "Hit rate:".dimmed(), stats.hit_rate * 100.0);
        }
        CacheAction::Clear => {
            let report = resolver.clear_cache().await;
            if report.cache_enabled {
                println!("{} {} entries", "Cleared".green().bold(), report.removed_count);
            } else {
                println!("{}", "Cache is disabled, nothing to clear.".yellow());
            }
        }
    }

    Ok(())
}

/// Health check
async fn cmd_health(config: ProxyConfig) -> Result<()> {
    let resolver = build_resolver(&config).await?;
    let report = resolver.health().await;

    let mark = |ok: bool| if ok { "ok".green() } else { "down".red() };
    println!("{}", "txview health:".cyan().bold());
    println!(
        "   {} {} ({})",
        "Upstream:".dimmed(),
        mark(report.upstream_reachable),
        config.upstream.address_base_url
    );
    println!("   {} {}", "Cache:".dimmed(), mark(report.cache_enabled));
    println!("   {} {}", "Checked at:".dimmed(), report.checked_at.to_rfc3339());

    if !report.upstream_reachable {
        anyhow::bail!("upstream is unreachable");
    }
    Ok(())
}
