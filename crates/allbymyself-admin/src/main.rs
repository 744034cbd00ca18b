//! allbymyself admin server - HTTP admin for singleton records.
//!
//! Serves the admin views of every registered singleton as JSON, with
//! redirects and flash messages mapped onto plain HTTP.

mod auth;
mod handler;
mod models;
mod server;

use allbymyself::config::CacheSettings;
use allbymyself::{
    AdminSite, CacheBackend, CacheClient, CacheConfig, MemoryCache, SingletonRepository,
    SqliteCache, SqliteStore,
};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use models::{MaintenanceBanner, SiteConfiguration};
use server::AppState;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CacheKind {
    Memory,
    Sqlite,
}

#[derive(Parser, Debug)]
#[command(name = "allbymyself-admin")]
#[command(about = "Admin server for singleton records")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "0")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Record store path, or `:memory:`
    #[arg(long, default_value = "data/singletons.sqlite")]
    database: String,

    /// Cache backend
    #[arg(long, value_enum, default_value = "memory")]
    cache: CacheKind,

    /// Cache database path for `--cache sqlite` (defaults next to the store)
    #[arg(long)]
    cache_path: Option<PathBuf>,

    /// Cache entry lifetime in seconds
    #[arg(long)]
    cache_ttl_secs: Option<u64>,

    /// Bearer token required by admin views
    #[arg(long, env = "ALLBYMYSELF_ADMIN_TOKEN")]
    admin_token: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn open_store(database: &str) -> Result<SqliteStore> {
    let store = if database == ":memory:" {
        SqliteStore::open_in_memory()?
    } else {
        SqliteStore::open(database)?
    };
    Ok(store)
}

fn open_cache(args: &Args, config: &CacheConfig) -> Result<Arc<dyn CacheBackend>> {
    let backend: Arc<dyn CacheBackend> = match args.cache {
        CacheKind::Memory => Arc::new(MemoryCache::with_config(config)),
        CacheKind::Sqlite => {
            let path = match &args.cache_path {
                Some(path) => path.clone(),
                None if args.database == ":memory:" => PathBuf::from(CacheSettings::DB_FILENAME),
                None => PathBuf::from(&args.database)
                    .parent()
                    .map(|dir| dir.join(CacheSettings::DB_FILENAME))
                    .unwrap_or_else(|| PathBuf::from(CacheSettings::DB_FILENAME)),
            };
            info!("Cache database: {}", path.display());
            Arc::new(SqliteCache::new(&path)?)
        }
    };
    Ok(backend)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting allbymyself admin server");
    info!("Record store: {}", args.database);

    let store = Arc::new(open_store(&args.database)?);

    let cache_config = match args.cache_ttl_secs {
        Some(secs) => CacheConfig::with_ttl(Duration::from_secs(secs)),
        None => CacheConfig::default(),
    };
    let cache = CacheClient::connected(open_cache(&args, &cache_config)?, &cache_config);

    let mut site = AdminSite::new();
    site.register_singleton(SingletonRepository::<SiteConfiguration>::new(
        store.clone(),
        cache.clone(),
    ))?;
    site.register_singleton(SingletonRepository::<MaintenanceBanner>::new(
        store,
        cache.clone(),
    ))?;

    if args.admin_token.is_none() {
        info!("No admin token configured, admin views are open");
    }

    let state = Arc::new(AppState::new(site, cache, args.admin_token.clone()));
    let addr = server::start_server(Arc::clone(&state), &args.host, args.port).await?;

    println!("ADMIN_PORT={}", addr.port());
    info!("Admin server running on http://{}/admin/", addr);

    // Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");

    state.cache.disconnect();

    Ok(())
}
