// Catalog page server with a background refresh cache

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use warehouse_catalog::api::CatalogServer;
use warehouse_catalog::catalog::{CatalogConfig, PageDataProvider, RefreshCache};
use warehouse_catalog::logging::init_tracing;
use warehouse_catalog::util::env as env_util;

#[derive(Parser, Debug)]
#[command(name = "catalog_server", about = "Serve catalog pages backed by a refresh cache")]
struct Args {
    /// Address to bind (overrides CATALOG_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Directory holding favicon.png and styles.css (overrides CATALOG_ASSETS_DIR)
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Port to listen on (overrides CATALOG_PORT)
    port: Option<u16>,
}

#[actix_web::main]
async fn main() -> Result<()> {
    env_util::init_env();
    init_tracing("info,warehouse_catalog=info")?;
    let args = Args::parse();

    let config = CatalogConfig::from_env();
    let mut server = CatalogServer::from_env();
    if let Some(host) = args.host {
        server.host = host;
    }
    if let Some(port) = args.port {
        server.port = port;
    }
    if let Some(assets) = args.assets {
        server.assets_dir = assets;
    }

    let cache = Arc::new(RefreshCache::from_config(&config)?);
    if config.warmup {
        tracing::info!("warming catalog cache before serving");
        cache.refresh_items_now().await;
        cache.refresh_availabilities_now().await;
        let snapshot = cache.snapshot();
        tracing::info!(
            items = snapshot.items.len(),
            availability_entries = snapshot.availability.len(),
            "warm-up finished"
        );
    }

    server.run(PageDataProvider::new(cache)).await
}
