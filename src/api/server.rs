// Catalog HTTP server using actix-web

use std::path::PathBuf;

use crate::api::handlers::AppState;
use crate::api::templates::Templates;
use crate::api::{middleware, routes};
use crate::catalog::PageDataProvider;
use crate::util::env::{env_opt, env_parse, log_config_snapshot};
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};

pub const DEFAULT_PORT: u16 = 7777;

pub struct CatalogServer {
    pub host: String,
    pub port: u16,
    pub assets_dir: PathBuf,
}

impl CatalogServer {
    /// Create server settings from environment variables
    pub fn from_env() -> Self {
        let server = Self {
            host: env_opt("CATALOG_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: env_parse("CATALOG_PORT", DEFAULT_PORT),
            assets_dir: env_opt("CATALOG_ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("assets")),
        };
        log_config_snapshot(
            "server",
            &["CATALOG_HOST", "CATALOG_PORT", "CATALOG_ASSETS_DIR"],
        );
        server
    }

    /// Start the HTTP server
    pub async fn run(self, pages: PageDataProvider) -> Result<()> {
        let bind_addr = format!("{}:{}", self.host, self.port);

        tracing::info!(
            host = %self.host,
            port = %self.port,
            assets = %self.assets_dir.display(),
            "Starting catalog server"
        );

        let state = web::Data::new(AppState {
            pages,
            templates: Templates::new()?,
            assets_dir: self.assets_dir,
        });

        HttpServer::new(move || {
            let (logger, compress) = middleware::setup_middleware();

            App::new()
                .app_data(state.clone())
                .wrap(logger)
                .wrap(compress)
                .configure(routes::configure_routes)
        })
        .bind(&bind_addr)
        .with_context(|| format!("Failed to bind to {}", bind_addr))?
        .run()
        .await
        .context("HTTP server error")?;

        Ok(())
    }
}
