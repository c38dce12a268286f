// Serving layer: catalog pages, static assets and a health endpoint

pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod templates;

pub use server::CatalogServer;
