//! Background refresh cache for the product catalog.
//!
//! Items and availability come from an upstream that regularly answers with
//! garbage under load. Data is fetched in background tasks and served from
//! the last complete snapshot.

pub mod availability;
pub mod cache;
pub mod config;
pub mod error;
pub mod items;
pub mod models;
pub mod pages;
pub mod payload;
pub mod upstream;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{RefreshCache, RefreshKind, RefreshState, Snapshot};
pub use config::CatalogConfig;
pub use error::CatalogError;
pub use models::{AvailabilityIndex, Category, Item};
pub use pages::{PageData, PageDataProvider};
pub use upstream::{HttpUpstream, Upstream};
