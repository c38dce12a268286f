use indexmap::IndexSet;
use tracing::{info, warn};

use super::error::CatalogError;
use super::models::{Category, CategoryItems, Item};
use super::upstream::Upstream;

/// Result of one item fetch: every category plus the manufacturers they
/// reference.
#[derive(Debug, Clone, Default)]
pub struct ItemsFetch {
    pub items: CategoryItems,
    pub manufacturers: Vec<String>,
}

/// Fetch all categories. Any failing category aborts the whole fetch; there
/// is no retry here.
pub async fn fetch_items(upstream: &dyn Upstream) -> Result<ItemsFetch, CatalogError> {
    let mut items = CategoryItems::default();

    for category in Category::ALL {
        let fetched = upstream.products(category).await.map_err(|e| {
            warn!(%category, error = %e, "product fetch failed");
            CatalogError::unavailable(format!("products/{category}"))
        })?;
        info!(%category, count = fetched.len(), "fetched category");
        items.insert(category, fetched);
    }

    let manufacturers = distinct_manufacturers(items.iter());
    info!(
        items = items.len(),
        manufacturers = ?manufacturers,
        "items fetched"
    );

    Ok(ItemsFetch {
        items,
        manufacturers,
    })
}

/// Distinct manufacturers in first-seen order.
pub fn distinct_manufacturers<'a>(items: impl IntoIterator<Item = &'a Item>) -> Vec<String> {
    let set: IndexSet<&str> = items
        .into_iter()
        .map(|item| item.manufacturer.as_str())
        .collect();
    set.into_iter().map(str::to_string).collect()
}
