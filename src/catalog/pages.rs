use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::cache::RefreshCache;
use super::models::{AvailabilityIndex, Category, Item};

/// Data needed to render one page. The landing page carries nothing.
#[derive(Debug, Clone, Default)]
pub struct PageData {
    pub items: Option<Arc<Vec<Item>>>,
    pub availability: Option<Arc<AvailabilityIndex>>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl PageData {
    /// Stock status for an item id, matched case-insensitively.
    pub fn stock_status(&self, id: &str) -> Option<&str> {
        self.availability
            .as_ref()?
            .get(&id.to_lowercase())
            .map(String::as_str)
    }
}

/// Read side of the cache as seen by the serving layer.
#[derive(Clone)]
pub struct PageDataProvider {
    cache: Arc<RefreshCache>,
}

impl PageDataProvider {
    pub fn new(cache: Arc<RefreshCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<RefreshCache> {
        &self.cache
    }

    /// Current data for `category`, or an empty landing-page view for `None`.
    pub fn get_snapshot(&self, category: Option<Category>) -> PageData {
        let Some(category) = category else {
            return PageData::default();
        };
        let snapshot = self.cache.snapshot();
        PageData {
            items: Some(snapshot.items.get(category)),
            availability: Some(snapshot.availability),
            last_updated: snapshot.last_updated,
        }
    }

    /// Kick off both refresh kinds; each is ignored if already running.
    pub fn notify_page_viewed(&self) {
        self.cache.trigger_items_refresh();
        self.cache.trigger_availabilities_refresh();
    }
}
