use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::Result;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::{debug, error, info, warn};

use super::availability::{build_index, fetch_availability};
use super::config::CatalogConfig;
use super::items::fetch_items;
use super::models::{AvailabilityIndex, CategoryItems, RawAvailabilityRecord};
use super::upstream::{HttpUpstream, Upstream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshKind {
    Items,
    Availabilities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    Idle,
    Refreshing,
}

/// Fully built view of the cached data at one point in time.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub items: Arc<CategoryItems>,
    pub manufacturers: Arc<Vec<String>>,
    pub availability: Arc<AvailabilityIndex>,
    /// Completion time of the last successful availability rebuild.
    pub last_updated: Option<DateTime<Utc>>,
}

/// Last good feed per manufacturer, in first-seen order.
type Feeds = IndexMap<String, Vec<RawAvailabilityRecord>>;

/// Clears an in-progress flag when the refresh ends, including on panic.
struct InFlight<'a>(&'a AtomicBool);

fn try_begin(flag: &AtomicBool) -> bool {
    flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_ok()
}

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        try_begin(flag).then(|| Self(flag))
    }

    /// Take over a flag that was already set by a trigger.
    fn adopt(flag: &'a AtomicBool) -> Self {
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Process-wide cache of catalog data, refreshed in the background.
///
/// Readers never wait on a refresh: each dataset lives behind an `Arc` that
/// is swapped in one step once a refresh has fully completed. Each refresh
/// kind is single-flight; triggering one that is already running does
/// nothing.
pub struct RefreshCache {
    upstream: Arc<dyn Upstream>,
    max_attempts: u32,
    slots: RwLock<Snapshot>,
    // Only the running availabilities cycle touches this.
    feeds: Mutex<Feeds>,
    items_refreshing: AtomicBool,
    availabilities_refreshing: AtomicBool,
}

impl RefreshCache {
    pub fn new(upstream: Arc<dyn Upstream>, max_attempts: u32) -> Self {
        Self {
            upstream,
            max_attempts,
            slots: RwLock::new(Snapshot::default()),
            feeds: Mutex::new(Feeds::new()),
            items_refreshing: AtomicBool::new(false),
            availabilities_refreshing: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        let upstream = HttpUpstream::new(Some(&config.upstream_url), config.upstream_timeout)?;
        Ok(Self::new(Arc::new(upstream), config.max_attempts))
    }

    pub fn snapshot(&self) -> Snapshot {
        self.read_slots().clone()
    }

    pub fn state(&self, kind: RefreshKind) -> RefreshState {
        if self.flag(kind).load(Ordering::Acquire) {
            RefreshState::Refreshing
        } else {
            RefreshState::Idle
        }
    }

    /// Start an item refresh in the background. Returns false when one is
    /// already running or no runtime is available.
    pub fn trigger_items_refresh(self: &Arc<Self>) -> bool {
        self.spawn_refresh(RefreshKind::Items)
    }

    /// Start an availability refresh in the background over the manufacturer
    /// list as it is right now.
    pub fn trigger_availabilities_refresh(self: &Arc<Self>) -> bool {
        self.spawn_refresh(RefreshKind::Availabilities)
    }

    /// Run one item refresh inline under the same single-flight guard.
    pub async fn refresh_items_now(&self) -> bool {
        let Some(_flight) = InFlight::acquire(&self.items_refreshing) else {
            debug!("items refresh already running");
            return false;
        };
        self.run_items_cycle().await;
        true
    }

    /// Run one availability refresh inline under the same single-flight guard.
    pub async fn refresh_availabilities_now(&self) -> bool {
        let Some(_flight) = InFlight::acquire(&self.availabilities_refreshing) else {
            debug!("availabilities refresh already running");
            return false;
        };
        let manufacturers = self.read_slots().manufacturers.clone();
        self.run_availabilities_cycle(manufacturers).await;
        true
    }

    fn spawn_refresh(self: &Arc<Self>, kind: RefreshKind) -> bool {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(?kind, "no async runtime available; refresh not started");
            return false;
        };
        if !try_begin(self.flag(kind)) {
            debug!(?kind, "refresh already running; trigger ignored");
            return false;
        }

        // Taken at trigger time so a concurrent items refresh cannot change
        // which manufacturers this cycle visits.
        let manufacturers = self.read_slots().manufacturers.clone();
        let cache = Arc::clone(self);
        runtime.spawn(async move {
            let _flight = InFlight::adopt(cache.flag(kind));
            match kind {
                RefreshKind::Items => cache.run_items_cycle().await,
                RefreshKind::Availabilities => cache.run_availabilities_cycle(manufacturers).await,
            }
        });
        true
    }

    async fn run_items_cycle(&self) {
        match fetch_items(self.upstream.as_ref()).await {
            Ok(fetched) => {
                let mut slots = self.write_slots();
                slots.items = Arc::new(fetched.items);
                slots.manufacturers = Arc::new(fetched.manufacturers);
            }
            Err(e) => error!(error = %e, "items refresh failed; keeping previous snapshot"),
        }
    }

    async fn run_availabilities_cycle(&self, manufacturers: Arc<Vec<String>>) {
        if manufacturers.is_empty() {
            debug!("no manufacturers known yet; skipping availabilities refresh");
            return;
        }

        let total = manufacturers.len();
        let mut fetched = Feeds::with_capacity(total);
        for (n, manufacturer) in manufacturers.iter().enumerate() {
            match fetch_availability(self.upstream.as_ref(), manufacturer, self.max_attempts).await
            {
                Ok(records) => {
                    info!(
                        %manufacturer,
                        records = records.len(),
                        progress = n + 1,
                        total,
                        "availability fetched"
                    );
                    fetched.insert(manufacturer.clone(), records);
                }
                Err(e) => warn!(%manufacturer, error = %e, "keeping last feed for manufacturer"),
            }
        }

        if fetched.is_empty() {
            error!(total, "every availability fetch failed; keeping previous index");
            return;
        }

        let refreshed = fetched.len();
        let index = {
            let mut feeds = self.feeds.lock().unwrap_or_else(PoisonError::into_inner);
            feeds.retain(|manufacturer, _| manufacturers.contains(manufacturer));
            feeds.extend(fetched);
            build_index(&feeds)
        };

        let mut slots = self.write_slots();
        slots.availability = Arc::new(index);
        slots.last_updated = Some(Utc::now());
        info!(refreshed, skipped = total - refreshed, "availabilities updated");
    }

    fn flag(&self, kind: RefreshKind) -> &AtomicBool {
        match kind {
            RefreshKind::Items => &self.items_refreshing,
            RefreshKind::Availabilities => &self.availabilities_refreshing,
        }
    }

    // Writers only swap `Arc`s, so a poisoned lock still holds consistent data.
    fn read_slots(&self) -> RwLockReadGuard<'_, Snapshot> {
        self.slots.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_slots(&self) -> RwLockWriteGuard<'_, Snapshot> {
        self.slots.write().unwrap_or_else(PoisonError::into_inner)
    }
}
