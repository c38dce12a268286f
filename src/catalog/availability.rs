use indexmap::IndexMap;
use tracing::{debug, info, warn};

use super::error::CatalogError;
use super::models::{AvailabilityEnvelope, AvailabilityIndex, RawAvailabilityRecord};
use super::payload::extract_stock_status;
use super::upstream::Upstream;

/// One initial request plus five retries.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 6;

/// Fetch one manufacturer's availability feed, retrying immediately while the
/// upstream answers with its failure signature or the request itself fails.
pub async fn fetch_availability(
    upstream: &dyn Upstream,
    manufacturer: &str,
    max_attempts: u32,
) -> Result<Vec<RawAvailabilityRecord>, CatalogError> {
    let max_attempts = max_attempts.max(1);

    for attempt in 1..=max_attempts {
        let outcome = upstream
            .availability(manufacturer)
            .await
            .and_then(records_from_envelope);

        match outcome {
            Ok(records) => {
                debug!(%manufacturer, attempt, records = records.len(), "availability fetched");
                return Ok(records);
            }
            Err(e) if attempt < max_attempts => {
                warn!(
                    %manufacturer,
                    attempt,
                    max_attempts,
                    error = %e,
                    "availability fetch failed; retrying"
                );
            }
            Err(e) => {
                warn!(
                    %manufacturer,
                    attempts = max_attempts,
                    error = %e,
                    "availability fetch failed; giving up"
                );
            }
        }
    }

    Err(CatalogError::unavailable(format!("availability/{manufacturer}")))
}

fn records_from_envelope(
    envelope: AvailabilityEnvelope,
) -> Result<Vec<RawAvailabilityRecord>, CatalogError> {
    if envelope.is_failure_signature() {
        let code = envelope
            .code
            .map_or_else(|| "none".to_string(), |c| c.to_string());
        return Err(CatalogError::Transport(format!(
            "failure signature (upstream code {code})"
        )));
    }
    envelope.into_records()
}

/// Build a fresh index from every collected feed. Records whose payload has
/// no stock-status markers are dropped. A duplicate id is resolved in favour
/// of the manufacturer that comes later in `collected`.
pub fn build_index(collected: &IndexMap<String, Vec<RawAvailabilityRecord>>) -> AvailabilityIndex {
    let mut index = AvailabilityIndex::with_capacity(collected.values().map(Vec::len).sum());
    let mut dropped = 0usize;

    for (manufacturer, records) in collected {
        for record in records {
            let status = match extract_stock_status(&record.payload) {
                Ok(status) => status,
                Err(e) => {
                    dropped += 1;
                    debug!(%manufacturer, id = %record.id, error = %e, "dropping availability record");
                    continue;
                }
            };
            let key = record.id.to_lowercase();
            if let Some(previous) = index.insert(key, status.to_string()) {
                debug!(%manufacturer, id = %record.id, %previous, "duplicate availability id overwritten");
            }
        }
    }

    if dropped > 0 {
        warn!(dropped, "availability records with malformed payloads were skipped");
    }
    info!(entries = index.len(), "availability index rebuilt");
    index
}
