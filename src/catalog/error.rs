use thiserror::Error;

/// Failures produced while talking to the catalog upstream.
///
/// None of these reach the serving layer: the refresh cache absorbs them and
/// keeps the last good snapshot.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A record's payload did not contain the expected stock-status markers.
    #[error("malformed payload: missing {marker} marker")]
    MalformedPayload { marker: &'static str },

    /// The upstream could not deliver usable data for `resource`.
    #[error("upstream unavailable: {resource}")]
    UpstreamUnavailable { resource: String },

    /// Connection, timeout, HTTP status or body decoding failure.
    #[error("upstream transport error: {0}")]
    Transport(String),
}

impl CatalogError {
    pub fn unavailable(resource: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            resource: resource.into(),
        }
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
