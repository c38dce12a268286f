use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;

use super::error::CatalogError;
use super::models::{AvailabilityEnvelope, Category, Item};

pub const DEFAULT_UPSTREAM_URL: &str = "https://bad-api-assignment.reaktor.com/v2";

fn truncate_for_log(mut s: String, max_len: usize) -> String {
    if s.len() > max_len {
        let mut cut = max_len;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
        s.push('…');
    }
    s
}

/// Source of product and availability data.
///
/// The fetchers only see this trait, so tests drive them with scripted fakes.
#[async_trait]
pub trait Upstream: Send + Sync {
    /// `GET /products/{category}`
    async fn products(&self, category: Category) -> Result<Vec<Item>, CatalogError>;

    /// `GET /availability/{manufacturer}`, one attempt, no retry.
    async fn availability(&self, manufacturer: &str) -> Result<AvailabilityEnvelope, CatalogError>;
}

/// HTTP client for the legacy warehouse API.
///
/// Endpoints:
/// - GET /products/{beanies|facemasks|gloves} - JSON array of items
/// - GET /availability/{manufacturer} - `{ "code": 200, "response": [...] }`
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    base_url: String,
    http: Client,
}

impl HttpUpstream {
    pub fn new(base_url: Option<&str>, timeout: Duration) -> Result<Self> {
        let base_url = base_url
            .unwrap_or(DEFAULT_UPSTREAM_URL)
            .trim_end_matches('/')
            .to_string();
        let http = Client::builder()
            .user_agent(concat!("warehouse-catalog/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        let resp = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = truncate_for_log(resp.text().await.unwrap_or_default(), 500);
            return Err(CatalogError::Transport(format!(
                "{status} url={url} body={body}"
            )));
        }

        // The upstream does not always label its JSON; decode from text.
        let text = resp.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn products(&self, category: Category) -> Result<Vec<Item>, CatalogError> {
        let url = format!("{}/products/{}", self.base_url, category.slug());
        self.get_json(&url).await
    }

    async fn availability(&self, manufacturer: &str) -> Result<AvailabilityEnvelope, CatalogError> {
        let url = format!(
            "{}/availability/{}",
            self.base_url,
            urlencoding::encode(manufacturer)
        );
        self.get_json(&url).await
    }
}
