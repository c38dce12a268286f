use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::CatalogError;

/// Length of the `response` field the availability upstream sends when it
/// fails under load (the string `"[]"`).
pub const FAILURE_SIGNATURE_LEN: usize = 2;

/// Lower-cased item id -> stock-status token.
pub type AvailabilityIndex = HashMap<String, String>;

/// Product categories served by the upstream `/products/{slug}` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Beanies,
    Facemasks,
    Gloves,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Beanies, Category::Facemasks, Category::Gloves];

    pub fn slug(self) -> &'static str {
        match self {
            Category::Beanies => "beanies",
            Category::Facemasks => "facemasks",
            Category::Gloves => "gloves",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Category::Beanies => "Beanies",
            Category::Facemasks => "Facemasks",
            Category::Gloves => "Gloves",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.slug() == slug)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// One product as returned by the upstream. Everything except `id` and
/// `manufacturer` is display data and passes through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub manufacturer: String,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Item {
    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").and_then(|v| v.as_str())
    }

    pub fn colors(&self) -> Vec<&str> {
        self.attributes
            .get("color")
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|c| c.as_str()).collect())
            .unwrap_or_default()
    }

    /// Price rendered as the upstream sent it (number or string).
    pub fn price(&self) -> Option<String> {
        match self.attributes.get("price")? {
            Value::Number(n) => Some(n.to_string()),
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

/// Items of every category from one item fetch.
#[derive(Debug, Clone, Default)]
pub struct CategoryItems {
    by_category: BTreeMap<Category, Arc<Vec<Item>>>,
}

impl CategoryItems {
    pub fn insert(&mut self, category: Category, items: Vec<Item>) {
        self.by_category.insert(category, Arc::new(items));
    }

    /// Items for `category`; empty when that category was never fetched.
    pub fn get(&self, category: Category) -> Arc<Vec<Item>> {
        self.by_category.get(&category).cloned().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.by_category.values().flat_map(|items| items.iter())
    }

    pub fn len(&self) -> usize {
        self.by_category.values().map(|items| items.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One row of a manufacturer's availability feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawAvailabilityRecord {
    pub id: String,
    #[serde(rename = "DATAPAYLOAD")]
    pub payload: String,
}

/// Body of `GET /availability/{manufacturer}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailabilityEnvelope {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub response: Value,
}

impl AvailabilityEnvelope {
    pub fn new(response: Value) -> Self {
        Self {
            code: Some(200),
            response,
        }
    }

    /// Length of `response` when it is a string or an array.
    pub fn response_len(&self) -> Option<usize> {
        match &self.response {
            Value::String(s) => Some(s.chars().count()),
            Value::Array(arr) => Some(arr.len()),
            _ => None,
        }
    }

    /// True for the upstream's transient failure reply. Only the exact
    /// length counts; an empty feed is a valid answer.
    pub fn is_failure_signature(&self) -> bool {
        self.response_len() == Some(FAILURE_SIGNATURE_LEN)
    }

    pub fn into_records(self) -> Result<Vec<RawAvailabilityRecord>, CatalogError> {
        match self.response {
            Value::Array(_) => Ok(serde_json::from_value(self.response)?),
            other => Err(CatalogError::Transport(format!(
                "unexpected availability response shape: {}",
                type_name(&other)
            ))),
        }
    }
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
