//! Scripted in-memory upstream used by the unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::sync::Semaphore;

use super::error::CatalogError;
use super::models::{AvailabilityEnvelope, Category, Item};
use super::upstream::Upstream;

#[derive(Debug, Clone)]
pub enum Reply {
    /// The upstream's `"[]"` failure reply.
    FailureSignature,
    /// `(id, stock status)` pairs wrapped in a well-formed payload.
    Stock(Vec<(&'static str, &'static str)>),
    /// Raw records, for payloads that should not parse.
    Raw(Value),
    Transport,
}

impl Reply {
    fn into_result(self) -> Result<AvailabilityEnvelope, CatalogError> {
        match self {
            Reply::FailureSignature => Ok(AvailabilityEnvelope::new(json!("[]"))),
            Reply::Stock(rows) => Ok(AvailabilityEnvelope::new(Value::Array(
                rows.into_iter()
                    .map(|(id, status)| {
                        json!({
                            "id": id,
                            "DATAPAYLOAD": format!(
                                "<AVAILABILITY>\n  <CODE>200</CODE>\n  <INSTOCKVALUE>{status}</INSTOCKVALUE>\n</AVAILABILITY>"
                            ),
                        })
                    })
                    .collect(),
            ))),
            Reply::Raw(value) => Ok(AvailabilityEnvelope::new(value)),
            Reply::Transport => Err(CatalogError::Transport("connection reset".into())),
        }
    }
}

pub fn item(id: &str, manufacturer: &str, name: &str) -> Item {
    let mut attributes = Map::new();
    attributes.insert("name".into(), json!(name));
    attributes.insert("color".into(), json!(["black"]));
    attributes.insert("price".into(), json!(12));
    Item {
        id: id.into(),
        manufacturer: manufacturer.into(),
        attributes,
    }
}

#[derive(Default)]
pub struct FakeUpstream {
    products: Mutex<HashMap<Category, Vec<Item>>>,
    failing_categories: Mutex<Vec<Category>>,
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    fallbacks: Mutex<HashMap<String, Reply>>,
    product_calls: AtomicUsize,
    availability_calls: Mutex<HashMap<String, usize>>,
    gate: Option<Semaphore>,
    availability_gate: Option<Semaphore>,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Product fetches block until `open_gate` is called.
    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    /// Availability fetches block until `open_gate` is called.
    pub fn with_availability_gate(self) -> Self {
        Self {
            availability_gate: Some(Semaphore::new(0)),
            ..self
        }
    }

    pub fn open_gate(&self) {
        for gate in [&self.gate, &self.availability_gate].into_iter().flatten() {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    pub fn with_products(self, category: Category, items: Vec<Item>) -> Self {
        self.products.lock().unwrap().insert(category, items);
        self
    }

    pub fn set_products(&self, category: Category, items: Vec<Item>) {
        self.products.lock().unwrap().insert(category, items);
    }

    pub fn fail_category(self, category: Category) -> Self {
        self.set_failing(category);
        self
    }

    pub fn set_failing(&self, category: Category) {
        self.failing_categories.lock().unwrap().push(category);
    }

    /// Replies returned in order; once exhausted the fallback (or the failure
    /// signature) is used.
    pub fn with_script(self, manufacturer: &str, replies: Vec<Reply>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(manufacturer.into(), replies.into());
        self
    }

    pub fn with_fallback(self, manufacturer: &str, reply: Reply) -> Self {
        self.fallbacks
            .lock()
            .unwrap()
            .insert(manufacturer.into(), reply);
        self
    }

    pub fn product_calls(&self) -> usize {
        self.product_calls.load(Ordering::SeqCst)
    }

    pub fn availability_calls(&self, manufacturer: &str) -> usize {
        self.availability_calls
            .lock()
            .unwrap()
            .get(manufacturer)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_availability_calls(&self) -> usize {
        self.availability_calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn products(&self, category: Category) -> Result<Vec<Item>, CatalogError> {
        self.product_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            let _permit = gate
                .acquire()
                .await
                .map_err(|e| CatalogError::Transport(e.to_string()))?;
        }
        if self.failing_categories.lock().unwrap().contains(&category) {
            return Err(CatalogError::Transport("connection refused".into()));
        }
        Ok(self
            .products
            .lock()
            .unwrap()
            .get(&category)
            .cloned()
            .unwrap_or_default())
    }

    async fn availability(&self, manufacturer: &str) -> Result<AvailabilityEnvelope, CatalogError> {
        *self
            .availability_calls
            .lock()
            .unwrap()
            .entry(manufacturer.to_string())
            .or_default() += 1;
        if let Some(gate) = &self.availability_gate {
            let _permit = gate
                .acquire()
                .await
                .map_err(|e| CatalogError::Transport(e.to_string()))?;
        }

        let scripted = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(manufacturer)
            .and_then(|q| q.pop_front());
        let reply = scripted
            .or_else(|| self.fallbacks.lock().unwrap().get(manufacturer).cloned())
            .unwrap_or(Reply::FailureSignature);
        reply.into_result()
    }
}
