use dashmap::DashMap;
use serde_json::Value;
use std::sync::Arc;

/// Key/value store holding everything a dialogue session has learned so far.
///
/// Values are stored as JSON so steps can keep whatever shape they need
/// (numbers, strings, lists) without the engine knowing about it. Cloning a
/// `Context` is cheap and all clones share the same underlying map.
#[derive(Clone, Debug)]
pub struct Context {
    data: Arc<DashMap<String, Value>>,
}

impl Context {
    pub fn new() -> Self {
        Self {
            data: Arc::new(DashMap::new()),
        }
    }

    pub fn set(&self, key: impl Into<String>, value: impl serde::Serialize) {
        let value = serde_json::to_value(value).expect("Failed to serialize value");
        self.data.insert(key.into(), value);
    }

    pub fn get<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.data
            .get(key)
            .and_then(|v| serde_json::from_value(v.value().clone()).ok())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.data.remove(key).map(|(_, v)| v)
    }

    pub fn clear(&self) {
        self.data.clear();
    }

    /// Snapshot of the current contents, for inspection endpoints and logs.
    pub fn snapshot(&self) -> serde_json::Map<String, Value> {
        self.data
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}
