// src/store/config.rs
//! Configuration blob with synchronous change notifications.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

use super::storage::Storage;
use super::CONFIG_KEY;

/// Where a configuration change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    /// A write made through this store.
    Local,
    /// The backing storage changed underneath us.
    External,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigChange {
    pub source: ChangeSource,
    pub key: Option<String>,
    pub value: Option<String>,
}

impl ConfigChange {
    pub fn local(key: &str, value: Option<&str>) -> Self {
        Self {
            source: ChangeSource::Local,
            key: Some(key.to_string()),
            value: value.map(str::to_string),
        }
    }

    pub fn external() -> Self {
        Self {
            source: ChangeSource::External,
            key: None,
            value: None,
        }
    }
}

type Listener = Arc<dyn Fn(&ConfigStore, &ConfigChange) + Send + Sync>;

pub struct ConfigStore {
    storage: Arc<dyn Storage>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
    last_seen_raw: Mutex<Option<String>>,
}

/// Keeps a listener registered; dropping it unsubscribes.
pub struct Subscription {
    store: Weak<ConfigStore>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            store.unsubscribe(self.id);
        }
    }
}

impl ConfigStore {
    pub fn new(storage: Arc<dyn Storage>) -> Arc<Self> {
        let store = Self {
            storage,
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
            last_seen_raw: Mutex::new(None),
        };
        let raw = store.raw();
        *lock(&store.last_seen_raw) = raw;
        Arc::new(store)
    }

    fn raw(&self) -> Option<String> {
        match self.storage.get_item(CONFIG_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Configuration storage unreadable, treating as empty: {}", e);
                None
            }
        }
    }

    /// Parsed configuration object; anything malformed reads as empty.
    pub fn snapshot(&self) -> Map<String, Value> {
        self.raw().map(|raw| parse_blob(&raw)).unwrap_or_default()
    }

    /// String value for `key`. Empty strings read as unset.
    pub fn get(&self, key: &str) -> Option<String> {
        match self.snapshot().get(key) {
            Some(Value::String(value)) if !value.is_empty() => Some(value.clone()),
            _ => None,
        }
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.write(key, Some(value))
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.write(key, None)
    }

    fn write(&self, key: &str, value: Option<&str>) -> Result<()> {
        let mut config = self.snapshot();
        match value {
            Some(value) => {
                config.insert(key.to_string(), Value::String(value.to_string()));
            }
            None => {
                config.remove(key);
            }
        }

        let raw = serde_json::to_string(&Value::Object(config))
            .context("Failed to serialize configuration")?;
        self.storage
            .set_item(CONFIG_KEY, &raw)
            .context("Failed to persist configuration")?;
        *lock(&self.last_seen_raw) = Some(raw);

        self.dispatch(&ConfigChange::local(key, value));
        Ok(())
    }

    pub fn subscribe<F>(self: &Arc<Self>, listener: F) -> Subscription
    where
        F: Fn(&ConfigStore, &ConfigChange) + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.listeners).push((id, Arc::new(listener)));
        Subscription {
            store: Arc::downgrade(self),
            id,
        }
    }

    fn unsubscribe(&self, id: u64) {
        lock(&self.listeners).retain(|(listener_id, _)| *listener_id != id);
    }

    #[cfg(test)]
    pub(crate) fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    /// A storage key changed outside this store. Only the configuration key
    /// is of interest; anything else is ignored.
    pub fn storage_event(&self, storage_key: &str) {
        if storage_key == CONFIG_KEY {
            self.dispatch(&ConfigChange::external());
        }
    }

    /// Compare the persisted blob with the last one this store saw and raise
    /// an external change when it differs. Returns whether it fired.
    pub fn poll_external(&self) -> bool {
        let raw = self.raw();
        {
            let mut last_seen = lock(&self.last_seen_raw);
            if *last_seen == raw {
                return false;
            }
            *last_seen = raw;
        }
        self.storage_event(CONFIG_KEY);
        true
    }

    fn dispatch(&self, change: &ConfigChange) {
        // Listeners may call back into the store, so run them unlocked.
        let listeners: Vec<Listener> = lock(&self.listeners)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(self, change);
        }
    }
}

/// Poll the backing storage for writes made by other processes.
pub fn watch(store: Arc<ConfigStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            if store.poll_external() {
                debug!("Configuration changed on disk");
            }
        }
    })
}

fn parse_blob(raw: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            debug!("Configuration blob is not an object, treating as empty");
            Map::new()
        }
        Err(e) => {
            debug!("Configuration blob is malformed, treating as empty: {}", e);
            Map::new()
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
