// src/flows/mod.rs
//! Front-end state machines for connecting an account and publishing posts.
//!
//! They render nothing: a caller (the CLI, or a test) drives them and reads
//! their state back. The browser address bar is abstracted as [`Location`].

pub mod connect;
pub mod publish;

pub use connect::{ConnectFlow, ConnectStatus};
pub use publish::{PublishFlow, PublishStatus, PublishView};

use reqwest::Url;
use std::sync::{Mutex, MutexGuard};

/// OAuth query parameters consumed on return from the provider.
const OAUTH_RETURN_PARAMS: [&str; 2] = ["code", "state"];

/// The address bar: read the current URL, rewrite it in place, or navigate.
pub trait Location: Send + Sync {
    fn href(&self) -> Url;
    /// Replace the visible URL without navigating.
    fn replace(&self, url: Url);
    /// Full-page navigation. Anything held in memory is lost.
    fn assign(&self, url: Url);
}

/// A `Location` backed by memory.
pub struct MemoryLocation {
    current: Mutex<Url>,
    assigned: Mutex<Option<Url>>,
}

impl MemoryLocation {
    pub fn new(url: Url) -> Self {
        Self {
            current: Mutex::new(url),
            assigned: Mutex::new(None),
        }
    }

    pub fn parse(url: &str) -> anyhow::Result<Self> {
        Ok(Self::new(Url::parse(url)?))
    }

    /// Where the last `assign` sent us, if anywhere.
    pub fn assigned(&self) -> Option<Url> {
        lock(&self.assigned).clone()
    }
}

impl Location for MemoryLocation {
    fn href(&self) -> Url {
        lock(&self.current).clone()
    }

    fn replace(&self, url: Url) {
        *lock(&self.current) = url;
    }

    fn assign(&self, url: Url) {
        *lock(&self.current) = url.clone();
        *lock(&self.assigned) = Some(url);
    }
}

pub fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// `url` without the `code`/`state` parameters; other parameters survive and
/// an emptied query is dropped.
pub fn strip_oauth_params(url: &Url) -> Url {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !OAUTH_RETURN_PARAMS.contains(&key.as_ref()))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    let mut cleaned = url.clone();
    if kept.is_empty() {
        cleaned.set_query(None);
    } else {
        cleaned.query_pairs_mut().clear().extend_pairs(kept);
    }
    cleaned
}

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
