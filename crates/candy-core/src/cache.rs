//! Response Cache
//!
//! Optional pass-through cache for list responses, keyed by request identity.
//! Owned by whoever builds the client; mutating calls must invalidate it.
//!
//! Each invalidation bumps an epoch. A list response is only stored if no
//! invalidation happened since its request was sent, so a response captured
//! before a mutation can never outlive that mutation.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::models::House;

#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: RefCell<HashMap<String, Vec<House>>>,
    hits: Cell<u64>,
    epoch: Cell<u64>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request identity: method and full URL
    pub fn key(method: &str, url: &str) -> String {
        format!("{} {}", method, url)
    }

    pub fn get(&self, key: &str) -> Option<Vec<House>> {
        let found = self.entries.borrow().get(key).cloned();
        if found.is_some() {
            self.hits.set(self.hits.get() + 1);
        }
        found
    }

    /// Read before sending the request whose response may be stored
    pub fn epoch(&self) -> u64 {
        self.epoch.get()
    }

    /// Store a response fetched at `epoch`.
    ///
    /// Returns false, storing nothing, if the cache was invalidated since.
    pub fn put(&self, key: String, houses: Vec<House>, epoch: u64) -> bool {
        if epoch != self.epoch.get() {
            log::debug!("[CACHE] Dropping response for {} from epoch {}", key, epoch);
            return false;
        }
        self.entries.borrow_mut().insert(key, houses);
        true
    }

    /// Drop everything; called on every create and patch
    pub fn invalidate(&self) {
        self.epoch.set(self.epoch.get() + 1);
        let mut entries = self.entries.borrow_mut();
        if !entries.is_empty() {
            log::debug!("[CACHE] Invalidating {} entries", entries.len());
            entries.clear();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits.get()
    }
}
