//! Bounded, persisted live feed log
//!
//! Entries are kept oldest-first and capped; pushing past capacity evicts
//! from the front. The whole log is persisted as one JSON array under
//! [`FEED_KEY`] so a restart shows the last known state immediately.

use crate::storage::{Store, FEED_KEY};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::VecDeque;

/// Default number of entries kept (and persisted)
pub const DEFAULT_CAPACITY: usize = 100;

/// One evaluation outcome pushed by the backend
///
/// The payload pairs a news item with the task snapshot it was evaluated
/// against. Fields are read leniently: anything missing renders as
/// "unknown" rather than dropping the entry, and unknown fields survive
/// the persistence round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedEntry(Map<String, Value>);

impl FeedEntry {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    fn news(&self) -> Option<&Map<String, Value>> {
        self.0.get("news")?.as_object()
    }

    fn task(&self) -> Option<&Map<String, Value>> {
        self.0.get("task")?.as_object()
    }

    pub fn news_title(&self) -> Option<&str> {
        self.news()?
            .get("title")?
            .as_str()
            .filter(|t| !t.is_empty())
    }

    pub fn news_link(&self) -> Option<&str> {
        self.news()?.get("link")?.as_str().filter(|l| !l.is_empty())
    }

    pub fn pub_date(&self) -> Option<&str> {
        self.news()?.get("pub_date")?.as_str()
    }

    pub fn task_title(&self) -> Option<&str> {
        self.task()?.get("title")?.as_str().filter(|t| !t.is_empty())
    }

    pub fn task_id(&self) -> Option<i64> {
        self.task()?.get("id")?.as_i64()
    }

    /// The task's boolean outcome for this news item
    pub fn result(&self) -> Option<bool> {
        self.task()?.get("result")?.as_bool()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Capped, oldest-first sequence of feed entries
#[derive(Debug, Clone)]
pub struct FeedLog {
    entries: VecDeque<FeedEntry>,
    capacity: usize,
    /// Every push ever made, evicted ones included
    appended: u64,
}

impl FeedLog {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            appended: 0,
        }
    }

    /// Rehydrate from the store
    ///
    /// A missing, unreadable or corrupt persisted log starts empty; the
    /// failure is logged and the next persist overwrites it.
    pub fn load(store: &dyn Store, capacity: usize) -> Self {
        let mut log = Self::new(capacity);

        let raw = match store.get(FEED_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return log,
            Err(e) => {
                tracing::error!("Failed to read persisted feed: {:#}", e);
                return log;
            }
        };

        match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(values) => {
                for value in values {
                    // Same rule as live frames: only objects are entries
                    if let Value::Object(fields) = value {
                        log.push(FeedEntry(fields));
                    }
                }
                tracing::debug!("Rehydrated {} feed entries", log.len());
            }
            Err(e) => tracing::error!("Persisted feed is corrupt, starting empty: {}", e),
        }

        log
    }

    /// Append, evicting the oldest entries beyond capacity
    pub fn push(&mut self, entry: FeedEntry) {
        self.entries.push_back(entry);
        self.appended += 1;
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Write the whole log as a JSON array (oldest first)
    pub fn persist(&self, store: &dyn Store) -> Result<()> {
        let json = serde_json::to_string(&self.entries).context("Failed to serialize feed")?;
        store.set(FEED_KEY, &json)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first, as stored
    pub fn entries(&self) -> impl Iterator<Item = &FeedEntry> {
        self.entries.iter()
    }

    /// Running append count, used as a cursor by readers that tail the log
    pub fn appended(&self) -> u64 {
        self.appended
    }

    /// Entries pushed after the cursor `seen`, oldest first
    ///
    /// Counts arrivals rather than comparing payloads, so a repeated
    /// payload is still reported. Entries already evicted are skipped.
    pub fn since(&self, seen: u64) -> Vec<FeedEntry> {
        let fresh = self.appended.saturating_sub(seen).min(self.entries.len() as u64) as usize;
        self.entries
            .iter()
            .skip(self.entries.len() - fresh)
            .cloned()
            .collect()
    }

    /// Most recent first, as displayed
    pub fn newest_first(&self) -> Vec<FeedEntry> {
        self.entries.iter().rev().cloned().collect()
    }
}
