//! Persisted personal history: the newest-first quote log and the lifetime
//! generation counter.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::{
    domain::{HistoryEntry, HistoryLog, Quote},
    error::PersistenceError,
};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::KeyValueStore;

pub const HISTORY_KEY: &str = "quoteHistory";
pub const TOTAL_QUOTES_KEY: &str = "totalQuotes";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistorySnapshot {
    pub log: HistoryLog,
    /// Lifetime count of accepted quotes. Unaffected by eviction and `clear`.
    pub total_generated: u64,
}

pub struct HistoryStore {
    kv: Arc<dyn KeyValueStore>,
    state: Mutex<HistorySnapshot>,
}

impl HistoryStore {
    /// Opens the store and loads whatever is currently persisted.
    pub async fn open(kv: Arc<dyn KeyValueStore>) -> Self {
        let snapshot = read_snapshot(kv.as_ref()).await;
        Self {
            kv,
            state: Mutex::new(snapshot),
        }
    }

    /// Re-reads durable storage. Absent or malformed data yields an empty
    /// log and a zero counter; this never fails.
    pub async fn load(&self) -> HistorySnapshot {
        let snapshot = read_snapshot(self.kv.as_ref()).await;
        *self.state.lock().await = snapshot.clone();
        snapshot
    }

    pub async fn snapshot(&self) -> HistorySnapshot {
        self.state.lock().await.clone()
    }

    pub async fn total_generated(&self) -> u64 {
        self.state.lock().await.total_generated
    }

    pub async fn append(&self, quote: Quote) -> HistoryLog {
        self.append_at(quote, Utc::now()).await
    }

    /// Prepends `quote` captured at `timestamp`, evicts past capacity, bumps
    /// the counter and persists both keys in one write.
    pub async fn append_at(&self, quote: Quote, timestamp: DateTime<Utc>) -> HistoryLog {
        let mut state = self.state.lock().await;

        let mut next = state.clone();
        next.log.push_front(HistoryEntry::capture(quote, timestamp));
        next.total_generated = next.total_generated.saturating_add(1);

        match serialize_history(&next.log) {
            Ok(raw) => {
                let write = self
                    .kv
                    .put_many(&[
                        (HISTORY_KEY, raw),
                        (TOTAL_QUOTES_KEY, next.total_generated.to_string()),
                    ])
                    .await;
                if let Err(err) = write {
                    let err = PersistenceError::Write {
                        key: HISTORY_KEY.to_string(),
                        reason: format!("{err:#}"),
                    };
                    warn!(error = %err, "history: append not persisted");
                }
            }
            Err(err) => warn!(error = %err, "history: append not persisted"),
        }

        debug!(
            entries = next.log.len(),
            total_generated = next.total_generated,
            "history: appended entry"
        );
        *state = next;
        state.log.clone()
    }

    /// Empties the log. The lifetime counter is left as is.
    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.log = HistoryLog::new();

        let write = match serialize_history(&state.log) {
            Ok(raw) => self.kv.put(HISTORY_KEY, raw).await.map_err(|err| {
                PersistenceError::Write {
                    key: HISTORY_KEY.to_string(),
                    reason: format!("{err:#}"),
                }
            }),
            Err(err) => Err(err),
        };
        if let Err(err) = write {
            warn!(error = %err, "history: clear not persisted");
        }
    }
}

pub fn serialize_history(log: &HistoryLog) -> Result<String, PersistenceError> {
    serde_json::to_string(log).map_err(|err| PersistenceError::Write {
        key: HISTORY_KEY.to_string(),
        reason: err.to_string(),
    })
}

pub fn deserialize_history(raw: &str) -> Result<HistoryLog, PersistenceError> {
    serde_json::from_str(raw).map_err(|err| PersistenceError::Corrupt {
        key: HISTORY_KEY.to_string(),
        reason: err.to_string(),
    })
}

fn parse_total(raw: &str) -> Result<u64, PersistenceError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|err| PersistenceError::Corrupt {
            key: TOTAL_QUOTES_KEY.to_string(),
            reason: err.to_string(),
        })
}

async fn read_snapshot(kv: &dyn KeyValueStore) -> HistorySnapshot {
    let log = match read_key(kv, HISTORY_KEY).await {
        Ok(Some(raw)) => deserialize_history(&raw).unwrap_or_else(|err| {
            warn!(error = %err, "history: discarding persisted log");
            HistoryLog::new()
        }),
        Ok(None) => HistoryLog::new(),
        Err(err) => {
            warn!(error = %err, "history: falling back to empty log");
            HistoryLog::new()
        }
    };

    let total_generated = match read_key(kv, TOTAL_QUOTES_KEY).await {
        Ok(Some(raw)) => parse_total(&raw).unwrap_or_else(|err| {
            warn!(error = %err, "history: resetting lifetime counter");
            0
        }),
        Ok(None) => 0,
        Err(err) => {
            warn!(error = %err, "history: falling back to zero counter");
            0
        }
    };

    HistorySnapshot {
        log,
        total_generated,
    }
}

async fn read_key(kv: &dyn KeyValueStore, key: &str) -> Result<Option<String>, PersistenceError> {
    kv.get(key).await.map_err(|err| PersistenceError::Read {
        key: key.to_string(),
        reason: format!("{err:#}"),
    })
}

#[cfg(test)]
#[path = "tests/history_tests.rs"]
mod tests;
