use tracing::warn;

use crate::error::Result;
use crate::storage::Storage;

pub const HISTORY_KEY: &str = "urlHistory";
pub const HISTORY_LIMIT: usize = 5;

/// Most-recently-used list of submitted references, newest first.
#[derive(Debug)]
pub struct HistoryStore<S> {
    storage: S,
    entries: Vec<String>,
}

impl<S: Storage> HistoryStore<S> {
    /// Restores the persisted list. Missing or unreadable state yields an
    /// empty history.
    pub fn load(storage: S) -> Self {
        let entries = match storage.get(HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(raw_entries) => {
                    let mut entries: Vec<String> = Vec::with_capacity(HISTORY_LIMIT);
                    for entry in raw_entries {
                        if !entries.contains(&entry) {
                            entries.push(entry);
                        }
                    }
                    entries.truncate(HISTORY_LIMIT);
                    entries
                }
                Err(e) => {
                    warn!("ignoring malformed history: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("could not read history: {}", e);
                Vec::new()
            }
        };

        Self { storage, entries }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn record(&mut self, reference: &str) -> Result<()> {
        let mut entries = Vec::with_capacity(HISTORY_LIMIT);
        entries.push(reference.to_string());
        entries.extend(
            self.entries
                .iter()
                .filter(|entry| entry.as_str() != reference)
                .cloned(),
        );
        entries.truncate(HISTORY_LIMIT);
        self.commit(entries)
    }

    pub fn remove(&mut self, reference: &str) -> Result<()> {
        if !self.entries.iter().any(|entry| entry == reference) {
            return Ok(());
        }
        let entries = self
            .entries
            .iter()
            .filter(|entry| entry.as_str() != reference)
            .cloned()
            .collect();
        self.commit(entries)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.storage.remove(HISTORY_KEY)?;
        self.entries.clear();
        Ok(())
    }

    /// Persists `entries`, replacing the in-memory list only on success.
    fn commit(&mut self, entries: Vec<String>) -> Result<()> {
        let raw = serde_json::to_string(&entries)?;
        self.storage.set(HISTORY_KEY, &raw)?;
        self.entries = entries;
        Ok(())
    }
}
