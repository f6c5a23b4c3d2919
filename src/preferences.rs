use tracing::warn;

use crate::error::Result;
use crate::storage::Storage;

pub const DARK_MODE_KEY: &str = "darkMode";

#[derive(Debug)]
pub struct Preferences<S> {
    storage: S,
    dark_mode: bool,
}

impl<S: Storage> Preferences<S> {
    pub fn load(storage: S) -> Self {
        let dark_mode = match storage.get(DARK_MODE_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("ignoring malformed dark mode flag: {}", e);
                false
            }),
            Ok(None) => false,
            Err(e) => {
                warn!("could not read dark mode flag: {}", e);
                false
            }
        };

        Self { storage, dark_mode }
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Flips the flag and persists it, returning the new value.
    /// The in-memory flag only changes once the write succeeds.
    pub fn toggle_dark_mode(&mut self) -> Result<bool> {
        let dark_mode = !self.dark_mode;
        self.storage
            .set(DARK_MODE_KEY, &serde_json::to_string(&dark_mode)?)?;
        self.dark_mode = dark_mode;
        Ok(dark_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, ReadOnlyStorage};

    fn persisted(storage: &MemoryStorage) -> Option<bool> {
        storage
            .get(DARK_MODE_KEY)
            .unwrap()
            .map(|raw| serde_json::from_str(&raw).unwrap())
    }

    #[test]
    fn test_toggle_twice_round_trips() {
        let storage = MemoryStorage::new();
        let mut prefs = Preferences::load(&storage);
        let original = prefs.dark_mode();

        assert_eq!(prefs.toggle_dark_mode().unwrap(), !original);
        assert_eq!(persisted(&storage), Some(prefs.dark_mode()));

        assert_eq!(prefs.toggle_dark_mode().unwrap(), original);
        assert_eq!(persisted(&storage), Some(prefs.dark_mode()));
    }

    #[test]
    fn test_load_defaults() {
        let storage = MemoryStorage::new();
        assert!(!Preferences::load(&storage).dark_mode());

        storage.set(DARK_MODE_KEY, "true").unwrap();
        assert!(Preferences::load(&storage).dark_mode());

        storage.set(DARK_MODE_KEY, "\"yes\"").unwrap();
        assert!(!Preferences::load(&storage).dark_mode());
    }

    #[test]
    fn test_failed_write_keeps_flag() {
        let storage = MemoryStorage::new();
        storage.set(DARK_MODE_KEY, "false").unwrap();
        let mut prefs = Preferences::load(ReadOnlyStorage(storage));

        assert!(prefs.toggle_dark_mode().is_err());
        assert!(!prefs.dark_mode());
        assert_eq!(prefs.storage.get(DARK_MODE_KEY).unwrap().as_deref(), Some("false"));
    }
}
