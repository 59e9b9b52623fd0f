// ============================================================================
// Stockage clé-valeur
// ============================================================================
// Abstraction minimale d'un stockage durable de chaînes (façon localStorage)
//
// CONCEPTS RUST :
// 1. Trait : interface commune au fichier JSON et au stockage mémoire
// 2. Box<dyn Trait> : le QuantityStore ne connaît pas l'implémentation
// 3. Écriture atomique : fichier temporaire puis rename
// ============================================================================

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::errors::PersistenceError;

/// Stockage durable de valeurs texte indexées par clé
pub trait KeyValueStore: Send {
    /// Lit la valeur associée à la clé (None si absente)
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Écrit la valeur, en écrasant l'ancienne
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

// ============================================================================
// JsonFileStore : un fichier JSON { "clé": "valeur", ... }
// ============================================================================

/// Stockage dans un fichier JSON sur disque
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Lit toutes les entrées du fichier
    ///
    /// Fichier absent = stockage vide (premier lancement).
    fn read_entries(&self) -> Result<BTreeMap<String, String>, PersistenceError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let mut entries = self.read_entries()?;
        Ok(entries.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        // Un fichier corrompu est remplacé plutôt que de bloquer l'écriture
        let mut entries = self.read_entries().unwrap_or_else(|e| {
            warn!(path = ?self.path, error = %e, "Store file unreadable, starting from an empty store");
            BTreeMap::new()
        });
        entries.insert(key.to_string(), value.to_string());
        self.write_entries(&entries)?;
        debug!(path = ?self.path, key, "Store entry written");
        Ok(())
    }
}

// ============================================================================
// MemoryStore : stockage volatile (tests, mode sans disque)
// ============================================================================

/// Stockage en mémoire, perdu à la fin du processus
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("store.json"));
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn test_file_store_set_then_get() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut store = JsonFileStore::new(&path);
        store.set("a", "1").unwrap();
        store.set("b", "two").unwrap();
        store.set("a", "3").unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.get("a").unwrap().as_deref(), Some("3"));
        assert_eq!(reopened.get("b").unwrap().as_deref(), Some("two"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error_on_read_and_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "not json at all").unwrap();

        let mut store = JsonFileStore::new(&path);
        assert!(store.get("a").is_err());

        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }
}
