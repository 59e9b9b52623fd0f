// ============================================================================
// Module : storage
// ============================================================================
// Persistance des quantités entre deux sessions
// ============================================================================

pub mod kv;       // Trait KeyValueStore + fichier JSON + mémoire
pub mod quantity; // Table des quantités par pièce

pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
pub use quantity::{QuantityMap, QuantityStore, QTY_STORAGE_KEY};
