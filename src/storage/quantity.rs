// ============================================================================
// QuantityStore : quantités détenues par pièce
// ============================================================================
// Persiste la table "<metal>::<name>" -> quantité sous une clé unique
//
// CONCEPT : Dégradation silencieuse
// - Un stockage illisible ou corrompu = aucune quantité sauvegardée
// - Les erreurs sont journalisées (warn) mais jamais remontées
// - L'affichage n'est jamais bloqué par la persistance
// ============================================================================

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::PersistenceError;
use crate::storage::KeyValueStore;

/// Clé unique sous laquelle la table des quantités est stockée
pub const QTY_STORAGE_KEY: &str = "coinmelt-qty-v1";

/// Table clé de pièce -> quantité
///
/// BTreeMap : ordre de sérialisation stable
pub type QuantityMap = BTreeMap<String, u32>;

/// Accès à la table des quantités
pub struct QuantityStore {
    store: Box<dyn KeyValueStore>,
}

impl QuantityStore {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Charge la table des quantités
    ///
    /// Retourne une table vide si rien n'est sauvegardé ou si le contenu
    /// n'est pas un objet JSON. Les valeurs qui ne sont pas des entiers
    /// positifs sont ignorées (la pièce retombe sur la quantité par défaut).
    pub fn load(&self) -> QuantityMap {
        match self.try_load() {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, "Saved quantities unreadable, using defaults");
                QuantityMap::new()
            }
        }
    }

    /// Sauvegarde la table complète (écrase l'existant, pas de fusion)
    pub fn save(&mut self, map: &QuantityMap) {
        if let Err(e) = self.try_save(map) {
            warn!(error = %e, entries = map.len(), "Failed to save quantities");
        }
    }

    /// Charge, modifie une entrée, sauvegarde
    ///
    /// Pas d'atomicité : un seul écrivain (la boucle UI).
    pub fn set_quantity(&mut self, key: &str, qty: u32) {
        let mut map = self.load();
        map.insert(key.to_string(), qty);
        self.save(&map);
        debug!(key, qty, "Quantity persisted");
    }

    fn try_load(&self) -> Result<QuantityMap, PersistenceError> {
        let raw = match self.store.get(QTY_STORAGE_KEY)? {
            Some(raw) => raw,
            None => return Ok(QuantityMap::new()),
        };

        let entries: serde_json::Map<String, Value> = serde_json::from_str(&raw)?;

        let map = entries
            .into_iter()
            .filter_map(|(key, value)| {
                match saved_quantity(&value) {
                    Some(qty) => Some((key, qty)),
                    None => {
                        debug!(key = %key, value = %value, "Ignoring invalid saved quantity");
                        None
                    }
                }
            })
            .collect();

        Ok(map)
    }

    fn try_save(&mut self, map: &QuantityMap) -> Result<(), PersistenceError> {
        let raw = serde_json::to_string(map)?;
        self.store.set(QTY_STORAGE_KEY, &raw)
    }
}

/// Quantité sauvegardée valide : entier positif, écrit `3` ou `3.0`
fn saved_quantity(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    let n = value.as_f64()?;
    let whole = n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= f64::from(u32::MAX);
    whole.then_some(n as u32)
}
