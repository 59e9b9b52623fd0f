// ============================================================================
// Module : errors
// ============================================================================
// Erreurs typées de la librairie
//
// CONCEPT RUST : thiserror
// - #[derive(Error)] génère Display et std::error::Error
// - #[from] permet la conversion automatique avec l'opérateur ?
// - Le binaire (main.rs) utilise anyhow par-dessus pour ajouter du contexte
// ============================================================================

use std::path::PathBuf;

use thiserror::Error;

use crate::models::Metal;

/// Échec du chargement du catalogue de pièces
#[derive(Error, Debug)]
pub enum LoadError {
    /// Ressource distante injoignable
    #[error("catalog request failed ({url}): {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Ressource distante avec un statut HTTP d'échec
    #[error("catalog load failed ({url}): HTTP {status}")]
    Status { url: String, status: u16 },

    /// Fichier local illisible
    #[error("catalog file {path:?} could not be read: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Document JSON invalide (syntaxe, champ manquant, métal inconnu)
    #[error("catalog is not a valid coin list: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Pièce dont le contenu en métal pur n'est pas un réel positif
    #[error("coin {name:?} has invalid fine_grams {fine_grams}")]
    InvalidCoin { name: String, fine_grams: f64 },
}

/// Échec de la récupération d'un prix spot
///
/// `Request` et `Status` forment la famille "fetch", `Parse` la famille "parse".
#[derive(Error, Debug)]
pub enum SpotError {
    /// Requête HTTP impossible (DNS, connexion, timeout configuré, ...)
    #[error("spot request failed ({url}): {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Statut HTTP hors 2xx
    #[error("spot fetch failed ({url}): HTTP {status}")]
    Status { url: String, status: u16 },

    /// Corps sans champ numérique "price"
    #[error("unexpected spot response ({url}): {body}")]
    Parse { url: String, body: String },
}

impl SpotError {
    /// Vrai pour les erreurs de transport ou de statut
    pub fn is_fetch(&self) -> bool {
        matches!(self, SpotError::Request { .. } | SpotError::Status { .. })
    }

    /// Vrai quand la réponse ne respecte pas le contrat JSON
    pub fn is_parse(&self) -> bool {
        matches!(self, SpotError::Parse { .. })
    }
}

/// Échec d'un rafraîchissement complet (or + argent)
#[derive(Error, Debug)]
#[error("{metal} price refresh failed: {source}")]
pub struct RefreshError {
    pub metal: &'static str,
    #[source]
    pub source: SpotError,
}

impl RefreshError {
    pub fn new(metal: Metal, source: SpotError) -> Self {
        Self {
            metal: metal.label(),
            source,
        }
    }
}

/// Échec de lecture/écriture du stockage clé-valeur
///
/// Ne sort jamais du QuantityStore : journalisée puis ignorée.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration invalide
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("No data directory available, set COINMELT_STORE")]
    NoDataDir,
}
