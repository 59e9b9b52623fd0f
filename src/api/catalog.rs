// ============================================================================
// Chargement du catalogue de pièces
// ============================================================================
// Lit la liste ordonnée des pièces (nom, métal, grammes de métal pur) puis
// applique les quantités sauvegardées
//
// CONCEPTS RUST :
// 1. Enum de source : Bundled (include_str!), File, Url
// 2. Serde : désérialisation directe vers une structure intermédiaire
// 3. Validation après parsing : fine_grams doit être un réel positif
// ============================================================================

use std::path::PathBuf;

use reqwest::header::CACHE_CONTROL;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::errors::LoadError;
use crate::models::{Coin, Metal, DEFAULT_QTY};
use crate::storage::{QuantityMap, QuantityStore};

/// Catalogue livré avec le binaire
pub const BUNDLED_CATALOG: &str = include_str!("../../data/coins.json");

/// Origine du catalogue
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CatalogSource {
    /// Catalogue compilé dans le binaire (data/coins.json)
    #[default]
    Bundled,

    /// Fichier JSON local
    File(PathBuf),

    /// Ressource HTTP(S)
    Url(String),
}

impl CatalogSource {
    /// Interprète une valeur de configuration : URL si http(s), sinon chemin
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.starts_with("http://") || value.starts_with("https://") {
            CatalogSource::Url(value.to_string())
        } else {
            CatalogSource::File(PathBuf::from(value))
        }
    }
}

/// Entrée brute du catalogue JSON
#[derive(Debug, Deserialize)]
struct CoinDefinition {
    name: String,
    metal: Metal,
    fine_grams: f64,
}

/// Charge le catalogue et fusionne les quantités sauvegardées
///
/// Chaque pièce reçoit la quantité sauvegardée sous sa clé, ou 1.
#[instrument(skip(client, store))]
pub async fn load_catalog(
    client: &Client,
    source: &CatalogSource,
    store: &QuantityStore,
) -> Result<Vec<Coin>, LoadError> {
    let raw = read_source(client, source).await?;
    let coins = parse_catalog(&raw)?;
    let coins = apply_quantities(coins, &store.load());

    info!(coins = coins.len(), "Catalog loaded");
    Ok(coins)
}

/// Lit le document brut depuis la source
async fn read_source(client: &Client, source: &CatalogSource) -> Result<String, LoadError> {
    match source {
        CatalogSource::Bundled => Ok(BUNDLED_CATALOG.to_string()),

        CatalogSource::File(path) => {
            debug!(?path, "Reading catalog file");
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| LoadError::Io {
                    path: path.clone(),
                    source,
                })
        }

        CatalogSource::Url(url) => {
            debug!(url = %url, "Fetching catalog");
            let response = client
                .get(url)
                .header(CACHE_CONTROL, "no-cache")
                .send()
                .await
                .map_err(|source| LoadError::Request {
                    url: url.clone(),
                    source,
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(LoadError::Status {
                    url: url.clone(),
                    status: status.as_u16(),
                });
            }

            response.text().await.map_err(|source| LoadError::Request {
                url: url.clone(),
                source,
            })
        }
    }
}

/// Parse et valide la liste ordonnée des pièces
pub fn parse_catalog(raw: &str) -> Result<Vec<Coin>, LoadError> {
    let definitions: Vec<CoinDefinition> = serde_json::from_str(raw)?;

    definitions
        .into_iter()
        .map(|def| {
            if !def.fine_grams.is_finite() || def.fine_grams <= 0.0 {
                return Err(LoadError::InvalidCoin {
                    name: def.name,
                    fine_grams: def.fine_grams,
                });
            }
            Ok(Coin::new(def.name, def.metal, def.fine_grams))
        })
        .collect()
}

/// Applique les quantités sauvegardées (défaut : 1)
///
/// Deux pièces de même clé (métal, nom) reçoivent la même quantité.
pub fn apply_quantities(coins: Vec<Coin>, saved: &QuantityMap) -> Vec<Coin> {
    coins
        .into_iter()
        .map(|mut coin| {
            coin.qty = saved.get(&coin.key()).copied().unwrap_or(DEFAULT_QTY);
            coin
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_server::{serve_once, test_client};
    use crate::storage::MemoryStore;

    fn empty_store() -> QuantityStore {
        QuantityStore::new(Box::new(MemoryStore::new()))
    }

    #[test]
    fn test_bundled_catalog_is_valid() {
        let coins = parse_catalog(BUNDLED_CATALOG).unwrap();
        assert!(!coins.is_empty());
        assert!(coins.iter().any(|c| c.metal == Metal::Gold));
        assert!(coins.iter().any(|c| c.metal == Metal::Silver));

        let mut keys: Vec<String> = coins.iter().map(Coin::key).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), coins.len(), "bundled catalog keys must be unique");
    }

    #[test]
    fn test_parse_keeps_order() {
        let raw = r#"[
            {"name": "B", "metal": "silver", "fine_grams": 1.5},
            {"name": "A", "metal": "gold", "fine_grams": 2.0}
        ]"#;
        let coins = parse_catalog(raw).unwrap();
        assert_eq!(coins[0].name, "B");
        assert_eq!(coins[1].name, "A");
        assert_eq!(coins[1].metal, Metal::Gold);
        assert!(coins.iter().all(|c| c.qty == DEFAULT_QTY));
    }

    #[test]
    fn test_parse_rejects_unknown_metal_and_bad_grams() {
        let unknown = r#"[{"name": "P", "metal": "platinum", "fine_grams": 1.0}]"#;
        assert!(matches!(parse_catalog(unknown), Err(LoadError::Malformed(_))));

        let zero = r#"[{"name": "Z", "metal": "gold", "fine_grams": 0}]"#;
        assert!(matches!(parse_catalog(zero), Err(LoadError::InvalidCoin { .. })));
    }

    #[test]
    fn test_apply_quantities_defaults_and_collisions() {
        let coins = vec![
            Coin::new("Krugerrand", Metal::Gold, 31.1035),
            Coin::new("Krugerrand", Metal::Gold, 31.1035),
            Coin::new("Krugerrand", Metal::Silver, 31.1035),
            Coin::new("Eagle", Metal::Gold, 31.1035),
        ];
        let mut saved = QuantityMap::new();
        saved.insert("gold::Krugerrand".to_string(), 5);

        let coins = apply_quantities(coins, &saved);
        // Même clé => même quantité
        assert_eq!(coins[0].qty, 5);
        assert_eq!(coins[1].qty, 5);
        assert_eq!(coins[2].qty, DEFAULT_QTY);
        assert_eq!(coins[3].qty, DEFAULT_QTY);
    }

    #[tokio::test]
    async fn test_load_catalog_round_trips_saved_quantity() {
        let mut store = empty_store();
        store.set_quantity("gold::Krugerrand", 7);

        let coins = load_catalog(&test_client(), &CatalogSource::Bundled, &store)
            .await
            .unwrap();
        let krugerrand = coins.iter().find(|c| c.name == "Krugerrand").unwrap();
        assert_eq!(krugerrand.qty, 7);
    }

    #[tokio::test]
    async fn test_load_catalog_from_missing_file() {
        let source = CatalogSource::File(PathBuf::from("/definitely/not/here/coins.json"));
        let err = load_catalog(&test_client(), &source, &empty_store())
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[tokio::test]
    async fn test_load_catalog_from_url() {
        let (url, _request) = serve_once("200 OK", r#"[{"name": "Dime", "metal": "silver", "fine_grams": 2.25}]"#).await;
        let coins = load_catalog(&test_client(), &CatalogSource::Url(url), &empty_store())
            .await
            .unwrap();
        assert_eq!(coins.len(), 1);
        assert_eq!(coins[0].metal, Metal::Silver);
    }

    #[tokio::test]
    async fn test_load_catalog_error_status() {
        let (url, _request) = serve_once("404 Not Found", "").await;
        let err = load_catalog(&test_client(), &CatalogSource::Url(url), &empty_store())
            .await
            .unwrap_err();
        assert!(matches!(err, LoadError::Status { status: 404, .. }));
    }

    #[test]
    fn test_catalog_source_parse() {
        assert_eq!(
            CatalogSource::parse("https://example.com/coins.json"),
            CatalogSource::Url("https://example.com/coins.json".to_string())
        );
        assert_eq!(
            CatalogSource::parse("./coins.json"),
            CatalogSource::File(PathBuf::from("./coins.json"))
        );
    }
}
