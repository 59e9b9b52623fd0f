// ============================================================================
// API Client : prix spot
// ============================================================================
// Récupère le prix par once troy de l'or et de l'argent
//
// CONCEPTS RUST :
// 1. async/await : les deux requêtes partent en même temps (try_join!)
// 2. Erreurs typées : SpotError distingue fetch (transport/statut) et parse
// 3. serde_json::Value : on ne dépend que du champ "price"
// ============================================================================

use std::time::Duration;

use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::errors::{RefreshError, SpotError};
use crate::models::Metal;

/// Endpoint or par défaut (gold-api.com accepte le CORS et ne demande pas de clé)
pub const DEFAULT_GOLD_URL: &str = "https://api.gold-api.com/price/XAU";

/// Endpoint argent par défaut
pub const DEFAULT_SILVER_URL: &str = "https://api.gold-api.com/price/XAG";

/// Longueur max du corps de réponse recopié dans une erreur de parsing
const BODY_EXCERPT_LEN: usize = 200;

/// URLs des deux fournisseurs de prix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotEndpoints {
    pub gold: String,
    pub silver: String,
}

impl Default for SpotEndpoints {
    fn default() -> Self {
        Self {
            gold: DEFAULT_GOLD_URL.to_string(),
            silver: DEFAULT_SILVER_URL.to_string(),
        }
    }
}

/// Résultat d'un rafraîchissement complet : les deux prix par once troy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpotQuotes {
    pub gold_ozt: f64,
    pub silver_ozt: f64,
}

/// Crée le client HTTP partagé par le catalogue et les prix
///
/// Sans timeout, une requête bloquée bloque seulement son rafraîchissement.
pub fn build_client(timeout: Option<Duration>) -> reqwest::Result<Client> {
    let mut builder = Client::builder().user_agent(concat!("coinmelt/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

/// Récupère le prix par once troy d'un métal
///
/// La requête contourne les caches. Un statut hors 2xx ou une erreur réseau
/// donne une erreur "fetch", un corps sans `price` numérique une erreur "parse".
#[instrument(skip(client))]
pub async fn fetch_spot(client: &Client, url: &str) -> Result<f64, SpotError> {
    debug!("Fetching spot price");

    let response = client
        .get(url)
        .header(CACHE_CONTROL, "no-cache")
        .header(PRAGMA, "no-cache")
        .send()
        .await
        .map_err(|source| SpotError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    debug!(status = %status, "Received HTTP response");

    if !status.is_success() {
        error!(status = %status, "Spot provider returned error status");
        return Err(SpotError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|source| SpotError::Request {
        url: url.to_string(),
        source,
    })?;

    let price = parse_spot_body(url, &body)?;
    info!(price, "Spot price fetched");
    Ok(price)
}

/// Extrait le champ numérique `price` d'une réponse JSON
///
/// `{"price": "2000"}` (chaîne) est refusé : seul un nombre JSON est accepté.
pub fn parse_spot_body(url: &str, body: &str) -> Result<f64, SpotError> {
    let parse_error = || SpotError::Parse {
        url: url.to_string(),
        body: body.chars().take(BODY_EXCERPT_LEN).collect(),
    };

    let value: Value = serde_json::from_str(body).map_err(|_| parse_error())?;

    value
        .get("price")
        .and_then(Value::as_f64)
        .ok_or_else(parse_error)
}

/// Rafraîchit les deux prix
///
/// CONCEPT RUST : tokio::try_join!
/// - Les deux futures progressent en même temps
/// - La première erreur annule l'ensemble : pas d'application partielle
#[instrument(skip(client, endpoints))]
pub async fn refresh_prices(client: &Client, endpoints: &SpotEndpoints) -> Result<SpotQuotes, RefreshError> {
    let gold = async {
        fetch_spot(client, &endpoints.gold)
            .await
            .map_err(|e| RefreshError::new(Metal::Gold, e))
    };
    let silver = async {
        fetch_spot(client, &endpoints.silver)
            .await
            .map_err(|e| RefreshError::new(Metal::Silver, e))
    };

    let (gold_ozt, silver_ozt) = tokio::try_join!(gold, silver)?;

    info!(gold_ozt, silver_ozt, "Spot prices refreshed");
    Ok(SpotQuotes { gold_ozt, silver_ozt })
}

// ============================================================================
// Tests unitaires
// ============================================================================
