// ============================================================================
// Configuration
// ============================================================================
// Lue depuis l'environnement (après chargement d'un éventuel fichier .env)
//
// Variables :
// - COINMELT_GOLD_URL / COINMELT_SILVER_URL : endpoints des prix spot
// - COINMELT_CATALOG : chemin ou URL http(s) du catalogue (défaut : intégré)
// - COINMELT_CURRENCY : devise initiale (défaut : USD)
// - COINMELT_LOCALE : format des montants (défaut : LC_ALL / LC_MONETARY / LANG)
// - COINMELT_STORE : fichier des quantités
// - COINMELT_LOG_DIR : répertoire des logs
// - COINMELT_FETCH_TIMEOUT_SECS : timeout HTTP (défaut : aucun)
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use crate::api::{CatalogSource, SpotEndpoints};
use crate::errors::ConfigError;
use crate::models::{Currency, Locale};

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Nom du répertoire de l'application dans le dossier de données
const APP_DIR: &str = "coinmelt";

/// Configuration de l'application
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoints: SpotEndpoints,
    pub catalog: CatalogSource,
    pub currency: Currency,
    pub locale: Locale,
    pub store_path: PathBuf,
    pub log_dir: PathBuf,
    pub fetch_timeout: Option<Duration>,
}

impl Config {
    /// Charge la configuration depuis .env et l'environnement
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Pas d'erreur si .env n'existe pas
        Self::from_lookup(|key| std::env::var(key).ok(), dirs::data_local_dir())
    }

    /// Construit la configuration à partir d'une fonction de lecture
    ///
    /// `data_dir` est le dossier de données de l'utilisateur (None si inconnu).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>, data_dir: Option<PathBuf>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let app_dir = data_dir.map(|dir| dir.join(APP_DIR));

        let defaults = SpotEndpoints::default();
        let endpoints = SpotEndpoints {
            gold: get("COINMELT_GOLD_URL").unwrap_or(defaults.gold),
            silver: get("COINMELT_SILVER_URL").unwrap_or(defaults.silver),
        };

        let catalog = get("COINMELT_CATALOG")
            .map(|value| CatalogSource::parse(&value))
            .unwrap_or_default();

        let currency = match get("COINMELT_CURRENCY") {
            Some(value) => value.parse::<Currency>().map_err(|reason| ConfigError::InvalidValue {
                key: "COINMELT_CURRENCY",
                reason,
            })?,
            None => Currency::default(),
        };

        // COINMELT_LOCALE doit être reconnue, la locale système retombe sur en-US
        let locale = match get("COINMELT_LOCALE") {
            Some(value) => Locale::parse(&value).ok_or_else(|| ConfigError::InvalidValue {
                key: "COINMELT_LOCALE",
                reason: format!("{:?} is not a supported locale", value),
            })?,
            None => Locale::from_lookup(&lookup),
        };

        let store_path = match get("COINMELT_STORE") {
            Some(path) => PathBuf::from(path),
            None => app_dir
                .as_ref()
                .map(|dir| dir.join("store.json"))
                .ok_or(ConfigError::NoDataDir)?,
        };

        let log_dir = get("COINMELT_LOG_DIR")
            .map(PathBuf::from)
            .or_else(|| app_dir.as_ref().map(|dir| dir.join("logs")))
            .unwrap_or_else(|| PathBuf::from("./logs"));

        let fetch_timeout = match get("COINMELT_FETCH_TIMEOUT_SECS") {
            Some(value) => Some(parse_timeout(&value)?),
            None => None,
        };

        let config = Self {
            endpoints,
            catalog,
            currency,
            locale,
            store_path,
            log_dir,
            fetch_timeout,
        };
        config.validate()?;
        Ok(config)
    }

    /// Valide les valeurs de configuration
    fn validate(&self) -> Result<()> {
        for (key, url) in [
            ("COINMELT_GOLD_URL", &self.endpoints.gold),
            ("COINMELT_SILVER_URL", &self.endpoints.silver),
        ] {
            if !is_http_url(url) {
                return Err(ConfigError::InvalidValue {
                    key,
                    reason: format!("{:?} is not an http(s) URL", url),
                });
            }
        }
        Ok(())
    }
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

fn parse_timeout(value: &str) -> Result<Duration> {
    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::InvalidValue {
            key: "COINMELT_FETCH_TIMEOUT_SECS",
            reason: format!("{:?} must be a positive number of seconds", value),
        }),
    }
}
