// ============================================================================
// Module : api
// ============================================================================
// Sources de données externes : catalogue des pièces et prix spot
// ============================================================================

pub mod catalog; // Catalogue des pièces (intégré, fichier ou URL)
pub mod spot;    // Prix spot or/argent

#[cfg(test)]
pub(crate) mod test_server;

// Re-export des fonctions principales
pub use catalog::{load_catalog, CatalogSource};
pub use spot::{build_client, fetch_spot, refresh_prices, SpotEndpoints, SpotQuotes};
