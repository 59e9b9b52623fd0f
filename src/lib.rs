// ============================================================================
// CoinMelt - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests
// ============================================================================

pub mod api;       // Catalogue des pièces et prix spot
pub mod app;       // État de l'application
pub mod config;    // Configuration (environnement / .env)
pub mod errors;    // Erreurs typées
pub mod models;    // Structures de données
pub mod storage;   // Persistance des quantités
pub mod ui;        // Interface utilisateur
pub mod valuation; // Valeur de fonte et formatage
