// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
//
// CONCEPT RUST : Modules et visibilité
// - "pub mod" : déclare un sous-module public (accessible depuis l'extérieur)
// - Sans "pub", le module serait privé au crate
// ============================================================================

pub mod coin;     // Pièces du catalogue, métal, filtre
pub mod currency; // Devise d'affichage
pub mod locale;   // Conventions de formatage des montants
pub mod spot;     // Prix spot par once troy / par gramme

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use coinmelt::models::coin::Coin;
// On peut faire : use coinmelt::models::Coin;
pub use coin::{coin_key, Coin, Metal, MetalFilter, DEFAULT_QTY};
pub use currency::Currency;
pub use locale::Locale;
pub use spot::{SpotPrice, SpotState, TROY_OZ_TO_G};
