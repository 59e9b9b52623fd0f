// ============================================================================
// Structure : SpotPrice / SpotState
// ============================================================================
// Prix spot d'un métal : par once troy et dérivé par gramme
//
// CONCEPT RUST : Option<f64>
// - None tant que le premier fetch n'a pas réussi
// - Les deux champs sont toujours renseignés ensemble (from_ozt)
// ============================================================================

use crate::models::Metal;

/// Grammes dans une once troy
pub const TROY_OZ_TO_G: f64 = 31.1034768;

/// Prix spot d'un métal
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpotPrice {
    /// Prix par once troy dans la devise de référence
    pub per_ozt: Option<f64>,

    /// Prix par gramme = per_ozt / TROY_OZ_TO_G
    pub per_gram: Option<f64>,
}

impl SpotPrice {
    /// Construit un prix complet à partir du prix par once troy
    pub fn from_ozt(per_ozt: f64) -> Self {
        Self {
            per_ozt: Some(per_ozt),
            per_gram: Some(per_ozt / TROY_OZ_TO_G),
        }
    }

    pub fn is_priced(&self) -> bool {
        self.per_gram.is_some()
    }
}

/// Prix spot des deux métaux
///
/// Remplacé en bloc à chaque rafraîchissement réussi, jamais métal par métal.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpotState {
    pub gold: SpotPrice,
    pub silver: SpotPrice,
}

impl SpotState {
    /// État initial : aucun prix connu
    pub fn new() -> Self {
        Self::default()
    }

    /// Construit l'état à partir des deux prix par once troy
    pub fn from_quotes(gold_ozt: f64, silver_ozt: f64) -> Self {
        Self {
            gold: SpotPrice::from_ozt(gold_ozt),
            silver: SpotPrice::from_ozt(silver_ozt),
        }
    }

    /// Retourne le prix du métal demandé
    pub fn get(&self, metal: Metal) -> &SpotPrice {
        match metal {
            Metal::Gold => &self.gold,
            Metal::Silver => &self.silver,
        }
    }

    /// Vrai dès qu'un rafraîchissement complet a réussi
    pub fn is_priced(&self) -> bool {
        self.gold.is_priced() && self.silver.is_priced()
    }
}
