// ============================================================================
// Structure : Coin
// ============================================================================
// Représente une pièce du catalogue (or ou argent) avec la quantité détenue
//
// CONCEPTS RUST :
// 1. Enums sérialisés : Metal <-> "gold" / "silver" grâce à serde
// 2. Copy : Metal et MetalFilter sont de simples tags, copiés sans coût
// 3. Clé d'identité : (métal, nom) formatée en "gold::Krugerrand"
// ============================================================================

use serde::{Deserialize, Serialize};

/// Quantité utilisée quand aucune valeur n'a été sauvegardée
pub const DEFAULT_QTY: u32 = 1;

/// Métal précieux contenu dans une pièce
///
/// CONCEPT RUST : #[serde(rename_all = "lowercase")]
/// - Gold <-> "gold", Silver <-> "silver" dans le JSON du catalogue
/// - Toute autre valeur fait échouer la désérialisation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metal {
    Gold,
    Silver,
}

impl Metal {
    /// Identifiant utilisé dans les clés de persistance et les logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Metal::Gold => "gold",
            Metal::Silver => "silver",
        }
    }

    /// Libellé pour l'affichage
    pub fn label(&self) -> &'static str {
        match self {
            Metal::Gold => "Gold",
            Metal::Silver => "Silver",
        }
    }
}

/// Filtre d'affichage par métal
///
/// CONCEPT : Cycle d'états (comme les intervalles d'un graphique)
/// - All → Gold → Silver → All
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetalFilter {
    #[default]
    All,
    Gold,
    Silver,
}

impl MetalFilter {
    /// Vérifie si un métal passe le filtre
    pub fn accepts(&self, metal: Metal) -> bool {
        match self {
            MetalFilter::All => true,
            MetalFilter::Gold => metal == Metal::Gold,
            MetalFilter::Silver => metal == Metal::Silver,
        }
    }

    /// Filtre suivant (touche 'f')
    pub fn next(&self) -> Self {
        match self {
            MetalFilter::All => MetalFilter::Gold,
            MetalFilter::Gold => MetalFilter::Silver,
            MetalFilter::Silver => MetalFilter::All,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MetalFilter::All => "All",
            MetalFilter::Gold => "Gold",
            MetalFilter::Silver => "Silver",
        }
    }
}

/// Une pièce du catalogue avec la quantité détenue
#[derive(Debug, Clone, PartialEq)]
pub struct Coin {
    /// Nom affiché (ex: "Krugerrand")
    pub name: String,

    /// Métal de la pièce
    pub metal: Metal,

    /// Grammes de métal pur (toujours > 0)
    pub fine_grams: f64,

    /// Nombre de pièces détenues, modifiable par l'utilisateur
    pub qty: u32,
}

impl Coin {
    /// Crée une pièce avec la quantité par défaut (1)
    pub fn new(name: impl Into<String>, metal: Metal, fine_grams: f64) -> Self {
        Self {
            name: name.into(),
            metal,
            fine_grams,
            qty: DEFAULT_QTY,
        }
    }

    /// Clé d'identité pour la persistance : "<metal>::<name>"
    ///
    /// Deux pièces avec le même couple (métal, nom) partagent la même clé,
    /// donc la même quantité sauvegardée.
    pub fn key(&self) -> String {
        coin_key(self.metal, &self.name)
    }
}

/// Construit la clé de persistance d'une pièce
pub fn coin_key(metal: Metal, name: &str) -> String {
    format!("{}::{}", metal.as_str(), name)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coin_key_format() {
        let coin = Coin::new("Krugerrand", Metal::Gold, 31.1035);
        assert_eq!(coin.key(), "gold::Krugerrand");
        assert_eq!(coin.qty, DEFAULT_QTY);
    }

    #[test]
    fn test_metal_serde_lowercase() {
        let metal: Metal = serde_json::from_str("\"silver\"").unwrap();
        assert_eq!(metal, Metal::Silver);
        assert_eq!(serde_json::to_string(&Metal::Gold).unwrap(), "\"gold\"");
        assert!(serde_json::from_str::<Metal>("\"platinum\"").is_err());
    }

    #[test]
    fn test_filter_cycle() {
        let filter = MetalFilter::default();
        assert_eq!(filter, MetalFilter::All);
        assert_eq!(filter.next(), MetalFilter::Gold);
        assert_eq!(filter.next().next(), MetalFilter::Silver);
        assert_eq!(filter.next().next().next(), MetalFilter::All);
    }

    #[test]
    fn test_filter_accepts() {
        assert!(MetalFilter::All.accepts(Metal::Gold));
        assert!(MetalFilter::All.accepts(Metal::Silver));
        assert!(MetalFilter::Gold.accepts(Metal::Gold));
        assert!(!MetalFilter::Gold.accepts(Metal::Silver));
        assert!(!MetalFilter::Silver.accepts(Metal::Gold));
    }
}
