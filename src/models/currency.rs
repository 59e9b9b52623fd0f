// ============================================================================
// Enum : Currency
// ============================================================================
// Devise d'affichage choisie par l'utilisateur
//
// IMPORTANT : la devise ne pilote que le formatage. Aucun taux de change
// n'est appliqué, le prix spot est supposé déjà exprimé dans cette devise.
// ============================================================================

use std::fmt;
use std::str::FromStr;

/// Devises proposées dans le sélecteur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
    Cad,
    Aud,
    Chf,
    Jpy,
}

impl Currency {
    /// Ordre du sélecteur (touches 'c' / 'C')
    pub const ALL: [Currency; 7] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Cad,
        Currency::Aud,
        Currency::Chf,
        Currency::Jpy,
    ];

    /// Code ISO 4217
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Cad => "CAD",
            Currency::Aud => "AUD",
            Currency::Chf => "CHF",
            Currency::Jpy => "JPY",
        }
    }

    /// Symbole placé devant le montant
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Gbp => "£",
            Currency::Cad => "CA$",
            Currency::Aud => "A$",
            Currency::Chf => "CHF ",
            Currency::Jpy => "¥",
        }
    }

    /// Nombre de décimales (unité mineure ISO 4217)
    pub fn minor_digits(&self) -> usize {
        match self {
            Currency::Jpy => 0,
            _ => 2,
        }
    }

    /// Devise suivante dans le sélecteur (boucle)
    pub fn next(&self) -> Self {
        let index = self.position();
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    /// Devise précédente dans le sélecteur (boucle)
    pub fn previous(&self) -> Self {
        let index = self.position();
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    fn position(&self) -> usize {
        Self::ALL.iter().position(|c| c == self).unwrap_or(0)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Parse un code de devise ("usd", "EUR", ...)
impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.code() == code)
            .ok_or_else(|| format!("unsupported currency: {}", s))
    }
}
