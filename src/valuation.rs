// ============================================================================
// Valorisation : valeur de fonte des pièces
// ============================================================================
// Fonctions pures : (pièce, prix spot) -> valeur, puis formatage
//
// CONCEPT : Option plutôt que 0
// - Un métal sans prix donne None, affiché "—"
// - 0 ferait passer une pièce non valorisée pour une pièce sans valeur
// ============================================================================

use crate::models::{Coin, Currency, Locale, SpotState, TROY_OZ_TO_G};

/// Texte affiché pour une valeur inconnue
pub const PLACEHOLDER: &str = "—";

/// Prix par gramme à partir du prix par once troy
pub fn per_gram(per_ozt: f64) -> f64 {
    per_ozt / TROY_OZ_TO_G
}

/// Valeur de fonte : grammes purs × quantité × prix par gramme
///
/// None tant que le métal de la pièce n'a pas de prix.
pub fn melt_value(coin: &Coin, spot: &SpotState) -> Option<f64> {
    let per_gram = spot.get(coin.metal).per_gram?;
    Some(coin.fine_grams * f64::from(coin.qty) * per_gram)
}

/// Formate un montant dans la devise et la locale de l'utilisateur
///
/// EnUs : "$1,234.56", "¥1,235". FrFr : "1 234,56 €". DeDe : "1.234,56 €".
/// None, NaN ou infini donnent le placeholder au lieu de paniquer.
pub fn format_money(value: Option<f64>, currency: Currency, locale: Locale) -> String {
    let value = match value {
        Some(v) if v.is_finite() => v,
        _ => return PLACEHOLDER.to_string(),
    };

    let rounded = format!("{:.*}", currency.minor_digits(), value.abs());
    let is_zero = rounded.chars().all(|c| matches!(c, '0' | '.'));
    let sign = if value < 0.0 && !is_zero { "-" } else { "" };

    let amount = group_thousands(&rounded, locale);
    format!("{}{}", sign, locale.place_symbol(currency.symbol(), &amount))
}

/// Formate des grammes avec 3 décimales : "31.104"
pub fn format_grams(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{:.3}", v),
        _ => PLACEHOLDER.to_string(),
    }
}

/// Insère les séparateurs de la locale dans un nombre déjà arrondi ("1234.5")
fn group_thousands(rounded: &str, locale: Locale) -> String {
    let (int_part, frac_part) = match rounded.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rounded, None),
    };

    let mut grouped = String::with_capacity(rounded.len() + int_part.len() / 3 * 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(locale.group_separator());
        }
        grouped.push(c);
    }

    if let Some(frac_part) = frac_part {
        grouped.push(locale.decimal_separator());
        grouped.push_str(frac_part);
    }
    grouped
}

// ============================================================================
// Tests unitaires
// ============================================================================
