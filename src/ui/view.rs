// ============================================================================
// Vue déclarative du tableau de bord
// ============================================================================
// (catalogue, prix spot, devise, filtre) -> DashboardView
//
// CONCEPT : séparer le calcul de l'affichage
// - build_view() ne connaît pas ratatui : testable sans terminal
// - dashboard.rs applique la vue aux widgets
// ============================================================================

use crate::models::{Coin, Currency, Locale, Metal, MetalFilter, SpotPrice, SpotState};
use crate::valuation::{format_grams, format_money, melt_value, PLACEHOLDER};

/// Ordre des sections du tableau : argent puis or
pub const SECTION_ORDER: [Metal; 2] = [Metal::Silver, Metal::Gold];

/// Prix spot d'un métal, déjà formatés
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotView {
    pub per_ozt: String,
    pub per_gram: String,
}

/// En-tête : prix spot, dernière mise à jour, sélecteurs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderView {
    pub gold: SpotView,
    pub silver: SpotView,
    pub last_updated: String,
    pub currency: Currency,
    pub locale: Locale,
    pub filter: MetalFilter,
}

/// Une ligne du tableau
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    /// Index de la pièce dans le catalogue (pour l'édition)
    pub coin_index: usize,
    pub name: String,
    pub metal: Metal,
    pub fine_grams: String,
    pub qty: u32,
    pub melt: String,
    /// Faux tant que le métal n'a pas de prix
    pub priced: bool,
}

/// Vue complète du tableau de bord
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardView {
    pub header: HeaderView,
    pub rows: Vec<RowView>,
}

/// Index des pièces visibles, dans l'ordre d'affichage
///
/// Sections argent puis or, ordre du catalogue à l'intérieur de chaque section.
pub fn visible_coins(coins: &[Coin], filter: MetalFilter) -> Vec<usize> {
    SECTION_ORDER
        .iter()
        .filter(|metal| filter.accepts(**metal))
        .flat_map(|metal| {
            coins
                .iter()
                .enumerate()
                .filter(move |(_, coin)| coin.metal == *metal)
                .map(|(index, _)| index)
        })
        .collect()
}

/// Construit la vue à afficher
pub fn build_view(
    coins: &[Coin],
    spot: &SpotState,
    currency: Currency,
    locale: Locale,
    filter: MetalFilter,
    last_updated: Option<&str>,
) -> DashboardView {
    let header = HeaderView {
        gold: spot_view(&spot.gold, currency, locale),
        silver: spot_view(&spot.silver, currency, locale),
        last_updated: last_updated.unwrap_or(PLACEHOLDER).to_string(),
        currency,
        locale,
        filter,
    };

    let rows = visible_coins(coins, filter)
        .into_iter()
        .map(|index| {
            let coin = &coins[index];
            let melt = melt_value(coin, spot);
            RowView {
                coin_index: index,
                name: coin.name.clone(),
                metal: coin.metal,
                fine_grams: format_grams(Some(coin.fine_grams)),
                qty: coin.qty,
                melt: format_money(melt, currency, locale),
                priced: melt.is_some(),
            }
        })
        .collect();

    DashboardView { header, rows }
}

fn spot_view(price: &SpotPrice, currency: Currency, locale: Locale) -> SpotView {
    SpotView {
        per_ozt: format_money(price.per_ozt, currency, locale),
        per_gram: format_money(price.per_gram, currency, locale),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<Coin> {
        vec![
            Coin::new("Krugerrand", Metal::Gold, 31.1035),
            Coin::new("Silver Eagle", Metal::Silver, 31.103),
            Coin::new("Sovereign", Metal::Gold, 7.3224),
            Coin::new("Dime", Metal::Silver, 2.25),
        ]
    }

    #[test]
    fn test_visible_coins_sections() {
        let coins = catalog();
        assert_eq!(visible_coins(&coins, MetalFilter::All), vec![1, 3, 0, 2]);
        assert_eq!(visible_coins(&coins, MetalFilter::Gold), vec![0, 2]);
        assert_eq!(visible_coins(&coins, MetalFilter::Silver), vec![1, 3]);
    }

    #[test]
    fn test_unpriced_view_uses_placeholders() {
        let view = build_view(&catalog(), &SpotState::new(), Currency::Usd, Locale::EnUs, MetalFilter::All, None);
        assert_eq!(view.header.gold.per_ozt, PLACEHOLDER);
        assert_eq!(view.header.silver.per_gram, PLACEHOLDER);
        assert_eq!(view.header.last_updated, PLACEHOLDER);
        assert_eq!(view.rows.len(), 4);
        for row in &view.rows {
            assert_eq!(row.melt, PLACEHOLDER);
            assert!(!row.priced);
        }
    }

    #[test]
    fn test_priced_view() {
        let spot = SpotState::from_quotes(2000.0, 25.0);
        let view = build_view(&catalog(), &spot, Currency::Usd, Locale::EnUs, MetalFilter::Gold, Some("2026-10-17 10:00:00"));

        assert_eq!(view.header.gold.per_ozt, "$2,000.00");
        assert_eq!(view.header.gold.per_gram, "$64.30");
        assert_eq!(view.header.silver.per_ozt, "$25.00");
        assert_eq!(view.header.last_updated, "2026-10-17 10:00:00");

        assert_eq!(view.rows.len(), 2);
        let krugerrand = &view.rows[0];
        assert_eq!(krugerrand.name, "Krugerrand");
        assert_eq!(krugerrand.fine_grams, "31.104");
        assert_eq!(krugerrand.qty, 1);
        assert_eq!(krugerrand.melt, "$2,000.00");
        assert!(krugerrand.priced);
    }

    #[test]
    fn test_currency_changes_formatting_only() {
        let spot = SpotState::from_quotes(2000.0, 25.0);
        let view = build_view(&catalog(), &spot, Currency::Eur, Locale::EnUs, MetalFilter::Gold, None);
        assert_eq!(view.header.gold.per_ozt, "€2,000.00");
        assert_eq!(view.rows[0].melt, "€2,000.00");
    }

    #[test]
    fn test_locale_reaches_every_amount() {
        let spot = SpotState::from_quotes(2000.0, 25.0);
        let view = build_view(&catalog(), &spot, Currency::Eur, Locale::FrFr, MetalFilter::All, None);
        assert_eq!(view.header.locale, Locale::FrFr);
        assert_eq!(view.header.gold.per_ozt, "2\u{202f}000,00\u{a0}€");
        assert_eq!(view.header.silver.per_ozt, "25,00\u{a0}€");
        assert_eq!(view.rows[2].name, "Krugerrand");
        assert_eq!(view.rows[2].melt, "2\u{202f}000,00\u{a0}€");
        // Les grammes restent au format fixe
        assert_eq!(view.rows[2].fine_grams, "31.104");
    }
}
