// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
// 3. Ownership : App possède le catalogue, les prix et le stockage
//
// PATTERN : "Application State"
// - Le rendu lit App via view() (vue déclarative)
// - Toutes les modifications passent par les méthodes de App
// - Seule la boucle UI touche App : pas de Mutex nécessaire
// ============================================================================

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::api::SpotQuotes;
use crate::models::{Coin, Currency, Locale, MetalFilter, SpotState};
use crate::storage::QuantityStore;
use crate::ui::view::{build_view, visible_coins, DashboardView};

/// Format de l'horodatage "dernière mise à jour" (heure locale)
pub const LAST_UPDATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// Enum : Screen
// ============================================================================

/// Écrans de l'application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale : tableau des pièces
    Dashboard,

    /// Saisie de la quantité de la pièce sélectionnée
    /// CONCEPT : Modal input mode (Vim-like)
    /// - Chaque touche applique immédiatement la nouvelle quantité
    /// - Enter ou ESC ferme la saisie
    EditQuantity,

    /// Alerte bloquante (erreur de rafraîchissement)
    /// - Les autres touches sont ignorées tant qu'elle n'est pas fermée
    Alert,
}

/// Étape du cycle de vie des prix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricePhase {
    /// Catalogue chargé, premier prix pas encore reçu
    AwaitingPrices,

    /// Au moins un rafraîchissement complet a réussi
    Priced,
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Catalogue des pièces avec les quantités détenues
    pub coins: Vec<Coin>,

    /// Prix spot courants (remplacés en bloc)
    pub spot: SpotState,

    /// Devise d'affichage
    pub currency: Currency,

    /// Conventions de formatage des montants (séparateurs, position du symbole)
    pub locale: Locale,

    /// Filtre par métal
    pub filter: MetalFilter,

    /// Index de la ligne sélectionnée parmi les lignes visibles
    pub selected_index: usize,

    /// Écran actuellement affiché
    pub current_screen: Screen,

    /// Two-step quit : première pression de 'q' = confirmation demandée
    pub confirm_quit: bool,

    /// Un rafraîchissement des prix est en cours
    /// CONCEPT : In-flight guard
    /// - Un seul rafraîchissement à la fois, les demandes suivantes sont ignorées
    pub is_loading: bool,

    /// Message de chargement optionnel
    pub loading_message: Option<String>,

    /// Buffer de saisie de la quantité
    pub input_buffer: String,

    /// Message de l'alerte affichée (Screen::Alert)
    pub alert_message: Option<String>,

    /// Horodatage formaté du dernier rafraîchissement réussi
    pub last_updated: Option<String>,

    /// Le worker thread a disparu (signalé une seule fois)
    worker_gone: bool,

    /// Persistance des quantités
    store: QuantityStore,
}

impl App {
    /// Crée l'application avec le catalogue déjà chargé
    pub fn new(coins: Vec<Coin>, store: QuantityStore, currency: Currency, locale: Locale) -> Self {
        Self {
            running: true,
            coins,
            spot: SpotState::new(),
            currency,
            locale,
            filter: MetalFilter::default(),
            selected_index: 0,
            current_screen: Screen::Dashboard,
            confirm_quit: false,
            is_loading: false,
            loading_message: None,
            input_buffer: String::new(),
            alert_message: None,
            last_updated: None,
            worker_gone: false,
            store,
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Vue déclarative de l'état courant (rendu complet à chaque frame)
    pub fn view(&self) -> DashboardView {
        build_view(
            &self.coins,
            &self.spot,
            self.currency,
            self.locale,
            self.filter,
            self.last_updated.as_deref(),
        )
    }

    /// Étape du cycle de vie des prix
    pub fn price_phase(&self) -> PricePhase {
        if self.spot.is_priced() {
            PricePhase::Priced
        } else {
            PricePhase::AwaitingPrices
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    fn visible_len(&self) -> usize {
        visible_coins(&self.coins, self.filter).len()
    }

    /// Navigue vers le haut dans le tableau
    pub fn navigate_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    /// Navigue vers le bas dans le tableau
    pub fn navigate_down(&mut self) {
        let max_index = self.visible_len().saturating_sub(1);
        self.selected_index = (self.selected_index + 1).min(max_index);
    }

    /// Index dans le catalogue de la pièce sélectionnée
    pub fn selected_coin_index(&self) -> Option<usize> {
        visible_coins(&self.coins, self.filter)
            .get(self.selected_index)
            .copied()
    }

    /// Pièce sélectionnée
    pub fn selected_coin(&self) -> Option<&Coin> {
        self.selected_coin_index().map(|index| &self.coins[index])
    }

    // ========================================================================
    // Sélecteurs : devise et filtre
    // ========================================================================

    pub fn next_currency(&mut self) {
        self.currency = self.currency.next();
    }

    pub fn previous_currency(&mut self) {
        self.currency = self.currency.previous();
    }

    /// Passe au filtre suivant et garde la sélection dans les bornes
    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
        let max_index = self.visible_len().saturating_sub(1);
        self.selected_index = self.selected_index.min(max_index);
    }

    // ========================================================================
    // Quantités
    // ========================================================================

    /// Applique une saisie de quantité à une pièce
    ///
    /// 1. Normalise la saisie (entier positif, 0 si invalide)
    /// 2. Met à jour la pièce en mémoire
    /// 3. Sauvegarde la table complète des quantités
    ///
    /// Le rendu suivant reflète immédiatement la nouvelle valeur.
    pub fn set_quantity(&mut self, coin_index: usize, raw: &str) -> Option<u32> {
        let qty = parse_quantity(raw);
        let coin = self.coins.get_mut(coin_index)?;
        coin.qty = qty;
        let key = coin.key();
        self.store.set_quantity(&key, qty);
        debug!(key = %key, qty, "Quantity updated");
        Some(qty)
    }

    /// Ouvre la saisie de quantité pour la pièce sélectionnée
    pub fn start_edit(&mut self) {
        if let Some(coin) = self.selected_coin() {
            self.input_buffer = coin.qty.to_string();
            self.current_screen = Screen::EditQuantity;
        }
    }

    /// Ajoute un chiffre à la saisie et l'applique
    pub fn append_char(&mut self, c: char) {
        self.input_buffer.push(c);
        self.apply_input();
    }

    /// Supprime le dernier caractère et applique la saisie
    pub fn backspace(&mut self) {
        self.input_buffer.pop();
        self.apply_input();
    }

    /// Ferme la saisie (la quantité est déjà appliquée)
    pub fn finish_edit(&mut self) {
        self.current_screen = Screen::Dashboard;
        self.input_buffer.clear();
    }

    /// Vérifie si on est en saisie de quantité
    pub fn is_editing(&self) -> bool {
        self.current_screen == Screen::EditQuantity
    }

    fn apply_input(&mut self) {
        if let Some(index) = self.selected_coin_index() {
            let raw = self.input_buffer.clone();
            self.set_quantity(index, &raw);
        }
    }

    // ========================================================================
    // Rafraîchissement des prix
    // ========================================================================

    /// Démarre un rafraîchissement si aucun n'est en cours
    ///
    /// Retourne false si un rafraîchissement est déjà en vol : les demandes
    /// concurrentes ne sont pas empilées.
    pub fn begin_refresh(&mut self) -> bool {
        if self.is_loading {
            debug!("Refresh already in flight, ignoring request");
            return false;
        }
        self.is_loading = true;
        self.loading_message = Some("Refreshing spot prices...".to_string());
        true
    }

    /// Applique les deux prix d'un rafraîchissement réussi
    pub fn apply_quotes(&mut self, quotes: SpotQuotes, at: DateTime<Local>) {
        self.spot = SpotState::from_quotes(quotes.gold_ozt, quotes.silver_ozt);
        self.last_updated = Some(at.format(LAST_UPDATED_FORMAT).to_string());
        self.stop_loading();
        info!(gold = quotes.gold_ozt, silver = quotes.silver_ozt, "Spot prices applied");
    }

    /// Échec d'un rafraîchissement : prix inchangés, alerte affichée
    pub fn refresh_failed(&mut self, message: String) {
        self.stop_loading();
        warn!(error = %message, "Refresh failed, keeping previous prices");
        self.show_alert(message);
    }

    /// Le worker thread ne répond plus
    ///
    /// Seul le premier appel affiche l'alerte et retourne vrai : la boucle
    /// UI le constate à chaque tick.
    pub fn mark_worker_gone(&mut self) -> bool {
        if self.worker_gone {
            return false;
        }
        self.worker_gone = true;
        self.refresh_failed("Background worker stopped: prices can no longer be refreshed".to_string());
        true
    }

    fn stop_loading(&mut self) {
        self.is_loading = false;
        self.loading_message = None;
    }

    /// Vérifie si des données sont en cours de chargement
    pub fn is_loading_data(&self) -> bool {
        self.is_loading
    }

    // ========================================================================
    // Alerte
    // ========================================================================

    /// Affiche une alerte bloquante
    pub fn show_alert(&mut self, message: String) {
        self.input_buffer.clear();
        self.alert_message = Some(message);
        self.current_screen = Screen::Alert;
    }

    /// Ferme l'alerte et revient au tableau
    pub fn dismiss_alert(&mut self) {
        self.alert_message = None;
        self.current_screen = Screen::Dashboard;
    }

    pub fn is_showing_alert(&self) -> bool {
        self.current_screen == Screen::Alert
    }

    // ========================================================================
    // Two-step quit
    // ========================================================================

    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }
}

/// Normalise une saisie de quantité en entier positif
///
/// - Lit le préfixe entier ("12abc" -> 12, "3.7" -> 3)
/// - Vide, invalide ou négatif -> 0
/// - Trop grand -> u32::MAX
pub fn parse_quantity(raw: &str) -> u32 {
    let trimmed = raw.trim_start();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let digits: String = digits.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() || negative {
        return 0;
    }

    digits.parse::<u32>().unwrap_or(u32::MAX)
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metal;
    use crate::storage::{MemoryStore, QTY_STORAGE_KEY};
    use crate::storage::{JsonFileStore, KeyValueStore};
    use chrono::TimeZone;

    fn coins() -> Vec<Coin> {
        vec![
            Coin::new("Krugerrand", Metal::Gold, 31.1035),
            Coin::new("Silver Eagle", Metal::Silver, 31.103),
            Coin::new("Sovereign", Metal::Gold, 7.3224),
        ]
    }

    fn app() -> App {
        App::new(coins(), QuantityStore::new(Box::new(MemoryStore::new())), Currency::Usd, Locale::EnUs)
    }

    fn quotes() -> SpotQuotes {
        SpotQuotes {
            gold_ozt: 2000.0,
            silver_ozt: 25.0,
        }
    }

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_quantity_clamps() {
        assert_eq!(parse_quantity(""), 0);
        assert_eq!(parse_quantity("abc"), 0);
        assert_eq!(parse_quantity("-5"), 0);
        assert_eq!(parse_quantity("-0"), 0);
        assert_eq!(parse_quantity("7"), 7);
        assert_eq!(parse_quantity("  12abc"), 12);
        assert_eq!(parse_quantity("3.7"), 3);
        assert_eq!(parse_quantity("+4"), 4);
        assert_eq!(parse_quantity("99999999999999"), u32::MAX);
    }

    #[test]
    fn test_app_starts_awaiting_prices() {
        let app = app();
        assert!(app.is_running());
        assert_eq!(app.price_phase(), PricePhase::AwaitingPrices);
        assert_eq!(app.current_screen, Screen::Dashboard);
    }

    #[test]
    fn test_apply_quotes_prices_the_page() {
        let mut app = app();
        assert!(app.begin_refresh());
        app.apply_quotes(quotes(), noon());

        assert_eq!(app.price_phase(), PricePhase::Priced);
        assert!(!app.is_loading_data());
        assert_eq!(app.last_updated.as_deref(), Some("2026-10-17 12:00:00"));
        assert_eq!(app.spot, SpotState::from_quotes(2000.0, 25.0));
    }

    #[test]
    fn test_failed_refresh_keeps_previous_prices() {
        let mut app = app();
        app.begin_refresh();
        app.apply_quotes(quotes(), noon());
        let before = app.spot;
        let updated_before = app.last_updated.clone();

        assert!(app.begin_refresh());
        app.refresh_failed("Silver price refresh failed: HTTP 500".to_string());

        assert_eq!(app.spot, before);
        assert_eq!(app.last_updated, updated_before);
        assert!(app.is_showing_alert());
        assert!(!app.is_loading_data());
        assert_eq!(app.price_phase(), PricePhase::Priced);

        app.dismiss_alert();
        assert_eq!(app.current_screen, Screen::Dashboard);
        assert!(app.alert_message.is_none());
    }

    #[test]
    fn test_refresh_in_flight_guard() {
        let mut app = app();
        assert!(app.begin_refresh());
        assert!(!app.begin_refresh());
        app.apply_quotes(quotes(), noon());
        assert!(app.begin_refresh());
    }

    #[test]
    fn test_navigation_follows_filter() {
        let mut app = app();
        // Ordre visible : Silver Eagle, Krugerrand, Sovereign
        assert_eq!(app.selected_coin().unwrap().name, "Silver Eagle");

        app.navigate_down();
        app.navigate_down();
        app.navigate_down();
        assert_eq!(app.selected_index, 2);
        assert_eq!(app.selected_coin().unwrap().name, "Sovereign");

        // Filtre Gold : 2 lignes, la sélection reste dans les bornes
        app.cycle_filter();
        assert_eq!(app.filter, MetalFilter::Gold);
        assert_eq!(app.selected_index, 1);

        // Filtre Silver : 1 ligne
        app.cycle_filter();
        assert_eq!(app.selected_index, 0);
        assert_eq!(app.selected_coin().unwrap().name, "Silver Eagle");

        app.navigate_up();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_edit_applies_each_keystroke() {
        let mut app = app();
        app.apply_quotes(quotes(), noon());
        app.cycle_filter(); // Gold : Krugerrand sélectionné

        app.start_edit();
        assert!(app.is_editing());
        assert_eq!(app.input_buffer, "1");

        app.backspace();
        assert_eq!(app.coins[0].qty, 0);
        assert_eq!(app.view().rows[0].melt, "$0.00");

        app.append_char('3');
        assert_eq!(app.coins[0].qty, 3);
        let melt = &app.view().rows[0].melt;
        assert!(melt == "$6,000.00" || melt == "$6,000.01");

        app.finish_edit();
        assert!(!app.is_editing());
        assert!(app.input_buffer.is_empty());
    }

    #[test]
    fn test_set_quantity_persists_full_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let mut app = App::new(
            coins(),
            QuantityStore::new(Box::new(JsonFileStore::new(&path))),
            Currency::Usd,
            Locale::EnUs,
        );
        assert_eq!(app.set_quantity(0, "4"), Some(4));
        assert_eq!(app.set_quantity(1, "-2"), Some(0));
        assert_eq!(app.set_quantity(42, "1"), None);

        let raw = JsonFileStore::new(&path).get(QTY_STORAGE_KEY).unwrap().unwrap();
        let saved: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(saved["gold::Krugerrand"], 4);
        assert_eq!(saved["silver::Silver Eagle"], 0);
    }

    #[test]
    fn test_currency_selector() {
        let mut app = app();
        app.next_currency();
        assert_eq!(app.currency, Currency::Eur);
        app.previous_currency();
        app.previous_currency();
        assert_eq!(app.currency, Currency::Jpy);
    }

    #[test]
    fn test_two_step_quit() {
        let mut app = app();
        app.request_quit();
        assert!(app.is_awaiting_quit_confirmation());
        app.cancel_quit();
        assert!(!app.is_awaiting_quit_confirmation());
        app.quit();
        assert!(!app.is_running());
    }

    #[test]
    fn test_worker_gone_is_reported_once() {
        let mut app = app();
        assert!(app.begin_refresh());

        assert!(app.mark_worker_gone());
        assert!(app.is_showing_alert());
        assert!(!app.is_loading_data());

        app.dismiss_alert();
        assert!(!app.mark_worker_gone());
        assert!(!app.mark_worker_gone());
        assert!(!app.is_showing_alert());
    }
}
