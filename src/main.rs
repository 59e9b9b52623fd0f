// ============================================================================
// CoinMelt - Valeur de fonte de pièces d'or et d'argent
// ============================================================================
// Programme TUI : catalogue de pièces, quantités détenues, prix spot en direct
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère événements et rendering
// 3. Worker thread : les appels réseau ne bloquent jamais l'UI
// 4. Ownership : App appartient à la boucle UI, le worker ne fait que répondre
// ============================================================================

use std::io;
use std::sync::mpsc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use coinmelt::api::{build_client, load_catalog, refresh_prices, SpotEndpoints, SpotQuotes};
use coinmelt::app::App;
use coinmelt::config::Config;
use coinmelt::storage::{JsonFileStore, QuantityStore};
use coinmelt::ui::{events::EventHandler, render};

// ============================================================================
// AppCommand / AppResult : communication avec le worker thread
// ============================================================================

/// Commandes envoyées au worker thread
#[derive(Debug, Clone)]
enum AppCommand {
    /// Rafraîchir les prix or + argent
    RefreshPrices,
}

/// Résultats renvoyés par le worker thread
#[derive(Debug)]
enum AppResult {
    /// Les deux prix ont été récupérés
    PricesRefreshed(SpotQuotes),

    /// Au moins un des deux prix a échoué
    RefreshFailed(String),
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier avec rotation quotidienne
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/coinmelt/logs/coinmelt.log
/// RUST_LOG=coinmelt=trace cargo run
/// ```
fn init_logging(log_dir: &std::path::Path) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    std::fs::create_dir_all(log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "coinmelt.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coinmelt=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let config = Config::from_env().context("Configuration invalide")?;

    init_logging(&config.log_dir).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(?config, "CoinMelt starting up");

    let client = build_client(config.fetch_timeout).context("Échec de la création du client HTTP")?;
    let store = QuantityStore::new(Box::new(JsonFileStore::new(&config.store_path)));

    // Chargement du catalogue : une erreur ici est fatale
    println!("📊 Chargement du catalogue...");
    let runtime = tokio::runtime::Runtime::new()?;
    let coins = match runtime.block_on(load_catalog(&client, &config.catalog, &store)) {
        Ok(coins) => coins,
        Err(e) => {
            error!(error = ?e, "MAIN ERROR: catalog load failed");
            return Err(e).context("MAIN ERROR: impossible de charger le catalogue");
        }
    };
    // Le pool de connexions du client est lié à ce runtime : le worker aura le sien
    drop(client);
    drop(runtime);
    info!(coins = coins.len(), "Catalog ready");

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let mut app = App::new(coins, store, config.currency, config.locale);

    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    spawn_background_worker(command_rx, result_tx, config.fetch_timeout, config.endpoints.clone());

    // Premier chargement des prix
    request_refresh(&mut app, &command_tx);

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &command_tx, &result_rx);

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Background Worker Thread
// ============================================================================
// CONCEPT RUST : Background async worker avec channels
// - Thread séparé qui possède son propre runtime tokio
// - Reçoit des AppCommand, renvoie des AppResult
// - Ne touche jamais à App : seule la boucle UI modifie l'état
// ============================================================================

fn spawn_background_worker(
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
    fetch_timeout: Option<Duration>,
    endpoints: SpotEndpoints,
) {
    std::thread::spawn(move || {
        let setup = tokio::runtime::Runtime::new()
            .context("Failed to create worker runtime")
            .and_then(|runtime| {
                let client = build_client(fetch_timeout).context("Failed to create HTTP client")?;
                Ok((runtime, client))
            });

        let (runtime, client) = match setup {
            Ok(setup) => setup,
            Err(e) => {
                error!(error = ?e, "Worker setup failed");
                let _ = result_tx.send(AppResult::RefreshFailed(format!("Worker unavailable: {:#}", e)));
                return;
            }
        };

        // Channel fermé => recv() échoue => le worker s'arrête
        while let Ok(command) = command_rx.recv() {
            info!(?command, "Worker received command");

            match command {
                AppCommand::RefreshPrices => {
                    let result = runtime.block_on(refresh_prices(&client, &endpoints));

                    let message = match result {
                        Ok(quotes) => AppResult::PricesRefreshed(quotes),
                        Err(e) => {
                            error!(error = ?e, "Spot price refresh failed");
                            AppResult::RefreshFailed(e.to_string())
                        }
                    };
                    let _ = result_tx.send(message);
                }
            }
        }

        info!("Worker thread exiting (channel closed)");
    });
}

/// Envoie une demande de rafraîchissement si aucune n'est en cours
fn request_refresh(app: &mut App, command_tx: &mpsc::Sender<AppCommand>) {
    if app.begin_refresh() {
        info!("Requesting spot price refresh");
        if command_tx.send(AppCommand::RefreshPrices).is_err() {
            app.refresh_failed("Background worker is not running".to_string());
        }
    }
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Résultats du worker
//   1. Rendu complet
//   2. Événement clavier
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    command_tx: &mpsc::Sender<AppCommand>,
    result_rx: &mpsc::Receiver<AppResult>,
) -> Result<()> {
    while app.is_running() {
        // 0. RÉSULTATS : non bloquant
        match result_rx.try_recv() {
            Ok(AppResult::PricesRefreshed(quotes)) => {
                app.apply_quotes(quotes, chrono::Local::now());
            }
            Ok(AppResult::RefreshFailed(message)) => {
                error!(error = %message, "Refresh failed");
                app.refresh_failed(message);
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                if app.mark_worker_gone() {
                    error!("Worker thread disconnected!");
                }
            }
        }

        // 1. RENDER
        terminal.draw(|frame| render(frame, app))?;

        // 2. INPUT
        match events.next() {
            Ok(event) => handle_event(app, event, command_tx),
            Err(e) => debug!(error = ?e, "Failed to read terminal event"),
        }
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// CONCEPT RUST : Pattern matching avec guards
/// - L'écran courant décide quelles touches sont actives
/// - Alerte : bloque tout sauf la fermeture
fn handle_event(app: &mut App, event: coinmelt::ui::events::Event, command_tx: &mpsc::Sender<AppCommand>) {
    use coinmelt::ui::events::{
        get_digit_from_event, is_backspace_event, is_down_event, is_edit_event, is_enter_event,
        is_escape_event, is_filter_event, is_next_currency_event, is_previous_currency_event,
        is_quit_event, is_refresh_event, is_space_event, is_up_event, Event,
    };

    if let Event::Tick = event {
        return;
    }

    // Alerte bloquante : seule la fermeture est possible
    if app.is_showing_alert() {
        if is_enter_event(&event) || is_escape_event(&event) || is_space_event(&event) {
            debug!("User dismissed alert");
            app.dismiss_alert();
        }
        return;
    }

    // Saisie de quantité : chaque touche est appliquée immédiatement
    if app.is_editing() {
        if let Some(c) = get_digit_from_event(&event) {
            app.append_char(c);
        } else if is_backspace_event(&event) {
            app.backspace();
        } else if is_enter_event(&event) || is_escape_event(&event) {
            if let Some(coin) = app.selected_coin() {
                info!(coin = %coin.key(), qty = coin.qty, "Quantity edit finished");
            }
            app.finish_edit();
        }
        return;
    }

    match event {
        Event::Key(_) if is_quit_event(&event) => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        Event::Key(_) if is_up_event(&event) => {
            app.cancel_quit();
            app.navigate_up();
        }
        Event::Key(_) if is_down_event(&event) => {
            app.cancel_quit();
            app.navigate_down();
        }

        Event::Key(_) if is_edit_event(&event) || is_enter_event(&event) => {
            app.cancel_quit();
            app.start_edit();
        }

        Event::Key(_) if is_refresh_event(&event) => {
            app.cancel_quit();
            request_refresh(app, command_tx);
        }

        Event::Key(_) if is_next_currency_event(&event) => {
            app.cancel_quit();
            app.next_currency();
            info!(currency = %app.currency, "User changed currency");
        }
        Event::Key(_) if is_previous_currency_event(&event) => {
            app.cancel_quit();
            app.previous_currency();
            info!(currency = %app.currency, "User changed currency");
        }

        Event::Key(_) if is_filter_event(&event) => {
            app.cancel_quit();
            app.cycle_filter();
            info!(filter = app.filter.label(), "User changed metal filter");
        }

        _ => {
            // Toute autre touche : annule la confirmation de quit
            app.cancel_quit();
        }
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

/// Configure le terminal en mode TUI
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
///
/// Appelé dans main() même si la boucle a échoué.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}
