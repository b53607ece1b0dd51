// ============================================================================
// ERC-20 Indexer - Point d'entrée
// ============================================================================
// Programme TUI : connecte un wallet ou accepte une adresse / un nom ENS,
// puis affiche les soldes ERC-20 de cette adresse
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère événements, résultats et rendering
// 3. Worker thread + tokio : appels réseau sans bloquer l'UI
// ============================================================================

use std::io;
use std::sync::{mpsc, Arc};

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use erc20_indexer::api::{AlchemyClient, IndexingApi, JsonRpcClient, RpcWallet, WalletProvider};
use erc20_indexer::app::App;
use erc20_indexer::config::Config;
use erc20_indexer::services::Services;
use erc20_indexer::ui::events::{
    get_char_from_event, is_address_char_event, is_backspace_event, is_connect_event,
    is_edit_event, is_enter_event, is_escape_event, is_quit_event, Event, EventHandler,
};
use erc20_indexer::ui::render;
use erc20_indexer::worker::{spawn_background_worker, AppCommand, AppResult};

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier avec rotation quotidienne
// ============================================================================

/// Initialise le système de logging vers ./logs/erc20-indexer.log
///
/// # Utilisation
/// ```bash
/// tail -f logs/erc20-indexer.log
/// RUST_LOG=erc20_indexer=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = std::path::PathBuf::from("./logs");
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "erc20-indexer.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true)
                .with_thread_ids(true) // Utile : les tâches tournent sur le runtime du worker
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "erc20_indexer=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("ERC-20 Indexer starting up");

    let config = Config::load()?;
    debug!(network = %config.network, policy = ?config.metadata_policy, "Configuration loaded");

    // Capacités injectées : API d'indexation et wallet (optionnel)
    let api: Arc<dyn IndexingApi> = Arc::new(AlchemyClient::from_config(&config)?);
    let wallet: Option<Arc<dyn WalletProvider>> = match &config.wallet_url {
        Some(url) => {
            info!(%url, "Using JSON-RPC wallet");
            let rpc = JsonRpcClient::new(url.as_str(), config.request_timeout())?;
            let wallet: Arc<dyn WalletProvider> = Arc::new(RpcWallet::new(rpc));
            Some(wallet)
        }
        None => {
            warn!("No wallet endpoint configured, wallet connection disabled");
            None
        }
    };

    let services = Arc::new(Services::new(api, wallet, config.metadata_policy));

    let mut app = App::new();
    app.wallet_available = services.wallet.is_available();

    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    let worker = spawn_background_worker(services, command_rx, result_tx)?;

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::default();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &command_tx, &result_rx);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    // Ferme le channel : le worker sort de sa boucle
    drop(command_tx);
    if worker.join().is_err() {
        error!("Worker thread panicked");
    }

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Appliquer les résultats du worker
//   1. Dessiner l'interface
//   2. Traiter l'événement clavier
//   3. Tick
// App n'est manipulé que par ce thread : pas besoin de Mutex.
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    command_tx: &mpsc::Sender<AppCommand>,
    result_rx: &mpsc::Receiver<AppResult>,
) -> Result<()> {
    while app.is_running() {
        // 0. RÉSULTATS : on vide tout ce qui est arrivé depuis le dernier tour
        loop {
            match result_rx.try_recv() {
                Ok(result) => {
                    if let Some(next) = app.apply_result(result) {
                        send_command(command_tx, next);
                    }
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    error!("Worker thread disconnected!");
                    break;
                }
            }
        }

        // 1. RENDER
        terminal.draw(|frame| render(frame, app))?;

        // 2. INPUT
        match events.next() {
            Ok(event) => {
                if let Some(command) = handle_event(app, event) {
                    send_command(command_tx, command);
                }
            }
            Err(e) => {
                warn!(error = ?e, "Failed to read terminal event");
            }
        }

        // 3. UPDATE
        app.tick();
    }

    Ok(())
}

fn send_command(command_tx: &mpsc::Sender<AppCommand>, command: AppCommand) {
    if command_tx.send(command).is_err() {
        error!("Worker channel closed, command dropped");
    }
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement ; retourne la commande à envoyer au worker s'il y en a une
///
/// En mode saisie, toutes les touches caractère vont dans le champ
/// (un nom ENS peut contenir 'q' ou 'c').
fn handle_event(app: &mut App, event: Event) -> Option<AppCommand> {
    if app.is_in_input_mode() {
        return match event {
            Event::Key(_) if is_escape_event(&event) || is_enter_event(&event) => {
                debug!(input = %app.input_buffer, "User finished editing");
                app.stop_input();
                None
            }
            Event::Key(_) if is_backspace_event(&event) => Some(app.backspace()),
            Event::Key(_) if is_address_char_event(&event) => {
                get_char_from_event(&event).map(|c| app.append_char(c))
            }
            _ => None,
        };
    }

    match event {
        Event::Key(_) if is_quit_event(&event) => {
            if app.confirm_quit {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.confirm_quit = true;
            }
            None
        }

        Event::Key(_) if is_connect_event(&event) => {
            app.confirm_quit = false;
            info!("User requested wallet connection");
            Some(app.request_connect())
        }

        Event::Key(_) if is_edit_event(&event) => {
            app.confirm_quit = false;
            app.start_input();
            None
        }

        Event::Key(_) if is_enter_event(&event) => {
            app.confirm_quit = false;
            app.request_query()
        }

        Event::Key(_) => {
            // Toute autre touche : annule la confirmation de quit
            app.confirm_quit = false;
            None
        }

        Event::Tick => None,
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

/// Configure le terminal en mode TUI (raw mode + alternate screen)
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
