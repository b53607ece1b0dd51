// ============================================================================
// Background Worker
// ============================================================================
// Exécute les appels réseau hors du thread UI
//
// CONCEPT RUST : Command pattern avec channels
// - L'event loop envoie des AppCommand au worker
// - Le worker lance une tâche tokio par commande
// - Chaque tâche renvoie un AppResult sur un autre channel
//
// Les tâches tournent en parallèle : les résultats peuvent arriver dans le
// désordre. Les numéros de génération portés par les commandes permettent
// à App d'ignorer les résultats périmés.
// ============================================================================

use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::models::QueryResult;
use crate::services::{FetchError, ResolveError, Services, WalletError};

/// Commandes envoyées au worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    /// Demander les comptes au wallet
    Connect,

    /// Résoudre la saisie courante (une commande par frappe)
    Resolve { generation: u64, input: String },

    /// Récupérer les soldes d'une adresse
    FetchBalances { generation: u64, address: String },
}

/// Résultats renvoyés par le worker
#[derive(Debug)]
pub enum AppResult {
    Connected(Result<String, WalletError>),

    Resolved {
        generation: u64,
        outcome: Result<String, ResolveError>,
    },

    BalancesFetched {
        generation: u64,
        outcome: Result<QueryResult, FetchError>,
    },
}

impl Services {
    /// Exécute une commande et produit le résultat correspondant
    pub async fn execute(&self, command: AppCommand) -> AppResult {
        match command {
            AppCommand::Connect => AppResult::Connected(self.wallet.connect().await),
            AppCommand::Resolve { generation, input } => AppResult::Resolved {
                generation,
                outcome: self.resolver.resolve(&input).await,
            },
            AppCommand::FetchBalances { generation, address } => AppResult::BalancesFetched {
                generation,
                outcome: self.fetcher.fetch_balances(&address).await,
            },
        }
    }
}

/// Lance le worker thread
///
/// CONCEPT RUST : Thread + async runtime
/// - std::thread::spawn() : thread OS qui attend les commandes (recv bloquant)
/// - tokio::runtime::Runtime : exécute les tâches async sur ses propres threads
/// - Le runtime est créé avant le thread pour propager l'erreur avec ?
///
/// Le worker s'arrête quand le Sender des commandes est droppé.
pub fn spawn_background_worker(
    services: Arc<Services>,
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
) -> Result<JoinHandle<()>> {
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;

    let handle = std::thread::spawn(move || {
        while let Ok(command) = command_rx.recv() {
            debug!(?command, "Worker received command");

            let services = services.clone();
            let result_tx = result_tx.clone();
            runtime.spawn(async move {
                let result = services.execute(command).await;
                // L'UI a pu quitter entre-temps : on ignore l'échec d'envoi
                let _ = result_tx.send(result);
            });
        }

        info!("Worker thread exiting (channel closed)");
    });

    Ok(handle)
}

// ============================================================================
// Tests
// ============================================================================
