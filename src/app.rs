// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état global de l'application TUI
//
// PATTERN : "Application State"
// - Tous les composants de l'UI lisent depuis App
// - Toutes les modifications passent par les méthodes de App
// - Les méthodes qui déclenchent du travail réseau retournent une
//   AppCommand au lieu de l'exécuter : App reste synchrone et testable
// ============================================================================

use tracing::{debug, info, warn};

use crate::models::QueryResult;
use crate::services::{FetchError, ResolveError, WalletError};
use crate::worker::{AppCommand, AppResult};

// ============================================================================
// State machines
// ============================================================================
// CONCEPT RUST : Enums pour state machines
// - Remplacent les booléens loading / checking / valid
// - Les combinaisons impossibles (ex: "checking" ET "valid") ne sont
//   plus représentables
// ============================================================================

/// État de la saisie d'adresse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressState {
    /// Rien saisi pour l'instant
    Idle,

    /// Résolution en cours (lookup ENS possible)
    Resolving,

    /// Adresse valide : c'est la cible des requêtes
    Resolved(String),

    /// Saisie invalide ou nom non résolu
    Invalid,
}

/// État de la requête de soldes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryState {
    Idle,
    Fetching,
    Succeeded,
    /// Dernière requête en échec ; les résultats précédents sont conservés
    Failed(String),
}

/// Indicateur affiché à côté du champ de saisie
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Checking,
    Valid,
    Invalid,
}

/// Écrans de l'application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Vue principale
    Dashboard,

    /// Mode saisie : les touches alimentent le champ d'adresse
    InputMode,
}

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    pub current_screen: Screen,

    /// Two-step quit : première pression de 'q' = confirmation demandée
    pub confirm_quit: bool,

    /// Contenu du champ d'adresse
    pub input_buffer: String,

    pub address: AddressState,

    pub query: QueryState,

    /// Dernier résultat réussi (Some = "has queried")
    pub result: Option<QueryResult>,

    /// Compte retourné par le wallet
    pub connected_account: Option<String>,

    /// Connexion au wallet en cours
    pub connecting: bool,

    /// Un fournisseur de wallet est configuré
    pub wallet_available: bool,

    /// Dernière génération de résolution émise
    resolve_generation: u64,

    /// Dernière génération de requête de soldes émise
    fetch_generation: u64,

    /// Compteur de ticks pour l'animation du spinner
    pub ticks: usize,
}

impl App {
    pub fn new() -> Self {
        Self {
            running: true,
            current_screen: Screen::Dashboard,
            confirm_quit: false,
            input_buffer: String::new(),
            address: AddressState::Idle,
            query: QueryState::Idle,
            result: None,
            connected_account: None,
            connecting: false,
            wallet_available: false,
            resolve_generation: 0,
            fetch_generation: 0,
            ticks: 0,
        }
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Tick : appelé à chaque itération de la boucle (anime le spinner)
    pub fn tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
    }

    // ========================================================================
    // Indicateurs dérivés des state machines
    // ========================================================================

    pub fn is_loading(&self) -> bool {
        self.query == QueryState::Fetching
    }

    pub fn is_checking(&self) -> bool {
        self.address == AddressState::Resolving
    }

    pub fn has_queried(&self) -> bool {
        self.result.is_some()
    }

    pub fn validity(&self) -> Validity {
        match self.address {
            AddressState::Resolving => Validity::Checking,
            AddressState::Resolved(_) => Validity::Valid,
            AddressState::Idle | AddressState::Invalid => Validity::Invalid,
        }
    }

    /// Adresse à interroger, si la saisie est valide
    pub fn query_target(&self) -> Option<&str> {
        match &self.address {
            AddressState::Resolved(address) => Some(address),
            _ => None,
        }
    }

    /// Le bouton "query" est actif
    pub fn can_query(&self) -> bool {
        self.query_target().is_some() && !self.is_loading()
    }

    // ========================================================================
    // Input Mode
    // ========================================================================

    /// Passe en mode saisie ; ignoré pendant une requête de soldes
    ///
    /// Retourne true si le mode saisie est actif.
    pub fn start_input(&mut self) -> bool {
        if self.is_loading() {
            debug!("Address input locked while fetching");
            return false;
        }
        self.current_screen = Screen::InputMode;
        true
    }

    pub fn stop_input(&mut self) {
        self.current_screen = Screen::Dashboard;
    }

    pub fn is_in_input_mode(&self) -> bool {
        self.current_screen == Screen::InputMode
    }

    /// Ajoute un caractère et relance la résolution
    pub fn append_char(&mut self, c: char) -> AppCommand {
        self.input_buffer.push(c);
        self.on_input_changed()
    }

    /// Supprime le dernier caractère et relance la résolution
    pub fn backspace(&mut self) -> AppCommand {
        self.input_buffer.pop();
        self.on_input_changed()
    }

    /// Chaque modification de la saisie émet une nouvelle résolution
    ///
    /// La génération est incrémentée : toute résolution encore en vol
    /// devient périmée et sera ignorée à son arrivée.
    pub fn on_input_changed(&mut self) -> AppCommand {
        self.resolve_generation += 1;
        self.address = AddressState::Resolving;
        debug!(generation = self.resolve_generation, "Input changed, resolving");

        AppCommand::Resolve {
            generation: self.resolve_generation,
            input: self.input_buffer.clone(),
        }
    }

    // ========================================================================
    // Requêtes
    // ========================================================================

    /// Demande les soldes de la cible courante (bouton "query")
    ///
    /// None si aucune adresse valide ou si une requête est déjà en cours.
    pub fn request_query(&mut self) -> Option<AppCommand> {
        if !self.can_query() {
            debug!("Query requested without a valid target, ignoring");
            return None;
        }
        let address = self.query_target()?.to_string();
        Some(self.start_fetch(address))
    }

    /// Lance une requête de soldes pour `address`
    ///
    /// La validation est faite par le BalanceFetcher : une adresse invalide
    /// échoue sans appel réseau.
    pub fn start_fetch(&mut self, address: String) -> AppCommand {
        self.fetch_generation += 1;
        self.query = QueryState::Fetching;
        info!(%address, generation = self.fetch_generation, "Fetching balances");

        AppCommand::FetchBalances {
            generation: self.fetch_generation,
            address,
        }
    }

    /// Demande la connexion au wallet ; vide le résultat précédent
    pub fn request_connect(&mut self) -> AppCommand {
        self.result = None;
        self.connecting = true;
        AppCommand::Connect
    }

    // ========================================================================
    // Application des résultats du worker
    // ========================================================================

    /// Applique un résultat ; peut retourner une commande de suite
    /// (connexion réussie => requête de soldes)
    pub fn apply_result(&mut self, result: AppResult) -> Option<AppCommand> {
        match result {
            AppResult::Connected(outcome) => self.apply_connection(outcome),
            AppResult::Resolved { generation, outcome } => {
                self.apply_resolution(generation, outcome);
                None
            }
            AppResult::BalancesFetched { generation, outcome } => {
                self.apply_fetch(generation, outcome);
                None
            }
        }
    }

    fn apply_connection(
        &mut self,
        outcome: Result<String, WalletError>,
    ) -> Option<AppCommand> {
        self.connecting = false;

        match outcome {
            Ok(account) => {
                // La saisie est remplacée : les résolutions en vol sont périmées
                self.resolve_generation += 1;
                self.input_buffer = account.clone();
                self.address = AddressState::Resolved(account.clone());
                self.connected_account = Some(account.clone());
                Some(self.start_fetch(account))
            }
            Err(e) => {
                warn!(error = %e, "Error retrieving accounts");
                None
            }
        }
    }

    /// Retourne false si le résultat était périmé
    fn apply_resolution(
        &mut self,
        generation: u64,
        outcome: Result<String, ResolveError>,
    ) -> bool {
        if generation != self.resolve_generation {
            debug!(generation, latest = self.resolve_generation, "Discarding stale resolution");
            return false;
        }

        self.address = match outcome {
            Ok(address) => AddressState::Resolved(address),
            Err(e) => {
                debug!(error = %e, "Input is not a valid address");
                AddressState::Invalid
            }
        };
        true
    }

    /// Retourne false si le résultat était périmé
    fn apply_fetch(
        &mut self,
        generation: u64,
        outcome: Result<QueryResult, FetchError>,
    ) -> bool {
        if generation != self.fetch_generation {
            debug!(generation, latest = self.fetch_generation, "Discarding stale balances");
            return false;
        }

        match outcome {
            Ok(result) => {
                info!(tokens = result.len(), fetched_at = %result.fetched_at, "Query succeeded");
                self.result = Some(result);
                self.query = QueryState::Succeeded;
            }
            Err(e) => {
                warn!(error = %e, "Error in getting token balances");
                self.query = QueryState::Failed(e.to_string());
            }
        }
        true
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
