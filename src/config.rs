// ============================================================================
// Configuration
// ============================================================================
// Charge la configuration depuis un fichier TOML, puis applique les
// surcharges des variables d'environnement
//
// Ordre de priorité (du plus fort au plus faible) :
// 1. Variables d'environnement (ALCHEMY_API_KEY, WALLET_RPC_URL)
// 2. Fichier : $ERC20_INDEXER_CONFIG ou <config_dir>/erc20-indexer/config.toml
// 3. Valeurs par défaut
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

/// Variable d'environnement pointant vers un fichier de config explicite
pub const CONFIG_ENV: &str = "ERC20_INDEXER_CONFIG";
pub const API_KEY_ENV: &str = "ALCHEMY_API_KEY";
pub const WALLET_URL_ENV: &str = "WALLET_RPC_URL";

/// Politique appliquée quand une requête de métadonnées échoue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetadataPolicy {
    /// Un seul échec fait échouer toute la requête
    #[default]
    AllOrNothing,
    /// Les tokens en échec sont marqués, les autres restent affichés
    Partial,
}

/// Configuration de l'application
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Clé API Alchemy
    pub api_key: String,

    /// Réseau Alchemy (ex: "eth-mainnet", "eth-sepolia")
    pub network: String,

    /// URL JSON-RPC explicite (remplace l'URL Alchemy construite)
    pub rpc_url: Option<String>,

    /// Endpoint JSON-RPC du wallet (None = pas de wallet disponible)
    pub wallet_url: Option<String>,

    /// Timeout des requêtes HTTP, en secondes
    pub request_timeout_secs: u64,

    pub metadata_policy: MetadataPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            network: "eth-mainnet".to_string(),
            rpc_url: None,
            wallet_url: None,
            request_timeout_secs: 30,
            metadata_policy: MetadataPolicy::default(),
        }
    }
}

impl Config {
    /// Charge la configuration complète (fichier + environnement)
    ///
    /// Un fichier absent n'est pas une erreur : on part des valeurs par défaut.
    /// Un fichier présent mais invalide remonte une erreur avec contexte.
    pub fn load() -> Result<Self> {
        let mut config = match config_path() {
            Some(path) if path.exists() => {
                info!(path = %path.display(), "Loading configuration file");
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Échec de la lecture de {}", path.display()))?;
                Self::from_toml(&content)
                    .with_context(|| format!("Configuration invalide dans {}", path.display()))?
            }
            other => {
                debug!(path = ?other, "No configuration file, using defaults");
                Self::default()
            }
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse une configuration TOML
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Échec du parsing TOML")
    }

    /// Applique les surcharges d'environnement
    ///
    /// CONCEPT RUST : Closure en paramètre
    /// - `lookup` abstrait std::env::var
    /// - Les tests passent une closure sans toucher à l'environnement du process
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.is_empty()) {
            self.api_key = key;
        }
        if let Some(url) = lookup(WALLET_URL_ENV).filter(|v| !v.is_empty()) {
            self.wallet_url = Some(url);
        }
    }

    /// URL JSON-RPC de l'API d'indexation
    pub fn rpc_url(&self) -> String {
        match &self.rpc_url {
            Some(url) => url.clone(),
            None => format!("https://{}.g.alchemy.com/v2/{}", self.network, self.api_key),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Chemin du fichier de configuration
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV).map(PathBuf::from) {
        return Some(path);
    }
    dirs::config_dir().map(|dir| dir.join("erc20-indexer").join("config.toml"))
}

// ============================================================================
// Tests
// ============================================================================
