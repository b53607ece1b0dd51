// ============================================================================
// Module : api
// ============================================================================
// Clients des services externes : API d'indexation (Alchemy) et wallet.
// Chaque frontière est un trait pour pouvoir injecter un faux en test.
// ============================================================================

pub mod alchemy; // Client Alchemy (soldes, métadonnées, ENS)
pub mod ens;     // Namehash et encodage des appels ENS
pub mod rpc;     // Transport JSON-RPC commun
pub mod wallet;  // Fournisseur de wallet

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{TokenBalance, TokenMetadata};

// Re-exports des types principaux
pub use alchemy::AlchemyClient;
pub use rpc::{JsonRpcClient, RpcError};
pub use wallet::{RpcWallet, WalletProvider};

/// API d'indexation : agrège les requêtes on-chain pour le client
///
/// Une seule tentative par appel, pas de retry.
#[async_trait]
pub trait IndexingApi: Send + Sync {
    /// Résout un nom ENS ; Ok(None) si le nom n'a pas d'adresse
    async fn resolve_name(&self, name: &str) -> Result<Option<String>>;

    /// Liste les soldes ERC-20 détenus par `address`
    async fn get_token_balances(&self, address: &str) -> Result<Vec<TokenBalance>>;

    /// Métadonnées d'un contrat ERC-20
    async fn get_token_metadata(&self, contract_address: &str) -> Result<TokenMetadata>;
}
