// ============================================================================
// Fournisseur de wallet
// ============================================================================
// Capacité injectée qui expose les comptes autorisés par l'utilisateur
//
// CONCEPT RUST : Trait object
// - Le reste de l'application ne connaît que `dyn WalletProvider`
// - Les tests injectent un faux wallet, main() injecte RpcWallet
// ============================================================================

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, instrument};

use crate::api::rpc::JsonRpcClient;

/// Code EIP-1193 : l'utilisateur a refusé la requête
pub const USER_REJECTED_CODE: i64 = 4001;

/// Wallet capable de révéler les comptes de l'utilisateur
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Demande l'accès aux comptes ; l'ordre est celui du wallet
    async fn request_accounts(&self) -> Result<Vec<String>>;
}

/// Wallet joignable en JSON-RPC (daemon local, nœud de dev, etc.)
pub struct RpcWallet {
    rpc: JsonRpcClient,
}

impl RpcWallet {
    pub fn new(rpc: JsonRpcClient) -> Self {
        Self { rpc }
    }
}

#[async_trait]
impl WalletProvider for RpcWallet {
    #[instrument(skip(self))]
    async fn request_accounts(&self) -> Result<Vec<String>> {
        let accounts: Vec<String> = self.rpc.call("eth_requestAccounts", json!([])).await?;
        debug!(count = accounts.len(), "Wallet returned accounts");
        Ok(accounts)
    }
}
