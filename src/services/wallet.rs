// ============================================================================
// Wallet Connector
// ============================================================================
// Demande l'accès aux comptes et retourne le premier compte autorisé
// ============================================================================

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::api::wallet::USER_REJECTED_CODE;
use crate::api::{RpcError, WalletProvider};

/// Erreurs de connexion au wallet
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("aucun wallet disponible")]
    Unavailable,

    #[error("l'utilisateur a refusé l'accès aux comptes")]
    Rejected,

    #[error("le wallet n'a retourné aucun compte")]
    NoAccounts,

    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

/// Connecte l'application au wallet injecté (s'il y en a un)
pub struct WalletConnector {
    provider: Option<Arc<dyn WalletProvider>>,
}

impl WalletConnector {
    /// CONCEPT RUST : Option<Arc<dyn Trait>>
    /// - None représente un wallet absent, sans cas spécial ailleurs
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        Self { provider }
    }

    pub fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    /// Demande les comptes au wallet et retourne le premier
    #[instrument(skip(self))]
    pub async fn connect(&self) -> Result<String, WalletError> {
        let provider = self.provider.as_ref().ok_or(WalletError::Unavailable)?;

        let accounts = provider.request_accounts().await.map_err(|e| {
            match e.downcast_ref::<RpcError>() {
                Some(rpc) if rpc.code == USER_REJECTED_CODE => WalletError::Rejected,
                _ => WalletError::Provider(e),
            }
        })?;

        match accounts.into_iter().next() {
            Some(account) => {
                info!(%account, "Wallet connected");
                Ok(account)
            }
            None => {
                warn!("Wallet returned an empty account list");
                Err(WalletError::NoAccounts)
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
