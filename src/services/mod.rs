// ============================================================================
// Module : services
// ============================================================================
// Logique applicative au-dessus des clients externes :
// connexion au wallet, résolution d'adresse, récupération des soldes
// ============================================================================

pub mod fetcher;  // Balance Fetcher
pub mod resolver; // Address Resolver
pub mod wallet;   // Wallet Connector

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use crate::api::{IndexingApi, WalletProvider};
use crate::config::MetadataPolicy;

pub use fetcher::{BalanceFetcher, FetchError};
pub use resolver::{AddressResolver, ResolveError};
pub use wallet::{WalletConnector, WalletError};

/// Ensemble des services partagés par le worker
pub struct Services {
    pub wallet: WalletConnector,
    pub resolver: AddressResolver,
    pub fetcher: BalanceFetcher,
}

impl Services {
    /// Assemble les services à partir des capacités injectées
    pub fn new(
        api: Arc<dyn IndexingApi>,
        wallet: Option<Arc<dyn WalletProvider>>,
        policy: MetadataPolicy,
    ) -> Self {
        Self {
            wallet: WalletConnector::new(wallet),
            resolver: AddressResolver::new(api.clone()),
            fetcher: BalanceFetcher::new(api, policy),
        }
    }
}
