// ============================================================================
// Balance Fetcher
// ============================================================================
// Récupère les soldes d'une adresse puis les métadonnées de chaque token
//
// CONCEPTS RUST :
// 1. Fan-out / fan-in : toutes les requêtes de métadonnées partent en même
//    temps, on attend la fin de toutes (futures::future::try_join_all)
// 2. L'ordre des résultats est celui des futures en entrée, pas l'ordre
//    d'arrivée : l'alignement positionnel avec les soldes est garanti
// ============================================================================

use std::sync::Arc;

use futures::future::{join_all, try_join_all};
use tracing::{info, instrument, warn};

use crate::api::IndexingApi;
use crate::config::MetadataPolicy;
use crate::models::{is_valid_address, QueryResult, TokenBalance, TokenMetadata};

/// Erreurs de récupération des soldes
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("adresse invalide : {0:?}")]
    InvalidAddress(String),

    #[error("échec de la récupération des soldes : {0:#}")]
    Balances(anyhow::Error),

    #[error("échec des métadonnées de {contract} : {error:#}")]
    Metadata {
        contract: String,
        error: anyhow::Error,
    },
}

pub struct BalanceFetcher {
    api: Arc<dyn IndexingApi>,
    policy: MetadataPolicy,
}

impl BalanceFetcher {
    pub fn new(api: Arc<dyn IndexingApi>, policy: MetadataPolicy) -> Self {
        Self { api, policy }
    }

    /// Récupère soldes et métadonnées alignées pour `address`
    ///
    /// Aucun appel réseau si l'adresse est invalide.
    #[instrument(skip(self))]
    pub async fn fetch_balances(&self, address: &str) -> Result<QueryResult, FetchError> {
        if !is_valid_address(address) {
            return Err(FetchError::InvalidAddress(address.to_string()));
        }

        let balances = self
            .api
            .get_token_balances(address)
            .await
            .map_err(FetchError::Balances)?;

        let metadata = match self.policy {
            MetadataPolicy::AllOrNothing => self.fetch_all_metadata(&balances).await?,
            MetadataPolicy::Partial => self.fetch_partial_metadata(&balances).await,
        };

        info!(
            tokens = balances.len(),
            missing_metadata = metadata.iter().filter(|m| m.is_none()).count(),
            "Balances fetched"
        );
        Ok(QueryResult::new(address.to_string(), balances, metadata))
    }

    /// Un seul échec fait échouer l'ensemble
    async fn fetch_all_metadata(
        &self,
        balances: &[TokenBalance],
    ) -> Result<Vec<Option<TokenMetadata>>, FetchError> {
        let lookups = balances.iter().map(|balance| async move {
            self.api
                .get_token_metadata(&balance.contract_address)
                .await
                .map_err(|error| FetchError::Metadata {
                    contract: balance.contract_address.clone(),
                    error,
                })
        });

        let metadata = try_join_all(lookups).await?;
        Ok(metadata.into_iter().map(Some).collect())
    }

    /// Les échecs deviennent des marqueurs None à leur position
    async fn fetch_partial_metadata(
        &self,
        balances: &[TokenBalance],
    ) -> Vec<Option<TokenMetadata>> {
        let lookups = balances
            .iter()
            .map(|balance| self.api.get_token_metadata(&balance.contract_address));

        join_all(lookups)
            .await
            .into_iter()
            .zip(balances)
            .map(|(outcome, balance)| match outcome {
                Ok(metadata) => Some(metadata),
                Err(e) => {
                    warn!(contract = %balance.contract_address, error = ?e, "Token metadata unavailable");
                    None
                }
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::services::test_support::FakeApi;

    const HOLDER: &str = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045";

    fn fetcher(api: FakeApi, policy: MetadataPolicy) -> (BalanceFetcher, Arc<FakeApi>) {
        let api = Arc::new(api);
        (BalanceFetcher::new(api.clone(), policy), api)
    }

    fn three_tokens() -> FakeApi {
        FakeApi::with_tokens(&[
            ("0xaaa", "1500000000000000000", "AAA", 18),
            ("0xbbb", "100", "BBB", 0),
            ("0xccc", "2500000", "CCC", 6),
        ])
    }

    #[tokio::test]
    async fn test_invalid_address_makes_no_call() {
        let (fetcher, api) = fetcher(three_tokens(), MetadataPolicy::AllOrNothing);

        let result = fetcher.fetch_balances("not-an-address").await;

        assert!(matches!(result, Err(FetchError::InvalidAddress(_))));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_one_metadata_lookup_per_balance() {
        let (fetcher, api) = fetcher(three_tokens(), MetadataPolicy::AllOrNothing);

        let result = fetcher.fetch_balances(HOLDER).await.unwrap();

        assert_eq!(result.len(), 3);
        assert_eq!(api.count("balances:"), 1);
        assert_eq!(api.count("metadata:"), 3);
        assert_eq!(api.count("metadata:0xbbb"), 1);
    }

    #[tokio::test]
    async fn test_balances_failure_skips_metadata() {
        let mut api = three_tokens();
        api.fail_balances = true;
        let (fetcher, api) = fetcher(api, MetadataPolicy::AllOrNothing);

        let result = fetcher.fetch_balances(HOLDER).await;

        assert!(matches!(result, Err(FetchError::Balances(_))));
        assert_eq!(api.count("metadata:"), 0);
    }

    #[tokio::test]
    async fn test_metadata_order_ignores_completion_order() {
        // Le premier token répond en dernier, le dernier en premier
        let mut api = three_tokens();
        api.delays.insert("0xaaa".to_string(), Duration::from_millis(60));
        api.delays.insert("0xbbb".to_string(), Duration::from_millis(30));
        let (fetcher, _) = fetcher(api, MetadataPolicy::AllOrNothing);

        let result = fetcher.fetch_balances(HOLDER).await.unwrap();

        let symbols: Vec<_> = result
            .holdings()
            .map(|(balance, metadata)| {
                (
                    balance.contract_address.as_str(),
                    metadata.map(|m| m.display_symbol().to_string()),
                )
            })
            .collect();
        assert_eq!(
            symbols,
            vec![
                ("0xaaa", Some("AAA".to_string())),
                ("0xbbb", Some("BBB".to_string())),
                ("0xccc", Some("CCC".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_single_metadata_failure_fails_query() {
        let mut api = three_tokens();
        api.failing_contracts.insert("0xbbb".to_string());
        let (fetcher, _) = fetcher(api, MetadataPolicy::AllOrNothing);

        match fetcher.fetch_balances(HOLDER).await {
            Err(FetchError::Metadata { contract, .. }) => assert_eq!(contract, "0xbbb"),
            other => panic!("expected metadata error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_partial_policy_marks_failures() {
        let mut api = three_tokens();
        api.failing_contracts.insert("0xbbb".to_string());
        let (fetcher, _) = fetcher(api, MetadataPolicy::Partial);

        let result = fetcher.fetch_balances(HOLDER).await.unwrap();

        assert_eq!(result.metadata.len(), 3);
        assert!(result.metadata[0].is_some());
        assert!(result.metadata[1].is_none());
        assert!(result.metadata[2].is_some());
        assert_eq!(result.missing_metadata(), 1);
    }

    #[tokio::test]
    async fn test_zero_balances() {
        let (fetcher, api) = fetcher(FakeApi::default(), MetadataPolicy::AllOrNothing);

        let result = fetcher.fetch_balances(HOLDER).await.unwrap();

        assert!(result.is_empty());
        assert_eq!(result.address, HOLDER);
        assert_eq!(api.count("metadata:"), 0);
    }
}
