// ============================================================================
// Address Resolver
// ============================================================================
// Transforme la saisie utilisateur en adresse valide :
// - "xxx.eth" : résolution ENS via l'API d'indexation
// - sinon     : la saisie est prise telle quelle
// Puis validation du format dans les deux cas.
// ============================================================================

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::api::IndexingApi;
use crate::models::{is_ens_name, is_valid_address};

/// Erreurs de résolution ; l'UI les réduit toutes à "invalide"
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("nom ENS non résolu : {0}")]
    UnresolvedName(String),

    #[error(transparent)]
    Lookup(#[from] anyhow::Error),

    #[error("format d'adresse invalide : {0:?}")]
    InvalidFormat(String),
}

pub struct AddressResolver {
    api: Arc<dyn IndexingApi>,
}

impl AddressResolver {
    pub fn new(api: Arc<dyn IndexingApi>) -> Self {
        Self { api }
    }

    /// Résout et valide une saisie
    ///
    /// En cas de succès, l'adresse retournée est exactement la saisie
    /// (casse comprise) ou l'adresse renvoyée par la résolution ENS.
    #[instrument(skip(self))]
    pub async fn resolve(&self, input: &str) -> Result<String, ResolveError> {
        let candidate = if is_ens_name(input) {
            self.api
                .resolve_name(input)
                .await?
                .filter(|address| !address.is_empty())
                .ok_or_else(|| ResolveError::UnresolvedName(input.to_string()))?
        } else {
            input.to_string()
        };

        if !is_valid_address(&candidate) {
            return Err(ResolveError::InvalidFormat(candidate));
        }

        debug!(address = %candidate, "Input resolved");
        Ok(candidate)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::FakeApi;

    const VITALIK: &str = "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045";

    fn resolver(api: FakeApi) -> (AddressResolver, Arc<FakeApi>) {
        let api = Arc::new(api);
        (AddressResolver::new(api.clone()), api)
    }

    #[tokio::test]
    async fn test_literal_address_keeps_case() {
        let (resolver, api) = resolver(FakeApi::default());
        assert_eq!(resolver.resolve(VITALIK).await.unwrap(), VITALIK);

        let lower = VITALIK.to_lowercase();
        assert_eq!(resolver.resolve(&lower).await.unwrap(), lower);

        // Pas de lookup réseau pour une adresse littérale
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_ens_name_is_resolved() {
        let mut api = FakeApi::default();
        api.names.insert("vitalik.eth".to_string(), VITALIK.to_string());
        let (resolver, api) = resolver(api);

        assert_eq!(resolver.resolve("vitalik.eth").await.unwrap(), VITALIK);
        assert_eq!(api.calls(), vec!["resolve:vitalik.eth".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_ens_name() {
        let (resolver, _) = resolver(FakeApi::default());
        let result = resolver.resolve("nobody-here.eth").await;
        assert!(matches!(result, Err(ResolveError::UnresolvedName(_))));
    }

    #[tokio::test]
    async fn test_ens_lookup_failure() {
        let (resolver, _) = resolver(FakeApi {
            fail_names: true,
            ..FakeApi::default()
        });
        let result = resolver.resolve("vitalik.eth").await;
        assert!(matches!(result, Err(ResolveError::Lookup(_))));
    }

    #[tokio::test]
    async fn test_ens_resolving_to_garbage_is_invalid() {
        let mut api = FakeApi::default();
        api.names.insert("weird.eth".to_string(), "0x1234".to_string());
        let (resolver, _) = resolver(api);

        let result = resolver.resolve("weird.eth").await;
        assert!(matches!(result, Err(ResolveError::InvalidFormat(_))));
    }

    #[tokio::test]
    async fn test_malformed_inputs() {
        let (resolver, _) = resolver(FakeApi::default());
        for input in ["", "hello", "0x123", " 0xd8da6bf26964af9d7eed9e03e53415d37aa96045"] {
            assert!(
                matches!(resolver.resolve(input).await, Err(ResolveError::InvalidFormat(_))),
                "{input:?} should be rejected"
            );
        }
    }
}
