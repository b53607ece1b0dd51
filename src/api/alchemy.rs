// ============================================================================
// API Client : Alchemy
// ============================================================================
// Implémente IndexingApi au-dessus de l'API JSON-RPC d'Alchemy
//
// Méthodes utilisées :
// - alchemy_getTokenBalances : soldes ERC-20 d'une adresse (paginé)
// - alchemy_getTokenMetadata : symbole, décimales, logo d'un contrat
// - eth_call                 : résolution ENS (registre puis resolver)
// ============================================================================

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

use crate::api::ens;
use crate::api::rpc::JsonRpcClient;
use crate::api::IndexingApi;
use crate::config::Config;
use crate::models::{TokenBalance, TokenMetadata};

// ============================================================================
// Structures pour parser les réponses Alchemy
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenBalancesPage {
    token_balances: Vec<RawTokenBalance>,
    page_key: Option<String>,
}

/// Entrée brute : tokenBalance est null quand Alchemy signale une erreur
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTokenBalance {
    contract_address: String,
    token_balance: Option<String>,
    error: Option<serde_json::Value>,
}

/// Nombre maximum de pages de soldes lues pour une adresse
const MAX_BALANCE_PAGES: usize = 100;

/// Ajoute les soldes exploitables d'une page ; retourne sa clé de suite
///
/// Les entrées signalées en erreur par Alchemy sont ignorées.
fn collect_page(page: TokenBalancesPage, balances: &mut Vec<TokenBalance>) -> Option<String> {
    for raw in page.token_balances {
        match (raw.token_balance, raw.error) {
            (Some(amount), None) => {
                balances.push(TokenBalance::new(raw.contract_address, amount));
            }
            (_, error) => {
                warn!(contract = %raw.contract_address, ?error, "Skipping balance reported with error");
            }
        }
    }
    page.page_key.filter(|key| !key.is_empty())
}

/// Décide s'il faut lire une page de plus
///
/// Une clé identique à la précédente ou un nombre de pages excessif
/// signale une pagination qui ne termine pas : erreur plutôt que boucle infinie.
fn next_page_key(
    current: Option<&str>,
    next: Option<String>,
    pages_read: usize,
) -> Result<Option<String>> {
    let Some(next) = next else {
        return Ok(None);
    };

    if current == Some(next.as_str()) {
        anyhow::bail!("Pagination bloquée : clé de page répétée {:?}", next);
    }
    if pages_read >= MAX_BALANCE_PAGES {
        anyhow::bail!("Pagination interrompue après {} pages", MAX_BALANCE_PAGES);
    }
    Ok(Some(next))
}

/// Client Alchemy
pub struct AlchemyClient {
    rpc: JsonRpcClient,
}

impl AlchemyClient {
    pub fn new(rpc: JsonRpcClient) -> Self {
        Self { rpc }
    }

    /// Construit le client depuis la configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.api_key.is_empty() && config.rpc_url.is_none() {
            warn!("No Alchemy API key configured, requests will likely be rejected");
        }
        let rpc = JsonRpcClient::new(config.rpc_url(), config.request_timeout())?;
        Ok(Self::new(rpc))
    }

    /// eth_call en lecture sur le bloc "latest"
    async fn eth_call(&self, to: &str, data: String) -> Result<String> {
        self.rpc
            .call("eth_call", json!([{ "to": to, "data": data }, "latest"]))
            .await
    }
}

#[async_trait]
impl IndexingApi for AlchemyClient {
    #[instrument(skip(self))]
    async fn resolve_name(&self, name: &str) -> Result<Option<String>> {
        let node = ens::namehash(name);

        let resolver_word = self
            .eth_call(
                ens::ENS_REGISTRY,
                ens::encode_node_call(ens::RESOLVER_SELECTOR, node),
            )
            .await
            .context("Échec de la lecture du resolver ENS")?;

        let Some(resolver) = ens::decode_address_word(&resolver_word)? else {
            debug!("Name has no resolver");
            return Ok(None);
        };

        let addr_word = self
            .eth_call(
                &resolver.to_checksum(None),
                ens::encode_node_call(ens::ADDR_SELECTOR, node),
            )
            .await
            .context("Échec de la lecture de l'adresse ENS")?;

        let address = ens::decode_address_word(&addr_word)?.map(|a| a.to_checksum(None));
        debug!(resolved = ?address, "ENS lookup finished");
        Ok(address)
    }

    /// Récupère tous les soldes ERC-20, page par page
    #[instrument(skip(self))]
    async fn get_token_balances(&self, address: &str) -> Result<Vec<TokenBalance>> {
        let mut balances = Vec::new();
        let mut page_key: Option<String> = None;
        let mut pages_read = 0;

        loop {
            let params = match &page_key {
                Some(key) => json!([address, "erc20", { "pageKey": key }]),
                None => json!([address, "erc20"]),
            };

            let page: TokenBalancesPage = self
                .rpc
                .call("alchemy_getTokenBalances", params)
                .await
                .context("Échec de la récupération des soldes")?;
            pages_read += 1;

            let next = collect_page(page, &mut balances);
            match next_page_key(page_key.as_deref(), next, pages_read)? {
                Some(key) => page_key = Some(key),
                None => break,
            }
        }

        info!(tokens = balances.len(), pages = pages_read, "Fetched token balances");
        Ok(balances)
    }

    #[instrument(skip(self))]
    async fn get_token_metadata(&self, contract_address: &str) -> Result<TokenMetadata> {
        self.rpc
            .call("alchemy_getTokenMetadata", json!([contract_address]))
            .await
            .with_context(|| format!("Échec de la récupération des métadonnées de {}", contract_address))
    }
}

// ============================================================================
// Tests
// ============================================================================
