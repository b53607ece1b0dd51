// Faux services externes pour les tests unitaires

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::api::{IndexingApi, RpcError, WalletProvider};
use crate::models::{TokenBalance, TokenMetadata};

/// API d'indexation en mémoire qui enregistre chaque appel
#[derive(Default)]
pub struct FakeApi {
    pub names: HashMap<String, String>,
    pub balances: Vec<TokenBalance>,
    pub metadata: HashMap<String, TokenMetadata>,
    pub failing_contracts: HashSet<String>,
    pub delays: HashMap<String, Duration>,
    pub fail_balances: bool,
    pub fail_names: bool,
    pub calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn with_tokens(tokens: &[(&str, &str, &str, u8)]) -> Self {
        let mut api = Self::default();
        for &(contract, amount, symbol, decimals) in tokens {
            api.balances.push(TokenBalance::new(contract, amount));
            api.metadata
                .insert(contract.to_string(), TokenMetadata::new(symbol, decimals));
        }
        api
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl IndexingApi for FakeApi {
    async fn resolve_name(&self, name: &str) -> Result<Option<String>> {
        self.record(format!("resolve:{}", name));
        if self.fail_names {
            return Err(anyhow!("network down"));
        }
        Ok(self.names.get(name).cloned())
    }

    async fn get_token_balances(&self, address: &str) -> Result<Vec<TokenBalance>> {
        self.record(format!("balances:{}", address));
        if self.fail_balances {
            return Err(anyhow!("network down"));
        }
        Ok(self.balances.clone())
    }

    async fn get_token_metadata(&self, contract_address: &str) -> Result<TokenMetadata> {
        self.record(format!("metadata:{}", contract_address));
        if let Some(delay) = self.delays.get(contract_address) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_contracts.contains(contract_address) {
            return Err(anyhow!("metadata unavailable"));
        }
        Ok(self.metadata.get(contract_address).cloned().unwrap_or_default())
    }
}

/// Wallet qui répond toujours la même chose
pub enum FakeWallet {
    Accounts(Vec<String>),
    Rejects,
    Broken,
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn request_accounts(&self) -> Result<Vec<String>> {
        match self {
            FakeWallet::Accounts(accounts) => Ok(accounts.clone()),
            FakeWallet::Rejects => Err(RpcError {
                code: 4001,
                message: "User rejected the request.".to_string(),
            }
            .into()),
            FakeWallet::Broken => Err(anyhow!("connection refused")),
        }
    }
}
