// ============================================================================
// Client JSON-RPC
// ============================================================================
// Transport commun à l'API d'indexation (Alchemy) et au wallet
//
// CONCEPTS RUST :
// 1. Génériques avec bornes de traits : P: Serialize, R: DeserializeOwned
// 2. AtomicU64 : compteur d'identifiants partagé sans Mutex
// 3. Erreurs typées (thiserror) encapsulées dans anyhow pour le downcast
// ============================================================================

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

/// Erreur renvoyée par le serveur dans le champ "error" de la réponse
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, thiserror::Error)]
#[error("JSON-RPC error {code}: {message}")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct RpcRequest<'a, P> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: P,
}

#[derive(Debug, Deserialize)]
struct RpcResponse<R> {
    result: Option<R>,
    error: Option<RpcError>,
}

/// Client JSON-RPC sur HTTP
pub struct JsonRpcClient {
    http: reqwest::Client,
    url: String,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Crée un client pour `url` avec un timeout par requête
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("erc20-indexer/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Échec de la création du client HTTP")?;

        Ok(Self {
            http,
            url: url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    /// Envoie une requête et désérialise le champ "result"
    ///
    /// Une seule tentative : pas de retry, l'appelant décide quoi faire de l'erreur.
    #[instrument(skip(self, params))]
    pub async fn call<P, R>(&self, method: &str, params: P) -> Result<R>
    where
        P: Serialize + Send,
        R: DeserializeOwned,
    {
        let request = RpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        debug!(id = request.id, "Sending JSON-RPC request");
        let response = self
            .http
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .with_context(|| format!("Échec de la requête HTTP pour {}", method))?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "JSON-RPC endpoint returned error status");
            anyhow::bail!("L'endpoint JSON-RPC a retourné une erreur : HTTP {}", status);
        }

        let body: RpcResponse<R> = response
            .json()
            .await
            .with_context(|| format!("Échec du parsing JSON de la réponse {}", method))?;

        into_result(body)
    }
}

/// Sépare une réponse JSON-RPC en succès ou erreur
fn into_result<R>(body: RpcResponse<R>) -> Result<R> {
    if let Some(err) = body.error {
        return Err(err.into());
    }
    body.result.context("Réponse JSON-RPC sans résultat")
}

// ============================================================================
// Tests
// ============================================================================
