// ============================================================================
// Structures : TokenBalance, TokenMetadata, QueryResult
// ============================================================================
// Représente les données renvoyées par l'API d'indexation pour une adresse
//
// CONCEPTS RUST :
// 1. Serde : désérialisation directe depuis le JSON de l'API
// 2. Option<T> : l'API peut renvoyer null pour n'importe quel champ
// 3. Iterators et zip : alignement positionnel balances <-> métadonnées
// ============================================================================

use std::str::FromStr;

use alloy_primitives::{utils::format_units, U256};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Décimales utilisées quand l'API ne les fournit pas (unité "ether")
pub const DEFAULT_DECIMALS: u8 = 18;

/// Solde brut d'un token pour un contrat donné
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    /// Adresse du contrat ERC-20
    pub contract_address: String,

    /// Montant brut, entier décimal ou hexadécimal ("0x...")
    pub token_balance: String,
}

impl TokenBalance {
    pub fn new(contract_address: impl Into<String>, token_balance: impl Into<String>) -> Self {
        Self {
            contract_address: contract_address.into(),
            token_balance: token_balance.into(),
        }
    }
}

/// Métadonnées d'un token (symbole, décimales, logo)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TokenMetadata {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
    pub logo: Option<String>,
}

impl TokenMetadata {
    pub fn new(symbol: &str, decimals: u8) -> Self {
        Self {
            name: None,
            symbol: Some(symbol.to_string()),
            decimals: Some(decimals),
            logo: None,
        }
    }

    /// Symbole affichable, "?" si inconnu
    pub fn display_symbol(&self) -> &str {
        self.symbol
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("?")
    }
}

/// Résultat complet d'une requête de soldes
///
/// Invariant : `metadata[i]` décrit le contrat de `balances[i]`.
/// `None` marque un token dont les métadonnées n'ont pas pu être chargées
/// (uniquement avec la politique partielle).
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    pub address: String,
    pub balances: Vec<TokenBalance>,
    pub metadata: Vec<Option<TokenMetadata>>,
    pub fetched_at: DateTime<Utc>,
}

impl QueryResult {
    pub fn new(
        address: String,
        balances: Vec<TokenBalance>,
        metadata: Vec<Option<TokenMetadata>>,
    ) -> Self {
        Self {
            address,
            balances,
            metadata,
            fetched_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// Associe chaque solde à ses métadonnées par position
    ///
    /// CONCEPT RUST : zip
    /// - Combine deux itérateurs élément par élément
    /// - Le zip est positionnel, pas par clé de contrat
    pub fn holdings(&self) -> impl Iterator<Item = (&TokenBalance, Option<&TokenMetadata>)> {
        self.balances
            .iter()
            .zip(self.metadata.iter().map(|m| m.as_ref()))
    }

    /// Nombre de tokens dont les métadonnées sont manquantes
    pub fn missing_metadata(&self) -> usize {
        self.metadata.iter().filter(|m| m.is_none()).count()
    }
}

/// Formatte un montant brut avec exactement un chiffre après la virgule
///
/// Le montant est décalé de `decimals` puis passé par un f64 :
/// l'arrondi suit le formatage flottant, pas une arithmétique décimale exacte.
///
/// # Exemple
/// format_balance("1500000000000000000", Some(18)) == "1.5"
/// format_balance("100", Some(0)) == "100.0"
pub fn format_balance(raw: &str, decimals: Option<u8>) -> String {
    let decimals = decimals.unwrap_or(DEFAULT_DECIMALS);
    let raw = raw.trim();

    // U256::from_str lit "" et "0x" comme zéro : ce n'est pas un montant
    let digits = raw.strip_prefix("0x").unwrap_or(raw);
    if digits.is_empty() {
        return "?".to_string();
    }

    let Ok(amount) = U256::from_str(raw) else {
        return "?".to_string();
    };

    format_units(amount, decimals)
        .ok()
        .and_then(|shifted| shifted.parse::<f64>().ok())
        .map(|value| format!("{:.1}", value))
        .unwrap_or_else(|| "?".to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_balance_shifts_decimals() {
        assert_eq!(format_balance("1500000000000000000", Some(18)), "1.5");
    }

    #[test]
    fn test_format_balance_zero_decimals() {
        assert_eq!(format_balance("100", Some(0)), "100.0");
    }

    #[test]
    fn test_format_balance_hex_amount() {
        // 0x14d1120d7b160000 = 1.5e18
        assert_eq!(format_balance("0x14d1120d7b160000", Some(18)), "1.5");
    }

    #[test]
    fn test_format_balance_defaults_to_18_decimals() {
        assert_eq!(format_balance("2000000000000000000", None), "2.0");
    }

    #[test]
    fn test_format_balance_garbage() {
        assert_eq!(format_balance("not a number", Some(6)), "?");
        assert_eq!(format_balance("", Some(18)), "?");
        assert_eq!(format_balance("0x", Some(18)), "?");
        assert_eq!(format_balance("  ", None), "?");
    }

    #[test]
    fn test_deserialize_alchemy_balance() {
        let json = r#"{"contractAddress":"0xa0b8","tokenBalance":"0x01","error":null}"#;
        let balance: TokenBalance = serde_json::from_str(json).unwrap();
        assert_eq!(balance.contract_address, "0xa0b8");
        assert_eq!(balance.token_balance, "0x01");
    }

    #[test]
    fn test_deserialize_metadata_with_nulls() {
        let json = r#"{"name":null,"symbol":"USDC","decimals":6,"logo":null}"#;
        let metadata: TokenMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.display_symbol(), "USDC");
        assert_eq!(metadata.decimals, Some(6));
        assert!(metadata.logo.is_none());
    }

    #[test]
    fn test_holdings_are_positional() {
        let result = QueryResult::new(
            "0x00".to_string(),
            vec![TokenBalance::new("0xa", "1"), TokenBalance::new("0xb", "2")],
            vec![Some(TokenMetadata::new("AAA", 0)), None],
        );

        let holdings: Vec<_> = result.holdings().collect();
        assert_eq!(holdings.len(), 2);
        assert_eq!(holdings[0].0.contract_address, "0xa");
        assert_eq!(holdings[0].1.map(|m| m.display_symbol()), Some("AAA"));
        assert!(holdings[1].1.is_none());
        assert_eq!(result.missing_metadata(), 1);
    }
}
