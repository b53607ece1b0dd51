// ============================================================================
// Module : models
// ============================================================================
// Structures de données de l'application : adresses, soldes, métadonnées
// ============================================================================

pub mod address; // Validation d'adresse et détection ENS
pub mod token;   // Soldes, métadonnées et formatage des montants

// Re-export des éléments principaux pour simplifier les imports
// Au lieu de : use erc20_indexer::models::token::TokenBalance;
// On peut faire : use erc20_indexer::models::TokenBalance;
pub use address::{is_ens_name, is_valid_address, short_address};
pub use token::{format_balance, QueryResult, TokenBalance, TokenMetadata};
