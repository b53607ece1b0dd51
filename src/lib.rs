// ============================================================================
// ERC-20 Indexer - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests d'intégration
// ============================================================================

pub mod api;      // Clients externes : Alchemy, wallet
pub mod app;      // État de l'application
pub mod config;   // Configuration (fichier TOML + environnement)
pub mod models;   // Structures de données
pub mod services; // Wallet Connector, Address Resolver, Balance Fetcher
pub mod ui;       // Interface utilisateur
pub mod worker;   // Exécution des commandes en arrière-plan
