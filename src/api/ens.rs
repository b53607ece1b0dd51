// ============================================================================
// ENS : résolution de noms via eth_call
// ============================================================================
// Un nom "vitalik.eth" est résolu en deux appels :
// 1. registry.resolver(namehash(name)) -> adresse du resolver
// 2. resolver.addr(namehash(name))     -> adresse finale
//
// Seule la mise en minuscules est appliquée au nom (pas de normalisation
// ENSIP-15 complète).
// ============================================================================

use alloy_primitives::{hex, keccak256, Address, B256};
use anyhow::{Context, Result};

/// Registre ENS (même adresse sur mainnet et les testnets)
pub const ENS_REGISTRY: &str = "0x00000000000C2E074eC69A0dFb2997BA6C7d2e1e";

/// Sélecteur de `resolver(bytes32)`
pub const RESOLVER_SELECTOR: [u8; 4] = [0x01, 0x78, 0xb8, 0xbf];

/// Sélecteur de `addr(bytes32)`
pub const ADDR_SELECTOR: [u8; 4] = [0x3b, 0x3b, 0x57, 0xde];

/// Calcule le namehash EIP-137 d'un nom
///
/// namehash("") = 0x00..00
/// namehash(label.rest) = keccak256(namehash(rest) ++ keccak256(label))
pub fn namehash(name: &str) -> B256 {
    let name = name.to_lowercase();
    let mut node = B256::ZERO;

    if name.is_empty() {
        return node;
    }

    // CONCEPT RUST : rsplit
    // - Parcourt les labels de droite à gauche ("eth" puis "vitalik")
    for label in name.rsplit('.') {
        let label_hash = keccak256(label.as_bytes());
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(node.as_slice());
        buf[32..].copy_from_slice(label_hash.as_slice());
        node = keccak256(buf);
    }

    node
}

/// Encode l'appel `selector(bytes32 node)` en hexadécimal "0x..."
pub fn encode_node_call(selector: [u8; 4], node: B256) -> String {
    let mut data = Vec::with_capacity(36);
    data.extend_from_slice(&selector);
    data.extend_from_slice(node.as_slice());
    hex::encode_prefixed(data)
}

/// Décode un mot ABI de 32 octets contenant une adresse
///
/// Retourne None pour l'adresse nulle (nom sans resolver ou sans adresse).
pub fn decode_address_word(raw: &str) -> Result<Option<Address>> {
    let bytes = hex::decode(raw).context("Réponse eth_call non hexadécimale")?;

    if bytes.len() < 32 {
        // "0x" vide : le contrat appelé n'existe pas ou n'implémente pas la fonction
        return Ok(None);
    }

    let address = Address::from_slice(&bytes[12..32]);
    if address.is_zero() {
        Ok(None)
    } else {
        Ok(Some(address))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namehash_vectors() {
        assert_eq!(namehash(""), B256::ZERO);
        assert_eq!(
            hex::encode_prefixed(namehash("eth")),
            "0x93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"
        );
        assert_eq!(
            hex::encode_prefixed(namehash("foo.eth")),
            "0xde9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f"
        );
    }

    #[test]
    fn test_namehash_is_case_insensitive() {
        assert_eq!(namehash("Foo.ETH"), namehash("foo.eth"));
    }

    #[test]
    fn test_encode_node_call() {
        let data = encode_node_call(ADDR_SELECTOR, B256::ZERO);
        assert!(data.starts_with("0x3b3b57de"));
        // 0x + 4 octets de sélecteur + 32 octets de node
        assert_eq!(data.len(), 2 + 8 + 64);
    }

    #[test]
    fn test_decode_address_word() {
        let word = "0x000000000000000000000000d8da6bf26964af9d7eed9e03e53415d37aa96045";
        let address = decode_address_word(word).unwrap().unwrap();
        assert_eq!(
            address.to_checksum(None),
            "0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045"
        );
    }

    #[test]
    fn test_decode_zero_and_empty() {
        let zero = format!("0x{}", "0".repeat(64));
        assert!(decode_address_word(&zero).unwrap().is_none());
        assert!(decode_address_word("0x").unwrap().is_none());
        assert!(decode_address_word("0xzz").is_err());
    }
}
