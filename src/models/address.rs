// ============================================================================
// Adresses Ethereum et noms ENS
// ============================================================================
// Validation du format d'adresse et détection des noms ENS
//
// CONCEPTS RUST :
// 1. &str en entrée : on valide sans copier la chaîne
// 2. Pattern matching sur des tuples de booléens
// 3. Réutilisation d'une crate de l'écosystème (alloy-primitives)
//    pour le checksum EIP-55 au lieu de réimplémenter keccak
// ============================================================================

use alloy_primitives::Address;

/// Suffixe réservé des noms ENS
pub const ENS_SUFFIX: &str = ".eth";

/// Préfixe obligatoire d'une adresse
pub const ADDRESS_PREFIX: &str = "0x";

/// Nombre de chiffres hexadécimaux après le préfixe
pub const ADDRESS_HEX_LEN: usize = 40;

/// Vérifie si la saisie doit passer par la résolution ENS
pub fn is_ens_name(input: &str) -> bool {
    input.ends_with(ENS_SUFFIX)
}

/// Vérifie qu'une chaîne est une adresse Ethereum valide
///
/// Règles :
/// - préfixe "0x" obligatoire
/// - exactement 40 chiffres hexadécimaux
/// - casse uniforme (tout minuscule ou tout majuscule) acceptée telle quelle
/// - casse mixte : doit respecter le checksum EIP-55
///
/// CONCEPT RUST : Early return
/// - Chaque règle qui échoue retourne false immédiatement
/// - Évite les if imbriqués
pub fn is_valid_address(candidate: &str) -> bool {
    let Some(body) = candidate.strip_prefix(ADDRESS_PREFIX) else {
        return false;
    };

    if body.len() != ADDRESS_HEX_LEN || !body.chars().all(|c| c.is_ascii_hexdigit()) {
        return false;
    }

    let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = body.chars().any(|c| c.is_ascii_uppercase());

    match (has_lower, has_upper) {
        (true, true) => Address::parse_checksummed(candidate, None).is_ok(),
        _ => true,
    }
}

/// Raccourcit une adresse pour l'affichage : "0x1234…abcd"
///
/// La chaîne vient de l'API : si une coupure tombe au milieu d'un
/// caractère multi-octets, on la retourne entière au lieu de paniquer.
pub fn short_address(address: &str) -> String {
    if address.len() <= 12 {
        return address.to_string();
    }

    // CONCEPT RUST : str::get
    // - Retourne None au lieu de paniquer hors d'une frontière UTF-8
    match (address.get(..6), address.get(address.len() - 4..)) {
        (Some(head), Some(tail)) => format!("{}…{}", head, tail),
        _ => address.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
