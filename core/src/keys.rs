//! Deterministic key derivation from wallet signatures.
//!
//! A wallet signs one fixed message per session; everything else derives
//! from those 64 signature bytes:
//!
//! ```text
//! signature
//!   ├── bytes [0..31]      → V1 material (legacy)
//!   │        └── SHA-256   → UTXO private key v1
//!   └── Keccak-256         → V2 material (current)
//!            ├── Keccak-256              → UTXO private key v2
//!            └── Keccak-256(v2 ‖ "box")  → X25519 pay-link keypair seed
//! ```
//!
//! V2 material passes the signature through a hash so no algebraic
//! structure of the signature bytes survives into the key. The V1 prefix
//! slice predates that rule; it is frozen so ciphertexts already on chain
//! stay recoverable, and must never be extended to a new format.

use sha2::{Digest, Sha256};
use sha3::Keccak256;
use zeroize::Zeroize;

/// Fixed message the wallet signs to unlock a session.
pub const SIGN_IN_MESSAGE: &str = "Privacy Money account sign in";

/// Length of the legacy V1 material (signature prefix).
pub(crate) const V1_MATERIAL_LEN: usize = 31;

/// Split point inside the V1 material: bytes `[0..16]` key the stream
/// cipher, bytes `[16..31]` key the HMAC.
const V1_CIPHER_KEY_LEN: usize = 16;

/// External wallet signing capability.
///
/// The application layer implements this over whatever wallet adapter it
/// uses; the core only needs the signature bytes back. Implementations
/// report failure (including user rejection) as a message string.
pub trait MessageSigner {
    fn sign_message(&self, message: &[u8]) -> Result<Vec<u8>, String>;
}

/// Legacy (V1) key material: the first 31 bytes of the wallet signature.
///
/// Signatures shorter than 31 bytes are zero-padded; wallets produce
/// 64-byte ed25519 signatures in practice. Zeroized on drop.
pub struct LegacyKeyMaterial {
    material: [u8; V1_MATERIAL_LEN],
    utxo_private_key: String,
}

impl LegacyKeyMaterial {
    pub(crate) fn derive(signature: &[u8]) -> Self {
        let mut material = [0u8; V1_MATERIAL_LEN];
        let take = signature.len().min(V1_MATERIAL_LEN);
        material[..take].copy_from_slice(&signature[..take]);

        let digest = Sha256::digest(material);
        let utxo_private_key = format!("0x{}", hex::encode(digest));

        Self {
            material,
            utxo_private_key,
        }
    }

    /// AES-128-CTR key slice (frozen layout).
    pub(crate) fn cipher_key(&self) -> [u8; V1_CIPHER_KEY_LEN] {
        let mut key = [0u8; V1_CIPHER_KEY_LEN];
        key.copy_from_slice(&self.material[..V1_CIPHER_KEY_LEN]);
        key
    }

    /// HMAC-SHA256 key slice (frozen layout, 15 bytes).
    pub(crate) fn mac_key(&self) -> &[u8] {
        &self.material[V1_CIPHER_KEY_LEN..]
    }

    /// Hex-encoded UTXO private key for V1 records (`0x` + 64 hex chars).
    pub fn utxo_private_key(&self) -> &str {
        &self.utxo_private_key
    }
}

impl Drop for LegacyKeyMaterial {
    fn drop(&mut self) {
        self.material.zeroize();
        self.utxo_private_key.zeroize();
    }
}

impl std::fmt::Debug for LegacyKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacyKeyMaterial").finish_non_exhaustive()
    }
}

/// Current (V2) key material: `keccak256(signature)`.
///
/// Independent of the V1 prefix slice: knowing one buffer reveals nothing
/// about the other. Zeroized on drop.
pub struct SessionKeyMaterial {
    material: [u8; 32],
    utxo_private_key: String,
}

impl SessionKeyMaterial {
    pub(crate) fn derive(signature: &[u8]) -> Self {
        let mut material = [0u8; 32];
        material.copy_from_slice(&Keccak256::digest(signature));

        let digest = Keccak256::digest(material);
        let utxo_private_key = format!("0x{}", hex::encode(digest));

        Self {
            material,
            utxo_private_key,
        }
    }

    /// Full 32-byte AES-256-GCM key; also the box-seed input.
    pub(crate) fn cipher_key(&self) -> &[u8; 32] {
        &self.material
    }

    /// Hex-encoded UTXO private key for V2 records (`0x` + 64 hex chars).
    pub fn utxo_private_key(&self) -> &str {
        &self.utxo_private_key
    }
}

impl Drop for SessionKeyMaterial {
    fn drop(&mut self) {
        self.material.zeroize();
        self.utxo_private_key.zeroize();
    }
}

impl std::fmt::Debug for SessionKeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeyMaterial").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_v1_material_is_signature_prefix() {
        let signature: Vec<u8> = (0u8..64).collect();
        let legacy = LegacyKeyMaterial::derive(&signature);

        assert_eq!(legacy.cipher_key(), &signature[..16]);
        assert_eq!(legacy.mac_key(), &signature[16..31]);
    }

    #[test]
    fn test_v2_material_is_signature_hash() {
        let signature = [0x11u8; 64];
        let current = SessionKeyMaterial::derive(&signature);

        let expected = Keccak256::digest(signature);
        assert_eq!(current.cipher_key()[..], expected[..]);
    }

    #[test]
    fn test_utxo_private_key_shape() {
        let signature = [0x11u8; 64];
        let legacy = LegacyKeyMaterial::derive(&signature);
        let current = SessionKeyMaterial::derive(&signature);

        for key in [legacy.utxo_private_key(), current.utxo_private_key()] {
            assert_eq!(key.len(), 66);
            assert!(key.starts_with("0x"));
            assert!(key[2..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_short_signature_is_zero_padded() {
        let legacy = LegacyKeyMaterial::derive(&[0xab; 10]);
        let mut expected = [0u8; V1_MATERIAL_LEN];
        expected[..10].copy_from_slice(&[0xab; 10]);

        assert_eq!(legacy.cipher_key(), &expected[..16]);
        assert_eq!(legacy.mac_key(), &expected[16..]);
    }
}
