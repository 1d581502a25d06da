//! Symmetric UTXO blob encryption.
//!
//! Two authenticated formats share this module:
//!
//! * **V1 (legacy)**: AES-128-CTR with a random 16-byte IV, authenticated
//!   by an HMAC-SHA256 tag over `nonce ‖ ciphertext` truncated to 16 bytes.
//!   No version tag on the wire; layout `nonce(16) ‖ tag(16) ‖ ciphertext`.
//!   The cipher and MAC keys are adjacent slices of the signature prefix.
//!   This construction is frozen: it exists only so ciphertexts already on
//!   chain stay recoverable, and must never be used for a new format.
//! * **V2 (current)**: AES-256-GCM under the full 32-byte session key.
//!   Layout `tag8(…02) ‖ nonce(12) ‖ tag(16) ‖ ciphertext`.
//!
//! Nonces come fresh from the OS RNG on every call. A repeated nonce under
//! the same key breaks both constructions, and the RNG is the sole defense;
//! entropy failure aborts rather than degrading.

use aes::cipher::{KeyIvInit, StreamCipher};
use aes::Aes128;
use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use ctr::Ctr128BE;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::CryptoError;
use crate::format::{V2_TAG, VERSION_TAG_LEN};
use crate::keys::{LegacyKeyMaterial, SessionKeyMaterial};

type Aes128Ctr = Ctr128BE<Aes128>;
type HmacSha256 = Hmac<Sha256>;

pub(crate) const V1_NONCE_LEN: usize = 16;
pub(crate) const V1_TAG_LEN: usize = 16;
pub(crate) const V2_NONCE_LEN: usize = 12;
pub(crate) const GCM_TAG_LEN: usize = 16;

const SYMMETRIC_KEY_LEN: usize = 32;

// ============================================================================
// V1 (legacy)
// ============================================================================

/// Truncated HMAC-SHA256 over `nonce ‖ ciphertext`.
fn v1_auth_tag(material: &LegacyKeyMaterial, nonce: &[u8], ciphertext: &[u8]) -> [u8; V1_TAG_LEN] {
    // HMAC accepts keys of any length; 15 bytes cannot fail here.
    let mut mac = <HmacSha256 as Mac>::new_from_slice(material.mac_key())
        .expect("HMAC-SHA256 accepts any key length");
    mac.update(nonce);
    mac.update(ciphertext);
    let full = mac.finalize().into_bytes();

    let mut tag = [0u8; V1_TAG_LEN];
    tag.copy_from_slice(&full[..V1_TAG_LEN]);
    tag
}

/// Encrypt in the legacy V1 format. Backward-compatibility and test
/// fixtures only; new application data always uses V2.
pub(crate) fn encrypt_v1(material: &LegacyKeyMaterial, plaintext: &[u8]) -> Vec<u8> {
    let mut nonce = [0u8; V1_NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let mut ciphertext = plaintext.to_vec();
    let key = material.cipher_key();
    let mut cipher = Aes128Ctr::new((&key).into(), (&nonce).into());
    cipher.apply_keystream(&mut ciphertext);

    let tag = v1_auth_tag(material, &nonce, &ciphertext);

    let mut blob = Vec::with_capacity(V1_NONCE_LEN + V1_TAG_LEN + ciphertext.len());
    blob.extend_from_slice(&nonce);
    blob.extend_from_slice(&tag);
    blob.extend_from_slice(&ciphertext);
    blob
}

/// Decrypt a legacy V1 blob.
///
/// The tag is verified in constant time before any keystream is applied;
/// no plaintext is released on mismatch.
pub(crate) fn decrypt_v1(material: &LegacyKeyMaterial, blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if blob.len() < V1_NONCE_LEN + V1_TAG_LEN {
        return Err(CryptoError::DecryptionFailed);
    }

    let mut nonce = [0u8; V1_NONCE_LEN];
    nonce.copy_from_slice(&blob[..V1_NONCE_LEN]);
    let tag = &blob[V1_NONCE_LEN..V1_NONCE_LEN + V1_TAG_LEN];
    let ciphertext = &blob[V1_NONCE_LEN + V1_TAG_LEN..];

    let expected = v1_auth_tag(material, &nonce, ciphertext);
    if !bool::from(expected[..].ct_eq(tag)) {
        return Err(CryptoError::DecryptionFailed);
    }

    let mut plaintext = ciphertext.to_vec();
    let key = material.cipher_key();
    let mut cipher = Aes128Ctr::new((&key).into(), (&nonce).into());
    cipher.apply_keystream(&mut plaintext);
    Ok(plaintext)
}

// ============================================================================
// V2 (current)
// ============================================================================

fn encrypt_v2_with_key(key: &[u8; SYMMETRIC_KEY_LEN], plaintext: &[u8]) -> Vec<u8> {
    let cipher = Aes256Gcm::new(key.into());

    let mut nonce_bytes = [0u8; V2_NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from(nonce_bytes);

    // The AEAD appends the 16-byte tag; the wire format carries it between
    // the nonce and the ciphertext body.
    let sealed = cipher
        .encrypt(&nonce, plaintext)
        .expect("AES-GCM encryption of an in-memory buffer cannot fail");
    let (ciphertext, tag) = sealed.split_at(sealed.len() - GCM_TAG_LEN);

    let mut blob =
        Vec::with_capacity(VERSION_TAG_LEN + V2_NONCE_LEN + GCM_TAG_LEN + ciphertext.len());
    blob.extend_from_slice(&V2_TAG);
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(tag);
    blob.extend_from_slice(ciphertext);
    blob
}

fn decrypt_v2_with_key(key: &[u8; SYMMETRIC_KEY_LEN], blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
    const HEADER_LEN: usize = VERSION_TAG_LEN + V2_NONCE_LEN + GCM_TAG_LEN;

    if blob.len() < HEADER_LEN || blob[..VERSION_TAG_LEN] != V2_TAG {
        return Err(CryptoError::DecryptionFailed);
    }

    let mut nonce_bytes = [0u8; V2_NONCE_LEN];
    nonce_bytes.copy_from_slice(&blob[VERSION_TAG_LEN..VERSION_TAG_LEN + V2_NONCE_LEN]);
    let tag = &blob[VERSION_TAG_LEN + V2_NONCE_LEN..HEADER_LEN];
    let ciphertext = &blob[HEADER_LEN..];

    // Reassemble the `ciphertext ‖ tag` layout the AEAD API verifies.
    let mut sealed = Vec::with_capacity(ciphertext.len() + GCM_TAG_LEN);
    sealed.extend_from_slice(ciphertext);
    sealed.extend_from_slice(tag);

    let cipher = Aes256Gcm::new(key.into());
    cipher
        .decrypt(&Nonce::from(nonce_bytes), sealed.as_ref())
        .map_err(|_| CryptoError::DecryptionFailed)
}

pub(crate) fn encrypt_v2(material: &SessionKeyMaterial, plaintext: &[u8]) -> Vec<u8> {
    encrypt_v2_with_key(material.cipher_key(), plaintext)
}

pub(crate) fn decrypt_v2(material: &SessionKeyMaterial, blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
    decrypt_v2_with_key(material.cipher_key(), blob)
}

// ============================================================================
// External-key path (pay-link recipient side)
// ============================================================================

fn check_key_len(key: &[u8]) -> Result<&[u8; SYMMETRIC_KEY_LEN], CryptoError> {
    key.try_into().map_err(|_| CryptoError::InvalidKeyLength {
        expected: SYMMETRIC_KEY_LEN,
        actual: key.len(),
    })
}

/// V2-format encryption under a caller-supplied 32-byte key, used when
/// encrypting for someone else rather than under the derived session key.
pub fn encrypt_with_key(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    Ok(encrypt_v2_with_key(check_key_len(key)?, plaintext))
}

/// Inverse of [`encrypt_with_key`].
pub fn decrypt_with_key(blob: &[u8], key: &[u8]) -> Result<Vec<u8>, CryptoError> {
    decrypt_v2_with_key(check_key_len(key)?, blob)
}
