//! Pay-link ("box") encryption.
//!
//! A pay link embeds the recipient's X25519 public key, so a sender can
//! deposit into the recipient's shielded balance without any interactive
//! handshake. The recipient's keypair is derived deterministically from the
//! V2 session material and can always be re-derived from a fresh wallet
//! signature.
//!
//! Wire layout: `tag8(…03) ‖ ephemeral_pk(32) ‖ nonce(24) ‖ ciphertext`.
//! Each encryption uses a fresh ephemeral keypair and a fresh nonce; the
//! X25519 shared secret keys an XSalsa20-Poly1305 AEAD.

use rand::rngs::OsRng;
use rand::RngCore;
use sha3::{Digest, Keccak256};
use x25519_dalek::{PublicKey, StaticSecret};
use xsalsa20poly1305::{aead::Aead, KeyInit, Nonce, XSalsa20Poly1305};
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::format::{BOX_TAG, VERSION_TAG_LEN};
use crate::keys::SessionKeyMaterial;

/// Domain-separation suffix appended to the V2 material for the box seed.
const BOX_SEED_SUFFIX: &[u8] = b"box";

pub(crate) const BOX_PUBKEY_LEN: usize = 32;
pub(crate) const BOX_NONCE_LEN: usize = 24;
const POLY1305_TAG_LEN: usize = 16;

/// Shortest possible box blob: header plus the tag of an empty message.
const BOX_MIN_LEN: usize = VERSION_TAG_LEN + BOX_PUBKEY_LEN + BOX_NONCE_LEN + POLY1305_TAG_LEN;

/// Deterministic X25519 keypair backing the pay-link flow.
///
/// The secret half never leaves this struct; only the public half is
/// shareable. The inner secret is zeroized on drop.
pub struct BoxKeypair {
    secret: StaticSecret,
    public: PublicKey,
}

impl BoxKeypair {
    /// Derive from V2 session material: seed = `keccak256(v2 ‖ "box")`.
    ///
    /// Same material always yields the same keypair.
    pub(crate) fn derive(material: &SessionKeyMaterial) -> Self {
        let mut hasher = Keccak256::new();
        hasher.update(material.cipher_key());
        hasher.update(BOX_SEED_SUFFIX);

        let mut seed = [0u8; 32];
        seed.copy_from_slice(&hasher.finalize());

        let secret = StaticSecret::from(seed);
        let public = PublicKey::from(&secret);
        seed.zeroize();

        Self { secret, public }
    }

    /// The raw public key, safe to share.
    pub fn public_key(&self) -> [u8; BOX_PUBKEY_LEN] {
        self.public.to_bytes()
    }

    /// Hex form of the public key, the value embedded in pay links.
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public.as_bytes())
    }
}

impl std::fmt::Debug for BoxKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxKeypair")
            .field("public", &self.public_key_hex())
            .finish_non_exhaustive()
    }
}

/// Encrypt for a recipient known only by their box public key.
///
/// Sender side of the pay-link deposit flow; needs no local key material.
pub fn encrypt_for_recipient(
    plaintext: &[u8],
    recipient_public_key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let recipient: [u8; BOX_PUBKEY_LEN] =
        recipient_public_key
            .try_into()
            .map_err(|_| CryptoError::InvalidKeyLength {
                expected: BOX_PUBKEY_LEN,
                actual: recipient_public_key.len(),
            })?;

    let mut ephemeral_bytes = [0u8; 32];
    OsRng.fill_bytes(&mut ephemeral_bytes);
    let ephemeral_secret = StaticSecret::from(ephemeral_bytes);
    let ephemeral_public = PublicKey::from(&ephemeral_secret);
    ephemeral_bytes.zeroize();

    let shared = ephemeral_secret.diffie_hellman(&PublicKey::from(recipient));
    let cipher = XSalsa20Poly1305::new(shared.as_bytes().into());

    let mut nonce_bytes = [0u8; BOX_NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from(nonce_bytes);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .expect("XSalsa20-Poly1305 encryption of an in-memory buffer cannot fail");

    let mut blob =
        Vec::with_capacity(VERSION_TAG_LEN + BOX_PUBKEY_LEN + BOX_NONCE_LEN + ciphertext.len());
    blob.extend_from_slice(&BOX_TAG);
    blob.extend_from_slice(ephemeral_public.as_bytes());
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Open a box blob addressed to `keypair`.
pub(crate) fn decrypt_own(keypair: &BoxKeypair, blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if blob.len() < BOX_MIN_LEN || blob[..VERSION_TAG_LEN] != BOX_TAG {
        return Err(CryptoError::DecryptionFailed);
    }

    let mut ephemeral = [0u8; BOX_PUBKEY_LEN];
    ephemeral.copy_from_slice(&blob[VERSION_TAG_LEN..VERSION_TAG_LEN + BOX_PUBKEY_LEN]);

    let nonce_start = VERSION_TAG_LEN + BOX_PUBKEY_LEN;
    let mut nonce_bytes = [0u8; BOX_NONCE_LEN];
    nonce_bytes.copy_from_slice(&blob[nonce_start..nonce_start + BOX_NONCE_LEN]);
    let ciphertext = &blob[nonce_start + BOX_NONCE_LEN..];

    let shared = keypair.secret.diffie_hellman(&PublicKey::from(ephemeral));
    let cipher = XSalsa20Poly1305::new(shared.as_bytes().into());

    cipher
        .decrypt(&Nonce::from(nonce_bytes), ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)
}

/// Parse the hex public key carried in a pay link.
pub fn decode_public_key_hex(hex_key: &str) -> Result<[u8; BOX_PUBKEY_LEN], CryptoError> {
    let bytes = hex::decode(hex_key).map_err(|_| CryptoError::InvalidKeyLength {
        expected: BOX_PUBKEY_LEN,
        actual: hex_key.len() / 2,
    })?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| CryptoError::InvalidKeyLength {
            expected: BOX_PUBKEY_LEN,
            actual: bytes.len(),
        })
}
