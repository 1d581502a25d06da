//! Client-side encryption and key derivation for Privacy Money shielded
//! balances.
//!
//! A wallet signs a fixed message once per session; this crate turns that
//! signature into deterministic symmetric and asymmetric key material,
//! encrypts and decrypts the compact UTXO records stored on-chain as opaque
//! blobs, and implements the pay-link box path that lets a sender deposit
//! into a recipient's balance knowing only the recipient's public key.
//!
//! Three wire formats coexist on chain, distinguished by an 8-byte prefix:
//!
//! | format | tag (bytes 0-7) | layout after tag                     |
//! |--------|-----------------|--------------------------------------|
//! | V1     | none (fallback) | nonce(16) ‖ tag(16) ‖ ciphertext     |
//! | V2     | 00…00 02        | nonce(12) ‖ tag(16) ‖ ciphertext     |
//! | Box    | 00…00 03        | eph_pk(32) ‖ nonce(24) ‖ ciphertext  |
//!
//! Decryption fails closed: a wrong key, tampered bytes, or truncated input
//! all surface as [`CryptoError::DecryptionFailed`], never as garbage
//! plaintext. A single wrong offset here makes funds unrecoverable, so the
//! byte layouts above are frozen.
//!
//! Security properties:
//! - Constant-time comparison for authentication tags
//! - Zeroization of key material on drop and on [`WalletSession::reset`]
//! - Fresh OS-entropy nonces and ephemeral keys on every encryption

pub mod error;
pub mod format;
pub mod keys;
pub mod paylink;
pub mod session;
pub mod symmetric;
pub mod utxo;


#[cfg(test)]
mod test_vectors;



pub use error::CryptoError;
pub use format::{classify, is_box_encrypted, KeyVersion, WireFormat};
pub use keys::{MessageSigner, SIGN_IN_MESSAGE};
pub use paylink::{decode_public_key_hex, encrypt_for_recipient, BoxKeypair};
pub use session::WalletSession;
pub use symmetric::{decrypt_with_key, encrypt_with_key};
pub use utxo::{DecryptedRecord, UtxoRecord};
