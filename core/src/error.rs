//! Error types for the encryption core.

use thiserror::Error;

/// Errors surfaced by key derivation, the blob codecs, and the record codec.
///
/// A [`CryptoError::DecryptionFailed`] carries no detail about what went
/// wrong. Callers must treat it as "wrong key or corrupted data" without
/// distinguishing further; anything finer-grained becomes a decryption
/// oracle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Key material for the requested version has never been derived.
    #[error("key material not derived")]
    KeyNotDerived,

    /// The symmetric codec needs key material that is absent.
    #[error("encryption key not set")]
    KeyNotSet,

    /// A supplied key is not the required length.
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Authentication tag mismatch, cipher failure, or truncated input.
    #[error("decryption failed")]
    DecryptionFailed,

    /// Decrypted plaintext did not split into exactly four non-empty fields.
    #[error("malformed UTXO record")]
    MalformedRecord,

    /// A record field contains the reserved delimiter.
    #[error("field `{field}` contains the reserved delimiter")]
    InvalidField { field: &'static str },

    /// The wallet signing capability failed or was rejected by the user.
    #[error("wallet signing failed: {0}")]
    Signer(String),
}
