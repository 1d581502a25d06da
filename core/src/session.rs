//! Session orchestration: the public surface of the encryption core.
//!
//! A [`WalletSession`] starts empty, is fed one wallet signature, and then
//! serves encrypt/decrypt calls for the rest of its life. Key material is
//! read-only after derivation, so concurrent reads from multiple threads
//! are safe without locking. Callers that interleave [`WalletSession::reset`]
//! with readers must serialize those calls themselves (single-writer,
//! multi-reader).

use crate::error::CryptoError;
use crate::format::{classify, KeyVersion, WireFormat};
use crate::keys::{LegacyKeyMaterial, MessageSigner, SessionKeyMaterial, SIGN_IN_MESSAGE};
use crate::paylink::{self, BoxKeypair};
use crate::symmetric;
use crate::utxo::{DecryptedRecord, UtxoRecord};

/// Long-lived per-wallet encryption session.
#[derive(Default)]
pub struct WalletSession {
    pub(crate) legacy: Option<LegacyKeyMaterial>,
    pub(crate) current: Option<SessionKeyMaterial>,
}

impl WalletSession {
    /// Fresh session with no key material.
    pub fn new() -> Self {
        Self::default()
    }

    // ==================== Key derivation ====================

    /// Derive and cache both key versions from a wallet signature.
    ///
    /// Pure function of the input: deriving twice from the same signature,
    /// in the same or a different session, yields identical material and
    /// identical precomputed UTXO private keys.
    pub fn derive_from_signature(&mut self, signature: &[u8]) {
        self.legacy = Some(LegacyKeyMaterial::derive(signature));
        self.current = Some(SessionKeyMaterial::derive(signature));
    }

    /// Sign the fixed session message with the supplied wallet capability
    /// and derive from the resulting signature.
    pub fn derive_from_wallet<S: MessageSigner>(&mut self, signer: &S) -> Result<(), CryptoError> {
        let signature = signer
            .sign_message(SIGN_IN_MESSAGE.as_bytes())
            .map_err(CryptoError::Signer)?;
        self.derive_from_signature(&signature);
        Ok(())
    }

    /// Whether material for `version` is currently cached.
    pub fn is_derived(&self, version: KeyVersion) -> bool {
        match version {
            KeyVersion::V1 => self.legacy.is_some(),
            KeyVersion::V2 => self.current.is_some(),
        }
    }

    /// Hex-encoded UTXO private key for `version` (`0x` + 64 hex chars).
    pub fn utxo_private_key(&self, version: KeyVersion) -> Result<&str, CryptoError> {
        match version {
            KeyVersion::V1 => self.legacy.as_ref().map(LegacyKeyMaterial::utxo_private_key),
            KeyVersion::V2 => self
                .current
                .as_ref()
                .map(SessionKeyMaterial::utxo_private_key),
        }
        .ok_or(CryptoError::KeyNotDerived)
    }

    /// Deterministic pay-link keypair for this session.
    pub fn box_keypair(&self) -> Result<BoxKeypair, CryptoError> {
        self.current
            .as_ref()
            .map(BoxKeypair::derive)
            .ok_or(CryptoError::KeyNotDerived)
    }

    /// Shareable pay-link public key, hex-encoded.
    pub fn box_public_key_hex(&self) -> Result<String, CryptoError> {
        Ok(self.box_keypair()?.public_key_hex())
    }

    /// Drop (and zeroize) all cached key material.
    ///
    /// Key rotation and test hygiene; not a hot-path operation.
    pub fn reset(&mut self) {
        self.legacy = None;
        self.current = None;
    }

    // ==================== Raw buffers ====================

    /// Encrypt under the current (V2) key.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let material = self.current.as_ref().ok_or(CryptoError::KeyNotSet)?;
        Ok(symmetric::encrypt_v2(material, plaintext))
    }

    /// Encrypt in the legacy V1 format.
    ///
    /// Backward-compatibility fixtures only; new application data always
    /// goes through [`WalletSession::encrypt`].
    pub fn encrypt_legacy(&self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let material = self.legacy.as_ref().ok_or(CryptoError::KeyNotSet)?;
        Ok(symmetric::encrypt_v1(material, plaintext))
    }

    /// Decrypt a symmetric blob, routing V1/V2 on the version tag.
    pub fn decrypt(&self, blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match classify(blob) {
            WireFormat::V2 => {
                let material = self.current.as_ref().ok_or(CryptoError::KeyNotSet)?;
                symmetric::decrypt_v2(material, blob)
            }
            WireFormat::V1 => {
                let material = self.legacy.as_ref().ok_or(CryptoError::KeyNotSet)?;
                symmetric::decrypt_v1(material, blob)
            }
            // Box blobs are asymmetric and never decrypt on this path.
            WireFormat::Box => Err(CryptoError::DecryptionFailed),
        }
    }

    /// Decrypt a pay-link (box) blob addressed to this session.
    pub fn decrypt_paylink(&self, blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let keypair = self.box_keypair()?;
        paylink::decrypt_own(&keypair, blob)
    }

    // ==================== UTXO records ====================

    /// Serialize and encrypt a self-owned record. Always V2.
    pub fn encrypt_record(&self, record: &UtxoRecord) -> Result<Vec<u8>, CryptoError> {
        let plaintext = record.serialize()?;
        self.encrypt(plaintext.as_bytes())
    }

    /// Serialize and encrypt a record for another wallet's pay link.
    ///
    /// Sender side: needs only the recipient's box public key, no local
    /// key material.
    pub fn encrypt_record_for_recipient(
        record: &UtxoRecord,
        recipient_public_key: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let plaintext = record.serialize()?;
        paylink::encrypt_for_recipient(plaintext.as_bytes(), recipient_public_key)
    }

    /// Decrypt an on-chain blob into a spendable record.
    ///
    /// Detect format → decrypt → authenticate → split fields → reconstruct.
    /// The record is tagged with the format actually used and carries the
    /// matching UTXO private key; on any failure nothing is returned.
    pub fn decrypt_record(&self, blob: &[u8]) -> Result<DecryptedRecord, CryptoError> {
        let format = classify(blob);

        let plaintext = match format {
            WireFormat::Box => self.decrypt_paylink(blob)?,
            WireFormat::V1 | WireFormat::V2 => self.decrypt(blob)?,
        };

        let utxo = UtxoRecord::parse(&plaintext)?;
        let version = format.key_version();
        let utxo_private_key = self.utxo_private_key(version)?.to_string();

        Ok(DecryptedRecord {
            utxo,
            version,
            utxo_private_key,
        })
    }

    /// Which UTXO private key a blob needs, without decrypting it.
    ///
    /// Used to match on-chain blobs against candidate spending keys before
    /// committing to a full decrypt attempt.
    pub fn key_version_for(blob: &[u8]) -> KeyVersion {
        classify(blob).key_version()
    }
}

impl std::fmt::Debug for WalletSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletSession")
            .field("v1_derived", &self.legacy.is_some())
            .field("v2_derived", &self.current.is_some())
            .finish_non_exhaustive()
    }
}
