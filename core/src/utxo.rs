//! UTXO record (de)serialization.
//!
//! A record's four scalar fields travel as a single `|`-delimited UTF-8
//! string inside the encrypted blob: `amount|blinding|index|mint`. The
//! delimiter is reserved and there is no escaping, so a field containing it
//! is rejected before any encryption happens.

use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::format::KeyVersion;

/// Reserved field delimiter.
pub(crate) const FIELD_DELIMITER: char = '|';

const FIELD_COUNT: usize = 4;

/// One shielded balance fragment.
///
/// `amount` and `blinding` are arbitrary-precision integers in decimal
/// string form, `index` is the record's position in the commitment tree,
/// and `mint_address` is the base58 asset identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtxoRecord {
    pub amount: String,
    pub blinding: String,
    pub index: u64,
    pub mint_address: String,
}

impl UtxoRecord {
    /// Join the four fields with the reserved delimiter.
    pub fn serialize(&self) -> Result<String, CryptoError> {
        let fields = [
            ("amount", &self.amount),
            ("blinding", &self.blinding),
            ("mint_address", &self.mint_address),
        ];
        for (field, value) in fields {
            if value.contains(FIELD_DELIMITER) {
                return Err(CryptoError::InvalidField { field });
            }
        }
        Ok(format!(
            "{}|{}|{}|{}",
            self.amount, self.blinding, self.index, self.mint_address
        ))
    }

    /// Rebuild a record from decrypted plaintext.
    ///
    /// Exactly four non-empty parts or [`CryptoError::MalformedRecord`];
    /// a record is never partially populated.
    pub(crate) fn parse(plaintext: &[u8]) -> Result<Self, CryptoError> {
        let text = std::str::from_utf8(plaintext).map_err(|_| CryptoError::MalformedRecord)?;

        let parts: Vec<&str> = text.split(FIELD_DELIMITER).collect();
        if parts.len() != FIELD_COUNT || parts.iter().any(|part| part.is_empty()) {
            return Err(CryptoError::MalformedRecord);
        }

        let index: u64 = parts[2].parse().map_err(|_| CryptoError::MalformedRecord)?;

        Ok(Self {
            amount: parts[0].to_string(),
            blinding: parts[1].to_string(),
            index,
            mint_address: parts[3].to_string(),
        })
    }
}

/// A successfully decrypted record plus the context needed to spend it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptedRecord {
    #[serde(flatten)]
    pub utxo: UtxoRecord,
    /// Key version the blob was actually encrypted under.
    pub version: KeyVersion,
    /// UTXO private key matching `version`. Old on-chain ciphertexts were
    /// written under V1 keys and must remain spendable with them.
    pub utxo_private_key: String,
}
