//! Wire-format detection for encrypted blobs.
//!
//! Every blob written by the current codecs starts with a fixed 8-byte
//! version tag. Legacy V1 blobs predate the tag scheme, so any buffer whose
//! leading bytes match neither known tag is classified as V1. The fallback
//! is load-bearing: ciphertexts already on chain carry no tag and must keep
//! decrypting forever.

use serde::{Deserialize, Serialize};

/// Length of the version tag prefixed to V2 and Box blobs.
pub const VERSION_TAG_LEN: usize = 8;

/// Version tag for V2 symmetric blobs.
pub const V2_TAG: [u8; VERSION_TAG_LEN] = [0, 0, 0, 0, 0, 0, 0, 0x02];

/// Version tag for asymmetric (pay-link box) blobs.
pub const BOX_TAG: [u8; VERSION_TAG_LEN] = [0, 0, 0, 0, 0, 0, 0, 0x03];

/// The wire format that produced a ciphertext blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireFormat {
    /// Legacy AES-128-CTR + truncated HMAC, no version tag.
    V1,
    /// AES-256-GCM under the derived session key.
    V2,
    /// X25519 ephemeral box addressed to a recipient public key.
    Box,
}

/// Which derived UTXO private key a blob requires to spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyVersion {
    V1,
    V2,
}

impl KeyVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            KeyVersion::V1 => "v1",
            KeyVersion::V2 => "v2",
        }
    }
}

impl std::fmt::Display for KeyVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WireFormat {
    /// The key version needed to decrypt a blob of this format.
    ///
    /// Box blobs are opened with the X25519 keypair, which is itself derived
    /// from the V2 material, so they map to V2.
    pub fn key_version(self) -> KeyVersion {
        match self {
            WireFormat::V1 => KeyVersion::V1,
            WireFormat::V2 | WireFormat::Box => KeyVersion::V2,
        }
    }
}

/// Classify a ciphertext blob by its leading bytes.
///
/// Buffers shorter than the tag cannot carry one and fall through to the V1
/// arm along with everything else untagged.
pub fn classify(blob: &[u8]) -> WireFormat {
    if blob.len() < VERSION_TAG_LEN {
        return WireFormat::V1;
    }
    match &blob[..VERSION_TAG_LEN] {
        tag if *tag == V2_TAG => WireFormat::V2,
        tag if *tag == BOX_TAG => WireFormat::Box,
        _ => WireFormat::V1,
    }
}

/// Key-free check used before any key-dependent work on a blob.
pub fn is_box_encrypted(blob: &[u8]) -> bool {
    classify(blob) == WireFormat::Box
}
