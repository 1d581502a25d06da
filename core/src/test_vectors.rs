//! Wire-format and derivation test vectors.
//!
//! Each vector reconstructs the expected bytes from primitives only, then
//! checks the codecs against them. These pin the frozen on-chain layouts:
//! an offset or version-byte regression here means already-encrypted funds
//! become unrecoverable.

#[cfg(test)]
#[allow(clippy::needless_borrows_for_generic_args)]
mod derivation_vectors {
    use sha2::{Digest, Sha256};
    use sha3::Keccak256;

    use crate::{KeyVersion, WalletSession};

    const SIGNATURE: [u8; 64] = [0x11; 64];

    /// utxo_private_key_v1 = "0x" + hex(sha256(signature[0..31]))
    #[test]
    fn test_vector_utxo_private_key_v1() {
        let mut session = WalletSession::new();
        session.derive_from_signature(&SIGNATURE);

        let expected = format!("0x{}", hex::encode(Sha256::digest(&SIGNATURE[..31])));
        assert_eq!(session.utxo_private_key(KeyVersion::V1).unwrap(), expected);
    }

    /// utxo_private_key_v2 = "0x" + hex(keccak256(keccak256(signature)))
    #[test]
    fn test_vector_utxo_private_key_v2() {
        let mut session = WalletSession::new();
        session.derive_from_signature(&SIGNATURE);

        let v2_material = Keccak256::digest(SIGNATURE);
        let expected = format!("0x{}", hex::encode(Keccak256::digest(v2_material)));

        let key = session.utxo_private_key(KeyVersion::V2).unwrap();
        assert_eq!(key.len(), 66);
        assert_eq!(key, expected);
    }

    /// Box keypair seed = keccak256(keccak256(signature) || "box"), then a
    /// standard X25519 clamped keypair.
    #[test]
    fn test_vector_box_public_key() {
        use x25519_dalek::{PublicKey, StaticSecret};

        let mut session = WalletSession::new();
        session.derive_from_signature(&SIGNATURE);

        let v2_material = Keccak256::digest(SIGNATURE);
        let mut hasher = Keccak256::new();
        hasher.update(v2_material);
        hasher.update(b"box");
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&hasher.finalize());

        let secret = StaticSecret::from(seed);
        let expected = hex::encode(PublicKey::from(&secret).as_bytes());

        assert_eq!(session.box_public_key_hex().unwrap(), expected);
    }
}

#[cfg(test)]
#[allow(clippy::needless_borrows_for_generic_args)]
mod wire_vectors {
    use aes::cipher::{KeyIvInit, StreamCipher};
    use aes::Aes128;
    use aes_gcm::aead::{Aead, KeyInit};
    use aes_gcm::{Aes256Gcm, Nonce};
    use ctr::Ctr128BE;
    use hmac::{Hmac, Mac};
    use sha2::Sha256;
    use sha3::{Digest, Keccak256};

    use crate::WalletSession;

    type Aes128Ctr = Ctr128BE<Aes128>;
    type HmacSha256 = Hmac<Sha256>;

    const SIGNATURE: [u8; 64] = [0x11; 64];
    const PLAINTEXT: &[u8] = b"1000|42|0|So11111111111111111111111111111111111111112";

    fn derived_session() -> WalletSession {
        let mut session = WalletSession::new();
        session.derive_from_signature(&SIGNATURE);
        session
    }

    /// V1 wire: nonce(16) || hmac_tag(16) || aes128ctr_ciphertext, where the
    /// cipher key is signature[0..16] and the MAC key is signature[16..31].
    #[test]
    fn test_vector_v1_blob_built_by_hand_decrypts() {
        let session = derived_session();

        let nonce = [0xa0u8; 16];
        let mut ciphertext = PLAINTEXT.to_vec();
        let key: [u8; 16] = SIGNATURE[..16].try_into().unwrap();
        let mut cipher = Aes128Ctr::new((&key).into(), (&nonce).into());
        cipher.apply_keystream(&mut ciphertext);

        let mut mac = <HmacSha256 as Mac>::new_from_slice(&SIGNATURE[16..31]).unwrap();
        mac.update(&nonce);
        mac.update(&ciphertext);
        let full_tag = mac.finalize().into_bytes();

        let mut blob = Vec::new();
        blob.extend_from_slice(&nonce);
        blob.extend_from_slice(&full_tag[..16]);
        blob.extend_from_slice(&ciphertext);

        assert_eq!(session.decrypt(&blob).unwrap(), PLAINTEXT);
    }

    /// V1 blobs produced by the codec verify against an independently
    /// computed HMAC over nonce || ciphertext.
    #[test]
    fn test_vector_v1_blob_tag_is_truncated_hmac() {
        let session = derived_session();
        let blob = session.encrypt_legacy(PLAINTEXT).unwrap();

        let (nonce, rest) = blob.split_at(16);
        let (tag, ciphertext) = rest.split_at(16);

        let mut mac = <HmacSha256 as Mac>::new_from_slice(&SIGNATURE[16..31]).unwrap();
        mac.update(nonce);
        mac.update(ciphertext);
        let full_tag = mac.finalize().into_bytes();

        assert_eq!(tag, &full_tag[..16]);
    }

    /// V2 wire: 00*7,02 || nonce(12) || gcm_tag(16) || ciphertext, keyed by
    /// keccak256(signature).
    #[test]
    fn test_vector_v2_blob_built_by_hand_decrypts() {
        let session = derived_session();

        let mut key = [0u8; 32];
        key.copy_from_slice(&Keccak256::digest(SIGNATURE));

        let nonce_bytes = [0x0bu8; 12];
        let cipher = Aes256Gcm::new((&key).into());
        let sealed = cipher
            .encrypt(&Nonce::from(nonce_bytes), PLAINTEXT)
            .unwrap();
        let (ciphertext, tag) = sealed.split_at(sealed.len() - 16);

        let mut blob = vec![0, 0, 0, 0, 0, 0, 0, 0x02];
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(tag);
        blob.extend_from_slice(ciphertext);

        assert_eq!(session.decrypt(&blob).unwrap(), PLAINTEXT);
    }

    /// Box wire: 00*7,03 || ephemeral_pk(32) || nonce(24) || ciphertext,
    /// XSalsa20-Poly1305 under the X25519 shared secret.
    #[test]
    fn test_vector_box_blob_built_by_hand_decrypts() {
        use x25519_dalek::{PublicKey, StaticSecret};
        use xsalsa20poly1305::aead::Aead as SalsaAead;
        use xsalsa20poly1305::{KeyInit as SalsaKeyInit, XSalsa20Poly1305};

        let session = derived_session();
        let recipient_pk = session.box_keypair().unwrap().public_key();

        let sender_secret = StaticSecret::from([0x77u8; 32]);
        let sender_public = PublicKey::from(&sender_secret);
        let shared = sender_secret.diffie_hellman(&PublicKey::from(recipient_pk));

        let nonce_bytes = [0x0cu8; 24];
        let cipher = XSalsa20Poly1305::new(shared.as_bytes().into());
        let ciphertext = cipher
            .encrypt(&xsalsa20poly1305::Nonce::from(nonce_bytes), PLAINTEXT)
            .unwrap();

        let mut blob = vec![0, 0, 0, 0, 0, 0, 0, 0x03];
        blob.extend_from_slice(sender_public.as_bytes());
        blob.extend_from_slice(&nonce_bytes);
        blob.extend_from_slice(&ciphertext);

        assert_eq!(session.decrypt_paylink(&blob).unwrap(), PLAINTEXT);
    }

    /// The worked example: fixed signature, the documented sample record,
    /// full encrypt/decrypt cycle tagged "v2".
    #[test]
    fn test_vector_example_record_roundtrip() {
        use crate::{KeyVersion, UtxoRecord};

        let session = derived_session();
        let record = UtxoRecord {
            amount: "1000".to_string(),
            blinding: "42".to_string(),
            index: 0,
            mint_address: "So11111111111111111111111111111111111111112".to_string(),
        };

        let blob = session.encrypt_record(&record).unwrap();
        let decrypted = session.decrypt_record(&blob).unwrap();

        assert_eq!(decrypted.utxo, record);
        assert_eq!(decrypted.version, KeyVersion::V2);
        assert_eq!(
            decrypted.utxo_private_key,
            session.utxo_private_key(KeyVersion::V2).unwrap()
        );
    }
}
