// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

//! OpenPGP recipient keys for delivering a credential to one viewer.
//!
//! The credential is encrypted as a literal-data OpenPGP message to the
//! recipient's encryption subkey, or to the primary key when it can encrypt
//! and no subkey can. The binary message is what gets base64-encoded for
//! transport, so any OpenPGP implementation holding the secret key can read
//! it.
use std::fmt;

use pgp::composed::{
    Deserializable, KeyType, Message, SecretKeyParamsBuilder, SignedPublicKey, SignedSecretKey,
    SubkeyParamsBuilder,
};
use pgp::crypto::ecc_curve::ECCCurve;
use pgp::crypto::sym::SymmetricKeyAlgorithm;
use pgp::ser::Serialize;
use pgp::types::{PublicKeyTrait, SecretKeyTrait};
use zeroize::Zeroizing;

use crate::error::{QuorumError, Result};

const MESSAGE_CIPHER: SymmetricKeyAlgorithm = SymmetricKeyAlgorithm::AES256;
const DEFAULT_USER_ID: &str = "quorum recipient";

/// A parsed, self-verified OpenPGP public key that can receive messages.
#[derive(Clone)]
pub struct RecipientKey {
    key: SignedPublicKey,
    fingerprint: String,
}

impl RecipientKey {
    /// Parse an ASCII-armored OpenPGP public key (`gpg --armor --export`).
    pub fn from_armored(armored: &str) -> Result<Self> {
        let (key, _headers) = SignedPublicKey::from_string(armored.trim())
            .map_err(|e| QuorumError::InvalidPgpKey(e.to_string()))?;
        Self::from_signed(key)
    }

    fn from_signed(key: SignedPublicKey) -> Result<Self> {
        key.verify()
            .map_err(|e| QuorumError::InvalidPgpKey(format!("self-signature check failed: {e}")))?;

        let has_encryption_key = key.is_encryption_key()
            || key.public_subkeys.iter().any(|sub| sub.is_encryption_key());
        if !has_encryption_key {
            return Err(QuorumError::InvalidPgpKey(
                "key has no encryption-capable key or subkey".into(),
            ));
        }

        let fingerprint = hex::encode(key.fingerprint().as_bytes());
        Ok(Self { key, fingerprint })
    }

    /// Lowercase hex fingerprint of the primary key.
    pub fn fingerprint(&self) -> String {
        self.fingerprint.clone()
    }

    pub fn to_armored(&self) -> Result<String> {
        self.key
            .to_armored_string(Default::default())
            .map_err(|e| QuorumError::Encryption(e.to_string()))
    }

    /// Encrypt `plaintext` to this key, returning the binary OpenPGP message.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        let literal = Message::new_literal_bytes("", plaintext);
        let mut rng = rand::thread_rng();

        let encrypted = match self
            .key
            .public_subkeys
            .iter()
            .find(|sub| sub.is_encryption_key())
        {
            Some(subkey) => literal.encrypt_to_keys_seipdv1(&mut rng, MESSAGE_CIPHER, &[subkey]),
            None => literal.encrypt_to_keys_seipdv1(&mut rng, MESSAGE_CIPHER, &[&self.key]),
        }
        .map_err(|e| QuorumError::Encryption(e.to_string()))?;

        encrypted
            .to_bytes()
            .map_err(|e| QuorumError::Encryption(e.to_string()))
    }
}

impl PartialEq for RecipientKey {
    fn eq(&self, other: &Self) -> bool {
        self.fingerprint == other.fingerprint
    }
}

impl Eq for RecipientKey {}

impl fmt::Debug for RecipientKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecipientKey")
            .field("fingerprint", &self.fingerprint)
            .finish()
    }
}

/// The viewer's side: an unprotected OpenPGP secret key plus its public half.
pub struct RecipientKeypair {
    secret: SignedSecretKey,
    public: RecipientKey,
}

impl RecipientKeypair {
    /// Generate an Ed25519 signing key with a Curve25519 encryption subkey.
    pub fn generate() -> Result<Self> {
        Self::generate_for(DEFAULT_USER_ID)
    }

    pub fn generate_for(user_id: &str) -> Result<Self> {
        let subkey = SubkeyParamsBuilder::default()
            .key_type(KeyType::ECDH(ECCCurve::Curve25519))
            .can_encrypt(true)
            .passphrase(None)
            .build()
            .map_err(|e| QuorumError::Encryption(format!("subkey parameters: {e}")))?;

        let params = SecretKeyParamsBuilder::default()
            .key_type(KeyType::EdDSALegacy)
            .can_certify(true)
            .can_sign(true)
            .primary_user_id(user_id.to_string())
            .passphrase(None)
            .subkey(subkey)
            .build()
            .map_err(|e| QuorumError::Encryption(format!("key parameters: {e}")))?;

        let mut rng = rand::thread_rng();
        let secret = params
            .generate(&mut rng)
            .and_then(|key| key.sign(&mut rng, String::new))
            .map_err(|e| QuorumError::Encryption(format!("key generation failed: {e}")))?;

        Self::from_secret(secret)
    }

    /// Parse an ASCII-armored OpenPGP secret key without a passphrase.
    pub fn from_armored(armored: &str) -> Result<Self> {
        let (secret, _headers) = SignedSecretKey::from_string(armored.trim())
            .map_err(|e| QuorumError::InvalidPgpKey(e.to_string()))?;
        Self::from_secret(secret)
    }

    fn from_secret(secret: SignedSecretKey) -> Result<Self> {
        secret
            .verify()
            .map_err(|e| QuorumError::InvalidPgpKey(format!("self-signature check failed: {e}")))?;

        let public = secret
            .public_key()
            .sign(&mut rand::thread_rng(), &secret, String::new)
            .map_err(|e| QuorumError::InvalidPgpKey(e.to_string()))?;

        Ok(Self {
            public: RecipientKey::from_signed(public)?,
            secret,
        })
    }

    pub fn public_key(&self) -> &RecipientKey {
        &self.public
    }

    pub fn to_armored(&self) -> Result<Zeroizing<String>> {
        self.secret
            .to_armored_string(Default::default())
            .map(Zeroizing::new)
            .map_err(|e| QuorumError::Encryption(e.to_string()))
    }

    /// Decrypt a binary OpenPGP message addressed to this key.
    pub fn decrypt(&self, message: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let message = Message::from_bytes(message).map_err(|_| QuorumError::DecryptionFailed)?;
        let (decrypted, _key_ids) = message
            .decrypt(String::new, &[&self.secret])
            .map_err(|_| QuorumError::DecryptionFailed)?;
        let content = decrypted
            .get_content()
            .map_err(|_| QuorumError::DecryptionFailed)?
            .ok_or(QuorumError::DecryptionFailed)?;
        Ok(Zeroizing::new(content))
    }
}

impl fmt::Debug for RecipientKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecipientKeypair")
            .field("public", &self.public)
            .field("secret", &"<redacted>")
            .finish()
    }
}
