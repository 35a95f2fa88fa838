// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Master key management as seen by the root generation ceremony.
//!
//! The ceremony never holds the master key between calls. It learns the
//! standing threshold from a [`KeyManager`] and asks it to confirm any secret
//! reconstructed from submitted shares.
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto;
use crate::error::{QuorumError, Result};
use crate::shamir;

pub const MIN_KEY_LEN: usize = 16;
pub const MAX_KEY_LEN: usize = 32;

const FINGERPRINT_CONTEXT: &[u8] = b"quorum-master-fingerprint-v1";
const SALT_SIZE: usize = 32;

/// The key-management collaborator consumed by the ceremony.
pub trait KeyManager: Send + Sync {
    /// Shares required to reconstruct the master key.
    fn threshold(&self) -> usize;

    /// Length in bytes of the master key.
    fn key_len(&self) -> usize;

    /// Whether `secret` is the master key.
    fn verify_reconstructed(&self, secret: &[u8]) -> bool;

    /// Sealed servers refuse to start or advance a ceremony.
    fn is_sealed(&self) -> bool {
        false
    }
}

/// Persistable description of a master key: sharing parameters plus a salted
/// fingerprint. Never contains the key itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterKeyConfig {
    pub threshold: u8,
    pub shares: u8,
    pub key_len: usize,
    #[serde(with = "hex_array")]
    pub salt: [u8; SALT_SIZE],
    #[serde(with = "hex_array")]
    pub fingerprint: [u8; 32],
}

impl MasterKeyConfig {
    /// Generate a master key of `key_len` bytes and split it into `shares`.
    ///
    /// With a threshold of one the single share is the master key itself.
    pub fn generate(
        threshold: u8,
        shares: u8,
        key_len: usize,
    ) -> Result<(Self, Vec<Zeroizing<Vec<u8>>>)> {
        if !(MIN_KEY_LEN..=MAX_KEY_LEN).contains(&key_len) {
            return Err(QuorumError::InvalidConfig(format!(
                "key length must be between {MIN_KEY_LEN} and {MAX_KEY_LEN} bytes"
            )));
        }
        if threshold == 0 || shares == 0 {
            return Err(QuorumError::InvalidConfig(
                "threshold and shares must be non-zero".into(),
            ));
        }
        if threshold == 1 && shares != 1 {
            return Err(QuorumError::InvalidConfig(
                "threshold of one requires exactly one share".into(),
            ));
        }

        let master = crypto::random_vec(key_len);
        let config = Self::for_key(&master, threshold, shares)?;

        let parts = if threshold == 1 {
            vec![master]
        } else {
            shamir::split(&master, threshold, shares)?
        };

        Ok((config, parts))
    }

    /// Describe an existing master key.
    pub fn for_key(master: &[u8], threshold: u8, shares: u8) -> Result<Self> {
        if threshold == 0 || shares < threshold {
            return Err(QuorumError::InvalidConfig(
                "shares cannot be less than threshold".into(),
            ));
        }
        let salt: [u8; SALT_SIZE] = crypto::random_bytes();
        Ok(Self {
            threshold,
            shares,
            key_len: master.len(),
            fingerprint: fingerprint(&salt, master),
            salt,
        })
    }
}

fn fingerprint(salt: &[u8], master: &[u8]) -> [u8; 32] {
    crypto::blake2b_256_parts(&[FINGERPRINT_CONTEXT, salt, master])
}

/// In-process [`KeyManager`] over a [`MasterKeyConfig`].
pub struct MasterKeyVerifier {
    config: MasterKeyConfig,
    sealed: AtomicBool,
}

impl MasterKeyVerifier {
    pub fn new(config: MasterKeyConfig) -> Self {
        Self {
            config,
            sealed: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &MasterKeyConfig {
        &self.config
    }

    pub fn seal(&self) {
        self.sealed.store(true, Ordering::SeqCst);
    }

    pub fn unseal(&self) {
        self.sealed.store(false, Ordering::SeqCst);
    }
}

impl KeyManager for MasterKeyVerifier {
    fn threshold(&self) -> usize {
        self.config.threshold as usize
    }

    fn key_len(&self) -> usize {
        self.config.key_len
    }

    fn verify_reconstructed(&self, secret: &[u8]) -> bool {
        if secret.len() != self.config.key_len {
            return false;
        }
        let candidate = fingerprint(&self.config.salt, secret);
        crypto::ct_eq(&candidate, &self.config.fingerprint)
    }

    fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::SeqCst)
    }
}

mod hex_array {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer, const N: usize>(
        bytes: &[u8; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>, const N: usize>(
        deserializer: D,
    ) -> Result<[u8; N], D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(D::Error::custom)?;
        bytes
            .try_into()
            .map_err(|_| D::Error::custom(format!("expected {N} bytes")))
    }
}
