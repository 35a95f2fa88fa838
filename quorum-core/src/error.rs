// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

#![forbid(unsafe_code)]

use std::sync::PoisonError;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuorumError {
    #[error("root generation already in progress")]
    AlreadyInProgress,

    #[error("no root generation in progress")]
    NotInProgress,

    #[error("invalid root generation config: {0}")]
    InvalidConfig(String),

    #[error("invalid PGP key: {0}")]
    InvalidPgpKey(String),

    #[error("incorrect nonce supplied")]
    NonceMismatch,

    #[error("invalid key share: {0}")]
    InvalidShare(String),

    #[error("malformed shares: {0}")]
    MalformedShares(String),

    #[error("master key verification failed, root generation discarded")]
    InvalidMaster,

    #[error("OTP length mismatch: expected {expected} bytes, got {actual}")]
    OtpLengthMismatch { expected: usize, actual: usize },

    /// The credential exists in the registry but could not be delivered.
    /// The accessor identifies it for revocation.
    #[error("root credential issued but encoding failed (accessor {accessor}): {reason}")]
    EncodingFailedPostIssuance { accessor: String, reason: String },

    #[error("root credential issuance failed: {0}")]
    InternalIssuanceFailure(String),

    #[error("server is sealed")]
    Sealed,

    #[error("registry error: {0}")]
    Registry(String),

    #[error("Decryption failed - wrong key or corrupted data")]
    DecryptionFailed,

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("Runtime error: {0}")]
    Runtime(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl QuorumError {
    /// Whether the active ceremony was torn down as part of this error.
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            Self::InvalidMaster
                | Self::InternalIssuanceFailure(_)
                | Self::EncodingFailedPostIssuance { .. }
        )
    }

    /// Whether an orphaned credential may need manual revocation.
    pub fn requires_operator_action(&self) -> bool {
        matches!(self, Self::EncodingFailedPostIssuance { .. })
    }
}

pub(crate) fn lock_error<T>(_: PoisonError<T>) -> QuorumError {
    QuorumError::Runtime("lock poisoned".into())
}

pub type Result<T> = std::result::Result<T, QuorumError>;
