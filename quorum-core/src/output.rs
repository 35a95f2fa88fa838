// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Secure delivery of a freshly minted credential to a single viewer.
//!
//! The mode is chosen when a ceremony starts and cannot change afterwards.
//! OTP mode XORs the raw 16-byte credential id with a caller pad; PGP mode
//! encrypts the canonical textual id to the caller's OpenPGP public key. Both
//! results are base64-encoded for transport.
use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::crypto;
use crate::error::{QuorumError, Result};
use crate::recipient::{RecipientKey, RecipientKeypair};

/// Raw length of a credential id.
pub const CREDENTIAL_ID_LEN: usize = 16;

/// Required one-time pad length.
pub const OTP_LEN: usize = CREDENTIAL_ID_LEN;

/// A caller-supplied one-time pad.
#[derive(Clone)]
pub struct OtpPad(Zeroizing<Vec<u8>>);

impl OtpPad {
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let bytes = Zeroizing::new(
            STANDARD
                .decode(encoded.trim())
                .map_err(|e| QuorumError::InvalidConfig(format!("OTP is not valid base64: {e}")))?,
        );
        Self::from_bytes(bytes)
    }

    pub fn from_bytes(bytes: Zeroizing<Vec<u8>>) -> Result<Self> {
        if bytes.len() != OTP_LEN {
            return Err(QuorumError::OtpLengthMismatch {
                expected: OTP_LEN,
                actual: bytes.len(),
            });
        }
        Ok(Self(bytes))
    }

    fn xor(&self, data: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        xor_bytes(&self.0, data)
    }
}

impl fmt::Debug for OtpPad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpPad(<redacted>)")
    }
}

/// How the minted credential is protected on the way out.
#[derive(Clone, Debug)]
pub enum OutputMode {
    Otp(OtpPad),
    Pgp(RecipientKey),
}

impl OutputMode {
    /// Build a mode from the two optional request parameters. Exactly one
    /// must be present.
    pub fn from_params(otp: Option<&str>, pgp_key: Option<&str>) -> Result<Self> {
        let otp = otp.filter(|s| !s.trim().is_empty());
        let pgp_key = pgp_key.filter(|s| !s.trim().is_empty());

        match (otp, pgp_key) {
            (Some(otp), None) => Ok(Self::Otp(OtpPad::from_base64(otp)?)),
            (None, Some(key)) => Ok(Self::Pgp(RecipientKey::from_armored(key)?)),
            (Some(_), Some(_)) => Err(QuorumError::InvalidConfig(
                "only one of OTP and PGP key can be specified".into(),
            )),
            (None, None) => Err(QuorumError::InvalidConfig(
                "one of OTP or PGP key must be specified".into(),
            )),
        }
    }

    pub fn descriptor(&self) -> OutputDescriptor {
        match self {
            Self::Otp(_) => OutputDescriptor::Otp,
            Self::Pgp(key) => OutputDescriptor::Pgp {
                fingerprint: key.fingerprint(),
            },
        }
    }

    /// Encode a credential id (canonical hyphenated UUID) for the viewer.
    pub fn encode(&self, credential_id: &str) -> Result<String> {
        match self {
            Self::Otp(pad) => {
                let raw = parse_credential_id(credential_id)?;
                let masked = pad.xor(raw.as_bytes())?;
                Ok(STANDARD.encode(masked.as_slice()))
            }
            Self::Pgp(key) => {
                let message = key.encrypt(credential_id.as_bytes())?;
                Ok(STANDARD.encode(message))
            }
        }
    }
}

/// Public view of an [`OutputMode`], safe to return from status queries.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum OutputDescriptor {
    Otp,
    Pgp { fingerprint: String },
}

impl OutputDescriptor {
    pub fn pgp_fingerprint(&self) -> Option<&str> {
        match self {
            Self::Otp => None,
            Self::Pgp { fingerprint } => Some(fingerprint.as_str()),
        }
    }
}

impl fmt::Display for OutputDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Otp => f.write_str("otp"),
            Self::Pgp { fingerprint } => write!(f, "pgp:{fingerprint}"),
        }
    }
}

fn parse_credential_id(credential_id: &str) -> Result<Uuid> {
    Uuid::parse_str(credential_id).map_err(|_| QuorumError::OtpLengthMismatch {
        expected: OTP_LEN,
        actual: credential_id.len(),
    })
}

fn xor_bytes(a: &[u8], b: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if a.len() != b.len() {
        return Err(QuorumError::OtpLengthMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(Zeroizing::new(
        a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect(),
    ))
}

/// A fresh base64 one-time pad of [`OTP_LEN`] bytes.
pub fn generate_otp() -> Zeroizing<String> {
    let pad = crypto::random_vec(OTP_LEN);
    Zeroizing::new(STANDARD.encode(pad.as_slice()))
}

/// Recover the credential id from an OTP-encoded token.
pub fn decode_otp(encoded: &str, otp: &str) -> Result<Zeroizing<String>> {
    let pad = OtpPad::from_base64(otp)?;
    let masked = Zeroizing::new(
        STANDARD
            .decode(encoded.trim())
            .map_err(|e| QuorumError::Other(format!("encoded token is not valid base64: {e}")))?,
    );
    let raw = pad.xor(&masked)?;
    let id = Uuid::from_slice(&raw)
        .map_err(|e| QuorumError::Other(format!("decoded value is not a credential id: {e}")))?;
    Ok(Zeroizing::new(id.hyphenated().to_string()))
}

/// Recover the credential id from a PGP-mode token.
pub fn decode_pgp(encoded: &str, keypair: &RecipientKeypair) -> Result<Zeroizing<String>> {
    let message = STANDARD
        .decode(encoded.trim())
        .map_err(|e| QuorumError::Other(format!("encoded token is not valid base64: {e}")))?;
    let plaintext = keypair.decrypt(&message)?;
    let id = std::str::from_utf8(&plaintext).map_err(|_| QuorumError::DecryptionFailed)?;
    Ok(Zeroizing::new(id.to_string()))
}
