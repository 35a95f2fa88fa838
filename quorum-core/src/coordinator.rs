// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Root generation coordinator.
//!
//! Every operation runs under one mutex. The whole read-modify-write of an
//! update (nonce check, duplicate check, accept, quorum check, reconstruct,
//! verify, issue, encode, teardown) happens inside that critical section, so
//! concurrent submitters can never trigger issuance twice and a cancel can
//! never interleave with a completing update.
#![forbid(unsafe_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;
use tracing::{debug, error, info, warn};
use zeroize::Zeroizing;

use crate::ceremony::{Acceptance, Ceremony, CeremonyConfig, CeremonyState};
use crate::error::{lock_error, QuorumError, Result};
use crate::keys::KeyManager;
use crate::output::OutputMode;
use crate::registry::CredentialRegistry;
use crate::shamir;

/// Returned exactly once, to the submitter whose share completed the quorum.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CeremonyResult {
    pub encoded_credential: String,
}

/// Consistent snapshot of the coordinator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GenerationStatus {
    pub started: bool,
    pub nonce: Option<String>,
    pub progress: usize,
    pub required: usize,
    pub pgp_fingerprint: Option<String>,
}

pub struct RootGenerator {
    state: Mutex<CeremonyState>,
    keys: Arc<dyn KeyManager>,
    registry: Arc<dyn CredentialRegistry>,
}

impl RootGenerator {
    pub fn new(keys: Arc<dyn KeyManager>, registry: Arc<dyn CredentialRegistry>) -> Self {
        Self {
            state: Mutex::new(CeremonyState::default()),
            keys,
            registry,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, CeremonyState>> {
        self.state.lock().map_err(lock_error)
    }

    /// Start a ceremony. Exactly one of `otp` (base64) and `pgp_key`
    /// (armored public key) must be given.
    pub fn init(&self, otp: Option<&str>, pgp_key: Option<&str>) -> Result<()> {
        let mut state = self.lock()?;
        if !state.is_idle() {
            return Err(QuorumError::AlreadyInProgress);
        }
        let mode = OutputMode::from_params(otp, pgp_key)?;
        self.begin(&mut state, mode)
    }

    /// Start a ceremony with an already validated output mode.
    pub fn init_with_mode(&self, mode: OutputMode) -> Result<()> {
        let mut state = self.lock()?;
        self.begin(&mut state, mode)
    }

    fn begin(&self, state: &mut CeremonyState, mode: OutputMode) -> Result<()> {
        if !state.is_idle() {
            return Err(QuorumError::AlreadyInProgress);
        }
        if self.keys.is_sealed() {
            return Err(QuorumError::Sealed);
        }
        let ceremony = state.begin(mode, self.keys.threshold(), self.keys.key_len())?;
        let config = ceremony.config();
        info!(
            nonce = %config.nonce,
            threshold = config.threshold,
            output = %config.output,
            "root generation initialized"
        );
        Ok(())
    }

    /// Submit one key share. Returns `None` until the quorum is reached.
    pub fn update(&self, share: &[u8], nonce: &str) -> Result<Option<CeremonyResult>> {
        let mut state = self.lock()?;
        if self.keys.is_sealed() {
            return Err(QuorumError::Sealed);
        }

        let ceremony = state.active_mut()?;
        ceremony.check_nonce(nonce)?;

        if ceremony.accept(share)? == Acceptance::Duplicate {
            debug!(progress = ceremony.progress(), "duplicate key share ignored");
            return Ok(None);
        }

        if !ceremony.has_quorum() {
            debug!(
                progress = ceremony.progress(),
                required = ceremony.threshold(),
                "key share accepted"
            );
            return Ok(None);
        }

        let secret = match reconstruct(ceremony) {
            Ok(secret) => secret,
            Err(e) => {
                ceremony.reject_last();
                return Err(e);
            }
        };

        // Quorum reached: success or failure, this ceremony ends here.
        let ceremony = state.teardown().ok_or(QuorumError::NotInProgress)?;
        self.complete(ceremony, &secret).map(Some)
    }

    fn complete(&self, ceremony: Ceremony, secret: &[u8]) -> Result<CeremonyResult> {
        let nonce = ceremony.config().nonce;

        if !self.keys.verify_reconstructed(secret) {
            warn!(%nonce, "master key verification failed, root generation discarded");
            return Err(QuorumError::InvalidMaster);
        }

        let entry = self.registry.issue_root_credential().map_err(|e| {
            error!(%nonce, error = %e, "root credential issuance failed");
            QuorumError::InternalIssuanceFailure(e.to_string())
        })?;

        let encoded = ceremony.mode().encode(&entry.id).map_err(|e| {
            error!(
                %nonce,
                accessor = %entry.accessor,
                error = %e,
                "root credential issued but could not be encoded, revoke it"
            );
            QuorumError::EncodingFailedPostIssuance {
                accessor: entry.accessor.clone(),
                reason: e.to_string(),
            }
        })?;

        info!(%nonce, accessor = %entry.accessor, "root generation finished");
        Ok(CeremonyResult {
            encoded_credential: encoded,
        })
    }

    /// Number of accepted shares; zero when idle.
    pub fn progress(&self) -> Result<usize> {
        Ok(self.lock()?.active().map_or(0, Ceremony::progress))
    }

    pub fn configuration(&self) -> Result<Option<CeremonyConfig>> {
        Ok(self.lock()?.active().map(Ceremony::config))
    }

    /// Discard any in-flight ceremony. Idempotent.
    pub fn cancel(&self) -> Result<()> {
        if let Some(ceremony) = self.lock()?.teardown() {
            info!(
                nonce = %ceremony.config().nonce,
                discarded = ceremony.progress(),
                "root generation canceled"
            );
        }
        Ok(())
    }

    pub fn status(&self) -> Result<GenerationStatus> {
        let state = self.lock()?;
        Ok(match state.active() {
            Some(ceremony) => {
                let config = ceremony.config();
                GenerationStatus {
                    started: true,
                    pgp_fingerprint: config.output.pgp_fingerprint().map(str::to_string),
                    nonce: Some(config.nonce),
                    progress: ceremony.progress(),
                    required: config.threshold,
                }
            }
            None => GenerationStatus {
                started: false,
                nonce: None,
                progress: 0,
                required: self.keys.threshold(),
                pgp_fingerprint: None,
            },
        })
    }
}

fn reconstruct(ceremony: &Ceremony) -> Result<Zeroizing<Vec<u8>>> {
    match ceremony.shares() {
        [single] if ceremony.threshold() == 1 => Ok(single.clone()),
        shares => shamir::combine(shares),
    }
}
