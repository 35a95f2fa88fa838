// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

//! State of a single root generation ceremony.
//!
//! `Idle -> Configured -> Idle`. Every exit from `Configured` (cancel,
//! completion, or a destructive failure) goes through
//! [`CeremonyState::teardown`], which drops and wipes all accepted shares.
use serde::Serialize;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::crypto;
use crate::error::{QuorumError, Result};
use crate::keys::{MAX_KEY_LEN, MIN_KEY_LEN};
use crate::output::{OutputDescriptor, OutputMode};
use crate::shamir::{self, SHARE_OVERHEAD};

/// Public view of an in-flight ceremony. Never carries shares or the pad.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CeremonyConfig {
    pub nonce: String,
    pub threshold: usize,
    pub output: OutputDescriptor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Acceptance {
    Accepted,
    Duplicate,
}

pub(crate) struct Ceremony {
    nonce: String,
    threshold: usize,
    key_len: usize,
    mode: OutputMode,
    shares: Vec<Zeroizing<Vec<u8>>>,
}

impl Ceremony {
    fn new(mode: OutputMode, threshold: usize, key_len: usize) -> Self {
        Self {
            nonce: Uuid::new_v4().hyphenated().to_string(),
            threshold,
            key_len,
            mode,
            shares: Vec::with_capacity(threshold),
        }
    }

    pub(crate) fn config(&self) -> CeremonyConfig {
        CeremonyConfig {
            nonce: self.nonce.clone(),
            threshold: self.threshold,
            output: self.mode.descriptor(),
        }
    }

    pub(crate) fn progress(&self) -> usize {
        self.shares.len()
    }

    pub(crate) fn threshold(&self) -> usize {
        self.threshold
    }

    pub(crate) fn has_quorum(&self) -> bool {
        self.shares.len() >= self.threshold
    }

    pub(crate) fn check_nonce(&self, nonce: &str) -> Result<()> {
        if crypto::ct_eq(self.nonce.as_bytes(), nonce.as_bytes()) {
            Ok(())
        } else {
            Err(QuorumError::NonceMismatch)
        }
    }

    /// Validate `share` against the accepted set and record it.
    pub(crate) fn accept(&mut self, share: &[u8]) -> Result<Acceptance> {
        self.check_shape(share)?;

        for existing in &self.shares {
            if crypto::ct_eq(existing, share) {
                return Ok(Acceptance::Duplicate);
            }
        }

        if self.threshold > 1 {
            let x = shamir::x_coordinate(share)
                .ok_or_else(|| QuorumError::InvalidShare("missing x-coordinate".into()))?;
            if self
                .shares
                .iter()
                .any(|s| shamir::x_coordinate(s) == Some(x))
            {
                return Err(QuorumError::InvalidShare(
                    "conflicts with a previously accepted share".into(),
                ));
            }
        }

        self.shares.push(Zeroizing::new(share.to_vec()));
        Ok(Acceptance::Accepted)
    }

    /// Every share has the master key's length, plus the x-coordinate byte
    /// when the key is split.
    fn check_shape(&self, share: &[u8]) -> Result<()> {
        let overhead = if self.threshold > 1 { SHARE_OVERHEAD } else { 0 };
        let expected = self.key_len + overhead;
        if share.len() != expected {
            return Err(QuorumError::InvalidShare(format!(
                "key share must be {expected} bytes"
            )));
        }
        Ok(())
    }

    /// Undo the most recent acceptance.
    pub(crate) fn reject_last(&mut self) {
        self.shares.pop();
    }

    pub(crate) fn mode(&self) -> &OutputMode {
        &self.mode
    }

    pub(crate) fn shares(&self) -> &[Zeroizing<Vec<u8>>] {
        &self.shares
    }
}

#[derive(Default)]
pub(crate) enum CeremonyState {
    #[default]
    Idle,
    Configured(Ceremony),
}

impl CeremonyState {
    pub(crate) fn begin(
        &mut self,
        mode: OutputMode,
        threshold: usize,
        key_len: usize,
    ) -> Result<&Ceremony> {
        if threshold == 0 {
            return Err(QuorumError::InvalidConfig("threshold must be non-zero".into()));
        }
        if !(MIN_KEY_LEN..=MAX_KEY_LEN).contains(&key_len) {
            return Err(QuorumError::InvalidConfig(format!(
                "key length must be between {MIN_KEY_LEN} and {MAX_KEY_LEN} bytes"
            )));
        }
        if !self.is_idle() {
            return Err(QuorumError::AlreadyInProgress);
        }
        *self = Self::Configured(Ceremony::new(mode, threshold, key_len));
        self.active().ok_or(QuorumError::NotInProgress)
    }

    pub(crate) fn active(&self) -> Option<&Ceremony> {
        match self {
            Self::Idle => None,
            Self::Configured(c) => Some(c),
        }
    }

    pub(crate) fn active_mut(&mut self) -> Result<&mut Ceremony> {
        match self {
            Self::Idle => Err(QuorumError::NotInProgress),
            Self::Configured(c) => Ok(c),
        }
    }

    /// Return to `Idle`, handing back the ceremony that was running.
    pub(crate) fn teardown(&mut self) -> Option<Ceremony> {
        match std::mem::take(self) {
            Self::Idle => None,
            Self::Configured(c) => Some(c),
        }
    }

    pub(crate) fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
