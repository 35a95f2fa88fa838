// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Quorum Core - Threshold-authorized root credential generation
//!
//! This crate provides the ceremony that mints a new root credential once
//! enough key-share holders have cooperated:
//! - Shamir reconstruction over GF(256) with partial share validation
//! - One-time-pad or OpenPGP protected delivery of the credential
//! - A single-ceremony state machine guarded by one mutex
#![forbid(unsafe_code)]

mod ceremony;
pub mod coordinator;
pub mod crypto;
pub mod error;
pub mod keys;
pub mod output;
pub mod recipient;
pub mod registry;
pub mod shamir;

pub use ceremony::CeremonyConfig;
pub use coordinator::{CeremonyResult, GenerationStatus, RootGenerator};
pub use error::{QuorumError, Result};
pub use keys::{KeyManager, MasterKeyConfig, MasterKeyVerifier};
pub use output::{decode_otp, decode_pgp, generate_otp, OutputDescriptor, OutputMode};
pub use recipient::{RecipientKey, RecipientKeypair};
pub use registry::{CredentialEntry, CredentialRegistry, MemoryRegistry};
