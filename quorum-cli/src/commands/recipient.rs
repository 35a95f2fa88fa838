// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::Path;

use tracing::info;

use quorum_core::error::{QuorumError, Result};
use quorum_core::output::decode_pgp;
use quorum_core::RecipientKeypair;

use crate::output::Output;
use crate::store;

use super::read_file_capped;

pub fn cmd_keygen(out: &Output, key_out: &Path) -> Result<()> {
    if key_out.exists() {
        return Err(QuorumError::Other(format!(
            "{} already exists",
            key_out.display()
        )));
    }

    let keypair = RecipientKeypair::generate()?;
    let private = keypair.to_armored()?;
    store::write_atomic(key_out, private.as_bytes())?;

    let public = keypair.public_key();
    info!(fingerprint = %public.fingerprint(), "recipient key generated");

    out.success("Generated OpenPGP recipient keypair");
    out.field("Private key", &key_out.display().to_string());
    out.key_field("Fingerprint", &public.fingerprint());
    out.emit(&public.to_armored()?);
    Ok(())
}

pub fn cmd_decrypt(out: &Output, key: &Path, encoded: &str) -> Result<()> {
    let armored = zeroize::Zeroizing::new(read_file_capped(key)?);
    let keypair = RecipientKeypair::from_armored(&armored)?;
    let id = decode_pgp(encoded, &keypair)?;
    out.success("Decrypted root credential");
    out.emit(&id);
    Ok(())
}
