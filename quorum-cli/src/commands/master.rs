// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::Path;

use tracing::info;

use quorum_core::error::Result;
use quorum_core::MasterKeyConfig;

use crate::output::Output;
use crate::store;

pub fn cmd_init(
    out: &Output,
    data_dir: &Path,
    threshold: u8,
    shares: u8,
    key_len: usize,
) -> Result<()> {
    out.header("Creating master key");
    out.field("Path", &store::master_path(data_dir).display().to_string());
    out.field("Threshold", &format!("{threshold} of {shares}"));
    out.newline();

    let (config, parts) = MasterKeyConfig::generate(threshold, shares, key_len)?;
    store::save_master(data_dir, &config)?;

    info!(threshold, shares, key_len, "master key created");

    out.success("Master key created!");
    out.field("Fingerprint", &hex::encode(&config.fingerprint[..8]));
    out.newline();

    for (i, part) in parts.iter().enumerate() {
        out.key_field(&format!("Share {}", i + 1), &hex::encode(part.as_slice()));
    }

    out.share_notes();
    Ok(())
}
