// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::Path;

use tracing::info;

use quorum_core::error::{QuorumError, Result};
use quorum_core::CredentialRegistry;

use crate::output::Output;
use crate::store::FileRegistry;

pub fn cmd_tokens(out: &Output, data_dir: &Path) -> Result<()> {
    let registry = FileRegistry::open(data_dir)?;
    let entries = registry.entries()?;

    if entries.is_empty() {
        out.info("No credentials issued.");
        return Ok(());
    }

    out.table_header(&[("ACCESSOR", 38), ("POLICIES", 16), ("PARENT", 12)]);
    for entry in &entries {
        let policies = entry.policies.join(",");
        let parent = if entry.parent.is_empty() {
            "-"
        } else {
            entry.parent.as_str()
        };
        out.table_row(&[
            (entry.accessor.as_str(), 38, false),
            (policies.as_str(), 16, entry.is_root()),
            (parent, 12, false),
        ]);
    }
    out.newline();
    out.info(&format!("{} credential(s)", entries.len()));
    Ok(())
}

pub fn cmd_revoke(out: &Output, data_dir: &Path, accessor: &str) -> Result<()> {
    let registry = FileRegistry::open(data_dir)?;
    if !registry.revoke_accessor(accessor)? {
        return Err(QuorumError::Other(format!(
            "no credential with accessor {accessor}"
        )));
    }
    info!(accessor, "credential revoked");
    out.success("Credential revoked");
    Ok(())
}
