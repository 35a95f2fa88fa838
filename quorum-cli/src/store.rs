// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

//! On-disk state for the operator tooling: the master key description and a
//! JSON-file credential registry.
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::debug;

use quorum_core::error::{QuorumError, Result};
use quorum_core::{CredentialEntry, CredentialRegistry, MasterKeyConfig};

pub const MASTER_FILE: &str = "master.json";
pub const TOKENS_FILE: &str = "tokens.json";

const MAX_STATE_SIZE: u64 = 16 * 1024 * 1024;

pub fn master_path(data_dir: &Path) -> PathBuf {
    data_dir.join(MASTER_FILE)
}

pub fn load_master(data_dir: &Path) -> Result<MasterKeyConfig> {
    let path = master_path(data_dir);
    if !path.exists() {
        return Err(QuorumError::Other(format!(
            "no master key at {}, run `quorum init` first",
            path.display()
        )));
    }
    let content = read_capped(&path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn save_master(data_dir: &Path, config: &MasterKeyConfig) -> Result<()> {
    let path = master_path(data_dir);
    if path.exists() {
        return Err(QuorumError::Other(format!(
            "master key already exists at {}",
            path.display()
        )));
    }
    std::fs::create_dir_all(data_dir)?;
    let json = serde_json::to_vec_pretty(config)?;
    write_atomic(&path, &json)
}

fn read_capped(path: &Path) -> Result<String> {
    let metadata = std::fs::metadata(path)?;
    if metadata.len() > MAX_STATE_SIZE {
        return Err(QuorumError::Other(format!(
            "{} is too large",
            path.display()
        )));
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Write `data` to a sibling temp file, then rename it over `path`.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("tmp");

    let result = (|| -> Result<()> {
        let mut file = File::create(&temp_path)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(data)?;
        file.sync_all()?;
        Ok(())
    })();

    if let Err(e) = result {
        let _ = std::fs::remove_file(&temp_path);
        return Err(e);
    }

    std::fs::rename(&temp_path, path).map_err(|e| {
        let _ = std::fs::remove_file(&temp_path);
        QuorumError::Other(format!("failed to replace {}: {e}", path.display()))
    })
}

/// Credential registry persisted as a JSON array, rewritten after every
/// mutation.
pub struct FileRegistry {
    path: PathBuf,
    entries: Mutex<Vec<CredentialEntry>>,
}

impl FileRegistry {
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(TOKENS_FILE);
        let entries = if path.exists() {
            serde_json::from_str(&read_capped(&path)?)?
        } else {
            Vec::new()
        };
        debug!(path = %path.display(), "opened credential store");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn entries(&self) -> Result<Vec<CredentialEntry>> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<CredentialEntry>>> {
        self.entries
            .lock()
            .map_err(|_| QuorumError::Runtime("lock poisoned".into()))
    }

    fn flush(&self, entries: &[CredentialEntry]) -> Result<()> {
        let json = serde_json::to_vec_pretty(entries)?;
        write_atomic(&self.path, &json)
    }
}

impl CredentialRegistry for FileRegistry {
    fn issue_root_credential(&self) -> Result<CredentialEntry> {
        let mut entries = self.lock()?;
        let entry = CredentialEntry::new_root();
        if entries.iter().any(|e| e.id == entry.id) {
            return Err(QuorumError::Registry("credential id collision".into()));
        }
        entries.push(entry.clone());
        if let Err(e) = self.flush(&entries) {
            entries.pop();
            return Err(QuorumError::Registry(e.to_string()));
        }
        Ok(entry)
    }

    fn lookup(&self, id: &str) -> Result<Option<CredentialEntry>> {
        Ok(self.lock()?.iter().find(|e| e.id == id).cloned())
    }

    fn revoke_accessor(&self, accessor: &str) -> Result<bool> {
        let mut entries = self.lock()?;
        let before = entries.len();
        entries.retain(|e| e.accessor != accessor);
        if entries.len() == before {
            return Ok(false);
        }
        self.flush(&entries)?;
        Ok(true)
    }
}
