// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Credential registry collaborator.
use std::collections::HashMap;
use std::fmt;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{lock_error, QuorumError, Result};

pub const ROOT_POLICY: &str = "root";

/// A stored credential. The id is the bearer secret; the accessor is a
/// separate handle that is safe to log and can be used to revoke it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialEntry {
    pub id: String,
    pub accessor: String,
    pub parent: String,
    pub policies: Vec<String>,
}

impl CredentialEntry {
    /// A fresh parentless entry carrying only the root policy.
    pub fn new_root() -> Self {
        Self {
            id: Uuid::new_v4().hyphenated().to_string(),
            accessor: Uuid::new_v4().hyphenated().to_string(),
            parent: String::new(),
            policies: vec![ROOT_POLICY.to_string()],
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_empty() && self.policies.len() == 1 && self.policies[0] == ROOT_POLICY
    }
}

impl fmt::Debug for CredentialEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialEntry")
            .field("id", &"<redacted>")
            .field("accessor", &self.accessor)
            .field("parent", &self.parent)
            .field("policies", &self.policies)
            .finish()
    }
}

pub trait CredentialRegistry: Send + Sync {
    /// Create and persist a new root credential.
    fn issue_root_credential(&self) -> Result<CredentialEntry>;

    fn lookup(&self, id: &str) -> Result<Option<CredentialEntry>>;

    /// Revoke by accessor. Returns whether an entry was removed.
    fn revoke_accessor(&self, accessor: &str) -> Result<bool>;
}

/// In-memory registry.
#[derive(Default)]
pub struct MemoryRegistry {
    entries: RwLock<HashMap<String, CredentialEntry>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize> {
        let entries = self.entries.read().map_err(lock_error)?;
        Ok(entries.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    pub fn entries(&self) -> Result<Vec<CredentialEntry>> {
        let entries = self.entries.read().map_err(lock_error)?;
        Ok(entries.values().cloned().collect())
    }

    pub fn insert(&self, entry: CredentialEntry) -> Result<()> {
        let mut entries = self.entries.write().map_err(lock_error)?;
        if entries.contains_key(&entry.id) {
            return Err(QuorumError::Registry("credential id collision".into()));
        }
        entries.insert(entry.id.clone(), entry);
        Ok(())
    }
}

impl CredentialRegistry for MemoryRegistry {
    fn issue_root_credential(&self) -> Result<CredentialEntry> {
        let entry = CredentialEntry::new_root();
        self.insert(entry.clone())?;
        Ok(entry)
    }

    fn lookup(&self, id: &str) -> Result<Option<CredentialEntry>> {
        let entries = self.entries.read().map_err(lock_error)?;
        Ok(entries.get(id).cloned())
    }

    fn revoke_accessor(&self, accessor: &str) -> Result<bool> {
        let mut entries = self.entries.write().map_err(lock_error)?;
        let before = entries.len();
        entries.retain(|_, e| e.accessor != accessor);
        Ok(entries.len() != before)
    }
}
