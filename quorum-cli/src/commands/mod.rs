// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

pub mod master;
pub mod otp;
pub mod recipient;
pub mod root;
pub mod tokens;

use dialoguer::{theme::ColorfulTheme, Password};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use zeroize::Zeroizing;

use quorum_core::error::{QuorumError, Result};

const SHARES_ENV: &str = "QUORUM_SHARES";

fn warn_env_secret(var_name: &str) {
    tracing::warn!(
        "Using key shares from {} environment variable. \
         Environment variables may be visible to other processes via /proc on Linux.",
        var_name
    );
}

/// Where submitted key shares come from.
pub enum ShareSource {
    Env(std::vec::IntoIter<Zeroizing<Vec<u8>>>),
    Prompt,
}

impl ShareSource {
    pub fn detect() -> Result<Self> {
        match std::env::var(SHARES_ENV) {
            Ok(raw) => {
                debug!("using key shares from {} env var", SHARES_ENV);
                warn_env_secret(SHARES_ENV);
                let raw = SecretString::from(raw);
                Ok(Self::Env(parse_share_list(raw.expose_secret())?.into_iter()))
            }
            Err(_) => Ok(Self::Prompt),
        }
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Prompt)
    }

    /// The next share, or `None` once a non-interactive source runs dry.
    pub fn next_share(&mut self, prompt: &str) -> Result<Option<Zeroizing<Vec<u8>>>> {
        match self {
            Self::Env(shares) => Ok(shares.next()),
            Self::Prompt => {
                let input = Password::with_theme(&ColorfulTheme::default())
                    .with_prompt(prompt)
                    .interact()
                    .map_err(|e| QuorumError::Other(format!("Failed to read key share: {}", e)))?;
                let input = SecretString::from(input);
                parse_share(input.expose_secret()).map(Some)
            }
        }
    }
}

pub fn parse_share(hex_share: &str) -> Result<Zeroizing<Vec<u8>>> {
    hex::decode(hex_share.trim())
        .map(Zeroizing::new)
        .map_err(|_| QuorumError::InvalidShare("key share must be hex encoded".into()))
}

fn parse_share_list(raw: &str) -> Result<Vec<Zeroizing<Vec<u8>>>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_share)
        .collect()
}

pub fn read_file_capped(path: &std::path::Path) -> Result<String> {
    const MAX_KEY_FILE_SIZE: u64 = 64 * 1024;
    let metadata = std::fs::metadata(path).map_err(|e| {
        QuorumError::Other(format!("Failed to read {}: {}", path.display(), e))
    })?;
    if metadata.len() > MAX_KEY_FILE_SIZE {
        return Err(QuorumError::Other(format!("{} is too large", path.display())));
    }
    Ok(std::fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_share_list() {
        let shares = parse_share_list(" 0a0b, 0c0d ,,").unwrap();
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].as_slice(), &[0x0a, 0x0b]);
        assert_eq!(shares[1].as_slice(), &[0x0c, 0x0d]);
    }

    #[test]
    fn test_parse_share_rejects_non_hex() {
        assert!(matches!(
            parse_share("zz"),
            Err(QuorumError::InvalidShare(_))
        ));
    }
}
