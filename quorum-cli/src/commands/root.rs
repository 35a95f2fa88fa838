// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use quorum_core::error::{QuorumError, Result};
use quorum_core::{MasterKeyVerifier, OutputMode, RootGenerator};

use crate::cli::OutputArgs;
use crate::output::Output;
use crate::store::{self, FileRegistry};

use super::{read_file_capped, ShareSource};

fn output_mode(args: &OutputArgs) -> Result<OutputMode> {
    let pgp_key = args.pgp_key.as_deref().map(read_file_capped).transpose()?;
    OutputMode::from_params(args.otp.as_deref(), pgp_key.as_deref())
}

pub fn cmd_generate_root(out: &Output, data_dir: &Path, args: &OutputArgs) -> Result<()> {
    let master = store::load_master(data_dir)?;
    let registry = Arc::new(FileRegistry::open(data_dir)?);
    let generator = RootGenerator::new(Arc::new(MasterKeyVerifier::new(master)), registry);

    generator.init_with_mode(output_mode(args)?)?;
    let config = generator
        .configuration()?
        .ok_or(QuorumError::NotInProgress)?;

    out.header("Root generation");
    out.field("Nonce", &config.nonce);
    out.field("Required shares", &config.threshold.to_string());
    if let Some(fingerprint) = config.output.pgp_fingerprint() {
        out.field("Recipient", fingerprint);
    }
    out.newline();

    let mut source = ShareSource::detect()?;
    let result = loop {
        let progress = generator.progress()?;
        let prompt = format!("Key share {} of {}", progress + 1, config.threshold);

        let share = match source.next_share(&prompt) {
            Ok(Some(share)) => share,
            Ok(None) => {
                generator.cancel()?;
                return Err(QuorumError::Other(format!(
                    "not enough key shares supplied ({progress} of {})",
                    config.threshold
                )));
            }
            Err(e) if source.is_interactive() && !e.is_destructive() => {
                out.error(&e.to_string());
                continue;
            }
            Err(e) => {
                generator.cancel()?;
                return Err(e);
            }
        };

        match generator.update(&share, &config.nonce) {
            Ok(Some(result)) => break result,
            Ok(None) => {
                let now = generator.progress()?;
                if now == progress {
                    out.warn("Share already submitted");
                } else {
                    debug!(progress = now, "share accepted");
                }
            }
            Err(QuorumError::EncodingFailedPostIssuance { accessor, reason }) => {
                out.revoke_hint(&accessor);
                return Err(QuorumError::EncodingFailedPostIssuance { accessor, reason });
            }
            Err(e) if e.is_destructive() => return Err(e),
            Err(e) if source.is_interactive() => {
                warn!(error = %e, "key share rejected");
                out.error(&e.to_string());
            }
            Err(e) => {
                generator.cancel()?;
                return Err(e);
            }
        }
    };

    info!(nonce = %config.nonce, "root credential delivered");
    out.success("Root credential generated");
    out.info("Decode the token with the pad or private key chosen at start.");
    out.emit(&result.encoded_credential);
    Ok(())
}
